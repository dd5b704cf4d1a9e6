//! Ruida controller `.rd` writer.
//!
//! A file is header + body + trailer, byte-scrambled as a whole. Lengths are
//! in mm on the way in and micrometres on the wire, powers in percent, speeds
//! in mm/s. All multi-byte numbers use 7 bits per byte, most significant first.

use super::JobEncoder;
use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::types::{ColorLayer, LaserJob, Point, Rgb};
use tracing::debug;

/// Largest relative step on either axis, in mm
const MAX_RELATIVE: f64 = 8.191;

/// Absolute coordinates every this many relative commands, bounding rounding drift
const DEFAULT_FORCE_ABS: usize = 100;

/// Integer as `length` 7-bit groups. Values that need more groups keep them;
/// non-positive values encode as zeros.
pub fn encode_int(value: i64, length: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(length);
    let mut n = value;
    while n > 0 {
        out.push((n & 0x7f) as u8);
        n >>= 7;
    }
    while out.len() < length {
        out.push(0);
    }
    out.reverse();
    out
}

/// Length in mm as 5 bytes of micrometres
pub fn encode_mm(mm: f64) -> Vec<u8> {
    encode_int((mm * 1000.0) as i64, 5)
}

/// Percentage as 14 bits (100% = 0x3fff) in two bytes
pub fn encode_percent(percent: f64) -> [u8; 2] {
    let a = (percent.clamp(0.0, 100.0) * 0x3fff as f64 * 0.01) as i64;
    [(a >> 7) as u8, (a & 0x7f) as u8]
}

/// Signed relative offset in mm as 14-bit two's complement micrometres
pub fn encode_relcoord(mm: f64) -> Result<[u8; 2]> {
    let mut n = (mm * 1000.0) as i64;
    if !(-8191..=8191).contains(&n) {
        return Err(Error::Encode(format!(
            "relative coordinate {}mm is out of range",
            mm
        )));
    }
    if n < 0 {
        n += 16384;
    }
    Ok([(n >> 7) as u8, (n & 0x7f) as u8])
}

/// Preview color, packed BGR
pub fn encode_color(rgb: Rgb) -> Vec<u8> {
    let packed = ((rgb.b as i64) << 16) | ((rgb.g as i64) << 8) | rgb.r as i64;
    encode_int(packed, 5)
}

/// Swap the top and bottom bits, xor 0x88, add one
pub fn scramble(b: u8) -> u8 {
    let swapped = (b & 0x7e) | ((b & 0x01) << 7) | ((b & 0x80) >> 7);
    (swapped ^ 0x88).wrapping_add(1)
}

pub fn unscramble(b: u8) -> u8 {
    let r = b.wrapping_sub(1) ^ 0x88;
    (r & 0x7e) | ((r & 0x01) << 7) | ((r & 0x80) >> 7)
}

/// Command stream under construction
#[derive(Default)]
struct Commands(Vec<u8>);

impl Commands {
    fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(bytes);
        self
    }

    fn byte(&mut self, n: usize) -> &mut Self {
        let bytes = encode_int(n as i64, 1);
        self.raw(&bytes)
    }

    fn mm(&mut self, mm: f64) -> &mut Self {
        let bytes = encode_mm(mm);
        self.raw(&bytes)
    }

    fn point(&mut self, x: f64, y: f64) -> &mut Self {
        self.mm(x).mm(y)
    }

    fn percent(&mut self, percent: f64) -> &mut Self {
        let bytes = encode_percent(percent);
        self.raw(&bytes)
    }

    fn color(&mut self, rgb: Rgb) -> &mut Self {
        let bytes = encode_color(rgb);
        self.raw(&bytes)
    }

    fn rel(&mut self, mm: f64) -> Result<&mut Self> {
        let bytes = encode_relcoord(mm)?;
        Ok(self.raw(&bytes))
    }
}

/// A layer with its bounding box and the four laser power pairs
struct PreparedLayer<'a> {
    layer: &'a ColorLayer,
    bounds: Bounds,
    powers: [f64; 8],
}

impl<'a> PreparedLayer<'a> {
    fn new(layer: &'a ColorLayer) -> Result<Self> {
        let bounds = Bounds::of_paths(&layer.paths).ok_or_else(|| {
            Error::Encode(format!("layer {} has no points", layer.color_key))
        })?;
        let [min, max] = layer.power_range();
        Ok(Self {
            layer,
            bounds,
            powers: [min, max, min, max, min, max, min, max],
        })
    }
}

/// Writes jobs in the Ruida `.rd` format
#[derive(Debug, Clone)]
pub struct RuidaEncoder {
    /// Unscrambled output is only useful for debugging
    pub scramble: bool,
    /// 0 never forces absolute moves, 1 disables relative moves
    pub force_abs: usize,
}

impl Default for RuidaEncoder {
    fn default() -> Self {
        Self {
            scramble: true,
            force_abs: DEFAULT_FORCE_ABS,
        }
    }
}

impl JobEncoder for RuidaEncoder {
    fn encode(&self, job: &LaserJob) -> Result<Vec<u8>> {
        if job.is_empty() {
            return Ok(Vec::new());
        }

        let layers = job
            .iter()
            .map(PreparedLayer::new)
            .collect::<Result<Vec<_>>>()?;

        let mut out = Commands::default();
        self.header(&mut out, &layers);
        self.body(&mut out, &layers)?;
        let cut: f64 = layers.iter().map(|l| cut_distance(&l.layer.paths)).sum();
        self.trailer(&mut out, cut);

        debug!("Encoded {} layer(s) into {} bytes", layers.len(), out.0.len());

        let mut bytes = out.0;
        if self.scramble {
            bytes.iter_mut().for_each(|b| *b = scramble(*b));
        }
        Ok(bytes)
    }
}

impl RuidaEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scramble(mut self, scramble: bool) -> Self {
        self.scramble = scramble;
        self
    }

    fn header(&self, out: &mut Commands, layers: &[PreparedLayer]) {
        let mut global = layers[0].bounds;
        for l in &layers[1..] {
            global.expand(&l.bounds);
        }
        let (x0, y0, x1, y1) = (global.min_x, global.min_y, global.max_x, global.max_y);

        out.raw(&[0xd8, 0x12, 0xf0, 0xf1, 0x02, 0x00, 0xd8, 0x00]);
        out.raw(&[0xe7, 0x06]).point(0.0, 0.0);
        out.raw(&[0xe7, 0x03]).point(x0, y0);
        out.raw(&[0xe7, 0x07]).point(x1, y1);
        out.raw(&[0xe7, 0x50]).point(x0, y0);
        out.raw(&[0xe7, 0x51]).point(x1, y1);
        out.raw(&[0xe7, 0x04, 0x00, 0x01, 0x00, 0x01]).point(0.0, 0.0);
        out.raw(&[0xe7, 0x05, 0x00]);

        for (lnum, l) in layers.iter().enumerate() {
            let p = &l.powers;
            let b = &l.bounds;

            out.raw(&[0xc9, 0x04]).byte(lnum).mm(l.layer.speed);

            for (i, (min_op, max_op)) in [(0x31, 0x32), (0x41, 0x42), (0x35, 0x36), (0x37, 0x38)]
                .into_iter()
                .enumerate()
            {
                out.raw(&[0xc6, min_op]).byte(lnum).percent(p[2 * i]);
                out.raw(&[0xc6, max_op]).byte(lnum).percent(p[2 * i + 1]);
            }

            out.raw(&[0xca, 0x06]).byte(lnum).color(l.layer.rgb);
            out.raw(&[0xca, 0x41]).byte(lnum).byte(0);
            out.raw(&[0xe7, 0x52]).byte(lnum).point(b.min_x, b.min_y);
            out.raw(&[0xe7, 0x53]).byte(lnum).point(b.max_x, b.max_y);
            out.raw(&[0xe7, 0x61]).byte(lnum).point(b.min_x, b.min_y);
            out.raw(&[0xe7, 0x62]).byte(lnum).point(b.max_x, b.max_y);
        }

        out.raw(&[0xca, 0x22]).byte(layers.len() - 1);
        out.raw(&[0xe7, 0x54, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        out.raw(&[0xe7, 0x54, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        out.raw(&[0xe7, 0x55, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        out.raw(&[0xe7, 0x55, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        out.raw(&[0xf1, 0x03]).raw(&[0x00; 10]);
        out.raw(&[0xf1, 0x00, 0x00, 0xf1, 0x01, 0x00]);
        out.raw(&[0xf2, 0x00, 0x00, 0xf2, 0x01, 0x00]);
        out.raw(&[
            0xf2, 0x02, 0x05, 0x2a, 0x39, 0x1c, 0x41, 0x04, 0x6a, 0x15, 0x08, 0x20,
        ]);
        out.raw(&[0xf2, 0x03]).point(x0, y0);
        out.raw(&[0xf2, 0x04]).point(x1, y1);
        out.raw(&[0xf2, 0x06]).point(x0, y0);
        out.raw(&[0xf2, 0x07, 0x00]);
        out.raw(&[0xf2, 0x05, 0x00, 0x01, 0x00, 0x01]).point(x1, y1);
        out.raw(&[0xea, 0x00, 0xe7, 0x60, 0x00]);
        out.raw(&[0xe7, 0x13]).point(x0, y0);
        out.raw(&[0xe7, 0x17]).point(x1, y1);
        out.raw(&[0xe7, 0x23]).point(x0, y0);
        out.raw(&[0xe7, 0x24, 0x00]);
        out.raw(&[0xe7, 0x08, 0x00, 0x01, 0x00, 0x01]).point(x1, y1);
    }

    fn body(&self, out: &mut Commands, layers: &[PreparedLayer]) -> Result<()> {
        for (lnum, l) in layers.iter().enumerate() {
            let p = &l.powers;

            out.raw(&[0xca, 0x01, 0x00, 0xca, 0x02]).byte(lnum);
            out.raw(&[0xca, 0x01, 0x30, 0xca, 0x01, 0x10, 0xca, 0x01, 0x13]);
            out.raw(&[0xc9, 0x02]).mm(l.layer.speed);
            out.raw(&[0xc6, 0x15, 0x00, 0x00, 0x00, 0x00, 0x00]);
            out.raw(&[0xc6, 0x16, 0x00, 0x00, 0x00, 0x00, 0x00]);
            for (op, power) in [0x01, 0x02, 0x21, 0x22, 0x05, 0x06, 0x07, 0x08]
                .into_iter()
                .zip(p)
            {
                out.raw(&[0xc6, op]).percent(*power);
            }
            out.raw(&[0xca, 0x03, 0x01, 0xca, 0x10, 0x00]);

            self.moves(out, &l.layer.paths)?;
        }
        Ok(())
    }

    /// The first point of each path is a travel move, the rest are cuts
    fn moves(&self, out: &mut Commands, paths: &[Vec<Point>]) -> Result<()> {
        let mut last: Option<Point> = None;
        let mut relative_run = 0usize;

        for path in paths {
            for (i, &p) in path.iter().enumerate() {
                let travel = i == 0;

                let relative = last.filter(|lp| {
                    (p.x - lp.x).abs().max((p.y - lp.y).abs()) <= MAX_RELATIVE
                        && (self.force_abs == 0 || relative_run < self.force_abs)
                });

                match relative {
                    Some(lp) => {
                        if self.force_abs > 0 {
                            relative_run += 1;
                        }
                        let (dx, dy) = (p.x - lp.x, p.y - lp.y);
                        if p.y == lp.y {
                            out.raw(&[if travel { 0x8a } else { 0xaa }]).rel(dx)?;
                        } else if p.x == lp.x {
                            out.raw(&[if travel { 0x8b } else { 0xab }]).rel(dy)?;
                        } else {
                            out.raw(&[if travel { 0x89 } else { 0xa9 }])
                                .rel(dx)?
                                .rel(dy)?;
                        }
                    }
                    None => {
                        relative_run = 0;
                        out.raw(&[if travel { 0x88 } else { 0xa8 }]).point(p.x, p.y);
                    }
                }

                last = Some(p);
            }
        }
        Ok(())
    }

    /// The cut distance goes in twice, in metres
    fn trailer(&self, out: &mut Commands, cut_mm: f64) {
        out.raw(&[0xeb, 0xe7, 0x00, 0xda, 0x01, 0x06, 0x20]);
        out.mm(cut_mm * 0.001).mm(cut_mm * 0.001);
        out.raw(&[0xd7]);
    }
}

/// Total length of all cut moves in mm
fn cut_distance(paths: &[Vec<Point>]) -> f64 {
    paths
        .iter()
        .flat_map(|path| path.windows(2))
        .map(|w| w[0].distance(&w[1]))
        .sum()
}
