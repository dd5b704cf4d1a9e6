//! Grayscale conversion and shade quantization
//!
//! Reduces an image to a small palette of gray levels using median cut over
//! the luma histogram.

use image::{GrayImage, Luma, Rgba, RgbaImage};

/// A quantized image: one palette index per pixel, row-major
#[derive(Debug, Clone)]
pub struct ShadeMap {
    pub width: u32,
    pub height: u32,
    /// Gray value per palette entry, ascending
    pub palette: Vec<u8>,
    pub indices: Vec<u8>,
}

impl ShadeMap {
    /// Row `y` as palette indices
    pub fn row(&self, y: u32) -> &[u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.indices[start..start + w]
    }
}

/// Blend every pixel onto an opaque white background
pub fn composite_on_white(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let blend = |c: u8| -> u8 {
            let a = a as u32;
            ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        *pixel = Rgba([blend(r), blend(g), blend(b), 255]);
    }
    out
}

/// ITU-R 601-2 luma, fixed point
pub fn to_gray(img: &RgbaImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut gray = GrayImage::new(width, height);
    for (src, dst) in img.pixels().zip(gray.pixels_mut()) {
        let Rgba([r, g, b, _]) = *src;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        *dst = Luma([l as u8]);
    }
    gray
}

/// Contiguous run of gray levels
#[derive(Debug, Clone, Copy)]
struct GrayBox {
    lo: usize,
    hi: usize,
}

impl GrayBox {
    fn population(&self, histogram: &[u64; 256]) -> u64 {
        histogram[self.lo..=self.hi].iter().sum()
    }

    fn distinct(&self, histogram: &[u64; 256]) -> usize {
        histogram[self.lo..=self.hi].iter().filter(|&&c| c > 0).count()
    }

    /// Split at the median pixel so both halves keep at least one level in use
    fn split(&self, histogram: &[u64; 256]) -> Option<(GrayBox, GrayBox)> {
        let used: Vec<usize> = (self.lo..=self.hi).filter(|&v| histogram[v] > 0).collect();
        if used.len() < 2 {
            return None;
        }

        let half = self.population(histogram).div_ceil(2);
        let mut cumulative = 0;
        let mut k = used.len() - 1;
        for (i, &v) in used.iter().enumerate() {
            cumulative += histogram[v];
            if cumulative >= half {
                k = i + 1;
                break;
            }
        }
        let k = k.clamp(1, used.len() - 1);

        let cut = used[k - 1];
        Some((
            GrayBox {
                lo: self.lo,
                hi: cut,
            },
            GrayBox {
                lo: cut + 1,
                hi: self.hi,
            },
        ))
    }

    /// Population weighted mean gray value
    fn mean(&self, histogram: &[u64; 256]) -> u8 {
        let population = self.population(histogram);
        if population == 0 {
            return ((self.lo + self.hi) / 2) as u8;
        }
        let weighted: u64 = (self.lo..=self.hi)
            .map(|v| v as u64 * histogram[v])
            .sum();
        ((weighted + population / 2) / population) as u8
    }
}

/// Quantize a grayscale image to at most `num_colors` shades
pub fn quantize(gray: &GrayImage, num_colors: usize) -> ShadeMap {
    let (width, height) = gray.dimensions();

    let mut histogram = [0u64; 256];
    for Luma([v]) in gray.pixels() {
        histogram[*v as usize] += 1;
    }

    let mut boxes = vec![GrayBox { lo: 0, hi: 255 }];
    while boxes.len() < num_colors.clamp(1, 256) {
        // most populated box that can still be split
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.distinct(&histogram) > 1)
            .max_by_key(|(_, b)| b.population(&histogram))
            .map(|(i, _)| i);

        let Some(i) = candidate else { break };
        let Some((left, right)) = boxes[i].split(&histogram) else {
            break;
        };
        boxes[i] = left;
        boxes.insert(i + 1, right);
    }

    // drop ranges no pixel falls into
    boxes.retain(|b| b.population(&histogram) > 0);

    let mut lookup = [0u8; 256];
    for (index, b) in boxes.iter().enumerate() {
        for slot in &mut lookup[b.lo..=b.hi] {
            *slot = index as u8;
        }
    }

    ShadeMap {
        width,
        height,
        palette: boxes.iter().map(|b| b.mean(&histogram)).collect(),
        indices: gray.pixels().map(|Luma([v])| lookup[*v as usize]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_image(values: &[u8]) -> GrayImage {
        GrayImage::from_fn(values.len() as u32, 1, |x, _| Luma([values[x as usize]]))
    }

    #[test]
    fn test_transparent_becomes_white() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let out = composite_on_white(&img);
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_opaque_unchanged() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([12, 34, 56, 255]));
        assert_eq!(*composite_on_white(&img).get_pixel(0, 0), Rgba([12, 34, 56, 255]));
    }

    #[test]
    fn test_gray_weights() {
        let img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([255, 255, 255, 255]),
            1 => Rgba([0, 0, 0, 255]),
            _ => Rgba([255, 0, 0, 255]),
        });
        let gray = to_gray(&img);
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
        assert_eq!(gray.get_pixel(1, 0)[0], 0);
        assert_eq!(gray.get_pixel(2, 0)[0], 76);
    }

    #[test]
    fn test_quantize_two_levels_exact() {
        let map = quantize(&gray_image(&[0, 0, 255, 255]), 16);
        assert_eq!(map.palette, vec![0, 255]);
        assert_eq!(map.indices, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_quantize_respects_limit() {
        let values: Vec<u8> = (0..=255).collect();
        let map = quantize(&gray_image(&values), 4);
        assert_eq!(map.palette.len(), 4);
        assert!(map.palette.windows(2).all(|w| w[0] < w[1]));
        // indices are monotonic in gray value
        assert!(map.indices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_quantize_single_color() {
        let map = quantize(&gray_image(&[128; 5]), 8);
        assert_eq!(map.palette, vec![128]);
        assert!(map.indices.iter().all(|&i| i == 0));
    }
}
