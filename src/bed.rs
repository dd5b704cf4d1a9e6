//! Document → machine bed mapping.
//!
//! One uniform scale fits the larger document dimension onto the bed, the
//! content is centered on both axes and the y axis is flipped.

use crate::document::DocumentNode;
use crate::types::{Point, Transform};
use crate::walker::walk;
use tracing::{debug, warn};

/// Working dimension of the machine bed
pub const BED_SIZE: f64 = 50.0;

/// Canvas size used when the document says nothing about its size
pub const FALLBACK_SIZE: f64 = 100.0;

/// Global fit of a document onto the bed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedFit {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Document height, the pivot of the y flip
    pub height: f64,
}

impl BedFit {
    /// Map a document-space point into machine space
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset_x,
            (self.height - p.y) * self.scale + self.offset_y,
        )
    }
}

/// Compute the scale and centering offsets for a `width` × `height` document
pub fn compute_fit(width: f64, height: f64) -> BedFit {
    let scale = BED_SIZE / width.max(height);
    BedFit {
        scale,
        offset_x: (BED_SIZE - width * scale) / 2.0,
        offset_y: (BED_SIZE - height * scale) / 2.0,
        height,
    }
}

/// Logical size of a document.
///
/// Tries the root `viewBox`, then `width`/`height` with unit suffixes
/// stripped, then the extent of the document's own geometry, and finally
/// falls back to `FALLBACK_SIZE` square.
pub fn document_size(root: &DocumentNode) -> (f64, f64) {
    if let Some(size) = root.attribute("viewBox").and_then(parse_view_box) {
        debug!("Document size from viewBox: {}x{}", size.0, size.1);
        return size;
    }

    if let (Some(w), Some(h)) = (root.attribute("width"), root.attribute("height"))
        && let (Some(w), Some(h)) = (parse_length(w), parse_length(h))
        && usable(w, h)
    {
        debug!("Document size from width/height: {}x{}", w, h);
        return (w, h);
    }

    if let Some(size) = geometry_extent(root) {
        warn!(
            "No viewBox or width/height, using geometry extent {}x{}",
            size.0, size.1
        );
        return size;
    }

    warn!(
        "No size information and no geometry, using {}x{} canvas",
        FALLBACK_SIZE, FALLBACK_SIZE
    );
    (FALLBACK_SIZE, FALLBACK_SIZE)
}

fn usable(w: f64, h: f64) -> bool {
    w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0 && w.max(h) > 0.0
}

fn parse_view_box(raw: &str) -> Option<(f64, f64)> {
    let nums: Vec<f64> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect::<Option<_>>()?;

    match nums.as_slice() {
        [_, _, w, h] if usable(*w, *h) => Some((*w, *h)),
        _ => {
            warn!("Ignoring unusable viewBox \"{}\"", raw);
            None
        }
    }
}

/// "210mm" → 210, "12.5px" → 12.5
fn parse_length(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// Extent from the origin of the document's geometry in document space
fn geometry_extent(root: &DocumentNode) -> Option<(f64, f64)> {
    let colors = walk(root, Transform::identity(), &|p: Point| p);
    let points = colors.values().flatten().flatten();

    let (w, h) = points.fold((0.0_f64, 0.0_f64), |(w, h), p| (w.max(p.x), h.max(p.y)));
    usable(w, h).then_some((w, h))
}
