//! Raster image to vector document conversion
//!
//! This module turns raster images (PNG, JPEG) into an SVG document the
//! compiler can consume, one stroked path per gray shade.
//!
//! The conversion process:
//! 1. Load image and composite any transparency onto white
//! 2. Optionally downscale to keep the number of runs manageable
//! 3. Convert to grayscale and quantize to a few shades
//! 4. Trace each non-background shade row by row into horizontal runs
//! 5. Assemble the SVG, stroke color = shade gray value

mod quantize;
mod trace;

use crate::error::Result;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

pub use quantize::{ShadeMap, composite_on_white, quantize, to_gray};
pub use trace::{row_runs, trace_shade};

/// Options for raster conversion
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Number of gray shades to quantize to (default: 16)
    pub num_colors: usize,
    /// Downscale factor applied before tracing, clamped to [0.01, 1] (default: 0.5)
    pub scale: f64,
    /// Shades at or above this gray value are background and skipped (default: 250)
    pub background_threshold: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            num_colors: 16,
            scale: 0.5,
            background_threshold: 250,
        }
    }
}

/// Result of rasterization containing the SVG string
pub struct RasterResult {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// Convert image bytes into a shaded SVG
pub fn rasterize_image(image_bytes: &[u8], options: Option<RasterOptions>) -> Result<RasterResult> {
    let img = ImageReader::new(Cursor::new(image_bytes))
        .with_guessed_format()?
        .decode()?;

    rasterize_dynamic_image(&img, &options.unwrap_or_default())
}

/// Convert an image file into a shaded SVG
pub fn rasterize_image_file(
    path: impl AsRef<Path>,
    options: Option<RasterOptions>,
) -> Result<RasterResult> {
    let path = path.as_ref();
    info!("Opening image: {}", path.display());
    let img = ImageReader::open(path)?.decode()?;

    rasterize_dynamic_image(&img, &options.unwrap_or_default())
}

/// Convert a decoded image into a shaded SVG
pub fn rasterize_dynamic_image(img: &DynamicImage, options: &RasterOptions) -> Result<RasterResult> {
    let mut rgba = img.to_rgba8();
    if img.color().has_alpha() {
        debug!("Image has transparency, compositing onto white");
        rgba = composite_on_white(&rgba);
    }

    let scale = options.scale.clamp(0.01, 1.0);
    if scale < 1.0 {
        let (w, h) = img.dimensions();
        let new_w = ((w as f64 * scale) as u32).max(1);
        let new_h = ((h as f64 * scale) as u32).max(1);
        info!("Scaling image from {}x{} to {}x{}", w, h, new_w, new_h);
        rgba = image::imageops::resize(&rgba, new_w, new_h, FilterType::Lanczos3);
    }

    let gray = to_gray(&rgba);
    let shades = quantize(&gray, options.num_colors);
    info!(
        "Quantized {}x{} image to {} shade(s)",
        shades.width,
        shades.height,
        shades.palette.len()
    );

    let mut paths = Vec::new();
    for (index, &gray_value) in shades.palette.iter().enumerate() {
        if gray_value >= options.background_threshold {
            debug!("Skipping shade {} (value {}) as background", index, gray_value);
            continue;
        }
        if let Some(d) = trace_shade(&shades, index as u8) {
            debug!("Traced shade {} (value {})", index, gray_value);
            paths.push((gray_value, d));
        }
    }

    let svg = assemble_svg(shades.width, shades.height, &paths);
    Ok(RasterResult {
        svg,
        width: shades.width,
        height: shades.height,
    })
}

/// Assemble the final SVG, one path per shade
fn assemble_svg(width: u32, height: u32, paths: &[(u8, String)]) -> String {
    let content: String = paths
        .iter()
        .map(|(gray, d)| {
            format!(
                "    <path d=\"{d}\" stroke=\"#{gray:02x}{gray:02x}{gray:02x}\" stroke-width=\"1\" />\n"
            )
        })
        .collect();

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
  <g shape-rendering="crispEdges">
{content}  </g>
</svg>
"#
    )
}
