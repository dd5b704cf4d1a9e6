//! # laser-rd
//!
//! A Rust library for turning drawings into Ruida laser cutter jobs.
//!
//! ## Features
//!
//! - **SVG compilation**: Walk an SVG document, flatten every shape into
//!   polylines on the machine bed and group them into power layers by stroke color
//! - **RD encoding**: Serialize a compiled job into the scrambled `.rd` command stream
//! - **Raster conversion**: Quantize PNG/JPEG images into gray shades traced as SVG
//! - **DXF import**: Read lines, polylines, circles and arcs of a DXF drawing
//!   as a vector document
//!
//! ## Example - SVG to RD
//!
//! ```rust,ignore
//! use laser_rd::{JobEncoder, PlannerConfig, RuidaEncoder, compile_svg};
//!
//! let svg = std::fs::read_to_string("drawing.svg").unwrap();
//! let job = compile_svg(&svg, &PlannerConfig::default()).unwrap();
//! let bytes = RuidaEncoder::default().encode(&job).unwrap();
//! std::fs::write("drawing.rd", bytes).unwrap();
//! ```
//!
//! ## Example - Image to SVG
//!
//! ```rust,ignore
//! use laser_rd::raster::rasterize_image_file;
//!
//! let result = rasterize_image_file("photo.png", None).unwrap();
//! std::fs::write("photo.svg", result.svg).unwrap();
//! ```

pub mod bed;
pub mod bounds;
pub mod color;
pub mod compiler;
pub mod document;
pub mod dxf_io;
pub mod encoder;
pub mod error;
pub mod flatten;
pub mod path_data;
pub mod planner;
pub mod preview;
pub mod raster;
pub mod transform;
pub mod types;
pub mod walker;

// Re-export commonly used items
pub use compiler::{compile_document, compile_svg};
pub use document::{Document, DocumentNode};
pub use dxf_io::{load_dxf, load_dxf_file};
pub use encoder::{JobEncoder, RuidaEncoder};
pub use error::{Error, Result};
pub use planner::PlannerConfig;
pub use raster::{RasterOptions, RasterResult, rasterize_image, rasterize_image_file};
pub use types::{ColorLayer, GeometryPath, LaserJob, Point, Rgb, Transform};
