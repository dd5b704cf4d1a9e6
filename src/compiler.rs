use crate::bed::{compute_fit, document_size};
use crate::document::Document;
use crate::error::Result;
use crate::planner::{PlannerConfig, plan};
use crate::types::{LaserJob, Point, Transform};
use crate::walker::walk;
use tracing::{debug, warn};

/// Compile SVG text into a laser job
pub fn compile_svg(svg: &str, config: &PlannerConfig) -> Result<LaserJob> {
    let document = Document::parse(svg)?;
    Ok(compile_document(&document, config))
}

/// Compile an already parsed document.
///
/// Every point in the result is in machine space. A document without any
/// geometry compiles to an empty job.
pub fn compile_document(document: &Document, config: &PlannerConfig) -> LaserJob {
    let root = document.root();
    let (width, height) = document_size(root);
    let fit = compute_fit(width, height);
    debug!(
        "Fitting {}x{} document: scale {}, offset ({}, {})",
        width, height, fit.scale, fit.offset_x, fit.offset_y
    );

    let colors = walk(root, Transform::identity(), &|p: Point| fit.apply(p));
    let job = plan(colors, config);

    if job.is_empty() {
        warn!("No vector paths found in the document");
    }
    job
}
