//! Render a compiled job back to SVG, in machine coordinates, for inspection.

use crate::bed::BED_SIZE;
use crate::types::{ColorLayer, GeometryPath, LaserJob};

/// Format a number with 6 decimal places, treating -0 as 0
fn f(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{:.6}", n)
}

fn path_to_svg_element(path: &GeometryPath) -> String {
    let points: Vec<String> = path
        .iter()
        .map(|p| format!("{},{}", f(p.x), f(p.y)))
        .collect();
    format!("<polyline points=\"{}\"/>", points.join(" "))
}

fn layer_to_svg_group(index: usize, layer: &ColorLayer) -> String {
    let elements: Vec<String> = layer.paths.iter().map(path_to_svg_element).collect();
    format!(
        "<g id=\"layer-{}\" stroke=\"{}\" fill=\"none\" stroke-width=\"0.1\" data-power=\"{:.1}\" data-speed=\"{}\">\n        {}\n    </g>",
        index,
        layer.rgb.to_hex(),
        layer.power,
        layer.speed,
        elements.join("\n        ")
    )
}

/// Convert a job to an SVG string covering the whole bed
pub fn job_to_svg(job: &LaserJob) -> String {
    let groups: Vec<String> = job
        .iter()
        .enumerate()
        .map(|(i, layer)| layer_to_svg_group(i, layer))
        .collect();

    let size = f(BED_SIZE);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{size}mm" height="{size}mm" viewBox="0 0 {size} {size}">
    {}
</svg>"#,
        groups.join("\n    ")
    )
}
