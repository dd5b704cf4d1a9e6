//! DXF drawings as vector documents.
//!
//! Model space LINE, LWPOLYLINE, POLYLINE, CIRCLE and ARC entities become
//! `<path>` elements inside one group. The group's matrix moves the drawing's
//! lower-left extent to the origin and flips the y axis, so the document reads
//! like any y-down SVG of size `width` × `height`.

use crate::bounds::Bounds;
use crate::document::{Document, DocumentNode};
use crate::error::Result;
use crate::types::Point;
use dxf::Drawing;
use dxf::entities::{Arc, Circle, EntityType};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

/// viewBox used when the drawing has no usable extents
const FALLBACK_VIEW_BOX: &str = "0 0 100 100";

/// One entity converted to path data plus the points that bound it
struct EntityPath {
    d: String,
    extent: Vec<Point>,
}

/// Load a DXF file into a document
pub fn load_dxf_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let mut reader = BufReader::new(File::open(path)?);
    let drawing = Drawing::load(&mut reader)?;
    Ok(drawing_to_document(&drawing))
}

/// Load DXF bytes into a document
pub fn load_dxf(bytes: &[u8]) -> Result<Document> {
    let mut reader = bytes;
    let drawing = Drawing::load(&mut reader)?;
    Ok(drawing_to_document(&drawing))
}

/// Convert the model space entities of a drawing into a document
pub fn drawing_to_document(drawing: &Drawing) -> Document {
    let paths: Vec<EntityPath> = drawing
        .entities()
        .filter_map(|entity| entity_path(&entity.specific))
        .collect();
    info!("Converted {} DXF entities to paths", paths.len());

    let mut points = paths.iter().flat_map(|p| p.extent.iter().copied());
    let bounds = points.next().map(|first| {
        let mut b = Bounds::at(first);
        points.for_each(|p| b.include(p));
        b
    });

    let view_box = match bounds {
        Some(b) if b.width() > 0.0 && b.height() > 0.0 => {
            format!("0 0 {} {}", b.width(), b.height())
        }
        _ => {
            warn!("DXF drawing has no usable extents, using {}", FALLBACK_VIEW_BOX);
            FALLBACK_VIEW_BOX.to_string()
        }
    };
    let bounds = bounds.unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));

    let group = paths.into_iter().fold(
        DocumentNode::new("g").with_attribute(
            "transform",
            format!("matrix(1,0,0,-1,{},{})", -bounds.min_x, bounds.max_y),
        ),
        |group, path| group.with_child(DocumentNode::new("path").with_attribute("d", path.d)),
    );

    Document::from_root(
        DocumentNode::new("svg")
            .with_attribute("viewBox", view_box)
            .with_child(group),
    )
}

fn entity_path(entity: &EntityType) -> Option<EntityPath> {
    match entity {
        EntityType::Line(line) => polyline_path(vec![
            Point::new(line.p1.x, line.p1.y),
            Point::new(line.p2.x, line.p2.y),
        ]),
        EntityType::LwPolyline(polyline) => {
            let mut points: Vec<Point> = polyline
                .vertices
                .iter()
                .map(|v| Point::new(v.x, v.y))
                .collect();
            // Bit 0 marks a closed polyline
            if polyline.flags & 1 != 0
                && let Some(&first) = points.first()
            {
                points.push(first);
            }
            polyline_path(points)
        }
        EntityType::Polyline(polyline) => {
            let mut points: Vec<Point> = polyline
                .vertices()
                .map(|v| Point::new(v.location.x, v.location.y))
                .collect();
            if polyline.flags & 1 != 0
                && let Some(&first) = points.first()
            {
                points.push(first);
            }
            polyline_path(points)
        }
        EntityType::Circle(circle) => circle_path(circle),
        EntityType::Arc(arc) => arc_path(arc),
        _ => {
            debug!("Skipping unsupported DXF entity");
            None
        }
    }
}

fn polyline_path(points: Vec<Point>) -> Option<EntityPath> {
    let (first, rest) = points.split_first()?;
    let mut d = format!("M {} {}", first.x, first.y);
    for p in rest {
        d.push_str(&format!(" L {} {}", p.x, p.y));
    }
    Some(EntityPath { d, extent: points })
}

/// Object coordinates of circles and arcs are mirrored in x when the
/// extrusion direction points down the z axis.
fn to_world(center: Point, radius: f64, degrees: f64, mirrored: bool) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let x = center.x + radius * cos;
    let y = center.y + radius * sin;
    if mirrored { Point::new(-x, y) } else { Point::new(x, y) }
}

fn circle_path(circle: &Circle) -> Option<EntityPath> {
    let r = circle.radius;
    if r <= 0.0 {
        return None;
    }
    let center = Point::new(circle.center.x, circle.center.y);
    let mirrored = circle.normal.z < 0.0;
    let [p0, p90, p180, p270] = [0.0, 90.0, 180.0, 270.0].map(|a| to_world(center, r, a, mirrored));

    // Two half circles, start and end points of a single arc would coincide
    let d = format!(
        "M {} {} A {r},{r} 0 1 0 {},{} A {r},{r} 0 1 0 {},{}",
        p0.x, p0.y, p180.x, p180.y, p0.x, p0.y
    );
    Some(EntityPath {
        d,
        extent: vec![p0, p90, p180, p270],
    })
}

fn arc_path(arc: &Arc) -> Option<EntityPath> {
    let r = arc.radius;
    if r <= 0.0 {
        return None;
    }
    let center = Point::new(arc.center.x, arc.center.y);
    let mirrored = arc.normal.z < 0.0;
    let span = (arc.end_angle - arc.start_angle).rem_euclid(360.0);

    let start = to_world(center, r, arc.start_angle, mirrored);
    let end = to_world(center, r, arc.end_angle, mirrored);
    let large_arc = u8::from(span > 180.0);
    // Counterclockwise in object space, clockwise once mirrored
    let sweep = u8::from(!mirrored);

    let mut extent = vec![start, end];
    extent.extend(
        [0.0, 90.0, 180.0, 270.0]
            .into_iter()
            .filter(|q: &f64| (q - arc.start_angle).rem_euclid(360.0) <= span)
            .map(|q| to_world(center, r, q, mirrored)),
    );

    let d = format!(
        "M {} {} A {r},{r} 0 {large_arc} {sweep} {} {}",
        start.x, start.y, end.x, end.y
    );
    Some(EntityPath { d, extent })
}
