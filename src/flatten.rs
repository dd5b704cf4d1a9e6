//! Shape flattening: every supported primitive becomes one or more polylines.
//!
//! Points are produced in the shape's local frame and passed through the
//! caller's `apply` function, which maps them all the way into machine space.

use crate::document::DocumentNode;
use crate::path_data::{Segment, parse_path_data};
use crate::types::{GeometryPath, Point};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Number of segments used to approximate curves, arcs included (21 samples)
pub const CURVE_SEGMENTS: usize = 20;

/// Number of segments of the regular polygon standing in for circles/ellipses
pub const ELLIPSE_SEGMENTS: usize = 36;

/// Element kinds the flattener understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Path,
    Line,
    Rect,
    Circle,
    Ellipse,
    Polyline,
    Polygon,
}

impl ShapeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "path" => Some(Self::Path),
            "line" => Some(Self::Line),
            "rect" => Some(Self::Rect),
            "circle" => Some(Self::Circle),
            "ellipse" => Some(Self::Ellipse),
            "polyline" => Some(Self::Polyline),
            "polygon" => Some(Self::Polygon),
            _ => None,
        }
    }
}

/// Read a numeric attribute, defaulting to 0 when missing or unparsable
fn number_attr(node: &DocumentNode, name: &str) -> f64 {
    match node.attribute(name) {
        None => 0.0,
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!("<{}> attribute {}=\"{}\" is not a number, using 0", node.tag(), name, raw);
                0.0
            }
        },
    }
}

/// Flatten one shape element
pub fn flatten_shape<F>(kind: ShapeKind, node: &DocumentNode, apply: &F) -> Vec<GeometryPath>
where
    F: Fn(Point) -> Point,
{
    match kind {
        ShapeKind::Path => {
            let d = node.attribute("d").unwrap_or("");
            flatten_segments(&parse_path_data(d), apply)
        }
        ShapeKind::Line => {
            let start = Point::new(number_attr(node, "x1"), number_attr(node, "y1"));
            let end = Point::new(number_attr(node, "x2"), number_attr(node, "y2"));
            vec![vec![apply(start), apply(end)]]
        }
        ShapeKind::Rect => vec![rect_path(
            number_attr(node, "x"),
            number_attr(node, "y"),
            number_attr(node, "width"),
            number_attr(node, "height"),
            apply,
        )],
        ShapeKind::Circle => {
            let r = number_attr(node, "r");
            vec![ellipse_path(
                number_attr(node, "cx"),
                number_attr(node, "cy"),
                r,
                r,
                apply,
            )]
        }
        ShapeKind::Ellipse => vec![ellipse_path(
            number_attr(node, "cx"),
            number_attr(node, "cy"),
            number_attr(node, "rx"),
            number_attr(node, "ry"),
            apply,
        )],
        ShapeKind::Polyline => {
            let points = parse_points(node.attribute("points").unwrap_or(""));
            if points.len() < 2 {
                debug!("Dropping polyline with {} point(s)", points.len());
                return Vec::new();
            }
            vec![points.into_iter().map(apply).collect()]
        }
        ShapeKind::Polygon => {
            let mut points = parse_points(node.attribute("points").unwrap_or(""));
            if points.len() < 3 {
                debug!("Dropping polygon with {} point(s)", points.len());
                return Vec::new();
            }
            points.push(points[0]);
            vec![points.into_iter().map(apply).collect()]
        }
    }
}

/// Flatten path-grammar segments, one polyline per segment
pub fn flatten_segments<F>(segments: &[Segment], apply: &F) -> Vec<GeometryPath>
where
    F: Fn(Point) -> Point,
{
    segments
        .iter()
        .filter_map(|seg| flatten_segment(seg, apply))
        .collect()
}

/// Flatten a single segment.
///
/// Straight segments are emitted as their two endpoints. Everything else is
/// sampled at `CURVE_SEGMENTS + 1` evenly spaced parameters; samples that do
/// not evaluate are skipped and fewer than two survivors drop the segment.
pub fn flatten_segment<F>(segment: &Segment, apply: &F) -> Option<GeometryPath>
where
    F: Fn(Point) -> Point,
{
    if segment.is_straight() {
        return Some(vec![apply(segment.start()), apply(segment.end())]);
    }

    let path: GeometryPath = (0..=CURVE_SEGMENTS)
        .filter_map(|i| segment.point(i as f64 / CURVE_SEGMENTS as f64))
        .map(apply)
        .collect();

    if path.len() >= 2 {
        Some(path)
    } else {
        debug!("Dropping curve segment with {} evaluable sample(s)", path.len());
        None
    }
}

/// Closed five-point rectangle outline
pub fn rect_path<F>(x: f64, y: f64, width: f64, height: f64, apply: &F) -> GeometryPath
where
    F: Fn(Point) -> Point,
{
    [
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
        Point::new(x, y),
    ]
    .into_iter()
    .map(apply)
    .collect()
}

/// Closed 36-gon approximation of an axis-aligned ellipse.
///
/// The start vertex is repeated at the end so the path closes exactly.
pub fn ellipse_path<F>(cx: f64, cy: f64, rx: f64, ry: f64, apply: &F) -> GeometryPath
where
    F: Fn(Point) -> Point,
{
    let mut path: GeometryPath = (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / ELLIPSE_SEGMENTS as f64;
            apply(Point::new(cx + rx * angle.cos(), cy + ry * angle.sin()))
        })
        .collect();
    path.push(path[0]);
    path
}

/// Parse a `points` attribute ("x,y x,y ..."). Pairs without a comma or
/// with non-numeric parts are skipped.
pub fn parse_points(points: &str) -> Vec<Point> {
    points
        .split_whitespace()
        .filter_map(|pair| {
            let (x, y) = pair.split_once(',')?;
            match (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
                (Ok(x), Ok(y)) => Some(Point::new(x, y)),
                _ => {
                    debug!("Skipping malformed point pair '{}'", pair);
                    None
                }
            }
        })
        .collect()
}
