//! Depth-first document traversal that groups flattened geometry by stroke color.

use crate::document::DocumentNode;
use crate::flatten::{ShapeKind, flatten_shape};
use crate::transform::parse_transform;
use crate::types::{GeometryPath, Point, Transform};
use indexmap::IndexMap;
use tracing::debug;

/// Stroke used when a shape carries none
pub const DEFAULT_STROKE: &str = "#000000";

/// Geometry grouped by raw stroke token, in first-encountered order
pub type ColorMap = IndexMap<String, Vec<GeometryPath>>;

/// Walk `node` and everything below it.
///
/// `parent` is the effective transform of the node's parent; `bed` maps a
/// point in document space into machine space. The node's own transform is
/// composed under `parent`, its shape children are flattened in document
/// order, then its `<g>` children are walked with the composed transform and
/// their results appended.
pub fn walk<F>(node: &DocumentNode, parent: Transform, bed: &F) -> ColorMap
where
    F: Fn(Point) -> Point,
{
    let effective = parent.compose(&element_transform(node));
    let mut colors = ColorMap::new();

    for child in node.children() {
        let Some(kind) = ShapeKind::from_tag(child.tag()) else {
            continue;
        };

        if kind == ShapeKind::Path && child.attribute("d").is_none_or(|d| d.trim().is_empty()) {
            debug!("Skipping <path> without data");
            continue;
        }

        let shape_transform = effective.compose(&element_transform(child));
        let apply = |p: Point| bed(shape_transform.apply(p));
        let paths = flatten_shape(kind, child, &apply);

        let stroke = child.attribute("stroke").unwrap_or(DEFAULT_STROKE);
        debug!("<{}> stroke {} -> {} path(s)", child.tag(), stroke, paths.len());
        colors.entry(stroke.to_string()).or_default().extend(paths);
    }

    for group in node.children_by_tag("g") {
        for (color, paths) in walk(group, effective, bed) {
            colors.entry(color).or_default().extend(paths);
        }
    }

    colors
}

fn element_transform(node: &DocumentNode) -> Transform {
    node.attribute("transform")
        .map(parse_transform)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn identity(p: Point) -> Point {
        p
    }

    fn walk_str(xml: &str) -> ColorMap {
        let doc = Document::parse(xml).unwrap();
        walk(doc.root(), Transform::identity(), &identity)
    }

    #[test]
    fn test_default_stroke_is_black() {
        let colors = walk_str(r#"<svg><line x1="0" y1="0" x2="1" y2="1"/></svg>"#);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[DEFAULT_STROKE].len(), 1);
    }

    #[test]
    fn test_nested_groups_compose_transforms() {
        let colors = walk_str(
            r#"<svg>
                <g transform="translate(10,20)">
                    <g transform="scale(2)">
                        <line x1="1" y1="1" x2="2" y2="2" stroke="red"/>
                    </g>
                </g>
            </svg>"#,
        );
        let path = &colors["red"][0];
        assert_eq!(path[0], Point::new(12.0, 22.0));
        assert_eq!(path[1], Point::new(14.0, 24.0));
    }

    #[test]
    fn test_shape_transform_composed_under_group() {
        let colors = walk_str(
            r#"<svg><g transform="scale(2)">
                <line x1="0" y1="0" x2="1" y2="0" transform="translate(5)"/>
            </g></svg>"#,
        );
        let path = &colors[DEFAULT_STROKE][0];
        assert_eq!(path[0], Point::new(10.0, 0.0));
        assert_eq!(path[1], Point::new(12.0, 0.0));
    }

    #[test]
    fn test_same_color_accumulates_across_depths_in_document_order() {
        let colors = walk_str(
            r##"<svg>
                <line x1="0" y1="0" x2="1" y2="0" stroke="#f00"/>
                <g><g><line x1="2" y1="0" x2="3" y2="0" stroke="#f00"/></g></g>
                <line x1="4" y1="0" x2="5" y2="0" stroke="#f00"/>
            </svg>"##,
        );
        let xs: Vec<f64> = colors["#f00"].iter().map(|p| p[0].x).collect();
        // own shapes first, then groups
        assert_eq!(xs, vec![0.0, 4.0, 2.0]);
    }

    #[test]
    fn test_color_keys_keep_first_encountered_order() {
        let colors = walk_str(
            r##"<svg>
                <rect width="1" height="1" stroke="blue"/>
                <rect width="1" height="1" stroke="#ffffff"/>
                <rect width="1" height="1" stroke="blue"/>
            </svg>"##,
        );
        let keys: Vec<&str> = colors.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["blue", "#ffffff"]);
        assert_eq!(colors["blue"].len(), 2);
    }

    #[test]
    fn test_path_without_data_adds_no_key() {
        let colors = walk_str(r#"<svg><path stroke="red"/><path d="" stroke="red"/></svg>"#);
        assert!(colors.is_empty());
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let colors = walk_str(r#"<svg><text x="1">hi</text><defs><rect width="2"/></defs></svg>"#);
        assert!(colors.is_empty());
    }

    #[test]
    fn test_bed_mapping_applied_last() {
        let doc = Document::parse(
            r#"<svg><g transform="translate(1,0)"><line x1="0" y1="0" x2="1" y2="0"/></g></svg>"#,
        )
        .unwrap();
        let bed = |p: Point| Point::new(p.x * 10.0, 100.0 - p.y);
        let colors = walk(doc.root(), Transform::identity(), &bed);
        let path = &colors[DEFAULT_STROKE][0];
        assert_eq!(path[0], Point::new(10.0, 100.0));
        assert_eq!(path[1], Point::new(20.0, 100.0));
    }
}
