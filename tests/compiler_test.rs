//! End-to-end tests for SVG → LaserJob compilation
//!
//! Each test feeds a small hand-written document through `compile_svg` and
//! checks the machine-space geometry and layer parameters that come out.

use laser_rd::bed::{BED_SIZE, compute_fit};
use laser_rd::{Error, PlannerConfig, Point, Rgb, compile_document, compile_svg, load_dxf};

fn compile(svg: &str) -> laser_rd::LaserJob {
    compile_svg(svg, &PlannerConfig::default()).expect("document should compile")
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

// ============================================================================
// Bed mapping
// ============================================================================

#[test]
fn test_fit_for_wide_viewbox() {
    let fit = compute_fit(100.0, 50.0);
    assert_eq!(fit.scale, 0.5);
    assert_eq!(fit.offset_x, 0.0);
    assert_eq!(fit.offset_y, 12.5);
}

#[test]
fn test_every_point_inside_bed() {
    let job = compile(
        r##"<svg viewBox="0 0 200 80">
            <circle cx="100" cy="40" r="40" stroke="#333"/>
            <rect x="0" y="0" width="200" height="80" stroke="red"/>
            <path d="M10 10 C 50 -20, 150 100, 190 70" stroke="blue"/>
        </svg>"##,
    );
    for layer in &job {
        for path in &layer.paths {
            for p in path {
                assert!(p.x >= -1e-9 && p.x <= BED_SIZE + 1e-9, "x out of bed: {:?}", p);
                assert!(p.y >= -1e-9 && p.y <= BED_SIZE + 1e-9, "y out of bed: {:?}", p);
            }
        }
    }
}

#[test]
fn test_y_axis_flipped() {
    let job = compile(r#"<svg viewBox="0 0 50 50"><line x1="0" y1="0" x2="0" y2="50"/></svg>"#);
    let path = &job.layers()[0].paths[0];
    assert!(close(path[0], Point::new(0.0, 50.0)));
    assert!(close(path[1], Point::new(0.0, 0.0)));
}

// ============================================================================
// Shapes
// ============================================================================

#[test]
fn test_circle_closed_with_37_points() {
    let job = compile(r#"<svg viewBox="-10 -10 20 20"><circle cx="0" cy="0" r="10"/></svg>"#);
    let path = &job.layers()[0].paths[0];
    assert_eq!(path.len(), 37);
    assert_eq!(path.first(), path.last());
}

#[test]
fn test_polygon_closed_polyline_open() {
    let job = compile(
        r##"<svg viewBox="0 0 10 10">
            <polygon points="0,0 10,0 10,10" stroke="#000"/>
            <polyline points="0,0 10,0 10,10" stroke="#fff"/>
        </svg>"##,
    );
    let black = job.iter().find(|l| l.rgb == Rgb::BLACK).unwrap();
    let white = job.iter().find(|l| l.rgb == Rgb::WHITE).unwrap();
    assert_eq!(black.paths[0].len(), 4);
    assert_eq!(black.paths[0].first(), black.paths[0].last());
    assert_eq!(white.paths[0].len(), 3);
    assert_ne!(white.paths[0].first(), white.paths[0].last());
}

#[test]
fn test_group_transforms_reach_geometry() {
    let job = compile(
        r#"<svg viewBox="0 0 100 100">
            <g transform="translate(50,0)">
                <g transform="scale(0.5)">
                    <line x1="0" y1="0" x2="100" y2="0"/>
                </g>
            </g>
        </svg>"#,
    );
    // document x 50..100 → bed x 25..50; y 0 → bed y 50
    let path = &job.layers()[0].paths[0];
    assert!(close(path[0], Point::new(25.0, 50.0)));
    assert!(close(path[1], Point::new(50.0, 50.0)));
}

#[test]
fn test_matrix_shear_is_ignored() {
    let sheared = compile(
        r#"<svg viewBox="0 0 100 100"><g transform="matrix(1,0.7,0.3,1,10,0)">
            <line x1="0" y1="0" x2="10" y2="10"/>
        </g></svg>"#,
    );
    let plain = compile(
        r#"<svg viewBox="0 0 100 100"><g transform="translate(10)">
            <line x1="0" y1="0" x2="10" y2="10"/>
        </g></svg>"#,
    );
    assert_eq!(sheared, plain);
}

// ============================================================================
// Layers
// ============================================================================

#[test]
fn test_layers_ordered_by_channel_sum() {
    let job = compile(
        r##"<svg viewBox="0 0 10 10">
            <line x1="0" y1="0" x2="1" y2="1" stroke="#ffffff"/>
            <line x1="0" y1="0" x2="1" y2="1" stroke="#000000"/>
            <line x1="0" y1="0" x2="1" y2="1" stroke="#808080"/>
        </svg>"##,
    );
    let sums: Vec<u32> = job.iter().map(|l| l.rgb.sum()).collect();
    assert_eq!(sums, vec![0, 384, 765]);

    let config = PlannerConfig::default();
    assert_eq!(job.layers()[0].power, config.max_power);
    assert_eq!(job.layers()[2].power, config.min_power);
    let mid = job.layers()[1].power;
    assert!(mid > config.min_power && mid < config.max_power);
}

#[test]
fn test_same_color_across_groups_is_one_layer() {
    let job = compile(
        r##"<svg viewBox="0 0 10 10">
            <line x1="0" y1="0" x2="1" y2="1" stroke="#123456"/>
            <g><g><rect width="2" height="2" stroke="#123456"/></g></g>
        </svg>"##,
    );
    assert_eq!(job.len(), 1);
    assert_eq!(job.layers()[0].paths.len(), 2);
    assert_eq!(job.layers()[0].paths[0].len(), 2);
    assert_eq!(job.layers()[0].paths[1].len(), 5);
}

#[test]
fn test_bad_stroke_is_white_not_error() {
    let job = compile(
        r#"<svg viewBox="0 0 10 10"><line x1="0" y1="0" x2="1" y2="1" stroke="not-a-color"/></svg>"#,
    );
    assert_eq!(job.layers()[0].rgb, Rgb::WHITE);
    assert_eq!(job.layers()[0].color_key, "not-a-color");
}

#[test]
fn test_speed_only_changes_speed() {
    let svg = r##"<svg viewBox="0 0 10 10">
        <circle cx="5" cy="5" r="3" stroke="#444"/>
        <path d="M0 0 Q 5 10 10 0" stroke="#aaa"/>
    </svg>"##;
    let a = compile_svg(svg, &PlannerConfig::default()).unwrap();
    let b = compile_svg(
        svg,
        &PlannerConfig {
            speed: 42.0,
            ..PlannerConfig::default()
        },
    )
    .unwrap();

    assert_eq!(a.len(), b.len());
    for (la, lb) in a.iter().zip(&b) {
        assert_eq!(la.paths, lb.paths);
        assert_eq!(la.power, lb.power);
        assert_eq!(lb.speed, 42.0);
    }
}

// ============================================================================
// Degenerate input
// ============================================================================

#[test]
fn test_no_shapes_is_empty_job() {
    let job = compile(r#"<svg width="10mm" height="10mm"><g><g/></g></svg>"#);
    assert!(job.is_empty());
}

#[test]
fn test_degenerate_shapes_do_not_abort() {
    let job = compile(
        r#"<svg viewBox="0 0 10 10">
            <polygon points="1,1 2,2"/>
            <polyline points="garbage"/>
            <path d="M 1 1 L"/>
            <line x1="0" y1="0" x2="5" y2="5"/>
        </svg>"#,
    );
    assert_eq!(job.len(), 1);
    assert_eq!(job.layers()[0].paths.len(), 1);
}

#[test]
fn test_structurally_broken_document_is_fatal() {
    let err = compile_svg("<svg>\n<g>\n<line/>\n</svg>", &PlannerConfig::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { .. }));
}

// ============================================================================
// DXF input
// ============================================================================

#[test]
fn test_saved_dxf_compiles_like_svg() {
    let mut drawing = dxf::Drawing::new();
    drawing.add_entity(dxf::entities::Entity::new(dxf::entities::EntityType::Line(
        dxf::entities::Line::new(
            dxf::Point::new(10.0, 10.0, 0.0),
            dxf::Point::new(30.0, 20.0, 0.0),
        ),
    )));
    let mut bytes = Vec::new();
    drawing.save(&mut bytes).unwrap();

    let from_dxf = compile_document(&load_dxf(&bytes).unwrap(), &PlannerConfig::default());
    // same geometry with the y axis flipped by hand
    let from_svg = compile(r#"<svg viewBox="0 0 20 10"><line x1="0" y1="10" x2="20" y2="0"/></svg>"#);
    assert_eq!(from_dxf.len(), 1);
    let a = &from_dxf.layers()[0].paths[0];
    let b = &from_svg.layers()[0].paths[0];
    assert!(close(a[0], b[0]) && close(a[1], b[1]));
}

#[test]
fn test_unreadable_dxf_is_an_error() {
    let err = load_dxf(b"definitely not a drawing").unwrap_err();
    assert!(matches!(err, Error::Dxf(_)));
}
