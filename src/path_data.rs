//! Path grammar (`d` attribute) to typed segments.
//!
//! Tokenizing is done by `svgtypes`; this module resolves relative commands,
//! reflects smooth-curve control points and converts elliptical arcs to their
//! center parameterization so each segment can be evaluated at `t ∈ [0, 1]`.

use crate::types::Point;
use std::f64::consts::TAU;
use svgtypes::{PathParser, PathSegment};
use tracing::{debug, warn};

/// Elliptical arc in center parameterization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub start: Point,
    pub end: Point,
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    /// x-axis rotation in radians
    pub phi: f64,
    pub theta: f64,
    pub delta: f64,
}

impl ArcSegment {
    /// Build an arc from SVG endpoint parameters.
    ///
    /// Returns None when the endpoints coincide; such arcs are omitted.
    /// Zero radii must be handled by the caller.
    fn from_endpoints(
        start: Point,
        end: Point,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
    ) -> Option<Self> {
        if start == end {
            return None;
        }

        let phi = x_axis_rotation.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let mut rx = rx.abs();
        let mut ry = ry.abs();

        let hx = (start.x - end.x) / 2.0;
        let hy = (start.y - end.y) / 2.0;
        let x1p = cos_phi * hx + sin_phi * hy;
        let y1p = -sin_phi * hx + cos_phi * hy;

        // Scale radii up when no ellipse fits through both endpoints. The
        // ratios are combined with hypot so tiny radii cannot overflow them.
        let reach = (x1p / rx).hypot(y1p / ry);
        if !reach.is_finite() || reach > 1.0 {
            let aspect = ry / rx;
            rx = x1p.hypot(y1p / aspect);
            ry = rx * aspect;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        let mut coef = if den == 0.0 {
            0.0
        } else {
            (num / den).max(0.0).sqrt()
        };
        if large_arc == sweep {
            coef = -coef;
        }

        let cxp = coef * (rx * y1p / ry);
        let cyp = coef * (-ry * x1p / rx);

        let center = Point::new(
            cos_phi * cxp - sin_phi * cyp + (start.x + end.x) / 2.0,
            sin_phi * cxp + cos_phi * cyp + (start.y + end.y) / 2.0,
        );

        let ux = (x1p - cxp) / rx;
        let uy = (y1p - cyp) / ry;
        let vx = (-x1p - cxp) / rx;
        let vy = (-y1p - cyp) / ry;

        let theta = uy.atan2(ux);
        let mut delta = vy.atan2(vx) - theta;
        if sweep && delta < 0.0 {
            delta += TAU;
        } else if !sweep && delta > 0.0 {
            delta -= TAU;
        }

        Some(Self {
            start,
            end,
            center,
            rx,
            ry,
            phi,
            theta,
            delta,
        })
    }

    pub fn point(&self, t: f64) -> Point {
        let angle = self.theta + self.delta * t;
        let (sin_a, cos_a) = angle.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Point::new(
            cos_phi * self.rx * cos_a - sin_phi * self.ry * sin_a + self.center.x,
            sin_phi * self.rx * cos_a + cos_phi * self.ry * sin_a + self.center.y,
        )
    }
}

/// One drawable piece of a path, in the path's local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        start: Point,
        end: Point,
    },
    Quadratic {
        start: Point,
        control: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
    Arc(ArcSegment),
}

impl Segment {
    pub fn start(&self) -> Point {
        match self {
            Segment::Line { start, .. }
            | Segment::Quadratic { start, .. }
            | Segment::Cubic { start, .. } => *start,
            Segment::Arc(arc) => arc.start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Segment::Line { end, .. }
            | Segment::Quadratic { end, .. }
            | Segment::Cubic { end, .. } => *end,
            Segment::Arc(arc) => arc.end,
        }
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, Segment::Line { .. })
    }

    /// Evaluate the segment at parameter `t`; None if the result is not finite
    pub fn point(&self, t: f64) -> Option<Point> {
        let p = match self {
            Segment::Line { start, end } => Point::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
            ),
            Segment::Quadratic {
                start,
                control,
                end,
            } => {
                let mt = 1.0 - t;
                Point::new(
                    mt * mt * start.x + 2.0 * mt * t * control.x + t * t * end.x,
                    mt * mt * start.y + 2.0 * mt * t * control.y + t * t * end.y,
                )
            }
            Segment::Cubic {
                start,
                control1,
                control2,
                end,
            } => {
                let mt = 1.0 - t;
                let mt2 = mt * mt;
                let mt3 = mt2 * mt;
                let t2 = t * t;
                let t3 = t2 * t;
                Point::new(
                    mt3 * start.x + 3.0 * mt2 * t * control1.x + 3.0 * mt * t2 * control2.x + t3 * end.x,
                    mt3 * start.y + 3.0 * mt2 * t * control1.y + 3.0 * mt * t2 * control2.y + t3 * end.y,
                )
            }
            Segment::Arc(arc) => arc.point(t),
        };

        p.is_finite().then_some(p)
    }
}

/// Control point carried over for S/T reflection
#[derive(Clone, Copy)]
enum LastControl {
    None,
    Cubic(Point),
    Quadratic(Point),
}

fn reflect(control: Point, around: Point) -> Point {
    Point::new(2.0 * around.x - control.x, 2.0 * around.y - control.y)
}

/// Parse path data into absolute segments.
///
/// Move commands only reposition the pen. A close command yields a straight
/// segment back to the subpath start unless the pen is already there. A
/// malformed command stops parsing; everything before it is kept.
pub fn parse_path_data(d: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Point::default();
    let mut subpath_start = Point::default();
    let mut last_control = LastControl::None;

    for token in PathParser::from(d) {
        let token = match token {
            Ok(t) => t,
            Err(e) => {
                warn!("Path data error, keeping {} segments: {}", segments.len(), e);
                break;
            }
        };

        let resolve = move |abs: bool, x: f64, y: f64| {
            if abs {
                Point::new(x, y)
            } else {
                Point::new(current.x + x, current.y + y)
            }
        };

        match token {
            PathSegment::MoveTo { abs, x, y } => {
                current = resolve(abs, x, y);
                subpath_start = current;
                last_control = LastControl::None;
            }
            PathSegment::LineTo { abs, x, y } => {
                let end = resolve(abs, x, y);
                segments.push(Segment::Line {
                    start: current,
                    end,
                });
                current = end;
                last_control = LastControl::None;
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                let end = if abs {
                    Point::new(x, current.y)
                } else {
                    Point::new(current.x + x, current.y)
                };
                segments.push(Segment::Line {
                    start: current,
                    end,
                });
                current = end;
                last_control = LastControl::None;
            }
            PathSegment::VerticalLineTo { abs, y } => {
                let end = if abs {
                    Point::new(current.x, y)
                } else {
                    Point::new(current.x, current.y + y)
                };
                segments.push(Segment::Line {
                    start: current,
                    end,
                });
                current = end;
                last_control = LastControl::None;
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let control1 = resolve(abs, x1, y1);
                let control2 = resolve(abs, x2, y2);
                let end = resolve(abs, x, y);
                segments.push(Segment::Cubic {
                    start: current,
                    control1,
                    control2,
                    end,
                });
                current = end;
                last_control = LastControl::Cubic(control2);
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let control1 = match last_control {
                    LastControl::Cubic(c) => reflect(c, current),
                    _ => current,
                };
                let control2 = resolve(abs, x2, y2);
                let end = resolve(abs, x, y);
                segments.push(Segment::Cubic {
                    start: current,
                    control1,
                    control2,
                    end,
                });
                current = end;
                last_control = LastControl::Cubic(control2);
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let control = resolve(abs, x1, y1);
                let end = resolve(abs, x, y);
                segments.push(Segment::Quadratic {
                    start: current,
                    control,
                    end,
                });
                current = end;
                last_control = LastControl::Quadratic(control);
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let control = match last_control {
                    LastControl::Quadratic(c) => reflect(c, current),
                    _ => current,
                };
                let end = resolve(abs, x, y);
                segments.push(Segment::Quadratic {
                    start: current,
                    control,
                    end,
                });
                current = end;
                last_control = LastControl::Quadratic(control);
            }
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let end = resolve(abs, x, y);
                if rx == 0.0 || ry == 0.0 {
                    segments.push(Segment::Line {
                        start: current,
                        end,
                    });
                } else if let Some(arc) = ArcSegment::from_endpoints(
                    current,
                    end,
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                ) {
                    segments.push(Segment::Arc(arc));
                } else {
                    debug!("Dropping arc with coincident endpoints at {:?}", end);
                }
                current = end;
                last_control = LastControl::None;
            }
            PathSegment::ClosePath { .. } => {
                if current != subpath_start {
                    segments.push(Segment::Line {
                        start: current,
                        end: subpath_start,
                    });
                }
                current = subpath_start;
                last_control = LastControl::None;
            }
        }
    }

    segments
}
