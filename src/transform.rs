//! `transform` attribute parsing.
//!
//! Only scale and translation survive. `scale(...)`, `translate(...)` and
//! `matrix(...)` are each looked up independently; when a matrix is present it
//! replaces whatever scale/translate produced, and its shear/rotation terms
//! (`b`, `c`) are dropped.

use crate::types::Transform;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

fn function_regex(name: &str) -> Regex {
    Regex::new(&format!(r"\b{name}\s*\(([^)]*)\)")).expect("transform regex must compile")
}

fn scale_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| function_regex("scale"))
}

fn translate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| function_regex("translate"))
}

fn matrix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| function_regex("matrix"))
}

/// Split "1, 2 3" style argument lists. None if any entry is not a number.
fn parse_args(args: &str) -> Option<Vec<f64>> {
    args.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect()
}

fn function_args<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse a transform attribute into a scale + translate pair.
///
/// Absent, empty or unparsable input yields the identity transform.
pub fn parse_transform(input: &str) -> Transform {
    if input.trim().is_empty() {
        return Transform::identity();
    }

    match try_parse_transform(input) {
        Some(t) => t,
        None => {
            warn!("Unparsable transform, using identity: {}", input);
            Transform::identity()
        }
    }
}

fn try_parse_transform(input: &str) -> Option<Transform> {
    let mut t = Transform::identity();

    if let Some(args) = function_args(scale_regex(), input) {
        match parse_args(args)?.as_slice() {
            [s] => {
                t.sx = *s;
                t.sy = *s;
            }
            [sx, sy] => {
                t.sx = *sx;
                t.sy = *sy;
            }
            _ => return None,
        }
    }

    if let Some(args) = function_args(translate_regex(), input) {
        match parse_args(args)?.as_slice() {
            [tx] => {
                t.tx = *tx;
                t.ty = 0.0;
            }
            [tx, ty] => {
                t.tx = *tx;
                t.ty = *ty;
            }
            _ => return None,
        }
    }

    if let Some(args) = function_args(matrix_regex(), input) {
        match parse_args(args)?.as_slice() {
            [a, _b, _c, d, e, f] => {
                t = Transform::new(*a, *d, *e, *f);
            }
            _ => return None,
        }
    }

    Some(t)
}
