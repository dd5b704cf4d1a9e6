//! Stroke color resolution.
//!
//! Anything that is not a known name or a 3/6 digit hex triplet resolves to
//! white, which the planner treats as "background" (lowest power).

use crate::types::Rgb;
use tracing::warn;

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("white", Rgb::new(0xff, 0xff, 0xff)),
    ("red", Rgb::new(0xff, 0x00, 0x00)),
    ("green", Rgb::new(0x00, 0x80, 0x00)),
    ("blue", Rgb::new(0x00, 0x00, 0xff)),
    ("yellow", Rgb::new(0xff, 0xff, 0x00)),
    ("cyan", Rgb::new(0x00, 0xff, 0xff)),
    ("magenta", Rgb::new(0xff, 0x00, 0xff)),
    ("silver", Rgb::new(0xc0, 0xc0, 0xc0)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("maroon", Rgb::new(0x80, 0x00, 0x00)),
    ("olive", Rgb::new(0x80, 0x80, 0x00)),
    ("purple", Rgb::new(0x80, 0x00, 0x80)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("navy", Rgb::new(0x00, 0x00, 0x80)),
    ("none", Rgb::WHITE),
];

/// Resolve a raw stroke token to RGB
pub fn resolve_color(key: &str) -> Rgb {
    let normalized = key.trim().to_ascii_lowercase();

    if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == normalized) {
        return *rgb;
    }

    match parse_hex(normalized.trim_start_matches('#')) {
        Some(rgb) => rgb,
        None => {
            warn!("Unresolvable color \"{}\", treating as white", key);
            Rgb::WHITE
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Perceptual luminance `0.299R + 0.587G + 0.114B`, in 0..=255
pub fn luminance(rgb: Rgb) -> f64 {
    (299 * rgb.r as u32 + 587 * rgb.g as u32 + 114 * rgb.b as u32) as f64 / 1000.0
}
