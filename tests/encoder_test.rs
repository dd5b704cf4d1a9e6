//! Integration tests for the .rd encoder
//!
//! Jobs are compiled from small documents and encoded unscrambled so the
//! command stream can be inspected byte by byte.

use laser_rd::encoder::{JobEncoder, RuidaEncoder, encode_mm, encode_percent, scramble, unscramble};
use laser_rd::{LaserJob, PlannerConfig, compile_svg};

const SQUARE: &str = r#"<svg viewBox="0 0 50 50">
    <polygon points="0,0 50,0 50,50 0,50"/>
</svg>"#;

fn job(svg: &str, config: &PlannerConfig) -> LaserJob {
    compile_svg(svg, config).unwrap()
}

fn plain() -> RuidaEncoder {
    RuidaEncoder::default().with_scramble(false)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[test]
fn test_empty_job_encodes_to_nothing() {
    let job = job(r#"<svg viewBox="0 0 1 1"/>"#, &PlannerConfig::default());
    assert!(RuidaEncoder::default().encode(&job).unwrap().is_empty());
}

#[test]
fn test_stream_framing() {
    let bytes = plain().encode(&job(SQUARE, &PlannerConfig::default())).unwrap();
    assert_eq!(&bytes[..8], &[0xd8, 0x12, 0xf0, 0xf1, 0x02, 0x00, 0xd8, 0x00]);
    assert_eq!(*bytes.last().unwrap(), 0xd7);
}

#[test]
fn test_scrambled_is_plain_scrambled() {
    let job = job(SQUARE, &PlannerConfig::default());
    let plain_bytes = plain().encode(&job).unwrap();
    let scrambled = RuidaEncoder::default().encode(&job).unwrap();

    assert_eq!(plain_bytes.len(), scrambled.len());
    assert!(
        plain_bytes
            .iter()
            .zip(&scrambled)
            .all(|(&p, &s)| scramble(p) == s && unscramble(s) == p)
    );
}

#[test]
fn test_header_carries_bed_extents() {
    let bytes = plain().encode(&job(SQUARE, &PlannerConfig::default())).unwrap();

    let mut top_left = vec![0xe7, 0x03];
    top_left.extend(encode_mm(0.0));
    top_left.extend(encode_mm(0.0));
    assert!(find(&bytes, &top_left).is_some());

    let mut bottom_right = vec![0xe7, 0x07];
    bottom_right.extend(encode_mm(50.0));
    bottom_right.extend(encode_mm(50.0));
    assert!(find(&bytes, &bottom_right).is_some());
}

#[test]
fn test_layer_power_and_speed_encoded() {
    let config = PlannerConfig {
        min_power: 60.0,
        max_power: 60.0,
        speed: 100.0,
    };
    let bytes = plain().encode(&job(SQUARE, &config)).unwrap();

    let mut min_power = vec![0xc6, 0x31, 0x00];
    min_power.extend(encode_percent(60.0));
    assert!(find(&bytes, &min_power).is_some());

    let mut speed = vec![0xc9, 0x02];
    speed.extend(encode_mm(100.0));
    assert!(find(&bytes, &speed).is_some());
}

#[test]
fn test_one_header_block_per_layer() {
    let svg = r##"<svg viewBox="0 0 10 10">
        <line x1="0" y1="0" x2="1" y2="1" stroke="#000"/>
        <line x1="2" y1="2" x2="3" y2="3" stroke="#888"/>
        <line x1="4" y1="4" x2="5" y2="5" stroke="#ccc"/>
    </svg>"##;
    let bytes = plain().encode(&job(svg, &PlannerConfig::default())).unwrap();

    for lnum in 0..3u8 {
        assert!(find(&bytes, &[0xca, 0x06, lnum]).is_some(), "color of layer {lnum}");
        assert!(find(&bytes, &[0xca, 0x02, lnum]).is_some(), "prolog of layer {lnum}");
    }
    // highest layer number
    assert!(find(&bytes, &[0xca, 0x22, 0x02]).is_some());
}

#[test]
fn test_write_file_creates_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("square.rd");
    let job = job(SQUARE, &PlannerConfig::default());

    RuidaEncoder::default().write_file(&job, &path).unwrap();
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, RuidaEncoder::default().encode(&job).unwrap());
}
