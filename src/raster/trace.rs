//! Scanline tracing of quantized shades
//!
//! Every horizontal run of one shade becomes a 1px high stroke along the
//! pixel row center: `M{x},{y + 0.5}h{length}`.

use super::quantize::ShadeMap;

/// Half-open `[start, end)` runs of `index` in one row
pub fn row_runs(row: &[u8], index: u8) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;

    for (x, &v) in row.iter().enumerate() {
        match (v == index, start) {
            (true, None) => start = Some(x),
            (false, Some(s)) => {
                runs.push((s, x));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, row.len()));
    }

    runs
}

/// Path data for one shade, None if the shade never occurs
pub fn trace_shade(map: &ShadeMap, index: u8) -> Option<String> {
    let mut commands = Vec::new();

    for y in 0..map.height {
        for (start, end) in row_runs(map.row(y), index) {
            commands.push(format!("M{},{}h{}", start, y as f64 + 0.5, end - start));
        }
    }

    if commands.is_empty() {
        None
    } else {
        Some(commands.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_runs() {
        assert_eq!(row_runs(&[0, 1, 1, 0, 1], 1), vec![(1, 3), (4, 5)]);
        assert_eq!(row_runs(&[1, 1, 1], 1), vec![(0, 3)]);
        assert!(row_runs(&[0, 0], 1).is_empty());
    }

    #[test]
    fn test_trace_shade() {
        let map = ShadeMap {
            width: 3,
            height: 2,
            palette: vec![0, 255],
            indices: vec![0, 0, 1, 1, 0, 0],
        };
        assert_eq!(trace_shade(&map, 0).unwrap(), "M0,0.5h2 M1,1.5h2");
        assert_eq!(trace_shade(&map, 1).unwrap(), "M2,0.5h1 M0,1.5h1");
        assert!(trace_shade(&map, 2).is_none());
    }
}
