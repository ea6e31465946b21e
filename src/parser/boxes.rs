use std::collections::{HashMap, HashSet};

use super::glyphs::Frame;

/// A candidate whose midline crosses this many distinct vertical edges or
/// fewer is a ruled line, not an enclosing box.
const MAX_EDGES_FOR_RULE: usize = 2;

/// Reduce candidate rectangles to the final, pairwise-disjoint box set.
pub fn detect_boxes(candidates: &[Frame]) -> Vec<Frame> {
    let mut edges_at: HashMap<i64, HashSet<i64>> = HashMap::new();
    for c in candidates {
        for y in c.y0..=c.y1 {
            let xs = edges_at.entry(y).or_default();
            xs.insert(c.x0);
            xs.insert(c.x1);
        }
    }

    let mut boxes: Vec<Frame> = Vec::new();
    for c in candidates {
        let mid = ((c.y0 + c.y1) as f64 / 2.0).round_ties_even() as i64;
        let edges = edges_at.get(&mid).map_or(0, HashSet::len);
        if edges <= MAX_EDGES_FOR_RULE {
            continue;
        }
        boxes = absorb(boxes, *c);
    }
    boxes
}

/// Merge `frame` with every box it overlaps, repeating until the union no
/// longer touches anything else in the set.
fn absorb(mut boxes: Vec<Frame>, frame: Frame) -> Vec<Frame> {
    let mut merged = frame;
    loop {
        let (hits, rest): (Vec<Frame>, Vec<Frame>) =
            boxes.into_iter().partition(|b| b.overlaps(&merged));
        boxes = rest;
        if hits.is_empty() {
            break;
        }
        merged = hits.iter().fold(merged, |acc, b| acc.union(b));
    }
    boxes.push(merged);
    boxes
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn f(x0: i64, y0: i64, x1: i64, y1: i64) -> Frame {
        Frame { x0, y0, x1, y1 }
    }

    /// Cells of a 2x2 table, each sharing edges with its neighbours.
    fn table() -> Vec<Frame> {
        vec![
            f(100, 100, 200, 150),
            f(200, 100, 300, 150),
            f(100, 150, 200, 200),
            f(200, 150, 300, 200),
        ]
    }

    fn sorted(mut v: Vec<Frame>) -> Vec<Frame> {
        v.sort();
        v
    }

    #[test]
    fn table_cells_merge_into_one_box() {
        let boxes = detect_boxes(&table());
        assert_eq!(boxes, vec![f(100, 100, 300, 200)]);
    }

    #[test]
    fn isolated_rule_is_degenerate() {
        // an underline: only its own two ends at its midline
        let boxes = detect_boxes(&[f(50, 400, 150, 401)]);
        assert!(boxes.is_empty());
    }

    #[test]
    fn lone_frame_is_degenerate() {
        assert!(detect_boxes(&[f(50, 400, 150, 500)]).is_empty());
    }

    #[test]
    fn disjoint_tables_stay_apart() {
        let mut candidates = table();
        candidates.extend([f(100, 500, 200, 550), f(200, 500, 300, 550)]);
        let boxes = sorted(detect_boxes(&candidates));
        assert_eq!(boxes, vec![f(100, 100, 300, 200), f(100, 500, 300, 550)]);
    }

    #[test]
    fn union_growth_pulls_in_further_boxes() {
        // Two separate tables; a third one bridges them only once merged.
        let candidates = vec![
            f(0, 0, 10, 10),
            f(10, 0, 20, 10),
            f(40, 0, 50, 10),
            f(50, 0, 60, 10),
            f(15, 5, 45, 8),
        ];
        let boxes = detect_boxes(&candidates);
        assert_eq!(boxes, vec![f(0, 0, 60, 10)]);
    }

    #[test]
    fn merging_is_order_independent() {
        let mut candidates = table();
        candidates.extend([
            f(100, 500, 200, 550),
            f(200, 500, 300, 550),
            f(250, 180, 400, 260),
            f(400, 180, 450, 260),
        ]);
        let expected = sorted(detect_boxes(&candidates));

        let mut reversed = candidates.clone();
        reversed.reverse();
        assert_eq!(sorted(detect_boxes(&reversed)), expected);

        let mut rotated = candidates.clone();
        rotated.rotate_left(3);
        assert_eq!(sorted(detect_boxes(&rotated)), expected);

        for pair in sorted(expected.clone()).windows(2) {
            assert!(!pair[0].overlaps(&pair[1]));
        }
    }
}
