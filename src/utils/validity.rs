use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::Line;
use geo_types::LineString;
use rstar::{RTree, RTreeObject, AABB};

// Wrapper for Line to be indexable by rstar
#[derive(Clone, Copy, Debug)]
struct IndexedLine {
    line: Line<f64>,
    index: usize,
}

impl RTreeObject for IndexedLine {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let p1 = self.line.start;
        let p2 = self.line.end;
        AABB::from_corners(
            [p1.x.min(p2.x), p1.y.min(p2.y)],
            [p1.x.max(p2.x), p1.y.max(p2.y)],
        )
    }
}

/// Checks that a closed ring does not cross or touch itself.
///
/// Consecutive segments (including the closing pair) may only share their
/// common vertex; any other contact makes the ring non-simple.
pub fn is_simple_ring(ring: &LineString<f64>) -> bool {
    let segments: Vec<Line<f64>> = ring.lines().collect();
    let n = segments.len();
    if n < 3 {
        return false;
    }

    let indexed: Vec<IndexedLine> = segments
        .iter()
        .enumerate()
        .map(|(index, &line)| IndexedLine { line, index })
        .collect();
    let tree = RTree::bulk_load(indexed);

    for (a, b) in tree.intersection_candidates_with_other_tree(&tree) {
        let (i, j) = (a.index, b.index);
        if i >= j {
            continue;
        }
        let adjacent = j == i + 1 || (i == 0 && j == n - 1);

        let Some(res) = line_intersection(a.line, b.line) else {
            continue;
        };

        match res {
            // Two non-collinear neighbours can only meet at their shared vertex.
            LineIntersection::SinglePoint { .. } if adjacent => {}
            LineIntersection::Collinear { intersection } if adjacent => {
                if intersection.start != intersection.end {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}
