use crate::edge_ring::EdgeRing;
use crate::graph::{PlanarGraph, RingId};
use log::debug;
use rstar::{RTree, RTreeObject, AABB};

// Ring envelope indexable by rstar; `position` is the ring's place in the
// caller's list.
struct IndexedRing {
    envelope: AABB<[f64; 2]>,
    position: usize,
}

impl RTreeObject for IndexedRing {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn index_rings(graph: &PlanarGraph, rings: &[EdgeRing], ids: &[RingId]) -> RTree<IndexedRing> {
    let indexed: Vec<IndexedRing> = ids
        .iter()
        .enumerate()
        .filter_map(|(position, &id)| {
            let envelope = rings[id].envelope(graph)?;
            Some(IndexedRing { envelope, position })
        })
        .collect();
    RTree::bulk_load(indexed)
}

/// Assigns hole rings to the innermost shell containing them, using an
/// R-tree over shell envelopes to narrow the candidates.
pub struct HoleAssigner<'a> {
    graph: &'a PlanarGraph,
    shells: &'a [RingId],
    shell_tree: RTree<IndexedRing>,
}

impl<'a> HoleAssigner<'a> {
    pub fn new(graph: &'a PlanarGraph, rings: &[EdgeRing], shells: &'a [RingId]) -> Self {
        Self {
            graph,
            shells,
            shell_tree: index_rings(graph, rings, shells),
        }
    }

    /// Convenience entry point: index `shells` and assign every hole.
    pub fn assign_holes_to_shells(
        graph: &PlanarGraph,
        rings: &mut [EdgeRing],
        holes: &[RingId],
        shells: &[RingId],
    ) {
        let assignments = HoleAssigner::new(graph, rings, shells).find_shells(rings, holes);
        debug!(
            "assigned {} of {} holes to shells",
            assignments.len(),
            holes.len()
        );
        for (shell, hole) in assignments {
            EdgeRing::add_hole(rings, shell, hole);
        }
    }

    /// Pairs each hole with its containing shell, skipping holes with none.
    pub fn find_shells(&self, rings: &[EdgeRing], holes: &[RingId]) -> Vec<(RingId, RingId)> {
        let hole_tree = index_rings(self.graph, rings, holes);

        let mut candidates: Vec<Vec<usize>> = vec![Vec::new(); holes.len()];
        for (shell, hole) in self.shell_tree.intersection_candidates_with_other_tree(&hole_tree) {
            candidates[hole.position].push(shell.position);
        }

        holes
            .iter()
            .zip(candidates)
            .filter_map(|(&hole, mut positions)| {
                // Keep the shell-list order so ties resolve as in a plain scan.
                positions.sort_unstable();
                let shells: Vec<RingId> = positions.into_iter().map(|p| self.shells[p]).collect();
                let shell = EdgeRing::find_edge_ring_containing(self.graph, rings, hole, &shells)?;
                Some((shell, hole))
            })
            .collect()
    }
}
