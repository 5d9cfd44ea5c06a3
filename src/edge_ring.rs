//! Closed `next`-cycles of directed edges, materialised as rings.
//!
//! An [`EdgeRing`] is built once from the threaded graph and afterwards only
//! fills its lazy geometry caches and its shell / hole / inclusion fields.
//! Rings are addressed by [`RingId`], their index in the list returned by
//! [`PlanarGraph::get_edge_rings`].

use crate::error::{PolygonizerError, Result};
use crate::graph::{DirEdgeId, PlanarGraph, RingId};
use crate::utils;
use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::winding_order::Winding;
use geo_types::{Coord, LineString, Polygon};
use log::trace;
use rstar::{Envelope, AABB};
use std::cell::OnceCell;
use std::cmp::Ordering;

#[derive(Clone, Debug)]
pub struct EdgeRing {
    id: RingId,
    edges: Vec<DirEdgeId>,
    coords: OnceCell<Vec<Coord<f64>>>,
    ring: OnceCell<Option<LineString<f64>>>,
    envelope: OnceCell<Option<AABB<[f64; 2]>>>,
    is_hole: bool,
    is_valid: bool,
    /// Only set on holes.
    shell: Option<RingId>,
    /// Only populated on shells.
    holes: Vec<RingId>,
    hole_rings: Vec<LineString<f64>>,
    is_included: Option<bool>,
    is_processed: bool,
}

impl EdgeRing {
    fn new(id: RingId, edges: Vec<DirEdgeId>) -> Self {
        Self {
            id,
            edges,
            coords: OnceCell::new(),
            ring: OnceCell::new(),
            envelope: OnceCell::new(),
            is_hole: false,
            is_valid: false,
            shell: None,
            holes: Vec::new(),
            hole_rings: Vec::new(),
            is_included: None,
            is_processed: false,
        }
    }

    /// Walks `next` from `start` and stamps every edge with ring `id`.
    ///
    /// A missing `next`, or reaching an edge already assigned to a ring before
    /// returning to `start`, means the graph is corrupt.
    pub fn build(graph: &mut PlanarGraph, start: DirEdgeId, id: RingId) -> Result<Self> {
        let mut edges = Vec::new();
        let mut de = start;
        loop {
            edges.push(de);
            graph.directed_edges[de].ring = Some(id);

            let next = graph.directed_edges[de].next.ok_or_else(|| {
                PolygonizerError::TopologyError(format!(
                    "found null directed edge in ring at {}",
                    graph.describe_dir_edge(de)
                ))
            })?;
            if next == start {
                break;
            }
            if graph.directed_edges[next].ring.is_some() {
                return Err(PolygonizerError::TopologyError(format!(
                    "found directed edge already in ring: {}",
                    graph.describe_dir_edge(next)
                )));
            }
            de = next;
        }
        Ok(Self::new(id, edges))
    }

    /// Collects the directed edges on the `next`-cycle through `start`
    /// without modifying the graph.
    pub fn find_dir_edges_in_ring(graph: &PlanarGraph, start: DirEdgeId) -> Result<Vec<DirEdgeId>> {
        let limit = graph.directed_edges.len();
        let mut edges = Vec::new();
        let mut de = start;
        loop {
            edges.push(de);
            de = graph.directed_edges[de].next.ok_or_else(|| {
                PolygonizerError::TopologyError(format!(
                    "found null directed edge in ring at {}",
                    graph.describe_dir_edge(de)
                ))
            })?;
            if de == start {
                break;
            }
            // A walk longer than the edge count has entered a cycle that
            // does not pass through `start`.
            if edges.len() > limit {
                return Err(PolygonizerError::TopologyError(format!(
                    "ring walk from {} does not close",
                    graph.describe_dir_edge(start)
                )));
            }
        }
        Ok(edges)
    }

    pub fn id(&self) -> RingId {
        self.id
    }

    pub fn edges(&self) -> &[DirEdgeId] {
        &self.edges
    }

    /// The ring's coordinates in traversal order, with no repeated joins.
    pub fn coordinates(&self, graph: &PlanarGraph) -> &[Coord<f64>] {
        self.coords.get_or_init(|| {
            let mut coords = Vec::new();
            for &de in &self.edges {
                let line = graph.line_of(de);
                if graph.directed_edges[de].edge_direction {
                    utils::extend_distinct(&mut coords, line.0.iter());
                } else {
                    utils::extend_distinct(&mut coords, line.0.iter().rev());
                }
            }
            coords
        })
    }

    /// The ring as a linear ring, or `None` if the coordinates do not form one.
    pub fn ring(&self, graph: &PlanarGraph) -> Option<&LineString<f64>> {
        self.ring
            .get_or_init(|| match utils::linear_ring(self.coordinates(graph)) {
                Ok(ring) => Some(ring),
                Err(err) => {
                    trace!("edge ring {} has no ring geometry: {}", self.id, err);
                    None
                }
            })
            .as_ref()
    }

    /// The coordinates as a plain line, usable even when the ring is invalid.
    pub fn line_string(&self, graph: &PlanarGraph) -> LineString<f64> {
        LineString::new(self.coordinates(graph).to_vec())
    }

    pub fn envelope(&self, graph: &PlanarGraph) -> Option<AABB<[f64; 2]>> {
        *self
            .envelope
            .get_or_init(|| utils::envelope(&self.line_string(graph)))
    }

    pub fn compute_valid(&mut self, graph: &PlanarGraph) {
        let is_valid = self.coordinates(graph).len() > 3
            && self.ring(graph).is_some_and(utils::is_simple_ring);
        self.is_valid = is_valid;
    }

    /// `false` until [`EdgeRing::compute_valid`] has run.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Classifies the ring from its orientation: counter-clockwise rings are
    /// holes, clockwise rings are shells.
    pub fn compute_hole(&mut self, graph: &PlanarGraph) {
        let is_hole = self.ring(graph).is_some_and(|ring| ring.is_ccw());
        self.is_hole = is_hole;
    }

    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// The shell this hole was assigned to. Always `None` for shells.
    pub fn shell(&self) -> Option<RingId> {
        self.shell
    }

    pub fn has_shell(&self) -> bool {
        self.shell.is_some()
    }

    /// The shell enclosing this ring's area: the assigned shell for a hole,
    /// the ring itself for a shell.
    pub fn enclosing_shell(&self) -> Option<RingId> {
        if self.is_hole {
            self.shell
        } else {
            Some(self.id)
        }
    }

    /// A hole with no shell borders the unbounded exterior.
    pub fn is_outer_hole(&self) -> bool {
        self.is_hole && !self.has_shell()
    }

    /// The outer hole adjacent to this shell across any of its edges.
    pub fn outer_hole(&self, graph: &PlanarGraph, rings: &[EdgeRing]) -> Option<RingId> {
        if self.is_hole {
            return None;
        }
        self.edges
            .iter()
            .filter_map(|&de| adjacent_ring(graph, de))
            .find(|&adj| rings[adj].is_outer_hole())
    }

    pub fn is_outer_shell(&self, graph: &PlanarGraph, rings: &[EdgeRing]) -> bool {
        self.outer_hole(graph, rings).is_some()
    }

    /// Attaches a hole ring to `shell` and records `shell` on the hole.
    /// A hole that already has a shell is left where it is.
    pub fn add_hole(rings: &mut [EdgeRing], shell: RingId, hole: RingId) {
        if rings[hole].shell.is_some() {
            return;
        }
        rings[hole].shell = Some(shell);
        rings[shell].holes.push(hole);
    }

    /// Attaches a hole given directly as a linear ring.
    pub fn add_hole_ring(&mut self, ring: LineString<f64>) {
        self.hole_rings.push(ring);
    }

    pub fn holes(&self) -> &[RingId] {
        &self.holes
    }

    /// The polygon bounded by this ring with all attached holes.
    pub fn polygon(&self, graph: &PlanarGraph, rings: &[EdgeRing]) -> Option<Polygon<f64>> {
        let shell = self.ring(graph)?.clone();
        let interiors = self
            .holes
            .iter()
            .filter_map(|&hole| rings[hole].ring(graph).cloned())
            .chain(self.hole_rings.iter().cloned())
            .collect();
        Some(Polygon::new(shell, interiors))
    }

    pub fn is_included_set(&self) -> bool {
        self.is_included.is_some()
    }

    pub fn is_included(&self) -> bool {
        self.is_included == Some(true)
    }

    /// Sets the inclusion state. The first value set wins.
    pub fn set_included(&mut self, included: bool) {
        if self.is_included.is_none() {
            self.is_included = Some(included);
        }
    }

    pub fn is_processed(&self) -> bool {
        self.is_processed
    }

    pub fn set_processed(&mut self, processed: bool) {
        self.is_processed = processed;
    }

    /// Decides inclusion of shell `id` as the opposite of the first adjacent
    /// shell whose inclusion is already known. Does nothing for holes, for
    /// shells already decided, or when no neighbour is decided yet.
    pub fn update_included(rings: &mut [EdgeRing], graph: &PlanarGraph, id: RingId) {
        let er = &rings[id];
        if er.is_hole || er.is_included_set() {
            return;
        }
        let neighbour = er.edges.iter().find_map(|&de| {
            let adj = adjacent_ring(graph, de)?;
            let adj_shell = rings[adj].enclosing_shell()?;
            rings[adj_shell].is_included
        });
        if let Some(neighbour_included) = neighbour {
            rings[id].set_included(!neighbour_included);
        }
    }

    /// Tests whether `pt` lies inside or on this ring.
    pub fn is_in_ring(&self, graph: &PlanarGraph, pt: Coord<f64>) -> bool {
        self.ring(graph).is_some_and(|ring| {
            Polygon::new(ring.clone(), vec![]).coordinate_position(&pt) != CoordPos::Outside
        })
    }

    /// Finds the innermost ring in `shells` containing ring `test`.
    ///
    /// A candidate must have an envelope that covers, and is not equal to, the
    /// test envelope, and must contain a test vertex that is not one of its own
    /// vertices. Among containing candidates the one whose envelope lies inside
    /// the current best replaces it; otherwise the earlier candidate is kept.
    pub fn find_edge_ring_containing(
        graph: &PlanarGraph,
        rings: &[EdgeRing],
        test: RingId,
        shells: &[RingId],
    ) -> Option<RingId> {
        let test_er = &rings[test];
        let test_ring = test_er.ring(graph)?;
        let test_env = test_er.envelope(graph)?;

        let mut min_ring: Option<(RingId, AABB<[f64; 2]>)> = None;
        for &candidate in shells {
            let try_er = &rings[candidate];
            let (Some(try_ring), Some(try_env)) = (try_er.ring(graph), try_er.envelope(graph)) else {
                continue;
            };
            if try_env == test_env || !try_env.contains_envelope(&test_env) {
                continue;
            }
            let Some(test_pt) = utils::point_not_in_list(&test_ring.0, &try_ring.0) else {
                continue;
            };
            if !try_er.is_in_ring(graph, test_pt) {
                continue;
            }
            let is_smaller = match min_ring {
                None => true,
                Some((_, min_env)) => min_env != try_env && min_env.contains_envelope(&try_env),
            };
            if is_smaller {
                min_ring = Some((candidate, try_env));
            }
        }
        min_ring.map(|(id, _)| id)
    }
}

/// The ring on the other side of `de`'s edge.
fn adjacent_ring(graph: &PlanarGraph, de: DirEdgeId) -> Option<RingId> {
    graph.directed_edges[graph.directed_edges[de].sym_idx].ring
}

/// Orders rings by envelope (min x, min y, max x, max y), rings without an
/// envelope first.
pub struct EnvelopeComparator<'a> {
    graph: &'a PlanarGraph,
    rings: &'a [EdgeRing],
}

impl<'a> EnvelopeComparator<'a> {
    pub fn new(graph: &'a PlanarGraph, rings: &'a [EdgeRing]) -> Self {
        Self { graph, rings }
    }

    pub fn compare(&self, a: RingId, b: RingId) -> Ordering {
        let env_a = self.rings[a].envelope(self.graph);
        let env_b = self.rings[b].envelope(self.graph);
        match (env_a, env_b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(ea), Some(eb)) => {
                let (la, ua) = (ea.lower(), ea.upper());
                let (lb, ub) = (eb.lower(), eb.upper());
                la[0]
                    .total_cmp(&lb[0])
                    .then(la[1].total_cmp(&lb[1]))
                    .then(ua[0].total_cmp(&ub[0]))
                    .then(ua[1].total_cmp(&ub[1]))
            }
        }
    }

    /// Sorts ring ids in envelope order; equal envelopes keep their order.
    pub fn sort(&self, ids: &mut [RingId]) {
        ids.sort_by(|&a, &b| self.compare(a, b));
    }
}
