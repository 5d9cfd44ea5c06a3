use crate::utils::{self, parallel};
use geo_types::{Coord, LineString};
use smallvec::SmallVec;
use std::collections::HashMap;

// Type aliases for indices to ensure we don't mix them up
pub type NodeId = usize;
pub type EdgeId = usize;
pub type DirEdgeId = usize;
pub type RingId = usize;
pub type Label = usize;

#[derive(Clone, Debug)]
pub struct Node {
    pub coordinate: Coord<f64>,
    /// Indices of outgoing DirectedEdges.
    /// CRITICAL INVARIANT: Sorted by polar angle (CCW) once the graph is sorted.
    pub outgoing_edges: SmallVec<[DirEdgeId; 4]>,
}

#[derive(Clone, Debug)]
pub struct Edge {
    /// The input line, kept as given so it can be reported back as a dangle
    /// or cut edge.
    pub line: LineString<f64>,
    /// Indices of the two directed edges associated with this undirected edge.
    pub dir_edges: [DirEdgeId; 2],
}

#[derive(Clone, Debug)]
pub struct DirectedEdge {
    pub src: NodeId,
    pub dst: NodeId,
    /// Reference to the parent geometry (undirected edge)
    pub edge_idx: EdgeId,
    /// Index of the symmetric (reverse) edge
    pub sym_idx: DirEdgeId,
    /// Angle of the first segment leaving `src`, used to order the node star.
    pub angle: f64,
    /// Orientation in the parent LineString (true: same direction, false: opposite)
    pub edge_direction: bool,
    /// Successor when walking an edge ring.
    pub next: Option<DirEdgeId>,
    /// Ring label; `None` until a labelling pass reaches this edge.
    pub label: Option<Label>,
    /// Logically deleted (dangle or cut edge).
    pub is_marked: bool,
    /// The edge ring this edge was built into.
    pub ring: Option<RingId>,
}

pub struct PlanarGraph {
    /// All nodes in the graph. Index is `NodeId`.
    pub nodes: Vec<Node>,
    /// All undirected edges (geometry owners). Index is `EdgeId`.
    pub edges: Vec<Edge>,
    /// All directed half-edges. Index is `DirEdgeId`.
    pub directed_edges: Vec<DirectedEdge>,
    /// Exact-coordinate lookup, so each location owns a single node.
    pub node_map: HashMap<NodeKey, NodeId>,
    stars_sorted: bool,
}

// Wrapper for Coord to be Hashable (since f64 is not Hash)
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct NodeKey(u64, u64);

impl From<Coord<f64>> for NodeKey {
    fn from(c: Coord<f64>) -> Self {
        // Adding 0.0 folds -0.0 into 0.0 so the key matches f64 equality.
        NodeKey((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
    }
}

impl Default for PlanarGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanarGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            directed_edges: Vec::new(),
            node_map: HashMap::new(),
            stars_sorted: true,
        }
    }

    /// Looks up the node at exactly `coord`.
    pub fn find_node(&self, coord: Coord<f64>) -> Option<NodeId> {
        self.node_map.get(&NodeKey::from(coord)).copied()
    }

    /// Returns the node at `coord`, creating it on first reference.
    pub fn get_node(&mut self, coord: Coord<f64>) -> NodeId {
        let key = NodeKey::from(coord);
        if let Some(&id) = self.node_map.get(&key) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node {
            coordinate: coord,
            outgoing_edges: SmallVec::new(),
        });
        self.node_map.insert(key, id);
        id
    }

    /// Adds a noded line to the graph as a single edge between its end points.
    ///
    /// Repeated points are removed first; a line with fewer than two distinct
    /// points is ignored and `None` is returned.
    pub fn add_edge(&mut self, line: LineString<f64>) -> Option<EdgeId> {
        let pts = utils::remove_repeated_points(&line.0);
        if pts.len() < 2 {
            return None;
        }

        let n = pts.len();
        let start = pts[0];
        let end = pts[n - 1];

        let u = self.get_node(start);
        let v = self.get_node(end);

        let edge_idx = self.edges.len();
        let de_u_v_idx = self.directed_edges.len();
        let de_v_u_idx = de_u_v_idx + 1;

        self.directed_edges.push(DirectedEdge {
            src: u,
            dst: v,
            edge_idx,
            sym_idx: de_v_u_idx,
            angle: utils::segment_angle(start, pts[1]),
            edge_direction: true,
            next: None,
            label: None,
            is_marked: false,
            ring: None,
        });

        self.directed_edges.push(DirectedEdge {
            src: v,
            dst: u,
            edge_idx,
            sym_idx: de_u_v_idx,
            angle: utils::segment_angle(end, pts[n - 2]),
            edge_direction: false,
            next: None,
            label: None,
            is_marked: false,
            ring: None,
        });

        self.edges.push(Edge {
            line,
            dir_edges: [de_u_v_idx, de_v_u_idx],
        });

        self.nodes[u].outgoing_edges.push(de_u_v_idx);
        self.nodes[v].outgoing_edges.push(de_v_u_idx);
        self.stars_sorted = false;

        Some(edge_idx)
    }

    /// Sorts all outgoing edges of all nodes by angle.
    ///
    /// Equal angles fall back to the directed-edge index so the order is
    /// total and does not change between passes.
    pub fn sort_edges(&mut self) {
        if self.stars_sorted {
            return;
        }
        let directed_edges = &self.directed_edges;
        parallel::iterate_mut(&mut self.nodes, |node| {
            node.outgoing_edges.sort_by(|&a_idx, &b_idx| {
                directed_edges[a_idx]
                    .angle
                    .total_cmp(&directed_edges[b_idx].angle)
                    .then(a_idx.cmp(&b_idx))
            });
        });
        self.stars_sorted = true;
    }

    /// Number of outgoing edges at `node` that are not marked as deleted.
    pub fn degree_non_deleted(&self, node: NodeId) -> usize {
        self.nodes[node]
            .outgoing_edges
            .iter()
            .filter(|&&de| !self.directed_edges[de].is_marked)
            .count()
    }

    /// Number of outgoing edges at `node` carrying `label`.
    pub fn degree_with_label(&self, node: NodeId, label: Label) -> usize {
        self.nodes[node]
            .outgoing_edges
            .iter()
            .filter(|&&de| self.directed_edges[de].label == Some(label))
            .count()
    }

    /// Marks a directed edge and its sym as deleted.
    pub(crate) fn mark_edge_pair(&mut self, de: DirEdgeId) {
        let sym = self.directed_edges[de].sym_idx;
        self.directed_edges[de].is_marked = true;
        self.directed_edges[sym].is_marked = true;
    }

    /// The input line carried by the edge that `de` traverses.
    pub fn line_of(&self, de: DirEdgeId) -> &LineString<f64> {
        &self.edges[self.directed_edges[de].edge_idx].line
    }

    /// Human-readable location of a directed edge for error messages.
    pub fn describe_dir_edge(&self, de: DirEdgeId) -> String {
        let dir_edge = &self.directed_edges[de];
        let from = self.nodes[dir_edge.src].coordinate;
        let to = self.nodes[dir_edge.dst].coordinate;
        format!(
            "directed edge {} ({} {} -> {} {})",
            de, from.x, from.y, to.x, to.y
        )
    }
}
