//! Graph cleaning and ring threading for polygonization.
//!
//! The passes here must run in order: edges are threaded clockwise around
//! every node, labelled into maximal rings, and then re-threaded
//! counter-clockwise at self-intersection nodes so each label splits into
//! minimal rings.

use super::planar_graph::{DirEdgeId, Label, NodeId, PlanarGraph};
use crate::edge_ring::EdgeRing;
use crate::error::{PolygonizerError, Result};
use geo_types::LineString;
use log::{debug, trace};

impl PlanarGraph {
    /// Removes dangles: edges with an end node of degree 1.
    ///
    /// Deleting an edge can leave its far end with degree 1, so the removal
    /// cascades through an explicit stack. Returns the lines of the removed
    /// edges, each once.
    pub fn delete_dangles(&mut self) -> Vec<LineString<f64>> {
        let mut node_stack: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&n| self.degree_non_deleted(n) == 1)
            .collect();

        let mut dangles = Vec::new();
        while let Some(node) = node_stack.pop() {
            for i in 0..self.nodes[node].outgoing_edges.len() {
                let de = self.nodes[node].outgoing_edges[i];
                if self.directed_edges[de].is_marked {
                    continue;
                }
                self.mark_edge_pair(de);
                dangles.push(self.line_of(de).clone());

                let to_node = self.directed_edges[de].dst;
                if self.degree_non_deleted(to_node) == 1 {
                    node_stack.push(to_node);
                }
            }
        }

        debug!("deleted {} dangles", dangles.len());
        dangles
    }

    /// Removes cut edges: edges whose two directed edges lie in the same
    /// maximal ring, so they bound no area.
    pub fn delete_cut_edges(&mut self) -> Result<Vec<LineString<f64>>> {
        self.compute_next_cw_edges();
        self.clear_labels();
        self.find_labeled_edge_rings()?;

        let mut cut_lines = Vec::new();
        for de in 0..self.directed_edges.len() {
            let dir_edge = &self.directed_edges[de];
            if dir_edge.is_marked {
                continue;
            }
            let sym = &self.directed_edges[dir_edge.sym_idx];
            if dir_edge.label.is_some() && dir_edge.label == sym.label {
                self.mark_edge_pair(de);
                cut_lines.push(self.line_of(de).clone());
            }
        }

        debug!("deleted {} cut edges", cut_lines.len());
        Ok(cut_lines)
    }

    /// Threads `next` so that arriving at a node, the walk leaves by the next
    /// unmarked edge around the star. Produces maximal rings.
    pub fn compute_next_cw_edges(&mut self) {
        self.sort_edges();
        for node in 0..self.nodes.len() {
            self.compute_next_cw_edges_at(node);
        }
    }

    fn compute_next_cw_edges_at(&mut self, node: NodeId) {
        let star = &self.nodes[node].outgoing_edges;
        let directed_edges = &mut self.directed_edges;

        let mut start_de: Option<DirEdgeId> = None;
        let mut prev_de: Option<DirEdgeId> = None;

        // the edges are stored in CCW order around the star
        for &out_de in star.iter() {
            if directed_edges[out_de].is_marked {
                continue;
            }
            start_de.get_or_insert(out_de);
            if let Some(prev) = prev_de {
                let sym = directed_edges[prev].sym_idx;
                directed_edges[sym].next = Some(out_de);
            }
            prev_de = Some(out_de);
        }

        if let (Some(prev), Some(start)) = (prev_de, start_de) {
            let sym = directed_edges[prev].sym_idx;
            directed_edges[sym].next = Some(start);
        }
    }

    /// Resets every directed edge to the unlabelled state.
    pub(crate) fn clear_labels(&mut self) {
        for de in &mut self.directed_edges {
            de.label = None;
        }
    }

    /// Labels every unmarked, unlabelled ring reachable through `next`.
    ///
    /// Returns one start edge per ring found; the ring's label is the
    /// position of its start edge in the returned list.
    pub fn find_labeled_edge_rings(&mut self) -> Result<Vec<DirEdgeId>> {
        let mut ring_starts = Vec::new();
        for de in 0..self.directed_edges.len() {
            let dir_edge = &self.directed_edges[de];
            if dir_edge.is_marked || dir_edge.label.is_some() {
                continue;
            }
            let label: Label = ring_starts.len();
            ring_starts.push(de);
            for member in EdgeRing::find_dir_edges_in_ring(self, de)? {
                self.directed_edges[member].label = Some(label);
            }
        }
        Ok(ring_starts)
    }

    /// Splits every maximal ring into minimal rings by re-threading `next`
    /// at the nodes the ring passes through more than once.
    pub fn convert_maximal_to_minimal_edge_rings(&mut self, ring_starts: &[DirEdgeId]) -> Result<()> {
        for &start in ring_starts {
            let Some(label) = self.directed_edges[start].label else {
                continue;
            };
            let int_nodes = self.find_intersection_nodes(start, label)?;
            if !int_nodes.is_empty() {
                trace!(
                    "ring label {} touches itself at {} node(s)",
                    label,
                    int_nodes.len()
                );
            }
            for node in int_nodes {
                self.compute_next_ccw_edges(node, label)?;
            }
        }
        Ok(())
    }

    /// Nodes on the ring of `label` where that label has more than one
    /// outgoing edge.
    fn find_intersection_nodes(&self, start: DirEdgeId, label: Label) -> Result<Vec<NodeId>> {
        let mut int_nodes: Vec<NodeId> = Vec::new();
        let mut de = start;
        loop {
            let node = self.directed_edges[de].src;
            if self.degree_with_label(node, label) > 1 && !int_nodes.contains(&node) {
                int_nodes.push(node);
            }

            de = self.directed_edges[de].next.ok_or_else(|| {
                PolygonizerError::TopologyError(format!(
                    "found null next edge in ring at {}",
                    self.describe_dir_edge(de)
                ))
            })?;
            if de == start {
                break;
            }
            if self.directed_edges[de].ring.is_some() {
                return Err(PolygonizerError::TopologyError(format!(
                    "found directed edge already in ring: {}",
                    self.describe_dir_edge(de)
                )));
            }
        }
        Ok(int_nodes)
    }

    /// Re-threads `next` at `node` for edges of `label`, scanning the star
    /// clockwise and pairing each incoming edge with the next outgoing one.
    pub fn compute_next_ccw_edges(&mut self, node: NodeId, label: Label) -> Result<()> {
        let star = &self.nodes[node].outgoing_edges;
        let directed_edges = &mut self.directed_edges;

        let mut first_out_de: Option<DirEdgeId> = None;
        let mut prev_in_de: Option<DirEdgeId> = None;

        for &de in star.iter().rev() {
            let sym = directed_edges[de].sym_idx;
            let out_de = (directed_edges[de].label == Some(label)).then_some(de);
            let in_de = (directed_edges[sym].label == Some(label)).then_some(sym);

            if out_de.is_none() && in_de.is_none() {
                continue;
            }
            if in_de.is_some() {
                prev_in_de = in_de;
            }
            if let Some(out) = out_de {
                if let Some(prev_in) = prev_in_de.take() {
                    directed_edges[prev_in].next = Some(out);
                }
                first_out_de.get_or_insert(out);
            }
        }

        if let Some(prev_in) = prev_in_de {
            let first_out = first_out_de.ok_or_else(|| {
                let c = self.nodes[node].coordinate;
                PolygonizerError::TopologyError(format!(
                    "incoming edge {} of ring label {} has no outgoing partner at node ({} {})",
                    prev_in, label, c.x, c.y
                ))
            })?;
            self.directed_edges[prev_in].next = Some(first_out);
        }
        Ok(())
    }

    /// Builds the minimal edge rings of the graph.
    ///
    /// Runs the full threading sequence, then walks every unmarked directed
    /// edge not yet in a ring. Ring back-references from earlier calls are
    /// discarded.
    pub fn get_edge_rings(&mut self) -> Result<Vec<EdgeRing>> {
        self.compute_next_cw_edges();
        self.clear_labels();
        for de in &mut self.directed_edges {
            de.ring = None;
        }
        let maximal_rings = self.find_labeled_edge_rings()?;
        self.convert_maximal_to_minimal_edge_rings(&maximal_rings)?;

        let mut edge_rings = Vec::new();
        for de in 0..self.directed_edges.len() {
            let dir_edge = &self.directed_edges[de];
            if dir_edge.is_marked || dir_edge.ring.is_some() {
                continue;
            }
            let ring = EdgeRing::build(self, de, edge_rings.len())?;
            edge_rings.push(ring);
        }

        debug!(
            "found {} edge rings from {} maximal rings",
            edge_rings.len(),
            maximal_rings.len()
        );
        Ok(edge_rings)
    }
}
