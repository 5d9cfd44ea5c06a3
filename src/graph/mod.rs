pub mod planar_graph;
pub mod polygonize_graph;


pub use planar_graph::{
    DirEdgeId, DirectedEdge, Edge, EdgeId, Label, Node, NodeId, NodeKey, PlanarGraph, RingId,
};
