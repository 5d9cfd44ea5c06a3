pub mod batch;
pub mod edge_ring;
pub mod error;
pub mod graph;
pub mod hole_assigner;
pub mod polygonizer;
pub mod utils;

#[cfg(test)]
mod edge_ring_tests;

pub use batch::BatchPolygonizer;
pub use edge_ring::{EdgeRing, EnvelopeComparator};
pub use error::{PolygonizerError, Result};
pub use graph::PlanarGraph;
pub use polygonizer::{PolygonizeOutput, Polygonizer};
