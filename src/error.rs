use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolygonizerError {
    /// The graph violated an internal invariant, usually because the input
    /// was not correctly noded.
    #[error("Topology error: {0}")]
    TopologyError(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, PolygonizerError>;
