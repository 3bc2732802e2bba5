use thiserror::Error;

/// Rejections raised while building a shape from caller-provided geometry.
///
/// The simulation itself never fails; only construction does.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("a polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("vertex {index} is not finite")]
    NonFinite { index: usize },

    #[error("outline is not convex at vertex {index}")]
    NotConvex { index: usize },

    #[error("could not decompose outline into convex parts: {0}")]
    Decomposition(&'static str),
}
