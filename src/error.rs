use thiserror::Error;

/// Top-level error type for the road geometry kernel.
#[derive(Debug, Error)]
pub enum RoadspineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("spline needs at least 2 control points, got {count}")]
    InvalidSpline { count: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("clothoid fit did not converge after {iterations} iterations (residual {residual:e})")]
    ClothoidConvergence { residual: f64, iterations: usize },
}

/// Errors related to the road network topology.
///
/// These indicate a structural bug in the caller's edit and are always
/// propagated; the enclosing edit must be aborted.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("segment not found in spline: {0}")]
    SegmentNotFound(String),

    #[error("segment is neither a road nor a junction: {0}")]
    UnknownSegmentType(String),

    #[error("spline already has a segment at s = {0}")]
    DuplicateSegmentOffset(f64),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to network operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`RoadspineError`].
pub type Result<T> = std::result::Result<T, RoadspineError>;
