use crate::session::SessionId;
use thiserror::Error;

/// Error types for the stepkmeans library
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansError {
    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Points of differing dimensionality were compared or combined
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Manual initialization supplied the wrong number of centroids
    #[error("Manual initialization expected {expected} centroids, got {found}")]
    ManualCentroidCountMismatch { expected: usize, found: usize },

    /// Every remaining candidate has zero weight during kmeans++ seeding
    #[error("Degenerate initialization: {0}")]
    DegenerateInitialization(String),

    /// A step was requested before the session was initialized
    #[error("Session has not been initialized. Call initialize_session() first.")]
    UninitializedSession,

    /// No session is registered under the given identifier
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    /// A dataset must contain at least one point of at least one coordinate
    #[error("Dataset is empty")]
    EmptyDataset,

    /// A cluster refers to a row the dataset does not have
    #[error("Row {row} is out of range for a dataset of {n_points} points")]
    RowOutOfRange { row: usize, n_points: usize },

    /// NaN or infinite coordinate in the input
    #[error("Non-finite coordinate at point {point}, dimension {dim}")]
    NonFiniteCoordinate { point: usize, dim: usize },

    /// Initialization method name not recognized
    #[error("Unknown initialization method: {0:?} (expected random, farthest, kmeans++ or manual)")]
    UnknownInitMethod(String),

    /// Sampling range is empty or unbounded
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call fit() first.")]
    NotFitted,
}

pub type Result<T> = std::result::Result<T, KMeansError>;
