use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockError {
    /// Boundary is not a simple polygon, or a coordinate is not finite
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Flat optimization vector does not match the number of free poses
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, DockError>;
