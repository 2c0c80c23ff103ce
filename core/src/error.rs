/// Errors shared by every stage of the obstacle pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid config: {0}")]
    ConfigValidation(String),

    #[error("Depth source error: {0}")]
    DepthSource(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Insufficient plane data: {0}")]
    InsufficientPlaneData(String),

    #[error("Clustering error: {0}")]
    Clustering(String),

    #[error("Empty depth data: {0}")]
    EmptyDepthData(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Camera not found: {0}")]
    CameraNotFound(String),

    #[error("No camera specified")]
    NoCamera,

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
