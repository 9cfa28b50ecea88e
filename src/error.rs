use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error types for the image analysis pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source pixels could not be turned into a grayscale buffer
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Image too small for the requested operation
    #[error("Invalid dimensions: {width}x{height} (need more than {min} pixels per side)")]
    InvalidDimensions { width: u32, height: u32, min: u32 },

    /// Zero-mean image, gamma cannot be estimated
    #[error("Degenerate image: mean intensity is zero")]
    DegenerateImage,

    /// Thresholding left no foreground component
    #[error("No foreground component found after thresholding")]
    NoForeground,

    /// Classification requested without a loaded model
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The underlying model call failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model artifact could not be loaded
    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    /// Configuration file error
    #[error("Config error: {0}")]
    Config(String),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Config(format!("{}", e))
    }
}
