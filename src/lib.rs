pub mod classification;
pub mod config;
pub mod controller;
pub mod debug;
pub mod error;
pub mod imaging;
pub mod segmentation;

pub use classification::{
    ClassificationResult, Classifier, InputBatch, Model, ModelConfig, ModelKind, ModelRegistry,
    classify, classify_batch,
};
pub use config::AppConfig;
pub use controller::{DisplayState, PipelineController};
pub use error::{PipelineError, Result};
pub use imaging::{GrayscaleImage, WindowSpec, apply_window, from_buffer, to_buffer};
pub use segmentation::{SegmentationParams, SegmentationResult, segment};
