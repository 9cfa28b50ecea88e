mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from mammoscope for tests
pub use mammoscope::classification::{
    BINARY_LABELS, Classifier, InputBatch, MULTICLASS_LABELS, Model, ModelKind, ModelRegistry,
    Preprocessing,
};
pub use mammoscope::{GrayscaleImage, PipelineError, WindowSpec};
