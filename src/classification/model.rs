use rten_tensor::prelude::*;
use rten_tensor::{NdTensor, Tensor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::preprocess::{InputBatch, Preprocessing};
use crate::error::{PipelineError, Result};

/// Labels for the two-class model
pub const BINARY_LABELS: [&str; 2] = ["I", "III"];

/// Labels for the four-class model
pub const MULTICLASS_LABELS: [&str; 4] = ["I", "II", "III", "IV"];

/// Anything that maps one preprocessed sample to per-class scores
pub trait Classifier: Send + Sync {
    fn predict(&self, batch: &InputBatch) -> Result<Vec<f32>>;
}

/// Classifier backed by an `.rten` model file
pub struct RtenClassifier {
    model: rten::Model,
}

impl RtenClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        let model = rten::Model::load_file(path).map_err(|e| PipelineError::ModelLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { model })
    }
}

impl Classifier for RtenClassifier {
    fn predict(&self, batch: &InputBatch) -> Result<Vec<f32>> {
        let input = NdTensor::from_data(batch.shape, batch.data.clone());
        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        let scores: Tensor<f32> = output
            .try_into()
            .map_err(|e| PipelineError::Inference(format!("unexpected output type: {}", e)))?;
        Ok(scores.to_vec())
    }
}

/// Where a model lives and how its input must be prepared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// `input_size`, `layout` and `normalization` sit next to `path`
    #[serde(flatten)]
    pub preprocessing: Preprocessing,
}

impl ModelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            preprocessing: Preprocessing::default(),
        }
    }
}

/// Handle to a pretrained classifier, loaded once and shared read-only.
///
/// An unloaded handle is valid to hold; classifying with it fails with
/// `ModelUnavailable`.
pub struct Model {
    name: String,
    classifier: Option<Box<dyn Classifier>>,
    preprocessing: Preprocessing,
}

impl Model {
    /// Load an `.rten` artifact
    pub fn load(name: impl Into<String>, config: &ModelConfig) -> Result<Self> {
        let name = name.into();
        let classifier = RtenClassifier::load(&config.path)?;
        log::info!("Loaded {} model from {}", name, config.path.display());
        Ok(Self::from_classifier(name, Box::new(classifier), config.preprocessing))
    }

    /// Wrap an already constructed classifier
    pub fn from_classifier(
        name: impl Into<String>,
        classifier: Box<dyn Classifier>,
        preprocessing: Preprocessing,
    ) -> Self {
        Self {
            name: name.into(),
            classifier: Some(classifier),
            preprocessing,
        }
    }

    pub fn unloaded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classifier: None,
            preprocessing: Preprocessing::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn preprocessing(&self) -> &Preprocessing {
        &self.preprocessing
    }

    pub(crate) fn classifier(&self) -> Option<&dyn Classifier> {
        self.classifier.as_deref()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .field("preprocessing", &self.preprocessing)
            .finish()
    }
}

/// Which of the two configured models to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Binary,
    Multiclass,
}

impl ModelKind {
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Binary => &BINARY_LABELS,
            ModelKind::Multiclass => &MULTICLASS_LABELS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Binary => "binary",
            ModelKind::Multiclass => "multiclass",
        }
    }
}

/// The binary and multiclass models held for the process lifetime
#[derive(Debug)]
pub struct ModelRegistry {
    pub binary: Model,
    pub multiclass: Model,
}

impl ModelRegistry {
    pub fn new(binary: Model, multiclass: Model) -> Self {
        Self { binary, multiclass }
    }

    /// Registry with neither model loaded
    pub fn empty() -> Self {
        Self::new(
            Model::unloaded(ModelKind::Binary.name()),
            Model::unloaded(ModelKind::Multiclass.name()),
        )
    }

    /// Load both models; a failure leaves that slot unloaded and is logged
    pub fn load(binary: &ModelConfig, multiclass: &ModelConfig) -> Self {
        Self::new(
            load_or_unloaded(ModelKind::Binary, binary),
            load_or_unloaded(ModelKind::Multiclass, multiclass),
        )
    }

    pub fn get(&self, kind: ModelKind) -> &Model {
        match kind {
            ModelKind::Binary => &self.binary,
            ModelKind::Multiclass => &self.multiclass,
        }
    }
}

fn load_or_unloaded(kind: ModelKind, config: &ModelConfig) -> Model {
    match Model::load(kind.name(), config) {
        Ok(model) => model,
        Err(e) => {
            log::warn!("{} model not available: {}", kind.name(), e);
            Model::unloaded(kind.name())
        }
    }
}
