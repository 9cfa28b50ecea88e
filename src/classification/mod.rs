pub mod model;
pub mod preprocess;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::{PipelineError, Result};
use crate::imaging::GrayscaleImage;

pub use model::{
    BINARY_LABELS, Classifier, MULTICLASS_LABELS, Model, ModelConfig, ModelKind, ModelRegistry,
    RtenClassifier,
};
pub use preprocess::{InputBatch, Normalization, Preprocessing, TensorLayout, preprocess};

/// Top class of one inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub class_index: usize,
    pub confidence: f32,
    /// Wall-clock time of the model call alone
    pub elapsed_seconds: f64,
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (confidence: {:.2}, time: {:.3}s)",
            self.label, self.confidence, self.elapsed_seconds
        )
    }
}

/// Resize, normalise and classify a segmented region
pub fn classify(image: &GrayscaleImage, model: &Model, class_names: &[&str]) -> Result<ClassificationResult> {
    if !model.is_loaded() {
        return Err(PipelineError::ModelUnavailable(model.name().to_string()));
    }
    let batch = preprocess(image, model.preprocessing());
    classify_batch(&batch, model, class_names)
}

/// Classify an already preprocessed sample
pub fn classify_batch(batch: &InputBatch, model: &Model, class_names: &[&str]) -> Result<ClassificationResult> {
    let classifier = model
        .classifier()
        .ok_or_else(|| PipelineError::ModelUnavailable(model.name().to_string()))?;

    let start = Instant::now();
    let scores = classifier.predict(batch)?;
    let elapsed_seconds = start.elapsed().as_secs_f64();
    log::debug!("{} model inference took {:.4}s", model.name(), elapsed_seconds);

    top_class(&scores, class_names, elapsed_seconds)
}

fn top_class(scores: &[f32], class_names: &[&str], elapsed_seconds: f64) -> Result<ClassificationResult> {
    if scores.len() != class_names.len() {
        return Err(PipelineError::Inference(format!(
            "model produced {} scores for {} classes",
            scores.len(),
            class_names.len()
        )));
    }

    // First maximum wins on ties
    let (class_index, confidence) = scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .ok_or_else(|| PipelineError::Inference("model produced no scores".to_string()))?;

    Ok(ClassificationResult {
        label: class_names[class_index].to_string(),
        class_index,
        confidence,
        elapsed_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_class_picks_first_maximum() -> Result<()> {
        let result = top_class(&[0.2, 0.4, 0.4, 0.0], &MULTICLASS_LABELS, 0.0)?;
        assert_eq!(result.label, "II");
        assert_eq!(result.class_index, 1);
        Ok(())
    }

    #[test]
    fn score_count_must_match_labels() {
        assert!(matches!(
            top_class(&[0.5, 0.3, 0.2], &BINARY_LABELS, 0.0),
            Err(PipelineError::Inference(_))
        ));
        assert!(matches!(top_class(&[], &[], 0.0), Err(PipelineError::Inference(_))));
    }
}
