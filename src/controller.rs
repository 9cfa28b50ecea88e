use std::path::Path;

use crate::classification::{self, ClassificationResult, ModelKind, ModelRegistry};
use crate::error::{PipelineError, Result};
use crate::imaging::{self, GrayscaleImage, WindowSpec};
use crate::segmentation::{self, SegmentationParams, SegmentationResult};

/// What the displayed image currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Original,
    Windowed,
    Segmented,
}

/// Sequencing layer between a host UI and the pure pipeline stages.
///
/// Operations that need an image are no-ops while none is loaded. A failing
/// operation returns its error and leaves the displayed image untouched.
pub struct PipelineController {
    models: ModelRegistry,
    segmentation: SegmentationParams,
    window: WindowSpec,
    original: Option<GrayscaleImage>,
    displayed: Option<GrayscaleImage>,
    state: DisplayState,
    last_segmentation: Option<SegmentationResult>,
    last_classification: Option<ClassificationResult>,
}

impl PipelineController {
    pub fn new(models: ModelRegistry) -> Self {
        Self {
            models,
            segmentation: SegmentationParams::default(),
            window: WindowSpec::full_range(),
            original: None,
            displayed: None,
            state: DisplayState::Original,
            last_segmentation: None,
            last_classification: None,
        }
    }

    pub fn with_segmentation(mut self, params: SegmentationParams) -> Self {
        self.segmentation = params;
        self
    }

    pub fn with_window(mut self, window: WindowSpec) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> WindowSpec {
        self.window
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn original(&self) -> Option<&GrayscaleImage> {
        self.original.as_ref()
    }

    pub fn displayed(&self) -> Option<&GrayscaleImage> {
        self.displayed.as_ref()
    }

    pub fn last_segmentation(&self) -> Option<&SegmentationResult> {
        self.last_segmentation.as_ref()
    }

    pub fn last_classification(&self) -> Option<&ClassificationResult> {
        self.last_classification.as_ref()
    }

    /// Decode `path` and make it both the original and the displayed image
    pub fn open_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = imaging::load(path.as_ref())?;
        log::info!(
            "Opened {} ({}x{})",
            path.as_ref().display(),
            image.width(),
            image.height()
        );
        self.set_image(image);
        Ok(())
    }

    /// Install an already decoded image
    pub fn set_image(&mut self, image: GrayscaleImage) {
        self.displayed = Some(image.clone());
        self.original = Some(image);
        self.state = DisplayState::Original;
        self.last_segmentation = None;
        self.last_classification = None;
    }

    pub fn reset_to_original(&mut self) {
        if let Some(original) = &self.original {
            self.displayed = Some(original.clone());
            self.state = DisplayState::Original;
            self.last_segmentation = None;
        }
    }

    /// Update the lower bound; recomputes from the original while windowing is shown
    pub fn set_window_min(&mut self, v: i32) -> WindowSpec {
        self.update_window(self.window.with_min(v))
    }

    /// Update the upper bound; recomputes from the original while windowing is shown
    pub fn set_window_max(&mut self, v: i32) -> WindowSpec {
        self.update_window(self.window.with_max(v))
    }

    fn update_window(&mut self, window: WindowSpec) -> WindowSpec {
        self.window = window;
        if self.state == DisplayState::Windowed {
            self.apply_window(window);
        }
        self.window
    }

    /// Window the original with the current slider values
    pub fn apply_windowing(&mut self) {
        self.apply_window(self.window);
    }

    /// Window the original with an explicit spec, which becomes the current one
    pub fn apply_window(&mut self, spec: WindowSpec) {
        self.window = spec;
        if let Some(original) = &self.original {
            self.displayed = Some(imaging::apply_window(original, spec));
            self.state = DisplayState::Windowed;
            self.last_segmentation = None;
        }
    }

    /// Segment whatever is displayed and display the result
    pub fn apply_segmentation(&mut self) -> Result<Option<&SegmentationResult>> {
        let Some(displayed) = &self.displayed else {
            return Ok(None);
        };
        let result = segmentation::segment_with(displayed, &self.segmentation)?;
        log::info!(
            "Segmented region: {}x{}, area {} px",
            result.image.width(),
            result.image.height(),
            result.area
        );
        self.displayed = Some(result.image.clone());
        self.state = DisplayState::Segmented;
        self.last_segmentation = Some(result);
        Ok(self.last_segmentation.as_ref())
    }

    pub fn apply_classification_binary(&mut self) -> Result<Option<&ClassificationResult>> {
        self.apply_classification(ModelKind::Binary)
    }

    pub fn apply_classification_multiclass(&mut self) -> Result<Option<&ClassificationResult>> {
        self.apply_classification(ModelKind::Multiclass)
    }

    /// Classify the segmented region; the displayed image is segmented first if needed
    pub fn apply_classification(&mut self, kind: ModelKind) -> Result<Option<&ClassificationResult>> {
        let Some(displayed) = &self.displayed else {
            return Ok(None);
        };

        let model = self.models.get(kind);
        if !model.is_loaded() {
            return Err(PipelineError::ModelUnavailable(model.name().to_string()));
        }
        let result = if self.state == DisplayState::Segmented {
            classification::classify(displayed, model, kind.labels())?
        } else {
            let region = segmentation::segment_with(displayed, &self.segmentation)?;
            classification::classify(&region.image, model, kind.labels())?
        };
        log::info!("{} classification: {}", kind.name(), result);

        self.last_classification = Some(result);
        Ok(self.last_classification.as_ref())
    }
}
