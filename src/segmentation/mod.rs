pub mod components;
pub mod enhance;

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::imaging::GrayscaleImage;

/// Tunables for breast-region segmentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    /// Border removed from every side before thresholding
    pub margin: u32,
    /// Gamma at or above which the image is gamma corrected and Otsu thresholded
    pub gamma_cutoff: f64,
    /// Logarithm base used for gamma estimation
    pub gamma_base: f64,
    /// Threshold used for dim images (pixels strictly above it are foreground)
    pub fixed_threshold: u8,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            margin: 15,
            gamma_cutoff: 0.6,
            gamma_base: 512.0,
            fixed_threshold: 1,
        }
    }
}

/// Which binarisation path the gamma estimate selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdBranch {
    /// Gamma corrected, then Otsu
    GammaOtsu,
    /// Fixed low threshold, no gamma correction
    Fixed,
}

/// Cropped image reduced to its largest connected foreground region
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Same dimensions as the cropped input; background is 0
    pub image: GrayscaleImage,
    pub gamma: f64,
    pub branch: ThresholdBranch,
    pub threshold: u8,
    /// Pixel area of the kept region
    pub area: u32,
}

/// Intermediate images produced while segmenting
#[derive(Debug, Clone)]
pub struct SegmentationTrace {
    pub cropped: GrayscaleImage,
    pub enhanced: GrayscaleImage,
    pub binary: GrayImage,
    pub foreground: GrayImage,
    pub component_count: usize,
}

impl SegmentationTrace {
    /// Stage images in pipeline order, named for debug dumps
    pub fn stages(&self) -> Vec<(&'static str, GrayscaleImage)> {
        vec![
            ("cropped", self.cropped.clone()),
            ("enhanced", self.enhanced.clone()),
            ("binary", GrayscaleImage::from_gray(self.binary.clone())),
            ("foreground", GrayscaleImage::from_gray(self.foreground.clone())),
        ]
    }
}

/// Remove a fixed border from every side. Needs each side to exceed `2 * margin`.
pub fn crop_margin(image: &GrayscaleImage, margin: u32) -> Result<GrayscaleImage> {
    let (width, height) = image.dimensions();
    let Some(min) = margin.checked_mul(2) else {
        return Err(PipelineError::InvalidDimensions { width, height, min: u32::MAX });
    };
    if width <= min || height <= min {
        return Err(PipelineError::InvalidDimensions { width, height, min });
    }
    Ok(image.crop(margin, margin, width - min, height - min))
}

/// Zero every pixel of `image` outside `mask`
pub fn apply_mask(image: &GrayscaleImage, mask: &GrayImage) -> GrayscaleImage {
    let src = image.as_gray();
    GrayscaleImage::from_gray(GrayImage::from_fn(src.width(), src.height(), |x, y| {
        if mask.get_pixel(x, y)[0] > 0 {
            *src.get_pixel(x, y)
        } else {
            Luma([0u8])
        }
    }))
}

/// Segment with default parameters
pub fn segment(image: &GrayscaleImage) -> Result<SegmentationResult> {
    segment_with(image, &SegmentationParams::default())
}

pub fn segment_with(image: &GrayscaleImage, params: &SegmentationParams) -> Result<SegmentationResult> {
    segment_with_trace(image, params).map(|(result, _)| result)
}

/// Crop, enhance, binarise, keep the largest 8-connected blob and mask the crop with it.
///
/// Gamma is estimated on the uncropped input; everything after that works on
/// the cropped frame, so the output is `(w - 2m) x (h - 2m)`.
pub fn segment_with_trace(
    image: &GrayscaleImage,
    params: &SegmentationParams,
) -> Result<(SegmentationResult, SegmentationTrace)> {
    let cropped = crop_margin(image, params.margin)?;
    let gamma = enhance::estimate_gamma(image, params.gamma_base)?;

    let (branch, enhanced, level) = if gamma >= params.gamma_cutoff {
        let enhanced = enhance::gamma_correct(&cropped, gamma);
        let level = enhance::otsu(&enhanced);
        (ThresholdBranch::GammaOtsu, enhanced, level)
    } else {
        (ThresholdBranch::Fixed, cropped.clone(), params.fixed_threshold)
    };
    log::debug!("Segmentation gamma={:.4} branch={:?} threshold={}", gamma, branch, level);

    let binary = enhance::binarize(&enhanced, level);
    let labelling = components::label_components(&binary);
    let largest = labelling.largest().ok_or(PipelineError::NoForeground)?;
    log::debug!(
        "Found {} foreground components, keeping label {} with area {}",
        labelling.regions.len(),
        largest.label,
        largest.area()
    );

    let foreground = labelling.mask_of(largest.label);
    let segmented = apply_mask(&cropped, &foreground);

    let result = SegmentationResult {
        image: segmented,
        gamma,
        branch,
        threshold: level,
        area: largest.area(),
    };
    let trace = SegmentationTrace {
        cropped,
        enhanced,
        binary,
        foreground,
        component_count: labelling.regions.len(),
    };
    Ok((result, trace))
}
