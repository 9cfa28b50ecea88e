use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

use crate::error::{PipelineError, Result};
use crate::imaging::GrayscaleImage;

/// Image-dependent gamma: `ln(mean) / ln(base)`.
///
/// Fails with `DegenerateImage` when the mean is zero.
pub fn estimate_gamma(image: &GrayscaleImage, base: f64) -> Result<f64> {
    let mean = image.mean();
    if mean <= 0.0 {
        return Err(PipelineError::DegenerateImage);
    }
    Ok(mean.ln() / base.ln())
}

/// `pixel' = (pixel / 255)^gamma * 255`
pub fn gamma_correct(image: &GrayscaleImage, gamma: f64) -> GrayscaleImage {
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        let corrected = (v as f64 / 255.0).powf(gamma) * 255.0;
        *out = corrected.round().clamp(0.0, 255.0) as u8;
    }
    image.map_lut(&lut)
}

/// Pixels strictly above `level` become 255, the rest 0
pub fn binarize(image: &GrayscaleImage, level: u8) -> GrayImage {
    threshold(image.as_gray(), level, ThresholdType::Binary)
}

/// Otsu's level for the image histogram
pub fn otsu(image: &GrayscaleImage) -> u8 {
    otsu_level(image.as_gray())
}
