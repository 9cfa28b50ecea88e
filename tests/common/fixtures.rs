#![allow(dead_code)]

use image::{GrayImage, ImageBuffer, Luma, Rgb};
use mammoscope::classification::{Classifier, InputBatch, Model, Preprocessing};
use mammoscope::{GrayscaleImage, PipelineError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

/// Uniform image of one intensity
pub fn uniform(width: u32, height: u32, value: u8) -> GrayscaleImage {
    GrayscaleImage::filled(width, height, value)
}

/// Black image with a white axis-aligned square
pub fn square_on_black(size: u32, x0: u32, y0: u32, side: u32) -> GrayscaleImage {
    GrayscaleImage::from_gray(GrayImage::from_fn(size, size, |x, y| {
        if x >= x0 && x < x0 + side && y >= y0 && y < y0 + side {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    }))
}

/// Black background with filled rectangles `(x, y, w, h, value)`
pub fn rects_on_black(width: u32, height: u32, rects: &[(u32, u32, u32, u32, u8)]) -> GrayscaleImage {
    let mut img = GrayImage::new(width, height);
    for &(x0, y0, w, h, value) in rects {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
    GrayscaleImage::from_gray(img)
}

/// Horizontal gradient, each column holding `x * 255 / (width - 1)`
pub fn gradient(width: u32, height: u32) -> GrayscaleImage {
    GrayscaleImage::from_gray(GrayImage::from_fn(width, height, |x, _| {
        Luma([(x * 255 / (width - 1).max(1)) as u8])
    }))
}

/// Writes an RGB test image to a temp PNG. Dropping the file removes it.
pub fn write_rgb_png(width: u32, height: u32, rgb: [u8; 3]) -> NamedTempFile {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb(rgb));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Writes a grayscale buffer to a temp PNG
pub fn write_gray_png(img: &GrayscaleImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    mammoscope::imaging::save(img, file.path()).expect("Failed to save test image");
    file
}

/// Classifier returning fixed scores and counting calls
pub struct FixedClassifier {
    pub scores: Vec<f32>,
    pub calls: Arc<AtomicUsize>,
    pub last_shape: Arc<std::sync::Mutex<Option<[usize; 4]>>>,
}

impl Classifier for FixedClassifier {
    fn predict(&self, batch: &InputBatch) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut shape) = self.last_shape.lock() {
            *shape = Some(batch.shape);
        }
        Ok(self.scores.clone())
    }
}

/// Classifier whose every call fails
pub struct FailingClassifier {
    pub calls: Arc<AtomicUsize>,
}

impl Classifier for FailingClassifier {
    fn predict(&self, _batch: &InputBatch) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PipelineError::Inference("backend exploded".to_string()))
    }
}

/// Model with fixed scores, plus its call counter
pub fn fixed_model(name: &str, scores: &[f32]) -> (Model, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let classifier = FixedClassifier {
        scores: scores.to_vec(),
        calls: calls.clone(),
        last_shape: Arc::new(std::sync::Mutex::new(None)),
    };
    (
        Model::from_classifier(name, Box::new(classifier), Preprocessing::default()),
        calls,
    )
}

pub fn failing_model(name: &str) -> (Model, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let classifier = FailingClassifier { calls: calls.clone() };
    (
        Model::from_classifier(name, Box::new(classifier), Preprocessing::default()),
        calls,
    )
}

pub fn call_count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}
