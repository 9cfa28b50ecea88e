use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::imaging::GrayscaleImage;

/// Side length of the square model input
pub const DEFAULT_INPUT_SIZE: u32 = 224;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];
// BGR order
const CAFFE_MEAN: [f32; 3] = [103.939, 116.779, 123.68];

/// Maps one RGB sample in `0..=255` to model input units
pub type NormalizeFn = fn([f32; 3]) -> [f32; 3];

/// Input normalisation the model was trained with
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Raw 0..=255 values
    Identity,
    /// `x / 255`
    UnitRange,
    /// `x / 127.5 - 1`
    SymmetricUnit,
    /// `(x / 255 - mean) / std` with the ImageNet statistics
    ImageNet,
    /// BGR channel order with the ImageNet per-channel mean subtracted
    Caffe,
    #[serde(skip)]
    Custom(NormalizeFn),
}

impl Normalization {
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            Normalization::Identity => rgb,
            Normalization::UnitRange => rgb.map(|v| v / 255.0),
            Normalization::SymmetricUnit => rgb.map(|v| v / 127.5 - 1.0),
            Normalization::ImageNet => {
                std::array::from_fn(|c| (rgb[c] / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c])
            }
            Normalization::Caffe => std::array::from_fn(|c| rgb[2 - c] - CAFFE_MEAN[c]),
            Normalization::Custom(f) => f(rgb),
        }
    }
}

/// Memory order of the input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, 3, H, W]`
    Nchw,
    /// `[1, H, W, 3]`
    Nhwc,
}

/// What a model expects its single input sample to look like
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocessing {
    pub input_size: u32,
    pub layout: TensorLayout,
    pub normalization: Normalization,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            layout: TensorLayout::Nchw,
            normalization: Normalization::ImageNet,
        }
    }
}

/// One preprocessed sample, batch dimension included
#[derive(Debug, Clone, PartialEq)]
pub struct InputBatch {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

impl InputBatch {
    /// All-zero batch of the given shape
    pub fn zeros(shape: [usize; 4]) -> Self {
        Self {
            shape,
            data: vec![0.0; shape.iter().product()],
        }
    }
}

/// Resize to the model's square input, replicate gray to RGB and normalise
pub fn preprocess(image: &GrayscaleImage, prep: &Preprocessing) -> InputBatch {
    let size = prep.input_size;
    let resized = imageops::resize(image.as_gray(), size, size, FilterType::Triangle);
    let side = size as usize;
    let plane = side * side;

    let shape = match prep.layout {
        TensorLayout::Nchw => [1, 3, side, side],
        TensorLayout::Nhwc => [1, side, side, 3],
    };
    let mut batch = InputBatch::zeros(shape);

    for (x, y, pixel) in resized.enumerate_pixels() {
        let v = pixel[0] as f32;
        let rgb = prep.normalization.apply([v, v, v]);
        let offset = y as usize * side + x as usize;
        for (c, value) in rgb.into_iter().enumerate() {
            let idx = match prep.layout {
                TensorLayout::Nchw => c * plane + offset,
                TensorLayout::Nhwc => offset * 3 + c,
            };
            batch.data[idx] = value;
        }
    }

    batch
}
