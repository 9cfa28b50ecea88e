use image::{DynamicImage, GrayImage, ImageReader, Luma};
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Single-channel 8-bit image in row-major order.
///
/// Every pipeline stage takes one of these by reference and returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    pixels: GrayImage,
}

impl GrayscaleImage {
    /// Build from a raw row-major buffer. Fails if `data.len() != width * height`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(PipelineError::Conversion(format!(
                "buffer length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        GrayImage::from_raw(width, height, data)
            .map(Self::from_gray)
            .ok_or_else(|| PipelineError::Conversion("invalid raw buffer".to_string()))
    }

    /// Image filled with a single intensity
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::from_gray(GrayImage::from_pixel(width, height, Luma([value])))
    }

    pub fn from_gray(pixels: GrayImage) -> Self {
        Self { pixels }
    }

    pub fn to_gray(&self) -> GrayImage {
        self.pixels.clone()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Intensity at `(x, y)`, `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        self.pixels.get_pixel_checked(x, y).map(|p| p[0])
    }

    /// Mean intensity over every pixel (0.0 for an empty image)
    pub fn mean(&self) -> f64 {
        let raw = self.as_raw();
        if raw.is_empty() {
            return 0.0;
        }
        let sum: u64 = raw.iter().map(|&v| v as u64).sum();
        sum as f64 / raw.len() as f64
    }

    /// Copy out a rectangular region
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::from_gray(image::imageops::crop_imm(&self.pixels, x, y, width, height).to_image())
    }

    /// Apply a per-intensity lookup table
    pub fn map_lut(&self, lut: &[u8; 256]) -> Self {
        let data = self.as_raw().iter().map(|&v| lut[v as usize]).collect();
        let (width, height) = self.dimensions();
        // Same length as the source buffer, so from_raw cannot fail
        match GrayImage::from_raw(width, height, data) {
            Some(pixels) => Self::from_gray(pixels),
            None => self.clone(),
        }
    }
}

/// Convert a decoded image into a grayscale buffer.
///
/// Colour and alpha layouts are reduced to luma; 16-bit and float sources are
/// rescaled to 8 bits.
pub fn to_buffer(img: &DynamicImage) -> Result<GrayscaleImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(PipelineError::Conversion(format!(
            "image has no pixel data ({}x{})",
            img.width(),
            img.height()
        )));
    }

    let gray = match img {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_)
        | DynamicImage::ImageRgb32F(_)
        | DynamicImage::ImageRgba32F(_) => img.to_luma8(),
        other => {
            return Err(PipelineError::Conversion(format!(
                "unsupported channel layout: {:?}",
                other.color()
            )));
        }
    };

    Ok(GrayscaleImage::from_gray(gray))
}

/// Convert a grayscale buffer back into a displayable image
pub fn from_buffer(img: &GrayscaleImage) -> DynamicImage {
    DynamicImage::ImageLuma8(img.to_gray())
}

/// Decode an image file (PNG/TIFF/JPEG) and convert it to grayscale
pub fn load(path: impl AsRef<Path>) -> Result<GrayscaleImage> {
    let decoded = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()?;
    to_buffer(&decoded)
}

/// Encode a grayscale buffer to disk, format chosen by extension
pub fn save(img: &GrayscaleImage, path: impl AsRef<Path>) -> Result<()> {
    from_buffer(img).save(path.as_ref())?;
    Ok(())
}
