use serde::{Deserialize, Serialize};

use super::buffer::GrayscaleImage;

/// Upper end of the display range exposed by the window sliders
pub const DISPLAY_MAX: i32 = 255;

/// Contrast window in native intensity units.
///
/// Both bounds are clamped to `0..=255` on construction. A window with
/// `max <= min` is degenerate and maps every pixel to full white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawWindow")]
pub struct WindowSpec {
    min: i32,
    max: i32,
}

#[derive(Deserialize)]
struct RawWindow {
    min: i32,
    max: i32,
}

impl From<RawWindow> for WindowSpec {
    fn from(raw: RawWindow) -> Self {
        WindowSpec::new(raw.min, raw.max)
    }
}

impl WindowSpec {
    pub fn new(min: i32, max: i32) -> Self {
        Self {
            min: clamp_display(min),
            max: clamp_display(max),
        }
    }

    /// The full display range, an identity transform
    pub fn full_range() -> Self {
        Self::new(0, DISPLAY_MAX)
    }

    /// Window/level form: `center ± width / 2`
    pub fn from_center_width(center: i32, width: i32) -> Self {
        let (center, width) = (center as i64, width.max(0) as i64);
        let half = width / 2;
        Self::new(clamp_wide(center - half), clamp_wide(center + (width - half)))
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn with_min(self, min: i32) -> Self {
        Self::new(min, self.max)
    }

    pub fn with_max(self, max: i32) -> Self {
        Self::new(self.min, max)
    }

    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Lookup table realising the window for every 8-bit input value
    pub fn lut(&self) -> [u8; 256] {
        let mut lut = [255u8; 256];
        if self.is_degenerate() {
            return lut;
        }
        let span = (self.max - self.min) as u32;
        for (v, out) in lut.iter_mut().enumerate() {
            let clipped = (v as i32).clamp(self.min, self.max);
            *out = ((clipped - self.min) as u32 * 255 / span) as u8;
        }
        lut
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self::full_range()
    }
}

fn clamp_display(v: i32) -> i32 {
    v.clamp(0, DISPLAY_MAX)
}

fn clamp_wide(v: i64) -> i32 {
    v.clamp(0, DISPLAY_MAX as i64) as i32
}

/// Clip every pixel to `[min, max]` and stretch that range onto `[0, 255]`.
pub fn apply_window(image: &GrayscaleImage, spec: WindowSpec) -> GrayscaleImage {
    log::debug!(
        "Windowing {}x{} image with min={} max={}",
        image.width(),
        image.height(),
        spec.min(),
        spec.max()
    );
    image.map_lut(&spec.lut())
}
