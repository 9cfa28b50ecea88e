use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

/// One 8-connected foreground region of a binary mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn area(&self) -> u32 {
        self.pixel_count
    }
}

/// Labelled mask together with the statistics of every region in it
pub struct Labelling {
    pub labels: image::ImageBuffer<Luma<u32>, Vec<u32>>,
    /// Sorted by label
    pub regions: Vec<Region>,
}

impl Labelling {
    /// Region with the largest pixel area; ties go to the lowest label
    pub fn largest(&self) -> Option<&Region> {
        self.regions
            .iter()
            .fold(None, |best: Option<&Region>, region| match best {
                Some(b) if b.pixel_count >= region.pixel_count => Some(b),
                _ => Some(region),
            })
    }

    /// Binary mask (255 inside, 0 outside) containing exactly one region
    pub fn mask_of(&self, label: u32) -> GrayImage {
        let (width, height) = self.labels.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            if self.labels.get_pixel(x, y)[0] == label {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }
}

/// Label the 8-connected foreground (non-zero) components of a binary mask
pub fn label_components(mask: &GrayImage) -> Labelling {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    // Labels are consecutive from 1, background is 0
    let mut regions: Vec<Region> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue;
        }

        let idx = (label_val - 1) as usize;
        if idx >= regions.len() {
            regions.resize(
                idx + 1,
                Region {
                    label: 0,
                    min_x: u32::MAX,
                    min_y: u32::MAX,
                    max_x: 0,
                    max_y: 0,
                    pixel_count: 0,
                },
            );
        }

        let region = &mut regions[idx];
        region.label = label_val;
        region.min_x = region.min_x.min(x);
        region.min_y = region.min_y.min(y);
        region.max_x = region.max_x.max(x);
        region.max_y = region.max_y.max(y);
        region.pixel_count += 1;
    }

    regions.retain(|r| r.pixel_count > 0);

    Labelling { labels, regions }
}
