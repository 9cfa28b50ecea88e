use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::imaging::{self, GrayscaleImage};

/// Writes stage images to `<dir>/NN_<stage>/01.png`
#[derive(Clone, Debug)]
pub struct DebugSink {
    output_dir: PathBuf,
    next_index: usize,
}

impl DebugSink {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(PipelineError::Config(format!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self {
            output_dir,
            next_index: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save one stage image; stages are numbered in call order starting at 00
    pub fn save(&mut self, stage: &str, image: &GrayscaleImage) -> Result<PathBuf> {
        let step_dir_name = format!("{:02}_{}", self.next_index, stage.to_lowercase().replace(' ', "_"));
        let step_dir = self.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        let output_path = step_dir.join("01.png");
        imaging::save(image, &output_path)?;
        log::debug!("Debug: saved {}/01.png", step_dir_name);

        self.next_index += 1;
        Ok(output_path)
    }
}
