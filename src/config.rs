use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::classification::ModelConfig;
use crate::error::Result;
use crate::imaging::WindowSpec;
use crate::segmentation::SegmentationParams;

pub const DEFAULT_BINARY_MODEL: &str = "models/binary.rten";
pub const DEFAULT_MULTICLASS_MODEL: &str = "models/multiclass.rten";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub binary_model: ModelConfig,
    pub multiclass_model: ModelConfig,
    pub segmentation: SegmentationParams,
    pub window: WindowSpec,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            binary_model: ModelConfig::new(DEFAULT_BINARY_MODEL),
            multiclass_model: ModelConfig::new(DEFAULT_MULTICLASS_MODEL),
            segmentation: SegmentationParams::default(),
            window: WindowSpec::full_range(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let data = fs::read_to_string(path)?;
    parse_config(&data)
}

pub fn parse_config(data: &str) -> Result<AppConfig> {
    Ok(serde_json::from_str(data)?)
}
