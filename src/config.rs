use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::error;
use serde::{Deserialize, Serialize};

use crate::err::Result;
use crate::provider::{ImageDataProvider, DEFAULT_DATA_SUFFIX, DEFAULT_MASK_SUFFIX};
use crate::util::Float;

/// Provider settings as stored in a yaml or json file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub search_path: String,
    pub a_min: Option<Float>,
    pub a_max: Option<Float>,
    pub data_suffix: String,
    pub mask_suffix: String,
    pub shuffle_data: bool,
    /// Fixed seed for reproducible shuffles
    pub seed: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            search_path: String::new(),
            a_min: None,
            a_max: None,
            data_suffix: DEFAULT_DATA_SUFFIX.to_string(),
            mask_suffix: DEFAULT_MASK_SUFFIX.to_string(),
            shuffle_data: true,
            seed: None,
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

impl ProviderConfig {
    /// Reads a `.json` file as json, anything else as yaml
    pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<Self> {
        let filepath = filepath.as_ref();
        let cfg_file = File::open(filepath)?;

        let cfg: ProviderConfig = if is_json(filepath) {
            serde_json::from_reader(cfg_file)?
        } else {
            serde_yaml::from_reader(cfg_file)?
        };

        Ok(cfg)
    }

    pub fn to_file<P: AsRef<Path>>(&self, filepath: P) -> Result<()> {
        let filepath = filepath.as_ref();

        let serialized = if is_json(filepath) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self).map_err(|e| {
                error!("Error (serde-yaml) serializing provider config !!!");
                e
            })?
        };

        let mut output = File::create(filepath)?;
        output.write_all(serialized.as_bytes())?;

        Ok(())
    }
}

impl ImageDataProvider {
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        let mut builder = ImageDataProvider::builder(&cfg.search_path)
            .clip(cfg.a_min, cfg.a_max)
            .data_suffix(&cfg.data_suffix)
            .mask_suffix(&cfg.mask_suffix)
            .shuffle(cfg.shuffle_data);

        if let Some(seed) = cfg.seed {
            builder = builder.seed(seed);
        }

        builder.build()
    }
}
