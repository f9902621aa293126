use anyhow::Context;
use dedispcore::prelude::DedispersionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::GeneratorConfig;

/// How the emulated host delivers the spectrogram to the adapter.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub chunk_min: usize,
    pub chunk_max: usize,
    pub total_samples: usize,
    pub seed: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_min: 64,
            chunk_max: 512,
            total_samples: 8192,
            seed: 7,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub dedispersion: DedispersionConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Full-band configuration from the command-line knobs, defaults elsewhere.
    pub fn from_args(
        vec_length: usize,
        num_dms: usize,
        dm_step: f64,
        samples_per_call: usize,
    ) -> Self {
        let dedispersion = DedispersionConfig {
            vec_length,
            num_dms,
            samples_per_call,
            sub_band_start: 0,
            sub_band_end: vec_length,
            dm_step,
            ..Default::default()
        };
        Self {
            dedispersion,
            stream: StreamConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}
