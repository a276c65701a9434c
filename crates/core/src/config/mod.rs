use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{PacingPreset, RenderSettings, Result, MIN_CUT_SECONDS};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub director: DirectorConfig,
    pub render: RenderSettings,
}

impl AppConfig {
    /// Reads a JSON config file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Configuration specific to the edit scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Clips and cuts at or below this length are discarded.
    pub min_cut_seconds: f64,
    pub pacing: PacingPreset,
    /// Fixed seed for reproducible runs. A fresh one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            min_cut_seconds: MIN_CUT_SECONDS,
            pacing: PacingPreset::default(),
            seed: None,
        }
    }
}
