use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{BeatTimeline, CategorizedClips, EditList, Result};

/// Everything the upstream collaborators produced for one edit: classified
/// clips with probed durations, the beat grid and the track length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub music_duration_seconds: f64,
    #[serde(default)]
    pub beats: BeatTimeline,
    pub progression: Vec<String>,
    #[serde(default)]
    pub clips: CategorizedClips,
}

impl ProjectManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Progression entries the classifier produced no bucket for. They are
    /// valid input and simply get no stage.
    pub fn unknown_categories(&self) -> Vec<&str> {
        self.progression
            .iter()
            .filter(|category| !self.clips.contains_key(category.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Splits a comma separated progression such as `"intro, main,outro"`.
pub fn parse_progression(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Planned edit as written by the `plan` command and read back by the render
/// script exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditDocument {
    pub music_duration_seconds: f64,
    /// Seed that reproduces `cuts` from the same manifest and config.
    pub seed: u64,
    pub cuts: EditList,
}

impl EditDocument {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
