use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};
use serde::{Deserialize, Serialize};

use crate::{BeatcutError, Result};

/// Beat counts a shot may span.
pub const SHOT_BEATS: [usize; 4] = [1, 2, 4, 8];

/// One candidate shot length and its relative draw weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotWeight {
    pub beats: usize,
    pub weight: u32,
}

impl ShotWeight {
    pub const fn new(beats: usize, weight: u32) -> Self {
        Self { beats, weight }
    }
}

/// Named pacing presets selectable from config or the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PacingPreset {
    /// Uniform over 1, 2, 4 and 8 beats.
    #[default]
    Balanced,
    /// Favours short shots.
    Fine,
    /// Favours long shots.
    Coarse,
    Custom { shots: Vec<ShotWeight> },
}

impl PacingPreset {
    pub fn weights(&self) -> Vec<ShotWeight> {
        let ramp = |weights: [u32; 4]| -> Vec<ShotWeight> {
            SHOT_BEATS
                .iter()
                .zip(weights)
                .map(|(beats, weight)| ShotWeight::new(*beats, weight))
                .collect()
        };

        match self {
            PacingPreset::Balanced => ramp([1, 1, 1, 1]),
            PacingPreset::Fine => ramp([4, 3, 2, 1]),
            PacingPreset::Coarse => ramp([1, 2, 3, 4]),
            PacingPreset::Custom { shots } => shots.clone(),
        }
    }
}

impl std::str::FromStr for PacingPreset {
    type Err = BeatcutError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(PacingPreset::Balanced),
            "fine" => Ok(PacingPreset::Fine),
            "coarse" => Ok(PacingPreset::Coarse),
            other => Err(BeatcutError::invalid(format!(
                "unknown pacing preset `{other}` (expected balanced, fine or coarse)"
            ))),
        }
    }
}

/// Policy deciding how many beats the next shot lasts.
#[derive(Debug, Clone)]
pub struct ShotPacing {
    beats: Vec<usize>,
    index: WeightedIndex<u32>,
}

impl ShotPacing {
    pub fn new(shots: Vec<ShotWeight>) -> Result<Self> {
        if shots.is_empty() {
            return Err(BeatcutError::invalid("pacing needs at least one shot length"));
        }
        if shots.iter().any(|shot| shot.beats == 0) {
            return Err(BeatcutError::invalid("shot lengths must span at least one beat"));
        }

        let index = WeightedIndex::new(shots.iter().map(|shot| shot.weight))
            .map_err(|err| BeatcutError::invalid(format!("bad pacing weights: {err}")))?;

        Ok(Self {
            beats: shots.iter().map(|shot| shot.beats).collect(),
            index,
        })
    }

    pub fn from_preset(preset: &PacingPreset) -> Result<Self> {
        Self::new(preset.weights())
    }

    /// Every shot spans exactly `beats` beats.
    pub fn fixed(beats: usize) -> Result<Self> {
        Self::new(vec![ShotWeight::new(beats, 1)])
    }

    pub fn candidates(&self) -> &[usize] {
        &self.beats
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.beats[self.index.sample(rng)]
    }
}
