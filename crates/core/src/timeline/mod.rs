use serde::{Deserialize, Serialize};

/// Ascending beat timestamps, in seconds, for the target track.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct BeatTimeline {
    beats: Vec<f64>,
}

impl BeatTimeline {
    /// Builds a timeline, dropping negative or non-finite timestamps and
    /// sorting what remains.
    pub fn new(mut beats: Vec<f64>) -> Self {
        beats.retain(|beat| beat.is_finite() && *beat >= 0.0);
        beats.sort_by(f64::total_cmp);
        Self { beats }
    }

    /// Evenly spaced grid on `[0, until)`.
    #[cfg(test)]
    pub(crate) fn regular(interval: f64, until: f64) -> Self {
        if interval.is_nan() || interval <= 0.0 || !until.is_finite() {
            return Self::default();
        }

        let count = (until / interval).ceil() as usize;
        let beats = (0..count)
            .map(|i| i as f64 * interval)
            .filter(|beat| *beat < until)
            .collect();
        Self { beats }
    }

    pub fn beats(&self) -> &[f64] {
        &self.beats
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Beats with `start <= b < end`.
    pub fn window(&self, start: f64, end: f64) -> &[f64] {
        let from = self.beats.partition_point(|beat| *beat < start);
        let to = self.beats.partition_point(|beat| *beat < end).max(from);
        &self.beats[from..to]
    }

    /// Beats a stage should cut on. Falls back to a single synthetic beat at
    /// `start` when the window is silent, so every stage has an anchor.
    pub fn stage_beats(&self, start: f64, end: f64) -> Vec<f64> {
        let window = self.window(start, end);
        if window.is_empty() {
            vec![start]
        } else {
            window.to_vec()
        }
    }
}

impl From<Vec<f64>> for BeatTimeline {
    fn from(value: Vec<f64>) -> Self {
        Self::new(value)
    }
}

impl From<BeatTimeline> for Vec<f64> {
    fn from(value: BeatTimeline) -> Self {
        value.beats
    }
}

/// Contiguous time window assigned to one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub category: String,
    pub start: f64,
    pub end: f64,
}

impl Stage {
    pub fn budget(&self) -> f64 {
        self.end - self.start
    }
}

/// Splits `[0, music_duration)` evenly across `categories`, in order.
///
/// Categories without usable clips must already be removed; their share is
/// absorbed by the rest through the larger per-stage time. The last stage
/// ends exactly at `music_duration`.
pub fn allocate_stages(categories: &[String], music_duration: f64) -> Vec<Stage> {
    if categories.is_empty() || music_duration.is_nan() || music_duration <= 0.0 {
        return Vec::new();
    }

    let time_per_stage = music_duration / categories.len() as f64;
    let last = categories.len() - 1;

    categories
        .iter()
        .enumerate()
        .map(|(i, category)| Stage {
            category: category.clone(),
            start: i as f64 * time_per_stage,
            end: if i == last {
                music_duration
            } else {
                (i + 1) as f64 * time_per_stage
            },
        })
        .collect()
}
