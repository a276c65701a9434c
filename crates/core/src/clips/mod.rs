use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Shortest clip, and shortest cut, the scheduler will work with.
pub const MIN_CUT_SECONDS: f64 = 0.1;

/// Category name mapped to the clips the classifier assigned to it.
pub type CategorizedClips = BTreeMap<String, Vec<ClipRef>>;

/// Reference to a source clip with its measured playable length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRef {
    pub id: String,
    pub duration_seconds: f64,
}

impl ClipRef {
    pub fn new(id: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            id: id.into(),
            duration_seconds,
        }
    }

    /// Unmeasurable (NaN, infinite) and near-zero durations are unusable.
    pub fn is_usable(&self, min_duration: f64) -> bool {
        self.duration_seconds.is_finite() && self.duration_seconds > min_duration
    }
}

/// Owned copy of the clips long enough to be cut.
pub fn usable_clips(clips: &[ClipRef], min_duration: f64) -> Vec<ClipRef> {
    clips
        .iter()
        .filter(|clip| clip.is_usable(min_duration))
        .cloned()
        .collect()
}

/// Per-category rotation of source clips.
///
/// Clips are handed out from a shuffled working order; no clip comes back
/// until every other clip in the pool has been used, at which point a new
/// permutation is drawn. A reshuffle never starts with the clip that was
/// handed out last, so a pool of two or more clips never repeats back to
/// back.
#[derive(Debug, Clone)]
pub struct ClipPool {
    clips: Vec<ClipRef>,
    order: Vec<usize>,
    cursor: usize,
    last: Option<usize>,
}

impl ClipPool {
    pub fn new(clips: &[ClipRef]) -> Self {
        Self::with_min_duration(clips, MIN_CUT_SECONDS)
    }

    pub fn with_min_duration(clips: &[ClipRef], min_duration: f64) -> Self {
        let clips = usable_clips(clips, min_duration);
        Self {
            order: Vec::with_capacity(clips.len()),
            clips,
            cursor: 0,
            last: None,
        }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clips(&self) -> &[ClipRef] {
        &self.clips
    }

    /// Clips left in the current permutation before the next reshuffle.
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    /// Returns the next clip, reshuffling once the working order is spent.
    /// `None` only when the pool holds no usable clips at all.
    pub fn next_clip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<ClipRef> {
        if self.clips.is_empty() {
            return None;
        }

        if self.cursor >= self.order.len() {
            self.reshuffle(rng);
        }

        let index = self.order[self.cursor];
        self.cursor += 1;
        self.last = Some(index);
        Some(self.clips[index].clone())
    }

    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.clear();
        self.order.extend(0..self.clips.len());
        self.order.shuffle(rng);
        self.cursor = 0;

        if let Some(last) = self.last {
            if self.order.len() > 1 && self.order[0] == last {
                let swap = rng.gen_range(1..self.order.len());
                self.order.swap(0, swap);
            }
        }
    }
}
