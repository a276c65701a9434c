use serde::{Deserialize, Serialize};

use crate::ClipRef;

/// Slack allowed when comparing a cut's end against its clip length.
pub const OFFSET_TOLERANCE: f64 = 1e-6;

/// One segment of the final video: which clip, where in it, for how long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutInstruction {
    pub clip: ClipRef,
    pub start_offset_seconds: f64,
    pub duration_seconds: f64,
}

impl CutInstruction {
    pub fn end_offset_seconds(&self) -> f64 {
        self.start_offset_seconds + self.duration_seconds
    }

    /// True when the cut asks for more footage than the clip holds. Happens
    /// only when a clip is shorter than the beat-derived cut.
    pub fn overruns_clip(&self) -> bool {
        self.end_offset_seconds() > self.clip.duration_seconds + OFFSET_TOLERANCE
    }
}

/// Ordered cut instructions handed to the renderer. Empty means the
/// schedule could not be built.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditList {
    cuts: Vec<CutInstruction>,
}

impl EditList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cuts(&self) -> &[CutInstruction] {
        &self.cuts
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CutInstruction> {
        self.cuts.iter()
    }

    pub fn total_duration(&self) -> f64 {
        self.cuts.iter().map(|cut| cut.duration_seconds).sum()
    }

    pub(crate) fn extend(&mut self, cuts: impl IntoIterator<Item = CutInstruction>) {
        self.cuts.extend(cuts);
    }
}

impl From<Vec<CutInstruction>> for EditList {
    fn from(cuts: Vec<CutInstruction>) -> Self {
        Self { cuts }
    }
}

impl<'a> IntoIterator for &'a EditList {
    type Item = &'a CutInstruction;
    type IntoIter = std::slice::Iter<'a, CutInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
