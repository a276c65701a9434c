//! Core library for the Beatcut music-video editor.
//!
//! Given clips already bucketed by category, a beat grid and a track length,
//! the [`Director`] lays the clips out on the beat as a list of cut
//! instructions. Everything upstream (scene detection, classification, beat
//! tracking) and downstream (transcoding) is handled by other tools; this
//! crate only schedules and describes the edit.

pub mod clips;
pub mod config;
pub mod director;
pub mod edit;
pub mod error;
pub mod pacing;
pub mod project;
pub mod render;
pub mod timeline;

pub use clips::{usable_clips, CategorizedClips, ClipPool, ClipRef, MIN_CUT_SECONDS};
pub use config::{AppConfig, DirectorConfig};
pub use director::Director;
pub use edit::{CutInstruction, EditList};
pub use error::{BeatcutError, Result};
pub use pacing::{PacingPreset, ShotPacing, ShotWeight};
pub use project::{parse_progression, EditDocument, ProjectManifest};
pub use render::{RenderPlan, RenderSettings, SegmentJob};
pub use timeline::{allocate_stages, BeatTimeline, Stage};
