//! Beat-synchronised edit scheduling.
//!
//! The [`Director`] splits the track into one stage per usable category,
//! walks each stage's beats, and fills it with cuts drawn from that
//! category's [`ClipPool`]. It never fails: inputs it cannot work with
//! produce an empty [`EditList`] plus a diagnostic.

use std::collections::HashMap;

use rand::Rng;

use crate::{
    allocate_stages, BeatTimeline, BeatcutError, CategorizedClips, ClipPool, CutInstruction,
    DirectorConfig, EditList, Result, ShotPacing, Stage, MIN_CUT_SECONDS,
};

/// Allocates categorised clips onto a beat-timed schedule.
#[derive(Debug, Clone)]
pub struct Director {
    min_cut_seconds: f64,
    pacing: ShotPacing,
}

impl Director {
    pub fn new(config: &DirectorConfig) -> Result<Self> {
        if !config.min_cut_seconds.is_finite() || config.min_cut_seconds < 0.0 {
            return Err(BeatcutError::invalid(format!(
                "minimum cut length must be a non-negative number of seconds, got {}",
                config.min_cut_seconds
            )));
        }

        Ok(Self {
            min_cut_seconds: config.min_cut_seconds,
            pacing: ShotPacing::from_preset(&config.pacing)?,
        })
    }

    pub fn with_pacing(pacing: ShotPacing) -> Self {
        Self {
            min_cut_seconds: MIN_CUT_SECONDS,
            pacing,
        }
    }

    pub fn pacing(&self) -> &ShotPacing {
        &self.pacing
    }

    pub fn min_cut_seconds(&self) -> f64 {
        self.min_cut_seconds
    }

    /// Builds the full edit list for a track.
    ///
    /// Categories in `progression` without usable clips are dropped and the
    /// remaining ones share the whole duration. A category listed twice gets
    /// two stages that draw from the same pool.
    pub fn create_edit_list<R: Rng + ?Sized>(
        &self,
        clips: &CategorizedClips,
        beats: &BeatTimeline,
        music_duration: f64,
        progression: &[String],
        rng: &mut R,
    ) -> EditList {
        let mut edits = EditList::new();

        if beats.is_empty() {
            tracing::warn!("beat timeline is empty; nothing to cut on");
            return edits;
        }
        if !music_duration.is_finite() || music_duration <= 0.0 {
            tracing::warn!(music_duration, "music duration must be positive");
            return edits;
        }

        let mut pools: HashMap<&str, ClipPool> = HashMap::new();
        let mut valid_categories = Vec::with_capacity(progression.len());
        for category in progression {
            let pool = pools.entry(category.as_str()).or_insert_with(|| {
                let source = clips.get(category).map(Vec::as_slice).unwrap_or(&[]);
                ClipPool::with_min_duration(source, self.min_cut_seconds)
            });

            if pool.is_empty() {
                tracing::info!(%category, "skipping category without usable clips");
            } else {
                valid_categories.push(category.clone());
            }
        }

        if valid_categories.is_empty() {
            tracing::warn!("no usable clips in any category of the progression");
            return edits;
        }

        let stages = allocate_stages(&valid_categories, music_duration);
        for stage in &stages {
            let Some(pool) = pools.get_mut(stage.category.as_str()) else {
                continue;
            };

            let stage_beats = beats.stage_beats(stage.start, stage.end);
            let cuts = self.plan_stage(stage, &stage_beats, pool, rng);
            tracing::debug!(
                category = %stage.category,
                start = stage.start,
                end = stage.end,
                cuts = cuts.len(),
                "stage planned"
            );
            edits.extend(cuts);
        }

        tracing::info!(
            stages = stages.len(),
            cuts = edits.len(),
            total = edits.total_duration(),
            target = music_duration,
            "edit list assembled"
        );
        edits
    }

    /// Fills one stage with contiguous cuts anchored on `stage_beats`.
    ///
    /// The beat cursor moves forward on every iteration, so the loop ends
    /// after at most `stage_beats.len()` rounds. A stage whose pool runs dry
    /// is left short rather than borrowing time from later stages.
    pub fn plan_stage<R: Rng + ?Sized>(
        &self,
        stage: &Stage,
        stage_beats: &[f64],
        pool: &mut ClipPool,
        rng: &mut R,
    ) -> Vec<CutInstruction> {
        let mut cuts = Vec::new();
        let mut current_time = stage.start;
        let mut beat_index = 0;

        while current_time < stage.end && beat_index < stage_beats.len() {
            let Some(clip) = pool.next_clip(rng) else {
                tracing::warn!(
                    category = %stage.category,
                    covered = current_time - stage.start,
                    budget = stage.budget(),
                    "ran out of clips; stage ends early"
                );
                break;
            };

            let shot_beats = self.pacing.draw(rng);
            let start_beat = stage_beats[beat_index];
            let cut_end = beat_index
                .checked_add(shot_beats)
                .and_then(|end_index| stage_beats.get(end_index))
                .copied()
                .unwrap_or(stage.end)
                .min(stage.end);
            let cut_duration = cut_end - start_beat;

            if cut_duration <= self.min_cut_seconds {
                beat_index += 1;
                continue;
            }

            let max_start = (clip.duration_seconds - cut_duration).max(0.0);
            let start_offset = if max_start > 0.0 {
                rng.gen_range(0.0..=max_start)
            } else {
                0.0
            };

            let cut = CutInstruction {
                clip,
                start_offset_seconds: start_offset,
                duration_seconds: cut_duration,
            };
            if cut.overruns_clip() {
                tracing::debug!(
                    clip = %cut.clip.id,
                    clip_len = cut.clip.duration_seconds,
                    cut = cut_duration,
                    "clip shorter than its cut; starting from the top"
                );
            }
            cuts.push(cut);

            current_time = cut_end;
            while beat_index < stage_beats.len() && stage_beats[beat_index] < current_time {
                beat_index += 1;
            }
        }

        cuts
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::{ClipRef, PacingPreset};

    fn director() -> Director {
        Director::new(&DirectorConfig::default()).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    fn category(prefix: &str, count: usize, duration: f64) -> Vec<ClipRef> {
        (0..count)
            .map(|i| ClipRef::new(format!("temp/{prefix}_{i}.mp4"), duration))
            .collect()
    }

    fn scenario_a() -> CategorizedClips {
        let mut clips = CategorizedClips::new();
        clips.insert("intro".to_string(), category("intro", 2, 10.0));
        clips.insert("main".to_string(), category("main", 10, 10.0));
        clips.insert("outro".to_string(), Vec::new());
        clips
    }

    fn assert_cut_invariants(edits: &EditList) {
        for cut in edits {
            assert!(cut.duration_seconds > MIN_CUT_SECONDS);
            assert!(cut.start_offset_seconds >= 0.0);
            assert!(!cut.overruns_clip(), "{cut:?}");
        }
    }

    #[test]
    fn redistributes_time_away_from_empty_categories() {
        let director = director();
        let beats = BeatTimeline::regular(0.5, 120.0);
        let progression = names(&["intro", "main", "outro"]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let edits =
                director.create_edit_list(&scenario_a(), &beats, 120.0, &progression, &mut rng);

            assert!((edits.total_duration() - 120.0).abs() < 1.0, "seed {seed}");
            assert_cut_invariants(&edits);

            let intro_time: f64 = edits
                .iter()
                .filter(|cut| cut.clip.id.contains("intro"))
                .map(|cut| cut.duration_seconds)
                .sum();
            assert!((intro_time - 60.0).abs() < 1e-6, "seed {seed}");
            assert!(edits.iter().all(|cut| !cut.clip.id.contains("outro")));
        }
    }

    #[test]
    fn fills_the_track_when_every_category_is_usable() {
        let director = director();
        let beats = BeatTimeline::regular(0.5, 120.0);
        let mut rng = StdRng::seed_from_u64(5);
        let edits = director.create_edit_list(
            &scenario_a(),
            &beats,
            120.0,
            &names(&["intro", "main"]),
            &mut rng,
        );

        assert!((edits.total_duration() - 120.0).abs() < 1e-6);
        assert_cut_invariants(&edits);
    }

    #[test]
    fn intro_does_not_repeat_its_first_clip() {
        let director = director();
        let beats = BeatTimeline::regular(0.5, 120.0);
        let mut rng = StdRng::seed_from_u64(9);
        let edits = director.create_edit_list(
            &scenario_a(),
            &beats,
            120.0,
            &names(&["intro", "main", "outro"]),
            &mut rng,
        );

        let intro: Vec<&str> = edits
            .iter()
            .filter(|cut| cut.clip.id.contains("intro"))
            .map(|cut| cut.clip.id.as_str())
            .collect();
        assert!(intro.len() >= 2);
        for pair in intro.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn empty_beat_timeline_yields_nothing() {
        let director = director();
        let mut rng = StdRng::seed_from_u64(1);
        let edits = director.create_edit_list(
            &scenario_a(),
            &BeatTimeline::default(),
            120.0,
            &names(&["intro", "main"]),
            &mut rng,
        );
        assert!(edits.is_empty());
    }

    #[test]
    fn rejects_degenerate_globals() {
        let director = director();
        let beats = BeatTimeline::regular(0.5, 60.0);
        let mut rng = StdRng::seed_from_u64(1);
        let progression = names(&["intro", "main"]);

        assert!(director
            .create_edit_list(&scenario_a(), &beats, 0.0, &progression, &mut rng)
            .is_empty());
        assert!(director
            .create_edit_list(&scenario_a(), &beats, f64::NAN, &progression, &mut rng)
            .is_empty());
        assert!(director
            .create_edit_list(&scenario_a(), &beats, 60.0, &names(&["outro", "missing"]), &mut rng)
            .is_empty());
        assert!(director
            .create_edit_list(&CategorizedClips::new(), &beats, 60.0, &progression, &mut rng)
            .is_empty());
    }

    #[test]
    fn short_clip_starts_at_zero_and_keeps_beat_length() {
        let director = Director::with_pacing(ShotPacing::fixed(8).unwrap());
        let mut clips = CategorizedClips::new();
        clips.insert("solo".to_string(), vec![ClipRef::new("short.mp4", 3.0)]);
        let beats = BeatTimeline::regular(0.5, 20.0);
        let mut rng = StdRng::seed_from_u64(2);

        let edits = director.create_edit_list(&clips, &beats, 20.0, &names(&["solo"]), &mut rng);

        assert_eq!(edits.len(), 5);
        for cut in &edits {
            assert_eq!(cut.start_offset_seconds, 0.0);
            assert!((cut.duration_seconds - 4.0).abs() < 1e-9);
            assert!(cut.overruns_clip());
        }
    }

    #[test]
    fn repeated_category_shares_one_pool() {
        let director = Director::with_pacing(ShotPacing::fixed(4).unwrap());
        let mut clips = CategorizedClips::new();
        clips.insert("main".to_string(), category("main", 3, 10.0));
        // Two 6s stages of 2s cuts: three cuts each, so each stage exhausts
        // one full permutation of the shared pool.
        let beats = BeatTimeline::regular(0.5, 12.0);
        let mut rng = StdRng::seed_from_u64(4);

        let edits =
            director.create_edit_list(&clips, &beats, 12.0, &names(&["main", "main"]), &mut rng);

        assert_eq!(edits.len(), 6);
        let first: HashSet<&str> = edits.cuts()[..3].iter().map(|c| c.clip.id.as_str()).collect();
        let second: HashSet<&str> = edits.cuts()[3..].iter().map(|c| c.clip.id.as_str()).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        assert_ne!(edits.cuts()[2].clip.id, edits.cuts()[3].clip.id);
        assert!((edits.total_duration() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_edit_list() {
        let director = Director::new(&DirectorConfig {
            pacing: PacingPreset::Fine,
            ..DirectorConfig::default()
        })
        .unwrap();
        let beats = BeatTimeline::regular(0.5, 120.0);
        let progression = names(&["intro", "main", "outro"]);

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let edits =
                director.create_edit_list(&scenario_a(), &beats, 120.0, &progression, &mut rng);
            serde_json::to_string(&edits).unwrap()
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn caller_clips_are_left_untouched() {
        let director = director();
        let mut clips = scenario_a();
        clips
            .get_mut("main")
            .unwrap()
            .push(ClipRef::new("temp/broken.mp4", 0.0));
        let before = clips.clone();
        let mut rng = StdRng::seed_from_u64(8);

        let edits = director.create_edit_list(
            &clips,
            &BeatTimeline::regular(0.5, 30.0),
            30.0,
            &names(&["main"]),
            &mut rng,
        );

        assert_eq!(clips, before);
        assert!(edits.iter().all(|cut| cut.clip.id != "temp/broken.mp4"));
    }

    #[test]
    fn silent_stage_is_covered_by_a_single_cut() {
        let director = director();
        let mut clips = CategorizedClips::new();
        clips.insert("a".to_string(), category("a", 2, 30.0));
        clips.insert("b".to_string(), category("b", 2, 30.0));
        // Beats only in the first half; the second stage has none.
        let beats = BeatTimeline::regular(0.5, 10.0);
        let mut rng = StdRng::seed_from_u64(6);

        let edits = director.create_edit_list(&clips, &beats, 20.0, &names(&["a", "b"]), &mut rng);

        let last = edits.cuts().last().unwrap();
        assert!(last.clip.id.contains("temp/b_"));
        assert!((last.duration_seconds - 10.0).abs() < 1e-9);
        assert!((edits.total_duration() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn planner_skips_beats_too_close_to_the_stage_end() {
        let director = Director::with_pacing(ShotPacing::fixed(1).unwrap());
        let stage = Stage {
            category: "main".to_string(),
            start: 0.0,
            end: 2.0,
        };
        let mut pool = ClipPool::new(&category("main", 4, 10.0));
        let mut rng = StdRng::seed_from_u64(3);

        let cuts = director.plan_stage(&stage, &[0.0, 1.0, 1.95], &mut pool, &mut rng);

        assert_eq!(cuts.len(), 2);
        assert!((cuts[0].duration_seconds - 1.0).abs() < 1e-9);
        assert!((cuts[1].duration_seconds - 0.95).abs() < 1e-9);
    }

    #[test]
    fn planner_stops_when_the_pool_is_empty() {
        let director = director();
        let stage = Stage {
            category: "void".to_string(),
            start: 0.0,
            end: 10.0,
        };
        let mut pool = ClipPool::new(&[]);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(director
            .plan_stage(&stage, &[0.0, 1.0], &mut pool, &mut rng)
            .is_empty());
    }

    #[test]
    fn oversized_custom_shot_after_a_skipped_beat_falls_back_to_stage_end() {
        let raw = r#"{"custom":{"shots":[{"beats":18446744073709551615,"weight":1}]}}"#;
        let config = DirectorConfig {
            pacing: serde_json::from_str(raw).unwrap(),
            ..DirectorConfig::default()
        };
        let director = Director::new(&config).unwrap();
        let mut clips = CategorizedClips::new();
        clips.insert("a".to_string(), category("a", 2, 10.0));
        let beats = BeatTimeline::new(vec![9.92, 9.95]);
        let mut rng = StdRng::seed_from_u64(12);

        // Both beats sit within the minimum cut of the end, so each is skipped.
        let edits = director.create_edit_list(&clips, &beats, 10.0, &names(&["a"]), &mut rng);
        assert!(edits.is_empty());

        let stage = Stage {
            category: "a".to_string(),
            start: 0.0,
            end: 10.0,
        };
        let mut pool = ClipPool::new(&category("a", 2, 10.0));
        let cuts = director.plan_stage(&stage, &[0.0, 5.0, 9.0], &mut pool, &mut rng);
        assert_eq!(cuts.len(), 1);
        assert!((cuts[0].duration_seconds - 10.0).abs() < 1e-9);
    }

    #[test]
    fn irregular_beats_and_mixed_clip_lengths_keep_cuts_valid() {
        let mut grid_rng = StdRng::seed_from_u64(77);
        let mut raw_beats = Vec::new();
        let mut t = 0.0;
        while t < 60.0 {
            raw_beats.push(t);
            if grid_rng.gen_bool(0.1) {
                // Doubled onset from the beat tracker.
                raw_beats.push(t + 0.04);
            }
            t += grid_rng.gen_range(0.15..0.9);
        }
        let beats = BeatTimeline::new(raw_beats);

        let mut clips = CategorizedClips::new();
        clips.insert(
            "verse".to_string(),
            vec![
                ClipRef::new("temp/verse_long.mp4", 12.0),
                ClipRef::new("temp/verse_mid.mp4", 2.7),
                ClipRef::new("temp/verse_short.mp4", 0.6),
                ClipRef::new("temp/verse_blip.mp4", 0.05),
            ],
        );
        clips.insert(
            "chorus".to_string(),
            vec![
                ClipRef::new("temp/chorus_a.mp4", 1.3),
                ClipRef::new("temp/chorus_b.mp4", 7.5),
            ],
        );
        let director = Director::new(&DirectorConfig {
            pacing: PacingPreset::Coarse,
            ..DirectorConfig::default()
        })
        .unwrap();

        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let edits = director.create_edit_list(
                &clips,
                &beats,
                60.0,
                &names(&["verse", "chorus"]),
                &mut rng,
            );

            assert!(!edits.is_empty(), "seed {seed}");
            assert!(edits.total_duration() <= 60.0 + 1e-6, "seed {seed}");
            for cut in &edits {
                assert_ne!(cut.clip.id, "temp/verse_blip.mp4");
                assert!(cut.duration_seconds > MIN_CUT_SECONDS, "{cut:?}");
                assert!(cut.start_offset_seconds >= 0.0, "{cut:?}");
                if cut.clip.duration_seconds >= cut.duration_seconds {
                    assert!(!cut.overruns_clip(), "{cut:?}");
                } else {
                    assert_eq!(cut.start_offset_seconds, 0.0, "{cut:?}");
                }
            }
        }
    }

    #[test]
    fn rejects_negative_minimum_cut() {
        let config = DirectorConfig {
            min_cut_seconds: -1.0,
            ..DirectorConfig::default()
        };
        assert!(Director::new(&config).is_err());
    }
}
