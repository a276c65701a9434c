//! Export of an edit as ffmpeg invocations.
//!
//! Transcoding happens outside this crate; the plan describes every segment
//! extraction, the concat list, and the final mux so a downstream tool (or
//! the generated shell script) can execute them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{BeatcutError, EditDocument, Result};

/// Output format options for the rendered video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub crf: u8,
    pub preset: String,
    /// Directory for intermediate segments and the concat list.
    pub work_dir: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            crf: 23,
            preset: "medium".to_string(),
            work_dir: PathBuf::from("temp"),
        }
    }
}

impl RenderSettings {
    fn video_filter(&self) -> String {
        let (w, h) = (self.width, self.height);
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:-1:-1:black,fps={},format=yuv420p",
            self.fps
        )
    }
}

/// Extraction of one cut into an intermediate transport-stream file.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentJob {
    pub source: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub output: PathBuf,
}

/// Every ffmpeg step needed to turn an edit document into a video.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    settings: RenderSettings,
    segments: Vec<SegmentJob>,
    music_path: PathBuf,
    output_path: PathBuf,
    music_duration_seconds: f64,
}

impl RenderPlan {
    pub fn build(
        document: &EditDocument,
        music_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
        settings: RenderSettings,
    ) -> Result<Self> {
        if document.cuts.is_empty() {
            return Err(BeatcutError::invalid("edit list is empty; nothing to render"));
        }
        if !document.music_duration_seconds.is_finite() || document.music_duration_seconds <= 0.0 {
            return Err(BeatcutError::invalid(format!(
                "music duration must be positive, got {}",
                document.music_duration_seconds
            )));
        }

        let segments = document
            .cuts
            .iter()
            .enumerate()
            .map(|(i, cut)| SegmentJob {
                source: cut.clip.id.clone(),
                start_seconds: cut.start_offset_seconds,
                duration_seconds: cut.duration_seconds,
                output: settings.work_dir.join(format!("segment_{i:04}.ts")),
            })
            .collect();

        Ok(Self {
            settings,
            segments,
            music_path: music_path.as_ref().to_path_buf(),
            output_path: output_path.as_ref().to_path_buf(),
            music_duration_seconds: document.music_duration_seconds,
        })
    }

    pub fn segments(&self) -> &[SegmentJob] {
        &self.segments
    }

    pub fn concat_list_path(&self) -> PathBuf {
        self.settings.work_dir.join("concat_list.txt")
    }

    /// ffmpeg arguments that cut and normalise one segment.
    pub fn segment_args(&self, job: &SegmentJob) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-ss".to_string(),
            format!("{:.3}", job.start_seconds),
            "-t".to_string(),
            format!("{:.3}", job.duration_seconds),
            "-i".to_string(),
            job.source.clone(),
            "-vf".to_string(),
            self.settings.video_filter(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            self.settings.preset.clone(),
            "-crf".to_string(),
            self.settings.crf.to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            job.output.display().to_string(),
        ]
    }

    /// Contents of the concat-demuxer list file. ffmpeg resolves entries
    /// relative to the list itself, which sits next to the segments.
    pub fn concat_list(&self) -> String {
        self.segments
            .iter()
            .filter_map(|job| job.output.file_name())
            .map(|name| format!("file '{}'\n", name.to_string_lossy()))
            .collect()
    }

    /// ffmpeg arguments that join the segments, lay the music under them
    /// and trim the result to the track length.
    pub fn final_args(&self) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            self.concat_list_path().display().to_string(),
            "-i".to_string(),
            self.music_path.display().to_string(),
            "-map".to_string(),
            "0:v".to_string(),
            "-map".to_string(),
            "1:a".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-t".to_string(),
            format!("{:.3}", self.music_duration_seconds),
            "-strict".to_string(),
            "-2".to_string(),
            self.output_path.display().to_string(),
        ]
    }

    /// The whole plan as a POSIX shell script.
    pub fn to_shell_script(&self) -> String {
        let mut script = String::from("#!/bin/sh\nset -e\n\n");
        script.push_str(&format!(
            "mkdir -p {}\n\n",
            shell_quote(&self.settings.work_dir.display().to_string())
        ));

        for job in &self.segments {
            script.push_str(&command_line(&self.segment_args(job)));
        }

        script.push_str(&format!(
            "\ncat > {} <<'EOF'\n{}EOF\n\n",
            shell_quote(&self.concat_list_path().display().to_string()),
            self.concat_list()
        ));
        script.push_str(&command_line(&self.final_args()));

        let mut cleanup: Vec<String> = self
            .segments
            .iter()
            .map(|job| job.output.display().to_string())
            .collect();
        cleanup.push(self.concat_list_path().display().to_string());
        script.push_str("\nrm -f");
        for path in &cleanup {
            script.push(' ');
            script.push_str(&shell_quote(path));
        }
        script.push('\n');
        script
    }
}

fn command_line(args: &[String]) -> String {
    let mut line = String::from("ffmpeg");
    for arg in args {
        line.push(' ');
        line.push_str(&shell_quote(arg));
    }
    line.push('\n');
    line
}

fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
