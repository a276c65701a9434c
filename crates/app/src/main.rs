use std::path::{Path, PathBuf};

use beatcut_core::{
    parse_progression, AppConfig, BeatcutError, Director, EditDocument, PacingPreset,
    ProjectManifest, RenderPlan,
};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> beatcut_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            manifest,
            output,
            config,
            seed,
            pacing,
            progression,
        } => run_plan(
            &manifest,
            &output,
            config.as_deref(),
            seed,
            pacing,
            progression.as_deref(),
        ),
        Commands::RenderScript {
            edits,
            music,
            video,
            config,
            script,
        } => run_render_script(&edits, &music, &video, config.as_deref(), script.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> beatcut_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::debug!(?path, "loading config");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn run_plan(
    manifest_path: &Path,
    output: &Path,
    config_path: Option<&Path>,
    seed: Option<u64>,
    pacing: Option<PacingPreset>,
    progression: Option<&str>,
) -> beatcut_core::Result<()> {
    tracing::info!(?manifest_path, ?output, "planning edit");

    let mut config = load_config(config_path)?;
    if let Some(pacing) = pacing {
        config.director.pacing = pacing;
    }

    let mut manifest = ProjectManifest::load(manifest_path)?;
    if let Some(raw) = progression {
        manifest.progression = parse_progression(raw);
    }
    if manifest.progression.is_empty() {
        return Err(BeatcutError::invalid("progression lists no categories"));
    }
    for category in manifest.unknown_categories() {
        tracing::warn!(category, "progression category has no clips in the manifest");
    }

    let seed = seed
        .or(config.director.seed)
        .unwrap_or_else(rand::random::<u64>);
    tracing::info!(seed, pacing = ?config.director.pacing, "seeding director");

    let director = Director::new(&config.director)?;
    tracing::debug!(
        shot_beats = ?director.pacing().candidates(),
        min_cut = director.min_cut_seconds(),
        "director ready"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let cuts = director.create_edit_list(
        &manifest.clips,
        &manifest.beats,
        manifest.music_duration_seconds,
        &manifest.progression,
        &mut rng,
    );

    if cuts.is_empty() {
        return Err(BeatcutError::msg(
            "director produced an empty edit list; check that the progression's categories \
             have clips and that the beat grid is not empty",
        ));
    }

    let shortfall = manifest.music_duration_seconds - cuts.total_duration();
    if shortfall.abs() >= 1.0 {
        tracing::warn!(shortfall, "edit does not cover the whole track");
    }

    let document = EditDocument {
        music_duration_seconds: manifest.music_duration_seconds,
        seed,
        cuts,
    };
    document.save(output)?;
    tracing::info!(
        cuts = document.cuts.len(),
        total = document.cuts.total_duration(),
        ?output,
        "edit list written"
    );
    Ok(())
}

fn run_render_script(
    edits: &Path,
    music: &Path,
    video: &Path,
    config_path: Option<&Path>,
    script: Option<&Path>,
) -> beatcut_core::Result<()> {
    let config = load_config(config_path)?;
    let document = EditDocument::load(edits)?;
    let plan = RenderPlan::build(&document, music, video, config.render)?;
    let contents = plan.to_shell_script();

    match script {
        Some(path) => {
            std::fs::write(path, contents)?;
            tracing::info!(segments = plan.segments().len(), ?path, "render script written");
        }
        None => print!("{contents}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Cuts classified clips to the beat of a track", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schedule clips from a project manifest onto the beat grid.
    Plan {
        /// Manifest with classified clips, beats and track length.
        manifest: PathBuf,
        /// Where to write the edit document.
        output: PathBuf,
        /// Optional JSON config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seed for a reproducible edit.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Pacing preset: balanced, fine or coarse.
        #[arg(short, long)]
        pacing: Option<PacingPreset>,
        /// Comma separated category order, overriding the manifest.
        #[arg(long)]
        progression: Option<String>,
    },
    /// Turn an edit document into an ffmpeg shell script.
    RenderScript {
        /// Edit document written by `plan`.
        edits: PathBuf,
        /// Music track to lay under the video.
        music: PathBuf,
        /// Path of the final video.
        video: PathBuf,
        /// Optional JSON config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the script here instead of stdout.
        #[arg(long)]
        script: Option<PathBuf>,
    },
}
