//! Masked background removal CLI
//!
//! Headless front end: stroke scripts stand in for the pointer, files stand
//! in for the upload and download buttons.

use super::config::CliConfigBuilder;
use crate::{
    config::EditorConfig,
    script::StrokeScript,
    service::{submit, HttpRemovalService},
    services::{
        ImageIOService, StatusReporter, StatusUpdate, SubmissionStage, LOADING_FALLBACK_STATUS,
    },
    session::{EditorSession, SurfaceId},
    tracing_config::{events, init_cli_tracing, spans},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, Instrument};

/// Lasso mask editing and background removal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "masked-bgremove")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Editor configuration as JSON; flags below override it
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Background-removal endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub service_url: Option<String>,

    /// Export format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Display width cap that script coordinates refer to
    #[arg(long, global = true)]
    pub max_display_width: Option<u32>,

    /// Request timeout in seconds (0 = none)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory receiving exported files
    #[arg(short, long, global = true, default_value = ".")]
    pub output: PathBuf,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rasterize a stroke script into the selection mask
    Mask {
        /// Source image
        image: PathBuf,
        /// Stroke script for the mask surface
        #[arg(long, value_name = "FILE")]
        strokes: PathBuf,
    },
    /// Apply an edit script to an existing result and refined mask
    Composite {
        /// Source image
        image: PathBuf,
        /// Result image returned by the service
        #[arg(long, value_name = "FILE")]
        result: PathBuf,
        /// Refined mask returned by the service
        #[arg(long, value_name = "FILE")]
        mask: Option<PathBuf>,
        /// Include/remove script for the result surface
        #[arg(long, value_name = "FILE")]
        edits: PathBuf,
    },
    /// Select, submit to the service, refine and export
    Run {
        /// Source image
        image: PathBuf,
        /// Stroke script for the mask surface
        #[arg(long, value_name = "FILE")]
        strokes: PathBuf,
        /// Include/remove script applied to the result
        #[arg(long, value_name = "FILE")]
        edits: Option<PathBuf>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Mask { .. } => "mask",
            Self::Composite { .. } => "composite",
            Self::Run { .. } => "run",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Tiff,
    Webp,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    let start_time = Instant::now();
    let written = run_command(&cli, config)
        .instrument(spans::session(&session_id, cli.command.name()))
        .await?;

    for path in &written {
        println!("{}", path.display());
    }
    events::progress(&format!(
        "Wrote {} file(s) in {:.2}s",
        written.len(),
        start_time.elapsed().as_secs_f64()
    ));
    Ok(())
}

async fn run_command(cli: &Cli, config: EditorConfig) -> Result<Vec<PathBuf>> {
    match &cli.command {
        Command::Mask { image, strokes } => {
            let mut session = open_session(config, image)?;
            replay(&mut session, SurfaceId::Mask, strokes)?;
            let artifact = session
                .export_selection()
                .context("Failed to encode selection mask")?
                .context("The stroke script did not produce a selection")?;
            let path = ImageIOService::write_artifact(&cli.output, &artifact)
                .context("Failed to write selection mask")?;
            Ok(vec![path])
        },
        Command::Composite {
            image,
            result,
            mask,
            edits,
        } => {
            let mut session = open_session(config, image)?;
            let result_bytes = read_input(result)?;
            let mask_bytes = mask.as_deref().map(read_input).transpose()?;
            session
                .restore_result(&result_bytes, mask_bytes.as_deref())
                .context("Failed to restore result")?;
            replay(&mut session, SurfaceId::Result, edits)?;
            export_all(&session, &cli.output)
        },
        Command::Run {
            image,
            strokes,
            edits,
        } => {
            let mut session = open_session(config, image)?;
            replay(&mut session, SurfaceId::Mask, strokes)?;

            let service = HttpRemovalService::from_config(session.config())
                .context("Failed to create service client")?;
            let reporter = SpinnerReporter::new(cli.verbose > 0);
            let stage = submit(&mut session, &service, &reporter)
                .instrument(spans::submission(service.url()))
                .await
                .context("Submission refused")?;
            if stage != SubmissionStage::Completed {
                anyhow::bail!(
                    "Background removal failed: {}",
                    session.error().unwrap_or("unknown error")
                );
            }

            if let Some(edits) = edits {
                replay(&mut session, SurfaceId::Result, edits)?;
            }
            export_all(&session, &cli.output)
        },
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    ImageIOService::read_file(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn open_session(config: EditorConfig, image: &Path) -> Result<EditorSession> {
    let mut session = EditorSession::new(config).context("Invalid configuration")?;
    if !ImageIOService::is_supported_format(image) {
        warn!(
            "{} has no recognised image extension, decoding by content",
            image.display()
        );
    }
    let bytes = read_input(image)?;
    session
        .load_image(&bytes)
        .with_context(|| format!("Failed to load image: {}", image.display()))?;
    let (width, height) = session.scale().display_size();
    debug!(width, height, "script coordinates use this display size");
    Ok(session)
}

fn replay(session: &mut EditorSession, surface: SurfaceId, script: &Path) -> Result<()> {
    let script = StrokeScript::load(script)
        .with_context(|| format!("Failed to load stroke script: {}", script.display()))?;
    let summary = script.replay(session, surface);
    info!(
        "Replayed {} action(s): {} committed, {} discarded, {} deleted, {} undone",
        script.len(),
        summary.committed,
        summary.discarded,
        summary.deleted,
        summary.undone
    );
    if summary.discarded > 0 {
        warn!(
            "{} stroke(s) were discarded (fewer than 3 points or surface not active)",
            summary.discarded
        );
    }
    Ok(())
}

fn export_all(session: &EditorSession, dir: &Path) -> Result<Vec<PathBuf>> {
    let span = spans::export(dir);
    let _enter = span.enter();
    let started = Instant::now();

    let image = {
        let (width, height) = session.scale().natural_size();
        let span = spans::compositing(width, height, session.edit_surface().polygon_count());
        let _enter = span.enter();
        session
            .export_image()
            .context("Failed to encode result image")?
            .context("No result image to export")?
    };
    let image_path = match ImageIOService::write_artifact(dir, &image) {
        Ok(path) => path,
        Err(e) => {
            events::error_with_context(&e, "write result image");
            return Err(e).context("Failed to write result image");
        },
    };
    let mut written = vec![image_path];

    match session.export_mask().context("Failed to encode mask")? {
        Some(mask) => written.push(
            ImageIOService::write_artifact(dir, &mask).context("Failed to write mask")?,
        ),
        None => warn!("No refined mask available, skipping mask export"),
    }

    events::performance_metric("export", started.elapsed().as_millis() as u64);
    Ok(written)
}

/// Spinner on stderr that follows the submission stages
struct SpinnerReporter {
    bar: ProgressBar,
    verbose: bool,
}

impl SpinnerReporter {
    fn new(verbose: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(LOADING_FALLBACK_STATUS);
        Self { bar, verbose }
    }
}

impl StatusReporter for SpinnerReporter {
    fn report_status(&self, update: StatusUpdate) {
        if self.verbose {
            debug!(
                stage = ?update.stage,
                progress = update.progress,
                elapsed_ms = update.elapsed_ms,
                "submission progress"
            );
        }
        if !update.description.is_empty() {
            self.bar.set_message(update.description);
        }
    }

    fn report_completion(&self, elapsed_ms: u64) {
        self.bar.finish_with_message(format!(
            "Background removed in {:.1}s",
            elapsed_ms as f64 / 1000.0
        ));
    }

    fn report_error(&self, stage: SubmissionStage, error: &str) {
        self.bar
            .abandon_with_message(format!("Failed ({:?}): {}", stage, error));
    }
}
