use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::encode::ffmpeg::FfmpegSinkFactory;
use crate::encode::sink::SinkFactory;
use crate::foundation::error::{QuadfxError, QuadfxResult};
use crate::media::container::ContainerOpener;
use crate::media::ffmpeg::FfmpegOpener;
use crate::media::store::{AudioInfo, VideoInfo, demux_once};
use crate::pipeline::config::{PipelineConfig, VariantDescriptor};
use crate::remux::ffmpeg::FfmpegRemuxer;
use crate::remux::stage::{
    ArtifactFs, LocalFs, RemuxOutcome, RemuxReport, RemuxTool, remux_all,
};
use crate::render::cancel::CancelToken;
use crate::render::coordinator::render_all;
use crate::render::renderer::RenderReport;

/// The external collaborators a pipeline run talks to.
pub struct Toolchain {
    /// Decoder for the source.
    pub opener: Box<dyn ContainerOpener>,
    /// Encoder for each variant.
    pub sinks: Box<dyn SinkFactory>,
    /// Tool that muxes the donor audio in.
    pub remuxer: Box<dyn RemuxTool>,
    /// Filesystem the artifacts live on.
    pub fs: Box<dyn ArtifactFs>,
}

impl Toolchain {
    /// System `ffmpeg`/`ffprobe` plus the local filesystem.
    pub fn ffmpeg(config: &PipelineConfig) -> Self {
        Self {
            opener: Box::new(FfmpegOpener),
            sinks: Box::new(FfmpegSinkFactory {
                target: config.target.clone(),
            }),
            remuxer: Box::new(FfmpegRemuxer),
            fs: Box::new(LocalFs),
        }
    }
}

/// Wall-clock time per phase, in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PhaseTimings {
    /// Decoding the source.
    pub demux_ms: u64,
    /// Rendering every variant.
    pub render_ms: u64,
    /// Muxing audio into the outputs.
    pub remux_ms: u64,
    /// Whole run.
    pub total_ms: u64,
}

/// Post-run state of one final output.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OutputCheck {
    /// Variant the entry belongs to.
    pub variant_id: u32,
    /// Display name.
    pub name: String,
    /// Final output path.
    pub path: PathBuf,
    /// Whether the output is on disk.
    pub exists: bool,
    /// Output size, when known.
    pub size_bytes: Option<u64>,
}

/// Everything a pipeline run did, in variant order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PipelineReport {
    /// Source video, also the audio donor.
    pub source: PathBuf,
    /// Number of decoded frames.
    pub frames: usize,
    /// Source video parameters.
    pub video: Option<VideoInfo>,
    /// Source audio parameters.
    pub audio: Option<AudioInfo>,
    /// Per-phase wall-clock time.
    pub timings: PhaseTimings,
    /// One entry per variant.
    pub renders: Vec<RenderReport>,
    /// One entry per variant.
    pub remuxes: Vec<RemuxReport>,
    /// One entry per variant.
    pub outputs: Vec<OutputCheck>,
    /// Intermediates were deleted after every final output was found.
    pub intermediates_removed: bool,
}

impl PipelineReport {
    /// Whether every final output exists.
    pub fn all_outputs_present(&self) -> bool {
        self.outputs.iter().all(|o| o.exists)
    }
}

/// Decode once, render every variant in parallel, mux the donor audio back in, then verify and
/// clean up.
///
/// Returns `Err` only for invalid configuration, a failed demux, or output locations that cannot
/// be prepared; per-variant failures are reported in the returned [`PipelineReport`].
///
/// Only a render that completed is remuxed. Intermediates and outputs left by an earlier run are
/// removed before rendering starts.
pub fn run_pipeline(config: &PipelineConfig, tools: &Toolchain) -> QuadfxResult<PipelineReport> {
    config.validate()?;
    let total_start = Instant::now();
    let variants = config.resolved_variants();

    if !tools.fs.exists(&config.source) {
        return Err(QuadfxError::demux(format!(
            "input file '{}' not found",
            config.source.display()
        )));
    }

    let demux_start = Instant::now();
    let store = Arc::new(demux_once(tools.opener.as_ref(), &config.source).inspect_err(
        |err| tracing::error!(error = %err, "failed to demux source"),
    )?);
    let demux_ms = elapsed_ms(demux_start);
    let (frames, video, audio) = (
        store.len(),
        store.video().cloned(),
        store.audio().cloned(),
    );
    tracing::info!(frames, demux_ms, "single demux complete");

    for dir in [&config.output_dir, &config.work_dir] {
        tools.fs.create_dir_all(dir)?;
    }

    for v in &variants {
        discard_leftover(&v.intermediate, tools.fs.as_ref())?;
        discard_leftover(&v.output, tools.fs.as_ref())?;
        tracing::info!(variant = v.id, name = %v.name, "queued variant");
    }
    let render_start = Instant::now();
    let cancel = CancelToken::new();
    let renders = render_all(
        store,
        &variants,
        tools.sinks.as_ref(),
        config.noise,
        config.render_timeout(),
        &cancel,
    );
    let render_ms = elapsed_ms(render_start);
    tracing::info!(render_ms, "parallel render complete");

    let remux_start = Instant::now();
    let processed: Vec<PathBuf> = variants.iter().map(|v| v.intermediate.clone()).collect();
    let remuxes = remux_rendered(config, &variants, &renders, tools);
    let remux_ms = elapsed_ms(remux_start);
    tracing::info!(remux_ms, "remux complete");

    let outputs = verify_outputs(&variants, tools.fs.as_ref());
    let all_present = outputs.iter().all(|o| o.exists);
    let intermediates_removed = if !all_present {
        tracing::warn!("not every output was produced; keeping intermediates for inspection");
        false
    } else if config.keep_intermediates {
        false
    } else {
        remove_intermediates(&processed, tools.fs.as_ref())
    };

    Ok(PipelineReport {
        source: config.source.clone(),
        frames,
        video,
        audio,
        timings: PhaseTimings {
            demux_ms,
            render_ms,
            remux_ms,
            total_ms: elapsed_ms(total_start),
        },
        renders,
        remuxes,
        outputs,
        intermediates_removed,
    })
}

fn verify_outputs(variants: &[VariantDescriptor], fs: &dyn ArtifactFs) -> Vec<OutputCheck> {
    variants
        .iter()
        .map(|v| {
            let size_bytes = fs.size(&v.output);
            let exists = size_bytes.is_some() || fs.exists(&v.output);
            if exists {
                tracing::info!(
                    variant = v.id,
                    name = %v.name,
                    path = %v.output.display(),
                    size_bytes,
                    "output ready"
                );
            } else {
                tracing::warn!(
                    variant = v.id,
                    name = %v.name,
                    path = %v.output.display(),
                    "output missing"
                );
            }
            OutputCheck {
                variant_id: v.id,
                name: v.name.clone(),
                path: v.output.clone(),
                exists,
                size_bytes,
            }
        })
        .collect()
}

/// Remove a file left behind by an earlier run so it can never stand in for this run's work.
fn discard_leftover(path: &Path, fs: &dyn ArtifactFs) -> QuadfxResult<()> {
    if fs.exists(path) {
        fs.remove(path)?;
        tracing::warn!(path = %path.display(), "removed leftover from a previous run");
    }
    Ok(())
}

/// Remux every variant whose render completed. The others get `MissingInput`, and any partial
/// intermediate they left is deleted.
fn remux_rendered(
    config: &PipelineConfig,
    variants: &[VariantDescriptor],
    renders: &[RenderReport],
    tools: &Toolchain,
) -> Vec<RemuxReport> {
    let completed = |v: &VariantDescriptor| {
        renders
            .iter()
            .any(|r| r.variant_id == v.id && r.outcome.is_completed())
    };

    let (ready, skipped): (Vec<&VariantDescriptor>, Vec<&VariantDescriptor>) =
        variants.iter().partition(|v| completed(*v));
    for v in &skipped {
        if tools.fs.exists(&v.intermediate) {
            match tools.fs.remove(&v.intermediate) {
                Ok(()) => tracing::warn!(
                    variant = v.id,
                    path = %v.intermediate.display(),
                    "discarded incomplete render"
                ),
                Err(err) => tracing::error!(
                    variant = v.id,
                    path = %v.intermediate.display(),
                    error = %err,
                    "could not discard incomplete render"
                ),
            }
        }
    }

    let processed: Vec<PathBuf> = ready.iter().map(|v| v.intermediate.clone()).collect();
    let finals: Vec<PathBuf> = ready.iter().map(|v| v.output.clone()).collect();
    let mut muxed = remux_all(
        &processed,
        &finals,
        &config.source,
        &config.audio_codec,
        tools.remuxer.as_ref(),
        tools.fs.as_ref(),
    )
    .into_iter();

    variants
        .iter()
        .map(|v| {
            let report = completed(v).then(|| muxed.next()).flatten();
            report.unwrap_or_else(|| RemuxReport {
                processed: v.intermediate.clone(),
                output: v.output.clone(),
                outcome: RemuxOutcome::MissingInput,
            })
        })
        .collect()
}

fn remove_intermediates(paths: &[PathBuf], fs: &dyn ArtifactFs) -> bool {
    let mut all_ok = true;
    for path in paths.iter().filter(|p| fs.exists(p)) {
        match fs.remove(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed intermediate"),
            Err(err) => {
                all_ok = false;
                tracing::warn!(path = %path.display(), error = %err, "could not remove intermediate");
            }
        }
    }
    all_ok
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/driver.rs"]
mod tests;
