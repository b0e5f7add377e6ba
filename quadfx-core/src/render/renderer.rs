use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::time::Instant;

use crate::effects::noise::NoiseSeed;
use crate::effects::variants::apply_variant;
use crate::encode::sink::{FrameSink, SinkConfig, SinkFactory};
use crate::foundation::core::Rational;
use crate::foundation::error::{QuadfxError, QuadfxResult};
use crate::media::store::FrameStore;
use crate::pipeline::config::VariantDescriptor;
use crate::render::cancel::CancelToken;

/// Frames between progress log lines.
pub const PROGRESS_EVERY: u64 = 50;

/// Counters for a finished render.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_written: u64,
    /// Wall-clock time of the render.
    pub elapsed_ms: u64,
}

/// How one renderer ended.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Every frame was encoded and the sink finalized.
    Completed(RenderStats),
    /// Stopped by the cancel token; the intermediate is incomplete.
    Cancelled {
        /// Frames encoded before the stop.
        frames_written: u64,
    },
    /// Encoder error or panic; the reason is the error text.
    Failed {
        /// Error text.
        reason: String,
    },
}

impl RenderOutcome {
    /// Whether the render produced a complete intermediate.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Result of one renderer, tagged with the variant it ran.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RenderReport {
    /// Variant the entry belongs to.
    pub variant_id: u32,
    /// Display name.
    pub name: String,
    /// File the render wrote.
    pub intermediate_path: PathBuf,
    /// How the render ended.
    pub outcome: RenderOutcome,
}

impl RenderReport {
    pub(crate) fn failed(variant: &VariantDescriptor, reason: impl Into<String>) -> Self {
        Self {
            variant_id: variant.id,
            name: variant.name.clone(),
            intermediate_path: variant.intermediate.clone(),
            outcome: RenderOutcome::Failed {
                reason: reason.into(),
            },
        }
    }
}

/// Apply one variant to every stored frame in order and encode the result.
///
/// Never fails as a whole: encoder errors and panics are caught here and reported as
/// [`RenderOutcome::Failed`], so sibling renderers are unaffected.
#[tracing::instrument(
    skip_all,
    fields(variant = variant.id, path = %variant.intermediate.display())
)]
pub fn render_variant(
    store: &FrameStore,
    variant: &VariantDescriptor,
    sinks: &dyn SinkFactory,
    seed: NoiseSeed,
    cancel: &CancelToken,
) -> RenderReport {
    let started = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(|| {
        render_frames(store, variant, sinks, seed, cancel, started)
    }));

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            tracing::error!(error = %err, "render failed");
            RenderOutcome::Failed {
                reason: err.to_string(),
            }
        }
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            tracing::error!(%reason, "renderer panicked");
            RenderOutcome::Failed {
                reason: format!("renderer panicked: {reason}"),
            }
        }
    };

    match &outcome {
        RenderOutcome::Completed(stats) => tracing::info!(
            name = %variant.name,
            frames = stats.frames_written,
            elapsed_ms = stats.elapsed_ms,
            "variant rendered"
        ),
        RenderOutcome::Cancelled { frames_written } => tracing::warn!(
            name = %variant.name,
            frames = frames_written,
            "variant cancelled"
        ),
        RenderOutcome::Failed { .. } => {}
    }

    RenderReport {
        variant_id: variant.id,
        name: variant.name.clone(),
        intermediate_path: variant.intermediate.clone(),
        outcome,
    }
}

fn render_frames(
    store: &FrameStore,
    variant: &VariantDescriptor,
    sinks: &dyn SinkFactory,
    seed: NoiseSeed,
    cancel: &CancelToken,
    started: Instant,
) -> QuadfxResult<RenderOutcome> {
    let total = store.len() as u64;
    let Some(first) = store.frames().first() else {
        tracing::warn!("frame store is empty; nothing to encode");
        return Ok(RenderOutcome::Completed(RenderStats::default()));
    };

    let fps = store
        .video()
        .map(|v| v.frame_rate)
        .filter(|r| r.num != 0 && r.den != 0)
        .unwrap_or(Rational { num: 30, den: 1 });
    let cfg = SinkConfig {
        width: first.width(),
        height: first.height(),
        fps,
    };

    let mut rng = seed.rng_for(variant.id);
    let mut sink = sinks.create(&variant.intermediate)?;
    sink.begin(cfg)?;

    let mut written = 0u64;
    for (idx, frame) in store.frames().iter().enumerate() {
        if cancel.is_cancelled() {
            finish(sink.as_mut())?;
            return Ok(RenderOutcome::Cancelled {
                frames_written: written,
            });
        }

        let out = apply_variant(frame, variant.id, &mut rng);
        sink.push_frame(idx as u64, &out)?;
        written += 1;

        if written.is_multiple_of(PROGRESS_EVERY) {
            tracing::debug!(frames = written, total, "render progress");
        }
    }

    finish(sink.as_mut())?;
    Ok(RenderOutcome::Completed(RenderStats {
        frames_written: written,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }))
}

fn finish(sink: &mut dyn FrameSink) -> QuadfxResult<()> {
    sink.end()
        .map_err(|e| QuadfxError::encode(format!("failed to finalize output: {e}")))
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
