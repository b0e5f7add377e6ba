use std::path::{Path, PathBuf};

use crate::foundation::error::QuadfxResult;

/// Filesystem operations the remux stage and the driver's cleanup need.
pub trait ArtifactFs: Send + Sync {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;
    /// Size in bytes, `None` if the file is absent.
    fn size(&self, path: &Path) -> Option<u64>;
    /// Copy `from` verbatim to `to`, replacing `to`.
    fn copy(&self, from: &Path, to: &Path) -> QuadfxResult<()>;
    /// Delete a file.
    fn remove(&self, path: &Path) -> QuadfxResult<()>;
    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> QuadfxResult<()>;
}

/// The real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl ArtifactFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn size(&self, path: &Path) -> Option<u64> {
        std::fs::metadata(path).ok().map(|m| m.len())
    }

    fn copy(&self, from: &Path, to: &Path) -> QuadfxResult<()> {
        crate::encode::sink::ensure_parent_dir(to)?;
        std::fs::copy(from, to)?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> QuadfxResult<()> {
        std::fs::remove_file(path)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> QuadfxResult<()> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }
}

/// Exit status and diagnostics of one remux tool run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    /// The tool exited with status 0.
    pub success: bool,
    /// Human-readable exit status.
    pub status: String,
    /// Captured standard error.
    pub stderr: String,
}

/// External tool that muxes a silent video with the first audio stream of a donor file.
pub trait RemuxTool: Send + Sync {
    /// `Err` means the tool could not be run at all.
    fn remux(
        &self,
        video: &Path,
        audio_source: &Path,
        audio_codec: &str,
        output: &Path,
    ) -> QuadfxResult<ToolOutput>;
}

/// What happened to one processed/output pair.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemuxOutcome {
    /// The output has the video and the donor audio.
    Muxed,
    /// The tool failed; the silent render was copied to the output instead.
    CopiedWithoutAudio {
        /// Why the tool failed.
        reason: String,
    },
    /// The rendered file was not there to mux.
    MissingInput,
    /// Both the tool and the fallback copy failed.
    Failed {
        /// Tool and copy errors.
        reason: String,
    },
}

/// Outcome for one pair.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RemuxReport {
    /// Rendered, silent video.
    pub processed: PathBuf,
    /// Final output path.
    pub output: PathBuf,
    /// What happened.
    pub outcome: RemuxOutcome,
}

/// Mux each rendered file with the donor's audio, pair by pair.
///
/// Only the first `min(processed.len(), outputs.len())` pairs are handled. A failure on one pair
/// never stops the others.
pub fn remux_all(
    processed: &[PathBuf],
    outputs: &[PathBuf],
    audio_source: &Path,
    audio_codec: &str,
    tool: &dyn RemuxTool,
    fs: &dyn ArtifactFs,
) -> Vec<RemuxReport> {
    if processed.len() != outputs.len() {
        tracing::warn!(
            processed = processed.len(),
            outputs = outputs.len(),
            "remux lists differ in length; extra entries are ignored"
        );
    }

    processed
        .iter()
        .zip(outputs)
        .map(|(video, output)| RemuxReport {
            processed: video.clone(),
            output: output.clone(),
            outcome: remux_one(video, output, audio_source, audio_codec, tool, fs),
        })
        .collect()
}

fn remux_one(
    video: &Path,
    output: &Path,
    audio_source: &Path,
    audio_codec: &str,
    tool: &dyn RemuxTool,
    fs: &dyn ArtifactFs,
) -> RemuxOutcome {
    if !fs.exists(video) {
        tracing::error!(path = %video.display(), "rendered file not found; skipping");
        return RemuxOutcome::MissingInput;
    }

    let reason = match tool.remux(video, audio_source, audio_codec, output) {
        Ok(out) if out.success => {
            tracing::info!(path = %output.display(), "muxed audio into output");
            return RemuxOutcome::Muxed;
        }
        Ok(out) => format!("remux tool exited with {}: {}", out.status, out.stderr.trim()),
        Err(err) => err.to_string(),
    };

    tracing::warn!(
        path = %output.display(),
        %reason,
        "remux failed; copying video without audio"
    );
    match fs.copy(video, output) {
        Ok(()) => RemuxOutcome::CopiedWithoutAudio { reason },
        Err(err) => {
            tracing::error!(path = %output.display(), error = %err, "fallback copy failed");
            RemuxOutcome::Failed {
                reason: format!("{reason}; fallback copy failed: {err}"),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/remux/stage.rs"]
mod tests;
