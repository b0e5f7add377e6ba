use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::foundation::core::{Frame, Rational};
use crate::foundation::error::{QuadfxError, QuadfxResult};

/// Fixed output format every rendered variant is encoded to.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderTarget {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
    /// ffmpeg video encoder name.
    pub codec: String,
    /// ffmpeg output pixel format.
    pub pix_fmt: String,
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            codec: "libx264".to_string(),
            pix_fmt: "yuv420p".to_string(),
        }
    }
}

impl RenderTarget {
    /// Reject targets ffmpeg would refuse or mangle.
    pub fn validate(&self) -> QuadfxResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(QuadfxError::validation("target width/height must be non-zero"));
        }
        if self.pix_fmt == "yuv420p"
            && (!self.width.is_multiple_of(2) || !self.height.is_multiple_of(2))
        {
            return Err(QuadfxError::validation(
                "target width/height must be even (required for yuv420p output)",
            ));
        }
        if self.fps == 0 {
            return Err(QuadfxError::validation("target fps must be non-zero"));
        }
        if self.codec.trim().is_empty() || self.pix_fmt.trim().is_empty() {
            return Err(QuadfxError::validation("target codec/pix_fmt must be set"));
        }
        Ok(())
    }
}

/// Input description handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Width of the frames that will be pushed.
    pub width: u32,
    /// Height of the frames that will be pushed.
    pub height: u32,
    /// Rate the pushed frames were decoded at.
    pub fps: Rational,
}

/// Sink contract for consuming transformed frames in decode order.
///
/// Ordering contract: `push_frame` is called with strictly increasing indices.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> QuadfxResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: u64, frame: &Frame) -> QuadfxResult<()>;
    /// Called once after the last frame is pushed; flushes and finalizes the output.
    fn end(&mut self) -> QuadfxResult<()>;
}

/// Creates one sink per output file.
pub trait SinkFactory: Send + Sync {
    /// Sink writing to `path`; nothing is spawned until `begin`.
    fn create(&self, path: &Path) -> QuadfxResult<Box<dyn FrameSink>>;
}

/// What an [`InMemorySink`] saw, kept after the sink is dropped.
#[derive(Clone, Debug, Default)]
pub struct RecordedRender {
    /// Configuration passed to `begin`, if it was called.
    pub config: Option<SinkConfig>,
    /// Frames in push order.
    pub frames: Vec<(u64, Frame)>,
    /// `end` completed successfully.
    pub finished: bool,
}

impl RecordedRender {
    /// Frame indices in push order.
    pub fn indices(&self) -> Vec<u64> {
        self.frames.iter().map(|(idx, _)| *idx).collect()
    }
}

type Records = Arc<Mutex<HashMap<PathBuf, RecordedRender>>>;

/// In-memory sink for tests and debugging.
///
/// Frames are recorded into the owning [`InMemorySinkFactory`] when the sink is dropped, so the
/// record survives renders that fail or are cancelled.
#[derive(Debug)]
pub struct InMemorySink {
    path: PathBuf,
    fail_at: Option<u64>,
    write_file: bool,
    last_idx: Option<u64>,
    current: RecordedRender,
    records: Records,
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> QuadfxResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(QuadfxError::validation("sink width/height must be non-zero"));
        }
        self.current = RecordedRender {
            config: Some(cfg),
            ..RecordedRender::default()
        };
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &Frame) -> QuadfxResult<()> {
        if self.current.config.is_none() {
            return Err(QuadfxError::encode("in-memory sink not started"));
        }
        check_order(self.last_idx, idx)?;
        self.last_idx = Some(idx);
        if self.fail_at == Some(idx) {
            return Err(QuadfxError::encode(format!(
                "simulated encoder failure at frame {idx}"
            )));
        }
        self.current.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> QuadfxResult<()> {
        if self.current.config.is_none() {
            return Err(QuadfxError::encode("in-memory sink not started"));
        }
        if self.write_file {
            ensure_parent_dir(&self.path)?;
            std::fs::write(
                &self.path,
                format!("quadfx in-memory render: {} frames\n", self.current.frames.len()),
            )?;
        }
        self.current.finished = true;
        Ok(())
    }
}

impl Drop for InMemorySink {
    fn drop(&mut self) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(self.path.clone(), std::mem::take(&mut self.current));
        }
    }
}

/// Builds [`InMemorySink`]s and keeps what each of them recorded, keyed by output path.
#[derive(Clone, Debug, Default)]
pub struct InMemorySinkFactory {
    failures: HashMap<PathBuf, u64>,
    write_files: bool,
    records: Records,
}

impl InMemorySinkFactory {
    /// Empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the sink for `path` fail when frame `idx` is pushed.
    pub fn failing_at(mut self, path: impl Into<PathBuf>, idx: u64) -> Self {
        self.failures.insert(path.into(), idx);
        self
    }

    /// Write a small placeholder file to the output path on `end`, standing in for the encoded
    /// video.
    pub fn writing_files(mut self) -> Self {
        self.write_files = true;
        self
    }

    /// What the sink for `path` recorded, once it has been dropped.
    pub fn recorded(&self, path: &Path) -> Option<RecordedRender> {
        self.records.lock().ok()?.get(path).cloned()
    }
}

impl SinkFactory for InMemorySinkFactory {
    fn create(&self, path: &Path) -> QuadfxResult<Box<dyn FrameSink>> {
        Ok(Box::new(InMemorySink {
            path: path.to_path_buf(),
            fail_at: self.failures.get(path).copied(),
            write_file: self.write_files,
            last_idx: None,
            current: RecordedRender::default(),
            records: self.records.clone(),
        }))
    }
}

pub(crate) fn check_order(last: Option<u64>, idx: u64) -> QuadfxResult<()> {
    if let Some(last) = last
        && idx <= last
    {
        return Err(QuadfxError::encode(format!(
            "sink received out-of-order frame index {idx} after {last}"
        )));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> QuadfxResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
