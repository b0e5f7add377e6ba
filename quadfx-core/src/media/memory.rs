use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::foundation::core::{Frame, Rational};
use crate::foundation::error::{QuadfxError, QuadfxResult};
use crate::media::container::{
    ContainerOpener, FrameIter, MediaContainer, StreamDesc, StreamKind,
};

/// Scripted source served by [`InMemoryOpener`].
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    /// Streams in container order.
    pub streams: Vec<StreamDesc>,
    /// Frames yielded when the first video stream is decoded.
    pub frames: Vec<Frame>,
    /// Yield this many frames, then a decode error.
    pub fail_after: Option<usize>,
    /// Refuse to open, as a corrupt container would.
    pub corrupt: bool,
}

impl InMemorySource {
    /// A source with one video stream carrying `frames`, sized from the first frame.
    pub fn with_video(frames: Vec<Frame>, fps: u32) -> Self {
        let (width, height) = frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        Self {
            streams: vec![StreamDesc {
                index: 0,
                kind: StreamKind::Video {
                    width,
                    height,
                    frame_rate: Rational { num: fps, den: 1 },
                    time_base: Rational {
                        num: 1,
                        den: fps.max(1),
                    },
                },
            }],
            frames,
            ..Self::default()
        }
    }

    /// Append an audio stream after the existing ones.
    pub fn and_audio(mut self, sample_rate: u32, channels: u16) -> Self {
        self.streams.push(StreamDesc {
            index: self.streams.len(),
            kind: StreamKind::Audio {
                sample_rate,
                channels,
                layout: (channels == 2).then(|| "stereo".to_string()),
            },
        });
        self
    }
}

/// In-memory decode boundary for tests and debugging.
#[derive(Clone, Debug, Default)]
pub struct InMemoryOpener {
    sources: HashMap<PathBuf, InMemorySource>,
    closes: Arc<AtomicUsize>,
}

impl InMemoryOpener {
    /// Empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `source` when `path` is opened.
    pub fn with_source(mut self, path: impl Into<PathBuf>, source: InMemorySource) -> Self {
        self.sources.insert(path.into(), source);
        self
    }

    /// Number of containers closed so far.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl ContainerOpener for InMemoryOpener {
    fn open(&self, path: &Path) -> QuadfxResult<Box<dyn MediaContainer>> {
        let source = self.sources.get(path).ok_or_else(|| {
            QuadfxError::demux(format!("'{}': no such file", path.display()))
        })?;
        if source.corrupt {
            return Err(QuadfxError::demux(format!(
                "'{}': invalid data found when processing input",
                path.display()
            )));
        }
        Ok(Box::new(InMemoryContainer {
            source: source.clone(),
            closes: self.closes.clone(),
        }))
    }
}

struct InMemoryContainer {
    source: InMemorySource,
    closes: Arc<AtomicUsize>,
}

impl MediaContainer for InMemoryContainer {
    fn streams(&self) -> &[StreamDesc] {
        &self.source.streams
    }

    fn decode_video(&mut self, ordinal: usize) -> QuadfxResult<FrameIter<'_>> {
        let videos = self.source.streams.iter().filter(|s| s.is_video()).count();
        if ordinal >= videos {
            return Err(QuadfxError::demux(format!(
                "video stream #{ordinal} does not exist"
            )));
        }
        let ok_count = self.source.fail_after.unwrap_or(usize::MAX);
        let fails = self.source.fail_after.is_some();
        let frames = self.source.frames.iter().take(ok_count).cloned().map(Ok);
        let tail = fails
            .then(|| Err(QuadfxError::demux("error while decoding frame")))
            .into_iter();
        Ok(Box::new(frames.chain(tail)))
    }

    fn close(&mut self) -> QuadfxResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
