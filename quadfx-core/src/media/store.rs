use std::path::Path;

use crate::foundation::core::{Frame, Rational};
use crate::foundation::error::{QuadfxError, QuadfxResult};
use crate::media::container::{ContainerOpener, MediaContainer, StreamKind};

/// Metadata of the authoritative (first) video stream.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct VideoInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Average frame rate.
    pub frame_rate: Rational,
    /// Tick length of timestamps.
    pub time_base: Rational,
}

/// Metadata of the authoritative (first) audio stream.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AudioInfo {
    /// Samples per second.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Channel layout name, if known.
    pub layout: Option<String>,
}

/// Fully decoded source: every frame in presentation order plus stream metadata.
///
/// Populated once by [`demux_once`] and read-only afterwards; renderers share it through an
/// `Arc<FrameStore>`.
#[derive(Debug, Default)]
pub struct FrameStore {
    frames: Vec<Frame>,
    video: Option<VideoInfo>,
    audio: Option<AudioInfo>,
}

impl FrameStore {
    /// Store decoded frames with their stream parameters.
    pub fn new(frames: Vec<Frame>, video: Option<VideoInfo>, audio: Option<AudioInfo>) -> Self {
        Self {
            frames,
            video,
            audio,
        }
    }

    /// Frames in presentation order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame was decoded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Parameters of the first video stream.
    pub fn video(&self) -> Option<&VideoInfo> {
        self.video.as_ref()
    }

    /// Parameters of the first audio stream.
    pub fn audio(&self) -> Option<&AudioInfo> {
        self.audio.as_ref()
    }
}

/// Open `path`, capture stream metadata and decode every video frame into memory.
///
/// Fails as a unit: on any error no frames are returned. A container without streams yields an
/// empty store with both metadata fields absent.
#[tracing::instrument(skip(opener), fields(path = %path.display()))]
pub fn demux_once(opener: &dyn ContainerOpener, path: &Path) -> QuadfxResult<FrameStore> {
    let mut container = opener.open(path).map_err(|e| as_demux_error(path, e))?;

    let loaded = load_all(container.as_mut());
    let closed = container.close();

    let store = loaded.map_err(|e| as_demux_error(path, e))?;
    closed.map_err(|e| as_demux_error(path, e))?;

    tracing::info!(
        frames = store.len(),
        video = ?store.video(),
        audio = ?store.audio(),
        "loaded source into memory"
    );
    Ok(store)
}

fn load_all(container: &mut dyn MediaContainer) -> QuadfxResult<FrameStore> {
    let video = container.streams().iter().find_map(|s| match &s.kind {
        StreamKind::Video {
            width,
            height,
            frame_rate,
            time_base,
        } => Some(VideoInfo {
            width: *width,
            height: *height,
            frame_rate: *frame_rate,
            time_base: *time_base,
        }),
        _ => None,
    });
    let audio = container.streams().iter().find_map(|s| match &s.kind {
        StreamKind::Audio {
            sample_rate,
            channels,
            layout,
        } => Some(AudioInfo {
            sample_rate: *sample_rate,
            channels: *channels,
            layout: layout.clone(),
        }),
        _ => None,
    });

    let mut frames = Vec::new();
    if let Some(info) = video.as_ref() {
        for (idx, item) in container.decode_video(0)?.enumerate() {
            let frame = item?;
            if frame.width() != info.width || frame.height() != info.height {
                return Err(QuadfxError::demux(format!(
                    "frame {idx} is {}x{}, stream declares {}x{}",
                    frame.width(),
                    frame.height(),
                    info.width,
                    info.height
                )));
            }
            frames.push(frame);
        }
    }

    Ok(FrameStore::new(frames, video, audio))
}

fn as_demux_error(path: &Path, err: QuadfxError) -> QuadfxError {
    match err {
        QuadfxError::Demux(msg) => QuadfxError::demux(msg),
        other => QuadfxError::demux(format!("'{}': {other}", path.display())),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/store.rs"]
mod tests;
