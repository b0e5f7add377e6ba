use std::path::Path;

use crate::foundation::core::{Frame, Rational};
use crate::foundation::error::QuadfxResult;

/// Per-stream parameters as reported by the container, in container order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamKind {
    /// A picture stream.
    Video {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Average frame rate.
        frame_rate: Rational,
        /// Tick length of timestamps.
        time_base: Rational,
    },
    /// A sound stream.
    Audio {
        /// Samples per second.
        sample_rate: u32,
        /// Channel count.
        channels: u16,
        /// Channel layout name, such as `stereo`.
        layout: Option<String>,
    },
    /// Data, subtitle, attachment and anything else the pipeline ignores.
    Other {
        /// ffprobe `codec_type`.
        codec_type: String,
    },
}

/// One stream of a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamDesc {
    /// Index of the stream inside the container.
    pub index: usize,
    /// Type and parameters.
    pub kind: StreamKind,
}

impl StreamDesc {
    /// Whether this is a video stream.
    pub fn is_video(&self) -> bool {
        matches!(self.kind, StreamKind::Video { .. })
    }

    /// Whether this is an audio stream.
    pub fn is_audio(&self) -> bool {
        matches!(self.kind, StreamKind::Audio { .. })
    }
}

/// Lazy, finite, non-restartable sequence of decoded frames.
pub type FrameIter<'a> = Box<dyn Iterator<Item = QuadfxResult<Frame>> + 'a>;

/// An opened media container.
pub trait MediaContainer {
    /// Streams in container order.
    fn streams(&self) -> &[StreamDesc];

    /// Decode the `ordinal`-th video stream (0 is the first video stream) as RGB24 frames.
    fn decode_video(&mut self, ordinal: usize) -> QuadfxResult<FrameIter<'_>>;

    /// Release decoder resources. Called exactly once by the demux stage.
    fn close(&mut self) -> QuadfxResult<()>;
}

/// Decode boundary: opens a source for demuxing.
pub trait ContainerOpener: Send + Sync {
    /// Fails on missing or corrupt input.
    fn open(&self, path: &Path) -> QuadfxResult<Box<dyn MediaContainer>>;
}
