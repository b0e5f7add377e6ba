//! quadfx decodes a video once into memory and renders four stylized copies of it in parallel.
//!
//! A run has three phases:
//!
//! - Demux the source into a shared, read-only [`FrameStore`]
//! - Render every variant on its own thread through a fixed effect pipeline into a [`FrameSink`]
//! - Mux the source's audio back into each rendered file
//!
//! The external collaborators (decoder, encoder, remux tool, filesystem) sit behind traits so the
//! pipeline can run entirely in memory; the `ffmpeg`-backed implementations drive the system
//! `ffmpeg`/`ffprobe` binaries as subprocesses.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod effects;
pub(crate) mod encode;
pub(crate) mod media;
pub(crate) mod pipeline;
pub(crate) mod remux;
pub(crate) mod render;

pub use crate::foundation::core::{CHANNELS, Frame, Rational};
pub use crate::foundation::error::{QuadfxError, QuadfxResult};

pub use crate::effects::noise::NoiseSeed;
pub use crate::effects::variants::{KNOWN_VARIANTS, apply_variant};
pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkFactory, FfmpegSinkOpts, encoder_args, is_ffmpeg_on_path,
    is_ffprobe_on_path,
};
pub use crate::encode::sink::{
    FrameSink, InMemorySink, InMemorySinkFactory, RecordedRender, RenderTarget, SinkConfig,
    SinkFactory,
};
pub use crate::media::container::{
    ContainerOpener, FrameIter, MediaContainer, StreamDesc, StreamKind,
};
pub use crate::media::ffmpeg::{FfmpegOpener, probe_streams};
pub use crate::media::memory::{InMemoryOpener, InMemorySource};
pub use crate::media::store::{AudioInfo, FrameStore, VideoInfo, demux_once};
pub use crate::pipeline::config::{PipelineConfig, VariantDescriptor, default_variants};
pub use crate::pipeline::driver::{
    OutputCheck, PhaseTimings, PipelineReport, Toolchain, run_pipeline,
};
pub use crate::remux::ffmpeg::{FfmpegRemuxer, remux_args};
pub use crate::remux::stage::{
    ArtifactFs, LocalFs, RemuxOutcome, RemuxReport, RemuxTool, ToolOutput, remux_all,
};
pub use crate::render::cancel::CancelToken;
pub use crate::render::coordinator::{fan_out, render_all};
pub use crate::render::renderer::{
    PROGRESS_EVERY, RenderOutcome, RenderReport, RenderStats, render_variant,
};
