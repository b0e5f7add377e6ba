use std::ffi::OsString;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{
    FrameSink, RenderTarget, SinkConfig, SinkFactory, check_order, ensure_parent_dir,
};
use crate::foundation::core::Frame;
use crate::foundation::error::{QuadfxError, QuadfxResult};

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Resolution, rate and codec of the encoded file.
    pub target: RenderTarget,
}

impl FfmpegSinkOpts {
    /// Overwriting options for `out_path`.
    pub fn new(out_path: impl Into<PathBuf>, target: RenderTarget) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            target,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGB24 frames to its stdin.
///
/// Output is video-only; audio is added later by the remux stage.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<StderrDrain>,

    cfg: Option<SinkConfig>,
    frame_len: usize,
    last_idx: Option<u64>,
}

impl FfmpegSink {
    /// A sink that spawns `ffmpeg` on [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            frame_len: 0,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> QuadfxResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(QuadfxError::validation("input fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(QuadfxError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        self.opts.target.validate()?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(QuadfxError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(QuadfxError::encode(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(encoder_args(&cfg, &self.opts))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        tracing::debug!(?cmd, "spawning ffmpeg encoder");

        let mut child = cmd.spawn().map_err(|e| {
            QuadfxError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| QuadfxError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| QuadfxError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        self.frame_len = (cfg.width as usize) * (cfg.height as usize) * 3;
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(StderrDrain::spawn(stderr));
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &Frame) -> QuadfxResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| QuadfxError::encode("ffmpeg sink not started"))?;
        check_order(self.last_idx, idx)?;
        self.last_idx = Some(idx);

        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(QuadfxError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        debug_assert_eq!(frame.data().len(), self.frame_len);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(QuadfxError::encode("ffmpeg sink is already finalized"));
        };
        stdin.write_all(frame.data()).map_err(|e| {
            QuadfxError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> QuadfxResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| QuadfxError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            QuadfxError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr = match self.stderr_drain.take() {
            Some(drain) => drain.join()?,
            None => String::new(),
        };

        if !status.success() {
            return Err(QuadfxError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // A sink dropped without `end` (render aborted by a panic) must not leave ffmpeg running.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Argument vector for one encoder process (without the leading `ffmpeg`).
pub fn encoder_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let target = &opts.target;
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(s.into());

    push(if opts.overwrite { "-y" } else { "-n" });
    for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s"] {
        push(a);
    }
    push(&format!("{}x{}", cfg.width, cfg.height));
    // For rawvideo input, `-r` before `-i` sets the input rate.
    push("-r");
    push(&cfg.fps.to_string());
    for a in ["-i", "pipe:0", "-an", "-vf"] {
        push(a);
    }
    push(&format!("scale={}:{}", target.width, target.height));
    push("-c:v");
    push(&target.codec);
    push("-pix_fmt");
    push(&target.pix_fmt);
    push("-r");
    push(&target.fps.to_string());
    for a in ["-movflags", "+faststart"] {
        push(a);
    }
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// Creates one [`FfmpegSink`] per variant with a shared target format.
#[derive(Clone, Debug, Default)]
pub struct FfmpegSinkFactory {
    /// Format every created sink encodes to.
    pub target: RenderTarget,
}

impl SinkFactory for FfmpegSinkFactory {
    fn create(&self, path: &Path) -> QuadfxResult<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::new(FfmpegSinkOpts::new(
            path,
            self.target.clone(),
        ))))
    }
}

/// Collects a child's stderr on a helper thread so a chatty process cannot block on a full pipe.
pub(crate) struct StderrDrain(JoinHandle<std::io::Result<Vec<u8>>>);

impl StderrDrain {
    pub(crate) fn spawn(mut stderr: impl Read + Send + 'static) -> Self {
        Self(std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        }))
    }

    pub(crate) fn join(self) -> QuadfxResult<String> {
        let bytes = self
            .0
            .join()
            .map_err(|_| QuadfxError::Other(anyhow::anyhow!("stderr drain thread panicked")))??;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_responds("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_responds("ffprobe")
}

fn tool_responds(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
