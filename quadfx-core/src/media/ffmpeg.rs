use std::ffi::OsString;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::encode::ffmpeg::{StderrDrain, is_ffprobe_on_path};
use crate::foundation::core::{Frame, Rational, rgb24_len};
use crate::foundation::error::{QuadfxError, QuadfxResult};
use crate::media::container::{
    ContainerOpener, FrameIter, MediaContainer, StreamDesc, StreamKind,
};

/// Decode boundary backed by the system `ffprobe` (stream table) and `ffmpeg` (frames).
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegOpener;

impl ContainerOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> QuadfxResult<Box<dyn MediaContainer>> {
        if !path.is_file() {
            return Err(QuadfxError::demux(format!(
                "source '{}' not found",
                path.display()
            )));
        }
        let streams = probe_streams(path)?;
        Ok(Box::new(FfmpegContainer {
            path: path.to_path_buf(),
            streams,
            closed: false,
        }))
    }
}

/// Run `ffprobe` and return the container's streams in container order.
pub fn probe_streams(path: &Path) -> QuadfxResult<Vec<StreamDesc>> {
    if !is_ffprobe_on_path() {
        return Err(QuadfxError::demux(
            "ffprobe is required to open sources, but was not found on PATH",
        ));
    }

    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| QuadfxError::demux(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(QuadfxError::demux(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(&out.stdout)
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    index: usize,
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    time_base: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    channel_layout: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

pub(crate) fn parse_probe_json(bytes: &[u8]) -> QuadfxResult<Vec<StreamDesc>> {
    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| QuadfxError::demux(format!("ffprobe json parse failed: {e}")))?;

    parsed.streams.into_iter().map(stream_desc).collect()
}

fn stream_desc(s: ProbeStream) -> QuadfxResult<StreamDesc> {
    let kind = match s.codec_type.as_deref() {
        Some("video") => {
            let width = s.width.ok_or_else(|| {
                QuadfxError::demux(format!("video stream #{} has no width", s.index))
            })?;
            let height = s.height.ok_or_else(|| {
                QuadfxError::demux(format!("video stream #{} has no height", s.index))
            })?;
            // avg_frame_rate is "0/0" for some containers; r_frame_rate is the fallback.
            let frame_rate = s
                .avg_frame_rate
                .as_deref()
                .and_then(Rational::parse)
                .filter(|r| r.num != 0)
                .or_else(|| s.r_frame_rate.as_deref().and_then(Rational::parse))
                .unwrap_or(Rational { num: 0, den: 1 });
            let time_base = s
                .time_base
                .as_deref()
                .and_then(Rational::parse)
                .unwrap_or(Rational { num: 1, den: 1 });
            StreamKind::Video {
                width,
                height,
                frame_rate,
                time_base,
            }
        }
        Some("audio") => StreamKind::Audio {
            sample_rate: s
                .sample_rate
                .as_deref()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(0),
            channels: s.channels.unwrap_or(0),
            layout: s.channel_layout,
        },
        other => StreamKind::Other {
            codec_type: other.unwrap_or("unknown").to_string(),
        },
    };
    Ok(StreamDesc {
        index: s.index,
        kind,
    })
}

struct FfmpegContainer {
    path: PathBuf,
    streams: Vec<StreamDesc>,
    closed: bool,
}

impl MediaContainer for FfmpegContainer {
    fn streams(&self) -> &[StreamDesc] {
        &self.streams
    }

    fn decode_video(&mut self, ordinal: usize) -> QuadfxResult<FrameIter<'_>> {
        if self.closed {
            return Err(QuadfxError::demux("container is already closed"));
        }
        let (width, height) = self
            .streams
            .iter()
            .filter_map(|s| match s.kind {
                StreamKind::Video { width, height, .. } => Some((width, height)),
                _ => None,
            })
            .nth(ordinal)
            .ok_or_else(|| {
                QuadfxError::demux(format!("video stream #{ordinal} does not exist"))
            })?;

        let reader = RawVideoReader::spawn(&self.path, ordinal, width, height)?;
        Ok(Box::new(reader))
    }

    fn close(&mut self) -> QuadfxResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Streams `rgb24` frames out of an `ffmpeg` child process.
/// Arguments that decode the `ordinal`-th video stream of `path` to raw RGB24 on stdout.
///
/// Frames come out in coded orientation so they match the dimensions ffprobe reports; rotation
/// metadata is not applied.
pub(crate) fn decoder_args(path: &Path, ordinal: usize) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "error", "-nostdin", "-noautorotate", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(path.as_os_str().to_owned());
    args.extend(
        [
            "-map".to_string(),
            format!("0:v:{ordinal}"),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            "pipe:1".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args
}

struct RawVideoReader {
    child: Option<Child>,
    stdout: BufReader<ChildStdout>,
    stderr: Option<StderrDrain>,
    width: u32,
    height: u32,
    frame_len: usize,
    done: bool,
}

impl RawVideoReader {
    fn spawn(path: &Path, ordinal: usize, width: u32, height: u32) -> QuadfxResult<Self> {
        let frame_len = rgb24_len(width, height)
            .filter(|&n| n > 0)
            .ok_or_else(|| QuadfxError::demux("invalid video stream dimensions"))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(decoder_args(path, ordinal))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        tracing::debug!(?cmd, "spawning ffmpeg decoder");

        let mut child = cmd
            .spawn()
            .map_err(|e| QuadfxError::demux(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| QuadfxError::demux("failed to capture ffmpeg stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| QuadfxError::demux("failed to capture ffmpeg stderr (unexpected)"))?;

        Ok(Self {
            child: Some(child),
            stdout: BufReader::new(stdout),
            stderr: Some(StderrDrain::spawn(stderr)),
            width,
            height,
            frame_len,
            done: false,
        })
    }

    fn finish(&mut self) -> QuadfxResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| QuadfxError::demux(format!("failed to wait for ffmpeg decoder: {e}")))?;
        let stderr = match self.stderr.take() {
            Some(drain) => drain.join()?,
            None => String::new(),
        };
        if !status.success() {
            return Err(QuadfxError::demux(format!(
                "ffmpeg decoder exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Iterator for RawVideoReader {
    type Item = QuadfxResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = vec![0u8; self.frame_len];
        match read_full(&mut self.stdout, &mut buf) {
            Ok(n) if n == self.frame_len => Some(Frame::new(self.width, self.height, buf)),
            Ok(0) => {
                self.done = true;
                self.finish().err().map(Err)
            }
            Ok(n) => {
                self.done = true;
                let _ = self.finish();
                Some(Err(QuadfxError::demux(format!(
                    "truncated frame: got {n} of {} bytes",
                    self.frame_len
                ))))
            }
            Err(e) => {
                self.done = true;
                let _ = self.finish();
                Some(Err(QuadfxError::demux(format!(
                    "failed to read from ffmpeg decoder: {e}"
                ))))
            }
        }
    }
}

impl Drop for RawVideoReader {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
