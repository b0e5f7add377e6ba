use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::foundation::error::{QuadfxError, QuadfxResult};
use crate::remux::stage::{RemuxTool, ToolOutput};

/// Argument vector (without the leading `ffmpeg`) that stream-copies `video`, re-encodes the
/// first audio stream of `audio_source` and stops at the shorter of the two.
pub fn remux_args(video: &Path, audio_source: &Path, audio_codec: &str, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(video.into());
    args.push("-i".into());
    args.push(audio_source.into());
    for a in ["-c:v", "copy", "-c:a", audio_codec, "-map", "0:v:0", "-map", "1:a:0", "-shortest"] {
        args.push(a.into());
    }
    args.push(output.into());
    args
}

/// Remux through the system `ffmpeg`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegRemuxer;

impl RemuxTool for FfmpegRemuxer {
    fn remux(
        &self,
        video: &Path,
        audio_source: &Path,
        audio_codec: &str,
        output: &Path,
    ) -> QuadfxResult<ToolOutput> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(remux_args(video, audio_source, audio_codec, output))
            .stdin(Stdio::null());
        tracing::debug!(?cmd, "running remux");

        let out = cmd
            .output()
            .map_err(|e| QuadfxError::remux(format!("failed to spawn ffmpeg: {e}")))?;
        Ok(ToolOutput {
            success: out.status.success(),
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/remux/ffmpeg.rs"]
mod tests;
