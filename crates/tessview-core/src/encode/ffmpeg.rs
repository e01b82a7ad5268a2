use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;
use tracing::debug;

use crate::error::{Result, TessviewError};

use super::{check_frame, ensure_parent_dir, MovieWriter};

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// H.264 MP4 through a system `ffmpeg` fed raw RGBA on stdin.
pub struct FfmpegWriter {
    path: PathBuf,
    width: u32,
    height: u32,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegWriter {
    pub fn new(path: &Path, width: u32, height: u32, fps: u32) -> Result<Self> {
        validate(width, height, fps)?;
        if !is_ffmpeg_on_path() {
            return Err(TessviewError::WriterUnavailable(
                "ffmpeg is required for MP4 output but was not found on PATH".into(),
            ));
        }
        ensure_parent_dir(path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{width}x{height}"),
            "-r",
            &fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(path);

        let mut child = cmd
            .spawn()
            .map_err(|e| TessviewError::WriterUnavailable(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TessviewError::Encode("failed to open ffmpeg stdin".into()))?;

        debug!(path = %path.display(), width, height, fps, "ffmpeg started");
        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            child,
            stdin: Some(stdin),
        })
    }
}

fn validate(width: u32, height: u32, fps: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(TessviewError::Encode("movie width/height must be non-zero".into()));
    }
    if fps == 0 {
        return Err(TessviewError::Encode("movie fps must be non-zero".into()));
    }
    if width % 2 != 0 || height % 2 != 0 {
        return Err(TessviewError::Encode(
            "movie width/height must be even for yuv420p output".into(),
        ));
    }
    Ok(())
}

impl MovieWriter for FfmpegWriter {
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        check_frame(frame, self.width, self.height)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TessviewError::Encode("ffmpeg writer is already finished".into()));
        };
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| TessviewError::Encode(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        drop(self.stdin.take());
        let output = self
            .child
            .wait_with_output()
            .map_err(|e| TessviewError::Encode(format!("failed to wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TessviewError::Encode(format!(
                "ffmpeg exited with status {} writing {}: {}",
                output.status,
                self.path.display(),
                stderr.trim()
            )));
        }
        Ok(())
    }
}
