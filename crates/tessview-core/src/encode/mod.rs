//! Movie writers. The illustration renders each animation frame and hands it
//! to a [`MovieWriter`] picked from the output file extension.

mod ffmpeg;
mod gif;

use std::path::Path;

use image::RgbaImage;

use crate::error::{Result, TessviewError};

pub use ffmpeg::{is_ffmpeg_on_path, FfmpegWriter};
pub use gif::GifWriter;

/// Sink for rendered animation frames.
pub trait MovieWriter {
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()>;

    /// Flush and close the output.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Choose a writer by extension: `mp4` goes through ffmpeg, `gif` through
/// the built-in encoder.
pub fn writer_for_path(path: &Path, width: u32, height: u32, fps: u32) -> Result<Box<dyn MovieWriter>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("mp4") => Ok(Box::new(FfmpegWriter::new(path, width, height, fps)?)),
        Some("gif") => Ok(Box::new(GifWriter::new(path, width, height, fps)?)),
        other => Err(TessviewError::UnsupportedFormat(format!(
            "no movie writer for extension '{}'",
            other.unwrap_or("")
        ))),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn check_frame(frame: &RgbaImage, width: u32, height: u32) -> Result<()> {
    if frame.width() != width || frame.height() != height {
        return Err(TessviewError::Encode(format!(
            "frame size mismatch: got {}x{}, expected {width}x{height}",
            frame.width(),
            frame.height()
        )));
    }
    Ok(())
}
