use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::error::{Result, TessviewError};

use super::{check_frame, ensure_parent_dir, MovieWriter};

/// Looping animated GIF.
pub struct GifWriter {
    encoder: GifEncoder<BufWriter<File>>,
    width: u32,
    height: u32,
    delay: Delay,
}

impl GifWriter {
    pub fn new(path: &Path, width: u32, height: u32, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(TessviewError::Encode("movie fps must be non-zero".into()));
        }
        ensure_parent_dir(path)?;
        let file = BufWriter::new(File::create(path)?);
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(Self {
            encoder,
            width,
            height,
            delay: Delay::from_numer_denom_ms(1000, fps),
        })
    }
}

impl MovieWriter for GifWriter {
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        check_frame(frame, self.width, self.height)?;
        self.encoder
            .encode_frame(Frame::from_parts(frame.clone(), 0, 0, self.delay))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        // The trailer is written when the encoder is dropped.
        drop(self);
        Ok(())
    }
}
