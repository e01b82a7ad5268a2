use std::path::{Path, PathBuf};
use std::sync::Arc;

use fitrs::{Fits, Hdu};
use ndarray::{Array2, Array3};
use tessview_core::report::{Reporter, SilentReporter};
use tessview_core::sequence::Sequence;

/// A `(frames, rows, cols)` cube whose every pixel is distinct and positive:
/// `1 + 1000 * t + 10 * r + c`.
pub fn ramp_cube(frames: usize, rows: usize, cols: usize) -> Array3<f32> {
    Array3::from_shape_fn((frames, rows, cols), |(t, r, c)| {
        (1 + 1000 * t + 10 * r + c) as f32
    })
}

/// A sequence of `frames` ramp images sampled every `cadence` from zero.
pub fn ramp_sequence(frames: usize, rows: usize, cols: usize, cadence: f64) -> Sequence {
    let times = (0..frames).map(|i| i as f64 * cadence).collect();
    Sequence::from_cube(ramp_cube(frames, rows, cols), Some(times)).unwrap()
}

pub fn silent() -> Arc<dyn Reporter> {
    Arc::new(SilentReporter)
}

/// Write a 2D float image as a primary HDU, optionally with a `MIDTIME`.
pub fn write_fits_image(dir: &Path, name: &str, image: &Array2<f32>, time: Option<f64>) -> PathBuf {
    match time {
        Some(t) => write_fits_with_keys(dir, name, image, &[("MIDTIME", t)]),
        None => write_fits_with_keys(dir, name, image, &[]),
    }
}

/// Write a 2D float image as a primary HDU carrying the given numeric keys.
pub fn write_fits_with_keys(
    dir: &Path,
    name: &str,
    image: &Array2<f32>,
    keys: &[(&str, f64)],
) -> PathBuf {
    let (rows, cols) = image.dim();
    let data: Vec<f32> = image.iter().copied().collect();
    let mut hdu = Hdu::new(&[cols, rows], data);
    for &(key, value) in keys {
        hdu.insert(key, value);
    }
    let path = dir.join(name);
    Fits::create(&path, hdu).unwrap();
    path
}

/// Write a `(frames, rows, cols)` cube as one 3D primary HDU.
pub fn write_fits_cube(dir: &Path, name: &str, cube: &Array3<f32>) -> PathBuf {
    let (frames, rows, cols) = cube.dim();
    let data: Vec<f32> = cube.iter().copied().collect();
    let hdu = Hdu::new(&[cols, rows, frames], data);
    let path = dir.join(name);
    Fits::create(&path, hdu).unwrap();
    path
}
