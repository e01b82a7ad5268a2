pub mod fits;
pub mod source;
pub mod stats;

use std::cell::OnceCell;
use std::path::PathBuf;

use ndarray::{Array2, Array3, ArrayD, Axis, Ix3};
use tracing::{debug, warn};

use crate::error::{Result, TessviewError};

pub use fits::FitsImage;
pub use source::{LightCurve, PixelFile, PixelStamp, Source};

enum Frames {
    /// Fully loaded `(time, row, col)` cube.
    Cube(Array3<f32>),
    /// One FITS file per timestep, read on demand.
    Files { paths: Vec<PathBuf>, extension: usize },
}

/// A time-ordered series of equally shaped 2D images.
///
/// Built once from a `Source`, sorted by time, never resized. The mean and
/// median images are computed on first request and cached.
pub struct Sequence {
    frames: Frames,
    times: Vec<f64>,
    synthetic_time: bool,
    shape: (usize, usize),
    mean: OnceCell<Array2<f32>>,
    median: OnceCell<Array2<f32>>,
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("len", &self.len())
            .field("shape", &self.shape)
            .field("synthetic_time", &self.synthetic_time)
            .finish()
    }
}

impl Sequence {
    /// Pick the adapter for `source`. Sources that match no known kind fail
    /// with `UnsupportedSource`.
    pub fn from_source(source: Source) -> Result<Self> {
        debug!(kind = source.kind(), "Building sequence");
        match source {
            Source::Array(array) => Self::from_array(array),
            Source::FitsPaths { paths, extension } => Self::from_fits_paths(paths, extension),
            Source::FitsGlob { pattern, extension } => {
                let paths = fits::expand_glob(&pattern)?;
                if paths.is_empty() {
                    return Err(TessviewError::UnsupportedSource(format!(
                        "pattern '{pattern}' matched no files"
                    )));
                }
                Self::from_fits_paths(paths, extension)
            }
            Source::FitsHdus(images) => Self::from_images(images),
            Source::Stamp(stamp) => Self::from_cube(stamp.cube, Some(stamp.times)),
            Source::PixelFile(file) => Self::from_pixel_file(file),
            Source::Unknown(description) => Err(TessviewError::UnsupportedSource(description)),
        }
    }

    /// A 2D array becomes a one-frame sequence; a 3D array is `(time, row, col)`.
    pub fn from_array(array: ArrayD<f32>) -> Result<Self> {
        let cube = match array.ndim() {
            2 => array.insert_axis(Axis(0)),
            3 => array,
            n => {
                return Err(TessviewError::Shape(format!(
                    "expected a 2D or 3D array, got {n} dimensions"
                )))
            }
        };
        let cube = cube
            .into_dimensionality::<Ix3>()
            .map_err(|e| TessviewError::Shape(e.to_string()))?;
        Self::from_cube(cube, None)
    }

    /// Build from an in-memory cube and optional per-frame times.
    pub fn from_cube(cube: Array3<f32>, times: Option<Vec<f64>>) -> Result<Self> {
        let n = cube.len_of(Axis(0));
        let (times, synthetic_time) = resolve_times(times.map(|t| t.into_iter().map(Some).collect()), n)?;
        let order = argsort(&times);
        let cube = if is_identity(&order) {
            cube
        } else {
            cube.select(Axis(0), &order)
        };
        let shape = (cube.len_of(Axis(1)), cube.len_of(Axis(2)));
        Ok(Self::assemble(
            Frames::Cube(cube),
            reorder(&times, &order),
            synthetic_time,
            shape,
        ))
    }

    fn from_images(images: Vec<FitsImage>) -> Result<Self> {
        let Some(first) = images.first() else {
            return Self::from_cube(Array3::zeros((0, 0, 0)), None);
        };
        let (h, w) = first.data.dim();
        let mut cube = Array3::<f32>::zeros((images.len(), h, w));
        let mut times = Vec::with_capacity(images.len());
        for (i, image) in images.into_iter().enumerate() {
            if image.data.dim() != (h, w) {
                return Err(TessviewError::Shape(format!(
                    "image {i} has shape {:?}, expected {:?}",
                    image.data.dim(),
                    (h, w)
                )));
            }
            cube.index_axis_mut(Axis(0), i).assign(&image.data);
            times.push(image.time);
        }
        let (times, synthetic_time) = resolve_times(Some(times), cube.len_of(Axis(0)))?;
        Self::from_cube(cube, (!synthetic_time).then_some(times))
    }

    fn from_pixel_file(file: PixelFile) -> Result<Self> {
        let n = file.flux.len_of(Axis(0));
        if file.times.len() != n || file.quality.len() != n {
            return Err(TessviewError::Shape(format!(
                "pixel file has {n} cadences but {} times and {} quality flags",
                file.times.len(),
                file.quality.len()
            )));
        }
        let keep: Vec<usize> = (0..n)
            .filter(|&i| file.quality[i] == 0 && file.times[i].is_finite())
            .collect();
        if keep.len() < n {
            debug!(dropped = n - keep.len(), "Dropping flagged cadences");
        }
        let flux = file.flux.select(Axis(0), &keep);
        let times = keep.iter().map(|&i| file.times[i]).collect();
        Self::from_cube(flux, Some(times))
    }

    fn from_fits_paths(paths: Vec<PathBuf>, extension: usize) -> Result<Self> {
        let mut infos = Vec::with_capacity(paths.len());
        for path in &paths {
            infos.push(fits::read_header_info(path, extension)?);
        }

        // A single file holding a cube is loaded whole.
        if let [info] = infos.as_slice() {
            let significant = info.shape.iter().filter(|&&n| n != 1).count();
            if significant == 3 {
                let array = fits::read_array(&paths[0], extension)?;
                return Self::from_array(array);
            }
        }

        let mut shape = None;
        for (path, info) in paths.iter().zip(&infos) {
            let dims: Vec<usize> = info.shape.iter().copied().filter(|&n| n != 1).collect();
            let this = match dims.as_slice() {
                [h, w] => (*h, *w),
                _ => {
                    return Err(TessviewError::Shape(format!(
                        "{}: expected a 2D image, got shape {:?}",
                        path.display(),
                        info.shape
                    )))
                }
            };
            match shape {
                None => shape = Some(this),
                Some(s) if s != this => {
                    return Err(TessviewError::Shape(format!(
                        "{}: shape {this:?} differs from {s:?}",
                        path.display()
                    )))
                }
                Some(_) => {}
            }
        }

        let times = infos.iter().map(|info| info.time).collect();
        let (times, synthetic_time) = resolve_times(Some(times), paths.len())?;
        let order = argsort(&times);
        let paths = order.iter().map(|&i| paths[i].clone()).collect();
        Ok(Self::assemble(
            Frames::Files { paths, extension },
            reorder(&times, &order),
            synthetic_time,
            shape.unwrap_or((0, 0)),
        ))
    }

    fn assemble(frames: Frames, times: Vec<f64>, synthetic_time: bool, shape: (usize, usize)) -> Self {
        Self {
            frames,
            times,
            synthetic_time,
            shape,
            mean: OnceCell::new(),
            median: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// `(rows, cols)` of every frame.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Observation times, sorted ascending.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// True when no times were found and the axis is just `0..len`.
    pub fn is_synthetic_time(&self) -> bool {
        self.synthetic_time
    }

    /// Image at `timestep`, or `None` if out of range or unreadable.
    pub fn image_at(&self, timestep: usize) -> Option<Array2<f32>> {
        if timestep >= self.len() {
            return None;
        }
        match &self.frames {
            Frames::Cube(cube) => Some(cube.index_axis(Axis(0), timestep).to_owned()),
            Frames::Files { paths, extension } => {
                match fits::read_image(&paths[timestep], *extension) {
                    Ok(image) => Some(image.data),
                    Err(e) => {
                        warn!(timestep, error = %e, "Failed to read frame");
                        None
                    }
                }
            }
        }
    }

    /// Index of the frame closest in time to `time`; `None` when empty.
    pub fn nearest_timestep(&self, time: f64) -> Option<usize> {
        self.times
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - time).abs().total_cmp(&(*b - time).abs()))
            .map(|(i, _)| i)
    }

    /// Per-pixel mean over all frames, computed once.
    pub fn mean(&self) -> Option<&Array2<f32>> {
        if let Some(mean) = self.mean.get() {
            return Some(mean);
        }
        debug!(frames = self.len(), "Computing mean image");
        let mean = stats::running_mean(self.len(), |i| self.image_at(i))?;
        Some(self.mean.get_or_init(|| mean))
    }

    /// Per-pixel median over all frames, computed once.
    pub fn median(&self) -> Option<&Array2<f32>> {
        if let Some(median) = self.median.get() {
            return Some(median);
        }
        debug!(frames = self.len(), "Computing median image");
        let frames: Vec<Array2<f32>> = (0..self.len()).filter_map(|i| self.image_at(i)).collect();
        let median = stats::pixel_median(&frames)?;
        Some(self.median.get_or_init(|| median))
    }

    /// Mean of the frames within `half_width` steps of `timestep`, excluding
    /// `timestep` itself. `None` when there are no neighbours.
    pub fn neighbor_mean(&self, timestep: usize, half_width: usize) -> Option<Array2<f32>> {
        if timestep >= self.len() || half_width == 0 {
            return None;
        }
        let lo = timestep.saturating_sub(half_width);
        let hi = (timestep + half_width).min(self.len() - 1);
        let neighbors: Vec<usize> = (lo..=hi).filter(|&i| i != timestep).collect();
        stats::running_mean(neighbors.len(), |k| self.image_at(neighbors[k]))
    }
}

/// Fill in a time axis. Missing or non-finite times anywhere make the whole
/// axis synthetic (`0..n`). Returns the axis and the synthetic flag.
fn resolve_times(times: Option<Vec<Option<f64>>>, n: usize) -> Result<(Vec<f64>, bool)> {
    let synthetic = || ((0..n).map(|i| i as f64).collect(), true);
    let Some(times) = times else {
        return Ok(synthetic());
    };
    if times.len() != n {
        return Err(TessviewError::Shape(format!(
            "{} times given for {n} frames",
            times.len()
        )));
    }
    let resolved: Option<Vec<f64>> = times
        .into_iter()
        .map(|t| t.filter(|v| v.is_finite()))
        .collect();
    Ok(match resolved {
        Some(t) => (t, false),
        None => synthetic(),
    })
}

fn argsort(times: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));
    order
}

fn reorder(times: &[f64], order: &[usize]) -> Vec<f64> {
    order.iter().map(|&i| times[i]).collect()
}

fn is_identity(order: &[usize]) -> bool {
    order.iter().enumerate().all(|(i, &j)| i == j)
}
