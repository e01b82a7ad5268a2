use std::path::PathBuf;

use ndarray::{Array3, ArrayD};

use super::fits::{is_pattern, FitsImage};

/// Every kind of pixel source a `Sequence` can be built from.
#[derive(Clone, Debug)]
pub enum Source {
    /// A single 2D image or a `(time, row, col)` cube.
    Array(ArrayD<f32>),
    /// One image per FITS file, or a single FITS cube.
    FitsPaths {
        paths: Vec<PathBuf>,
        extension: usize,
    },
    /// A wildcard pattern over FITS file names.
    FitsGlob { pattern: String, extension: usize },
    /// FITS images that are already decoded.
    FitsHdus(Vec<FitsImage>),
    /// A postage-stamp cutout around one target.
    Stamp(PixelStamp),
    /// A target-pixel-file style cube with quality flags.
    PixelFile(PixelFile),
    /// Anything else; always rejected.
    Unknown(String),
}

impl Source {
    /// Build a file source from command-line style inputs: a single pattern
    /// becomes a glob, anything else a path list.
    pub fn from_inputs(inputs: &[String], extension: usize) -> Self {
        match inputs {
            [single] if is_pattern(single) => Source::FitsGlob {
                pattern: single.clone(),
                extension,
            },
            [] => Source::Unknown("no inputs given".into()),
            many => Source::FitsPaths {
                paths: many.iter().map(PathBuf::from).collect(),
                extension,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Source::Array(_) => "array",
            Source::FitsPaths { .. } => "fits-paths",
            Source::FitsGlob { .. } => "fits-glob",
            Source::FitsHdus(_) => "fits-hdus",
            Source::Stamp(_) => "stamp",
            Source::PixelFile(_) => "pixel-file",
            Source::Unknown(_) => "unknown",
        }
    }
}

/// Postage-stamp cutout: a small cube around one star.
#[derive(Clone, Debug)]
pub struct PixelStamp {
    /// `(time, row, col)` pixels.
    pub cube: Array3<f32>,
    pub times: Vec<f64>,
}

/// Target-pixel-file style data. Cadences with a nonzero quality flag are
/// dropped when building a sequence.
#[derive(Clone, Debug)]
pub struct PixelFile {
    pub flux: Array3<f32>,
    pub times: Vec<f64>,
    pub quality: Vec<u32>,
}

/// A light curve to be drawn into a timeseries panel.
#[derive(Clone, Debug, Default)]
pub struct LightCurve {
    pub time: Vec<f64>,
    pub flux: Vec<f64>,
    pub label: Option<String>,
}

impl LightCurve {
    pub fn new(time: Vec<f64>, flux: Vec<f64>) -> Self {
        Self {
            time,
            flux,
            label: None,
        }
    }
}
