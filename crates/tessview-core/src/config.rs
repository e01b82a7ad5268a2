use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::colorscale::ScaleParams;
use crate::consts::{DEFAULT_FIGURE_HEIGHT, DEFAULT_FIGURE_WIDTH, DEFAULT_FPS};
use crate::error::Result;
use crate::geometry::Orientation;

/// Which visual pieces a panel draws.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredients {
    pub image: bool,
    pub time: bool,
    pub colorbar: bool,
    pub arrows: bool,
    pub title: bool,
}

impl Default for Ingredients {
    fn default() -> Self {
        Self {
            image: true,
            time: true,
            colorbar: true,
            arrows: false,
            title: true,
        }
    }
}

/// Per-frame processing applied before display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Processing {
    #[default]
    None,
    SubtractMean,
    SubtractMedian,
    /// Current frame minus the mean of up to `half_width` frames on each side.
    SubtractNeighbors { half_width: usize },
}

impl std::fmt::Display for Processing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::SubtractMean => write!(f, "Subtract mean"),
            Self::SubtractMedian => write!(f, "Subtract median"),
            Self::SubtractNeighbors { half_width } => {
                write!(f, "Subtract neighbors (±{half_width})")
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImshowConfig {
    pub ingredients: Ingredients,
    pub processing: Processing,
    /// Used when this panel computes its own colour scale.
    pub scale: ScaleParams,
    pub title: Option<String>,
    /// Coordinate-frame name, e.g. `cam1` or `cam2/ccd3`.
    pub frame: Option<String>,
    /// Opaque styling passthrough for callers that post-process the scene.
    pub style: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Name of the panel to cut from.
    pub source: String,
    /// Cutout centre in the source's display coordinates.
    pub position: (f64, f64),
    /// Cutout `(width, height)` in pixels.
    pub size: (usize, usize),
    /// On-screen pixels per cutout pixel.
    pub factor: f64,
    pub outline_color: [u8; 4],
    pub title: Option<String>,
    pub style: BTreeMap<String, String>,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            position: (0.0, 0.0),
            size: (16, 16),
            factor: 8.0,
            outline_color: [0, 0, 0, 255],
            title: None,
            style: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeseriesConfig {
    /// Add a sibling axis with the marginal histogram of plotted values.
    pub histogram: bool,
    pub title: Option<String>,
    pub marker_color: [u8; 4],
    pub line_color: [u8; 4],
    pub style: BTreeMap<String, String>,
}

impl Default for TimeseriesConfig {
    fn default() -> Self {
        Self {
            histogram: false,
            title: None,
            marker_color: [200, 30, 30, 255],
            line_color: [40, 40, 40, 255],
            style: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FIGURE_WIDTH,
            height: DEFAULT_FIGURE_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IllustrationConfig {
    pub share_colorscale: bool,
    pub share_colorbar: bool,
    /// Grid orientation; only "horizontal" can be transformed.
    pub orientation: String,
    /// Keep only one time label across panels.
    pub condense_time_labels: bool,
    /// Parameters for the shared colour scale.
    pub scale: ScaleParams,
    pub figure: FigureConfig,
}

impl Default for IllustrationConfig {
    fn default() -> Self {
        Self {
            share_colorscale: true,
            share_colorbar: true,
            orientation: "horizontal".into(),
            condense_time_labels: true,
            scale: ScaleParams::default(),
            figure: FigureConfig::default(),
        }
    }
}

impl IllustrationConfig {
    pub fn orientation(&self) -> Result<Orientation> {
        self.orientation.parse()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    pub mintime: Option<f64>,
    pub maxtimespan: Option<f64>,
    pub cadence: Option<f64>,
    pub fps: u32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            mintime: None,
            maxtimespan: None,
            cadence: None,
            fps: DEFAULT_FPS,
        }
    }
}

/// Grid variant of an illustration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutKind {
    SingleCamera { camera: u8 },
    FourCameras,
    CameraOfCcds { camera: u8 },
    Generic,
}

/// An image panel in a scene file: where its pixels come from and how to
/// draw them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImagePanelSpec {
    pub name: String,
    /// File paths or one wildcard pattern.
    pub inputs: Vec<String>,
    #[serde(default)]
    pub extension: usize,
    #[serde(default)]
    pub imshow: ImshowConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomPanelSpec {
    pub name: String,
    #[serde(flatten)]
    pub zoom: ZoomConfig,
}

/// A timeseries panel, optionally filled from a two-column (time, flux)
/// whitespace- or comma-separated text file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPanelSpec {
    pub name: String,
    #[serde(default)]
    pub lightcurves: Vec<PathBuf>,
    #[serde(default)]
    pub timeseries: TimeseriesConfig,
}

/// Everything needed to build and animate an illustration from a TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub layout: LayoutKind,
    #[serde(default)]
    pub images: Vec<ImagePanelSpec>,
    #[serde(default)]
    pub zooms: Vec<ZoomPanelSpec>,
    #[serde(default)]
    pub timeseries: Vec<TimeseriesPanelSpec>,
    #[serde(default)]
    pub illustration: IllustrationConfig,
    #[serde(default)]
    pub animation: AnimationOptions,
}

impl SceneConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
