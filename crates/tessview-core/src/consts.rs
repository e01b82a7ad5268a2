/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Scale factor turning a median absolute deviation into a Gaussian sigma.
pub const MAD_TO_SIGMA: f64 = 1.48;

/// Default lower percentile for colour-scale clipping.
pub const DEFAULT_LOWER_PERCENTILE: f64 = 1.0;

/// Default upper percentile for colour-scale clipping.
pub const DEFAULT_UPPER_PERCENTILE: f64 = 99.0;

/// Default width of the linear region of a diverging scale, in robust sigmas.
pub const DEFAULT_SIGMA_MULTIPLE: f64 = 3.0;

/// Smallest positive lower bound used for logarithmic normalization.
pub const LOG_FLOOR: f64 = 1e-6;

/// Tolerance used when stepping through animation times.
pub const TIME_EPSILON: f64 = 1e-9;

/// Default animation frame rate.
pub const DEFAULT_FPS: u32 = 30;

/// Default figure size in pixels.
pub const DEFAULT_FIGURE_WIDTH: u32 = 960;
pub const DEFAULT_FIGURE_HEIGHT: u32 = 540;

/// Width in pixels reserved to the right of a grid for a colorbar.
pub const COLORBAR_GUTTER: u32 = 48;

/// Base z-order for zoom outlines; registration index is added on top.
pub const OUTLINE_ZORDER: i32 = 10;

/// Number of bins used by the timeseries marginal histogram.
pub const HISTOGRAM_BINS: usize = 32;
