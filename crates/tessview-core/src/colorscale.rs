use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_LOWER_PERCENTILE, DEFAULT_SIGMA_MULTIPLE, DEFAULT_UPPER_PERCENTILE, LOG_FLOOR,
    MAD_TO_SIGMA,
};

/// Named colormaps, sampled by piecewise-linear interpolation of anchors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Colormap {
    Blues,
    RdBu,
    Gray,
}

const BLUES: [[u8; 3]; 9] = [
    [0xf7, 0xfb, 0xff],
    [0xde, 0xeb, 0xf7],
    [0xc6, 0xdb, 0xef],
    [0x9e, 0xca, 0xe1],
    [0x6b, 0xae, 0xd6],
    [0x42, 0x92, 0xc6],
    [0x21, 0x71, 0xb5],
    [0x08, 0x51, 0x9c],
    [0x08, 0x30, 0x6b],
];

const RDBU: [[u8; 3]; 11] = [
    [0x67, 0x00, 0x1f],
    [0xb2, 0x18, 0x2b],
    [0xd6, 0x60, 0x4d],
    [0xf4, 0xa5, 0x82],
    [0xfd, 0xdb, 0xc7],
    [0xf7, 0xf7, 0xf7],
    [0xd1, 0xe5, 0xf0],
    [0x92, 0xc5, 0xde],
    [0x43, 0x93, 0xc3],
    [0x21, 0x66, 0xac],
    [0x05, 0x30, 0x61],
];

const GRAY: [[u8; 3]; 2] = [[0, 0, 0], [0xff, 0xff, 0xff]];

impl Colormap {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blues => "Blues",
            Self::RdBu => "RdBu",
            Self::Gray => "gray",
        }
    }

    fn anchors(&self) -> &'static [[u8; 3]] {
        match self {
            Self::Blues => &BLUES,
            Self::RdBu => &RDBU,
            Self::Gray => &GRAY,
        }
    }

    /// Colour at position `t` in `[0, 1]` (clamped).
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let anchors = self.anchors();
        let t = t.clamp(0.0, 1.0) * (anchors.len() - 1) as f64;
        let i = (t.floor() as usize).min(anchors.len() - 2);
        let frac = t - i as f64;
        let (a, b) = (anchors[i], anchors[i + 1]);
        let mix = |c: usize| (a[c] as f64 + (b[c] as f64 - a[c] as f64) * frac).round() as u8;
        [mix(0), mix(1), mix(2)]
    }
}

/// Maps data values onto `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Normalization {
    Linear { vmin: f64, vmax: f64 },
    Log { vmin: f64, vmax: f64 },
    /// Zero-centred: linear within `linthresh` of zero, logarithmic beyond.
    SymLog { linthresh: f64, vmin: f64, vmax: f64 },
}

impl Normalization {
    pub fn vmin(&self) -> f64 {
        match *self {
            Self::Linear { vmin, .. } | Self::Log { vmin, .. } | Self::SymLog { vmin, .. } => vmin,
        }
    }

    pub fn vmax(&self) -> f64 {
        match *self {
            Self::Linear { vmax, .. } | Self::Log { vmax, .. } | Self::SymLog { vmax, .. } => vmax,
        }
    }

    /// Normalized position of `value`, clipped to `[0, 1]`; `None` for NaN.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        let t = match *self {
            Self::Linear { vmin, vmax } => ratio(value - vmin, vmax - vmin),
            Self::Log { vmin, vmax } => {
                if value <= 0.0 {
                    0.0
                } else {
                    ratio(value.log10() - vmin.log10(), vmax.log10() - vmin.log10())
                }
            }
            Self::SymLog { linthresh, vmin, vmax } => {
                let f = |v: f64| symlog(v, linthresh);
                ratio(f(value) - f(vmin), f(vmax) - f(vmin))
            }
        };
        Some(t.clamp(0.0, 1.0))
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den.abs() < f64::EPSILON {
        0.5
    } else {
        num / den
    }
}

fn symlog(v: f64, linthresh: f64) -> f64 {
    let a = v.abs();
    let mag = if a <= linthresh {
        a / linthresh
    } else {
        1.0 + (a / linthresh).log10()
    };
    mag.copysign(v)
}

/// Knobs of the automatic colour-scale policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleParams {
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    /// Width of the linear region of a diverging scale, in robust sigmas.
    pub sigma_multiple: f64,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self {
            lower_percentile: DEFAULT_LOWER_PERCENTILE,
            upper_percentile: DEFAULT_UPPER_PERCENTILE,
            sigma_multiple: DEFAULT_SIGMA_MULTIPLE,
        }
    }
}

/// A colormap, a normalization and colorbar tick values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub cmap: Colormap,
    pub norm: Normalization,
    pub ticks: Vec<f64>,
}

impl ColorScale {
    /// Choose a scale for `values`.
    ///
    /// Any negative value selects a diverging, zero-centred symlog scale on
    /// `RdBu`; otherwise a log scale on `Blues` between the clipping
    /// percentiles. Non-finite values are ignored; `None` if nothing is left.
    pub fn for_sample(values: &[f32], params: &ScaleParams) -> Option<Self> {
        let mut finite: Vec<f64> = values
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| v as f64)
            .collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);
        let lo = percentile(&finite, params.lower_percentile);
        let hi = percentile(&finite, params.upper_percentile);

        if finite[0] < 0.0 {
            let vlim = lo.abs().max(hi.abs()).max(LOG_FLOOR);
            let sigma = robust_std(&finite);
            let linthresh = (params.sigma_multiple * sigma).clamp(LOG_FLOOR, vlim);
            let mut ticks = vec![-vlim, -linthresh, 0.0, linthresh, vlim];
            ticks.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON * vlim);
            Some(Self {
                cmap: Colormap::RdBu,
                norm: Normalization::SymLog {
                    linthresh,
                    vmin: -vlim,
                    vmax: vlim,
                },
                ticks,
            })
        } else {
            let vmin = lo.max(LOG_FLOOR);
            let vmax = if hi > vmin { hi } else { vmin * 10.0 };
            Some(Self {
                cmap: Colormap::Blues,
                norm: Normalization::Log { vmin, vmax },
                ticks: log_ticks(vmin, vmax),
            })
        }
    }

    /// RGBA for one value; NaN is fully transparent.
    pub fn rgba(&self, value: f32) -> [u8; 4] {
        match self.norm.normalize(value as f64) {
            Some(t) => {
                let [r, g, b] = self.cmap.sample(t);
                [r, g, b, 255]
            }
            None => [0, 0, 0, 0],
        }
    }
}

fn log_ticks(vmin: f64, vmax: f64) -> Vec<f64> {
    let mut ticks = vec![vmin];
    let first = vmin.log10().floor() as i32 + 1;
    let last = vmax.log10().ceil() as i32 - 1;
    for k in first..=last {
        let t = 10f64.powi(k);
        if t > vmin && t < vmax {
            ticks.push(t);
        }
    }
    ticks.push(vmax);
    ticks
}

/// Percentile of sorted data with linear interpolation between ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let i = rank.floor() as usize;
            let j = (i + 1).min(n - 1);
            let frac = rank - i as f64;
            sorted[i] + (sorted[j] - sorted[i]) * frac
        }
    }
}

/// Gaussian-equivalent scatter from the median absolute deviation.
pub fn robust_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = percentile(&sorted, 50.0);
    let mut deviations: Vec<f64> = sorted.iter().map(|v| (v - median).abs()).collect();
    deviations.sort_by(f64::total_cmp);
    MAD_TO_SIGMA * percentile(&deviations, 50.0)
}
