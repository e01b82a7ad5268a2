use crate::config::TimeseriesConfig;
use crate::consts::{HISTOGRAM_BINS, TIME_EPSILON};
use crate::error::Result;
use crate::geometry::Bounds;
use crate::scene::{ArtistId, ArtistKind, AxesId, Figure};
use crate::sequence::LightCurve;

use super::{PanelContext, PanelCore};

const HISTOGRAM_COLOR: [u8; 4] = [120, 120, 120, 255];

/// Light curves against time with a marker at the displayed time.
pub struct TimeseriesPanel {
    pub(super) core: PanelCore,
    config: TimeseriesConfig,
    /// Plotted curves and their artists; kept across re-initialization.
    series: Vec<(LightCurve, ArtistId)>,
    histogram_axes: Option<AxesId>,
    histogram: Option<ArtistId>,
    marker_time: Option<f64>,
}

impl TimeseriesPanel {
    pub fn new(name: impl Into<String>, axes: AxesId, config: TimeseriesConfig) -> Self {
        Self {
            core: PanelCore::new(name, axes),
            config,
            series: Vec::new(),
            histogram_axes: None,
            histogram: None,
            marker_time: None,
        }
    }

    /// Sibling axes for the marginal histogram.
    pub fn with_histogram_axes(mut self, axes: AxesId) -> Self {
        self.histogram_axes = Some(axes);
        self
    }

    pub fn config(&self) -> &TimeseriesConfig {
        &self.config
    }

    pub fn histogram_axes(&self) -> Option<AxesId> {
        self.histogram_axes
    }

    pub fn marker_time(&self) -> Option<f64> {
        self.marker_time
    }

    pub fn series(&self) -> impl Iterator<Item = &LightCurve> {
        self.series.iter().map(|(lc, _)| lc)
    }

    /// Times of every plotted curve, unsorted.
    pub fn times(&self) -> Vec<f64> {
        self.series
            .iter()
            .flat_map(|(lc, _)| lc.time.iter().copied())
            .filter(|t| t.is_finite())
            .collect()
    }

    /// Add a curve and rescale the axes to everything plotted so far.
    pub fn plot_series(&mut self, figure: &mut Figure, lightcurve: LightCurve) {
        let points: Vec<(f64, f64)> = lightcurve
            .time
            .iter()
            .zip(&lightcurve.flux)
            .filter(|(t, f)| t.is_finite() && f.is_finite())
            .map(|(&t, &f)| (t, f))
            .collect();
        let id = figure.add_artist(
            Some(self.core.axes),
            1,
            ArtistKind::Polyline {
                points,
                color: self.config.line_color,
            },
        );
        self.series.push((lightcurve, id));

        if let Some(limits) = self.data_limits() {
            if let Some(axes) = figure.axes_mut(self.core.axes) {
                axes.set_limits(limits);
            }
        }
        if self.histogram_axes.is_some() {
            self.refresh_histogram(figure);
        }
    }

    fn flux_values(&self) -> Vec<f64> {
        self.series
            .iter()
            .flat_map(|(lc, _)| lc.flux.iter().copied())
            .filter(|f| f.is_finite())
            .collect()
    }

    fn data_limits(&self) -> Option<Bounds> {
        let times = self.times();
        let flux = self.flux_values();
        let (tmin, tmax) = min_max(&times)?;
        let (fmin, fmax) = min_max(&flux)?;
        let pad = if fmax > fmin { 0.05 * (fmax - fmin) } else { 1.0 };
        Some(Bounds {
            xmin: tmin,
            xmax: if tmax > tmin { tmax } else { tmin + 1.0 },
            ymin: fmin - pad,
            ymax: fmax + pad,
        })
    }

    /// Redraw the marginal distribution of all plotted flux values.
    pub fn refresh_histogram(&mut self, figure: &mut Figure) {
        let Some(axes_id) = self.histogram_axes else {
            return;
        };
        let values = self.flux_values();
        let Some((lo, hi)) = min_max(&values) else {
            return;
        };
        let (edges, counts) = histogram(&values, lo, hi, HISTOGRAM_BINS);
        let peak = counts.iter().copied().fold(0.0, f64::max).max(1.0);

        let ylim = figure
            .axes(self.core.axes)
            .map(|a| a.ylim)
            .unwrap_or((lo, hi));
        if let Some(axes) = figure.axes_mut(axes_id) {
            axes.set_limits(Bounds {
                xmin: 0.0,
                xmax: peak,
                ymin: ylim.0,
                ymax: ylim.1,
            });
        }

        match self.histogram {
            Some(id) if figure.set_bars(id, edges.clone(), counts.clone()) => {}
            _ => {
                self.histogram = Some(figure.add_artist(
                    Some(axes_id),
                    1,
                    ArtistKind::Bars {
                        edges,
                        counts,
                        color: HISTOGRAM_COLOR,
                    },
                ));
            }
        }
    }

    pub fn initialize_plot(&mut self, time: Option<f64>, ctx: &mut PanelContext<'_>) -> Result<()> {
        self.core.clear(ctx.figure);
        self.marker_time = None;

        if let Some(axes) = ctx.figure.axes_mut(self.core.axes) {
            axes.title = self.config.title.clone();
        }
        if self.series.is_empty() {
            ctx.reporter
                .info(&format!("{}: no light curves plotted yet", self.core.name));
        }

        let start = time.or_else(|| {
            self.times()
                .into_iter()
                .min_by(f64::total_cmp)
        });
        if let Some(t) = start {
            let id = ctx.figure.add_artist(
                Some(self.core.axes),
                15,
                ArtistKind::VLine {
                    x: t,
                    color: self.config.marker_color,
                },
            );
            self.core.elements.insert("marker".into(), id);
            self.marker_time = Some(t);
        }

        if self.histogram_axes.is_some() {
            self.refresh_histogram(ctx.figure);
        }
        Ok(())
    }

    /// Sweep the marker to `time`.
    pub fn advance_to(&mut self, time: f64, ctx: &mut PanelContext<'_>) -> Result<bool> {
        if self
            .marker_time
            .is_some_and(|current| (current - time).abs() <= TIME_EPSILON)
        {
            return Ok(false);
        }
        match self.core.element("marker") {
            Some(id) => {
                ctx.figure.set_vline(id, time);
            }
            None => {
                let id = ctx.figure.add_artist(
                    Some(self.core.axes),
                    15,
                    ArtistKind::VLine {
                        x: time,
                        color: self.config.marker_color,
                    },
                );
                self.core.elements.insert("marker".into(), id);
            }
        }
        self.marker_time = Some(time);
        Ok(true)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn histogram(values: &[f64], lo: f64, hi: f64, bins: usize) -> (Vec<f64>, Vec<f64>) {
    let bins = bins.max(1);
    let span = if hi > lo { hi - lo } else { 1.0 };
    let edges: Vec<f64> = (0..=bins).map(|i| lo + span * i as f64 / bins as f64).collect();
    let mut counts = vec![0.0; bins];
    for &v in values {
        let i = (((v - lo) / span) * bins as f64) as usize;
        counts[i.min(bins - 1)] += 1.0;
    }
    (edges, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_value() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0];
        let (edges, counts) = histogram(&values, 0.0, 1.0, 4);
        assert_eq!(edges.len(), 5);
        assert_eq!(counts.iter().sum::<f64>(), 5.0);
        assert_eq!(counts[3], 2.0);
    }

    #[test]
    fn plotting_rescales_axes() {
        let mut figure = Figure::new(200, 100);
        let axes = figure.add_axes(crate::scene::Rect::new(0, 0, 200, 100));
        let hist = figure.add_axes(crate::scene::Rect::new(150, 0, 50, 100));
        let mut panel = TimeseriesPanel::new("lc", axes, TimeseriesConfig::default())
            .with_histogram_axes(hist);
        panel.plot_series(&mut figure, LightCurve::new(vec![1.0, 2.0, 3.0], vec![5.0, 6.0, 7.0]));
        let limits = figure.axes(axes).unwrap().limits();
        assert_eq!((limits.xmin, limits.xmax), (1.0, 3.0));
        assert!(limits.ymin < 5.0 && limits.ymax > 7.0);
        assert!(panel.histogram.is_some());
    }
}
