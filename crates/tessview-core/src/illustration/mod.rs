//! Multi-panel figures sharing a clock, a colour scale and a colorbar.

pub mod layouts;
pub mod scene;
mod timegrid;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info};

use crate::colorscale::ColorScale;
use crate::config::{AnimationOptions, IllustrationConfig};
use crate::consts::TIME_EPSILON;
use crate::encode::writer_for_path;
use crate::error::{Result, TessviewError};
use crate::geometry::Orientation;
use crate::panel::{Panel, PanelContext, SourceView};
use crate::report::Reporter;
use crate::scene::{ArtistId, AxesId, Figure};
use crate::sequence::LightCurve;

pub use layouts::{ImageInput, TimeseriesInput, ZoomInput};
pub use scene::{build_from_scene, read_lightcurve};
pub use timegrid::{min_positive_gap, TimeGrid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlotState {
    Constructed,
    Plotted,
}

/// A grid of panels drawn into one figure.
///
/// Panels are plotted and updated in registration order, so a zoom always
/// reads the image its source drew in the same pass.
pub struct Illustration {
    figure: Figure,
    panels: Vec<Panel>,
    config: IllustrationConfig,
    orientation: Orientation,
    reporter: Arc<dyn Reporter>,
    shared_scale: Option<ColorScale>,
    shared_colorbar: Option<ArtistId>,
    colorbar_axes: Vec<AxesId>,
    views: BTreeMap<String, SourceView>,
    time_offset: f64,
    state: PlotState,
}

impl Illustration {
    /// Validate the panel set and wire shared state.
    ///
    /// Panel names must be unique and every zoom's source must be an image
    /// panel registered before it.
    pub fn new(
        figure: Figure,
        mut panels: Vec<Panel>,
        config: IllustrationConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let orientation = config.orientation()?;

        let mut seen: BTreeSet<String> = BTreeSet::new();
        for panel in &panels {
            if let Panel::Zoom(zoom) = panel {
                if !seen.contains(zoom.source()) {
                    if panels.iter().any(|p| p.name() == zoom.source()) {
                        return Err(TessviewError::Config(format!(
                            "zoom '{}' must be registered after its source '{}'",
                            panel.name(),
                            zoom.source()
                        )));
                    }
                    return Err(TessviewError::UnknownPanel(zoom.source().to_string()));
                }
                let source_is_image = panels
                    .iter()
                    .any(|p| p.name() == zoom.source() && p.is_image_bearing());
                if !source_is_image {
                    return Err(TessviewError::Config(format!(
                        "zoom '{}' needs an image panel as source, '{}' is not one",
                        panel.name(),
                        zoom.source()
                    )));
                }
            }
            if !seen.insert(panel.name().to_string()) {
                return Err(TessviewError::Config(format!(
                    "duplicate panel name '{}'",
                    panel.name()
                )));
            }
        }

        let colorbar_axes = panels
            .iter()
            .filter(|p| p.is_image_bearing())
            .map(|p| p.core().axes)
            .collect();

        let time_offset = panels
            .iter()
            .filter(|p| !p.has_synthetic_time())
            .flat_map(|p| p.times())
            .filter(|t| t.is_finite())
            .min_by(f64::total_cmp)
            .map_or(0.0, f64::floor);

        if config.condense_time_labels {
            condense_time_labels(&figure, &mut panels);
        }

        Ok(Self {
            figure,
            panels,
            config,
            orientation,
            reporter,
            shared_scale: None,
            shared_colorbar: None,
            colorbar_axes,
            views: BTreeMap::new(),
            time_offset,
            state: PlotState::Constructed,
        })
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn config(&self) -> &IllustrationConfig {
        &self.config
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, name: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.name() == name)
    }

    pub fn panel_mut(&mut self, name: &str) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.name() == name)
    }

    pub fn state(&self) -> PlotState {
        self.state
    }

    /// Subtracted from displayed times: the floor of the earliest real
    /// (non-index) time of any panel.
    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }

    pub fn shared_scale(&self) -> Option<&ColorScale> {
        self.shared_scale.as_ref()
    }

    pub fn shared_colorbar(&self) -> Option<ArtistId> {
        self.shared_colorbar
    }

    /// Compute the shared scale from every image panel's first processed
    /// frame, once.
    fn ensure_shared_scale(&mut self) -> Result<()> {
        if !self.config.share_colorscale || self.shared_scale.is_some() {
            return Ok(());
        }
        let mut sample: Vec<f32> = Vec::new();
        for panel in &self.panels {
            let Panel::Imshow(imshow) = panel else {
                continue;
            };
            if !panel.is_image_bearing() {
                continue;
            }
            match imshow.scale_sample()? {
                Some(values) => sample.extend(values),
                None => self.reporter.warning(&format!(
                    "{}: no data available for the shared colour scale",
                    panel.name()
                )),
            }
        }
        self.shared_scale = ColorScale::for_sample(&sample, &self.config.scale);
        match &self.shared_scale {
            Some(scale) => debug!(cmap = scale.cmap.name(), "shared colour scale computed"),
            None => self
                .reporter
                .warning("no finite pixels for the shared colour scale; panels scale themselves"),
        }
        Ok(())
    }

    /// Run `step` on every panel in order with a freshly assembled context,
    /// publishing each image panel's view before the next panel runs.
    fn drive<F>(&mut self, mut step: F) -> Result<usize>
    where
        F: FnMut(&mut Panel, &mut PanelContext<'_>) -> Result<bool>,
    {
        let Self {
            figure,
            panels,
            config,
            reporter,
            shared_scale,
            shared_colorbar,
            colorbar_axes,
            views,
            time_offset,
            ..
        } = self;

        let mut changed = 0;
        for panel in panels.iter_mut() {
            let mut ctx = PanelContext {
                figure: &mut *figure,
                reporter: &**reporter,
                shared_scale: if config.share_colorscale {
                    shared_scale.as_ref()
                } else {
                    None
                },
                shared_colorbar: if config.share_colorbar {
                    Some(&mut *shared_colorbar)
                } else {
                    None
                },
                colorbar_axes: colorbar_axes.as_slice(),
                sources: &*views,
                time_offset: *time_offset,
            };
            if step(panel, &mut ctx)? {
                changed += 1;
            }
            if let Some(view) = panel.source_view() {
                views.insert(panel.name().to_string(), view);
            }
        }
        Ok(changed)
    }

    /// Draw every panel from scratch at its first frame.
    pub fn plot(&mut self) -> Result<()> {
        self.plot_at(None)
    }

    /// Draw every panel from scratch at `time` (or the first frame).
    pub fn plot_at(&mut self, time: Option<f64>) -> Result<()> {
        self.ensure_shared_scale()?;
        self.views.clear();
        self.drive(|panel, ctx| panel.initialize_plot(time, ctx).map(|_| true))?;
        self.state = PlotState::Plotted;
        info!(panels = self.panels.len(), "illustration plotted");
        Ok(())
    }

    /// Move every panel to `time`. Returns the number of panels that
    /// redrew anything.
    pub fn update(&mut self, time: f64) -> Result<usize> {
        if self.state != PlotState::Plotted {
            return Err(TessviewError::Config(
                "update() called before plot()".into(),
            ));
        }
        self.drive(|panel, ctx| panel.advance_to(time, ctx))
    }

    /// Reconcile every panel's native times into one grid.
    pub fn resolve_time_grid(&self, round: Option<f64>) -> TimeGrid {
        TimeGrid::resolve(self.panels.iter().flat_map(|p| p.times()), round)
    }

    /// Add a light curve to the timeseries panel `name`.
    pub fn plot_series(&mut self, name: &str, lightcurve: LightCurve) -> Result<()> {
        let Self { figure, panels, .. } = self;
        match panels.iter_mut().find(|p| p.name() == name) {
            Some(Panel::Timeseries(panel)) => {
                panel.plot_series(figure, lightcurve);
                Ok(())
            }
            Some(other) => Err(TessviewError::Config(format!(
                "panel '{name}' is a {} panel, not a timeseries",
                other.kind()
            ))),
            None => Err(TessviewError::UnknownPanel(name.to_string())),
        }
    }

    /// Rasterize the current state, plotting first if needed.
    pub fn render(&mut self) -> Result<RgbaImage> {
        if self.state != PlotState::Plotted {
            self.plot()?;
        }
        Ok(self.figure.render())
    }

    /// Save a still, plotting first if needed.
    pub fn savefig(&mut self, path: &Path) -> Result<()> {
        if self.state != PlotState::Plotted {
            self.plot()?;
        }
        self.figure.savefig(path)
    }

    pub fn animate(&mut self, path: &Path, options: &AnimationOptions) -> Result<usize> {
        self.animate_with_progress(path, options, |_, _| {})
    }

    /// Render one frame per animation time into a movie at `path`.
    ///
    /// The writer is chosen from the extension before anything is drawn, so
    /// a missing encoder fails fast. Returns the number of frames written.
    pub fn animate_with_progress<F>(
        &mut self,
        path: &Path,
        options: &AnimationOptions,
        mut progress: F,
    ) -> Result<usize>
    where
        F: FnMut(usize, usize),
    {
        let mut writer = writer_for_path(path, self.figure.width, self.figure.height, options.fps)?;
        if self.state != PlotState::Plotted {
            self.plot()?;
        }

        let grid = self.resolve_time_grid(None);
        let times = animation_times(&grid, options);
        if times.is_empty() {
            self.reporter.warning("no times to animate over");
        }

        let total = times.len();
        for (i, &time) in times.iter().enumerate() {
            self.update(time)?;
            writer.write_frame(&self.figure.render())?;
            progress(i + 1, total);
        }
        writer.finish()?;
        info!(frames = total, path = %path.display(), "animation written");
        Ok(total)
    }
}

/// Times an animation steps through: from `mintime` (or the first grid time)
/// over `maxtimespan` (or to the last grid time), at `cadence` or the grid's
/// own cadence; grid times when no cadence is known.
pub fn animation_times(grid: &TimeGrid, options: &AnimationOptions) -> Vec<f64> {
    let (Some(first), Some(last)) = (grid.first(), grid.last()) else {
        return Vec::new();
    };
    let lower = options.mintime.unwrap_or(first);
    let upper = options.maxtimespan.map_or(last, |span| lower + span);
    if upper < lower {
        return Vec::new();
    }
    match options.cadence.filter(|c| *c > 0.0).or(grid.cadence) {
        Some(step) => {
            let steps = ((upper - lower) / step + TIME_EPSILON).floor() as usize;
            (0..=steps).map(|k| lower + k as f64 * step).collect()
        }
        None => grid
            .times
            .iter()
            .copied()
            .filter(|t| *t >= lower - TIME_EPSILON && *t <= upper + TIME_EPSILON)
            .collect(),
    }
}

/// Keep the time label only on the lowest, then left-most, panel that
/// draws one.
fn condense_time_labels(figure: &Figure, panels: &mut [Panel]) {
    let keeper = panels
        .iter()
        .enumerate()
        .filter(|(_, p)| p.draws_time_label())
        .filter_map(|(i, p)| figure.axes(p.core().axes).map(|a| (i, a.rect)))
        .max_by(|(_, a), (_, b)| a.bottom().cmp(&b.bottom()).then(b.x.cmp(&a.x)))
        .map(|(i, _)| i);
    for (i, panel) in panels.iter_mut().enumerate() {
        if panel.draws_time_label() {
            panel.core_mut().show_time_label = Some(i) == keeper;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(times: &[f64], cadence: Option<f64>) -> TimeGrid {
        TimeGrid {
            times: times.to_vec(),
            cadence,
        }
    }

    #[test]
    fn animation_steps_at_grid_cadence() {
        let times = animation_times(&grid(&[0.0, 2.0, 4.0, 6.0, 8.0], Some(2.0)), &AnimationOptions::default());
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn animation_window_is_honoured() {
        let options = AnimationOptions {
            mintime: Some(2.0),
            maxtimespan: Some(3.0),
            cadence: Some(1.0),
            ..AnimationOptions::default()
        };
        let times = animation_times(&grid(&[0.0, 10.0], Some(10.0)), &options);
        assert_eq!(times, vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn single_time_without_cadence() {
        let times = animation_times(&grid(&[5.0], None), &AnimationOptions::default());
        assert_eq!(times, vec![5.0]);
    }
}
