use std::sync::Arc;

use ndarray::Array2;
use tracing::debug;

use crate::colorscale::{ColorScale, Colormap, Normalization};
use crate::config::ImshowConfig;
use crate::error::Result;
use crate::geometry::{Bounds, CoordinateFrame};
use crate::scene::{ArtistKind, AxesId};
use crate::sequence::Sequence;

use super::{time_label, PanelContext, PanelCore, SourceView};

const IMAGE_ZORDER: i32 = 0;
const ARROW_ZORDER: i32 = 5;
const TEXT_ZORDER: i32 = 20;
const ARROW_COLOR: [u8; 4] = [20, 20, 20, 255];

/// A sequence of frames shown as an image, reoriented through a
/// coordinate frame.
pub struct ImshowPanel {
    pub(super) core: PanelCore,
    sequence: Sequence,
    frame: Arc<CoordinateFrame>,
    config: ImshowConfig,
    own_scale: Option<ColorScale>,
    /// Extent of a frame after the coordinate transform.
    display_bounds: Bounds,
}

impl ImshowPanel {
    /// Fails if the frame chain cannot transform (unsupported orientation).
    pub fn new(
        name: impl Into<String>,
        axes: AxesId,
        sequence: Sequence,
        frame: CoordinateFrame,
        config: ImshowConfig,
    ) -> Result<Self> {
        let raw = Bounds::from_shape(sequence.shape());
        let frame = frame.with_bounds(raw);
        let display_bounds = frame.transform_bounds(raw)?;
        Ok(Self {
            core: PanelCore::new(name, axes),
            sequence,
            frame: Arc::new(frame),
            config,
            own_scale: None,
            display_bounds,
        })
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn config(&self) -> &ImshowConfig {
        &self.config
    }

    pub fn display_bounds(&self) -> Bounds {
        self.display_bounds
    }

    /// Processed and reoriented frame at `timestep`; `None` for a data gap.
    pub fn prepared_frame(&self, timestep: usize) -> Result<Option<Array2<f32>>> {
        let Some(raw) = self.sequence.image_at(timestep) else {
            return Ok(None);
        };
        let Some(processed) = self.config.processing.apply(&self.sequence, timestep, raw) else {
            return Ok(None);
        };
        Ok(Some(self.frame.transform_image(&processed)?))
    }

    /// Pixels that decide a colour scale: the first prepared frame, flattened.
    pub fn scale_sample(&self) -> Result<Option<Vec<f32>>> {
        if self.sequence.is_empty() {
            return Ok(None);
        }
        Ok(self.prepared_frame(0)?.map(|a| a.iter().copied().collect()))
    }

    fn resolve_scale(&mut self, ctx: &PanelContext<'_>) -> Result<ColorScale> {
        if let Some(shared) = ctx.shared_scale {
            return Ok(shared.clone());
        }
        if let Some(scale) = &self.own_scale {
            return Ok(scale.clone());
        }
        let scale = match self.scale_sample()? {
            Some(sample) => ColorScale::for_sample(&sample, &self.config.scale),
            None => None,
        };
        let scale = scale.unwrap_or_else(|| {
            ctx.reporter
                .warning(&format!("{}: no finite pixels to scale, using a linear grey scale", self.core.name));
            fallback_scale()
        });
        self.own_scale = Some(scale.clone());
        Ok(scale)
    }

    fn label_for(&self, timestep: usize, offset: f64) -> String {
        let time = self.sequence.times().get(timestep).copied().unwrap_or(0.0);
        time_label(time, timestep, self.sequence.is_synthetic_time(), offset)
    }

    pub fn initialize_plot(&mut self, time: Option<f64>, ctx: &mut PanelContext<'_>) -> Result<()> {
        self.core.clear(ctx.figure);

        let title = self.config.title.clone().unwrap_or_else(|| self.core.name.clone());
        if let Some(axes) = ctx.figure.axes_mut(self.core.axes) {
            axes.set_limits(self.display_bounds);
            axes.title = self.config.ingredients.title.then(|| title.clone());
        }

        if self.sequence.is_empty() {
            ctx.reporter
                .warning(&format!("{}: sequence is empty, nothing to draw", self.core.name));
            return Ok(());
        }

        let timestep = time
            .and_then(|t| self.sequence.nearest_timestep(t))
            .unwrap_or(0);
        let ingredients = self.config.ingredients.clone();

        if ingredients.image {
            let scale = self.resolve_scale(ctx)?;
            let data = match self.prepared_frame(timestep)? {
                Some(data) => data,
                None => {
                    ctx.reporter.warning(&format!(
                        "{}: frame {timestep} unavailable, drawing a blank image",
                        self.core.name
                    ));
                    blank(self.display_bounds)
                }
            };
            let id = ctx.figure.add_artist(
                Some(self.core.axes),
                IMAGE_ZORDER,
                ArtistKind::Image {
                    data,
                    scale: scale.clone(),
                    extent: self.display_bounds,
                },
            );
            self.core.elements.insert("image".into(), id);

            if ingredients.colorbar {
                self.core.ensure_colorbar(ctx, &scale);
            }
        }

        if ingredients.time && self.core.show_time_label {
            let id = ctx.figure.add_artist(
                Some(self.core.axes),
                TEXT_ZORDER,
                ArtistKind::Text {
                    text: self.label_for(timestep, ctx.time_offset),
                    anchor: (0.02, 0.95),
                },
            );
            self.core.elements.insert("time".into(), id);
        }

        if ingredients.title {
            let id = ctx.figure.add_artist(
                Some(self.core.axes),
                TEXT_ZORDER,
                ArtistKind::Text {
                    text: title,
                    anchor: (0.5, 1.02),
                },
            );
            self.core.elements.insert("title".into(), id);
        }

        if ingredients.arrows {
            let raw = Bounds::from_shape(self.sequence.shape());
            for (label, start, end) in self.frame.arrows(raw)? {
                let id = ctx.figure.add_artist(
                    Some(self.core.axes),
                    ARROW_ZORDER,
                    ArtistKind::Arrow {
                        label: label.to_string(),
                        start,
                        end,
                        color: ARROW_COLOR,
                    },
                );
                self.core.elements.insert(format!("arrow-{label}"), id);
            }
        }

        self.core.cursor = Some(timestep);
        debug!(panel = %self.core.name, timestep, "imshow initialized");
        Ok(())
    }

    pub fn advance_to(&mut self, time: f64, ctx: &mut PanelContext<'_>) -> Result<bool> {
        let Some(timestep) = self.sequence.nearest_timestep(time) else {
            return Ok(false);
        };
        if self.core.cursor == Some(timestep) {
            return Ok(false);
        }

        if let Some(id) = self.core.element("image") {
            match self.prepared_frame(timestep)? {
                Some(data) => {
                    ctx.figure.set_image(id, data);
                }
                None => {
                    ctx.reporter.warning(&format!(
                        "{}: frame {timestep} unavailable, keeping the previous image",
                        self.core.name
                    ));
                    return Ok(false);
                }
            }
        }
        if let Some(id) = self.core.element("time") {
            ctx.figure.set_text(id, self.label_for(timestep, ctx.time_offset));
        }

        self.core.cursor = Some(timestep);
        Ok(true)
    }

    pub fn source_view(&self) -> Option<SourceView> {
        Some(SourceView {
            axes: self.core.axes,
            image: self.core.element("image"),
            timestep: self.core.cursor,
        })
    }
}

fn blank(bounds: Bounds) -> Array2<f32> {
    Array2::from_elem(
        (bounds.height().max(0.0) as usize, bounds.width().max(0.0) as usize),
        f32::NAN,
    )
}

fn fallback_scale() -> ColorScale {
    ColorScale {
        cmap: Colormap::Gray,
        norm: Normalization::Linear { vmin: 0.0, vmax: 1.0 },
        ticks: vec![0.0, 1.0],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ndarray::Array3;

    use super::*;
    use crate::config::Processing;
    use crate::report::SilentReporter;
    use crate::scene::{Figure, Rect};

    fn panel(figure: &mut Figure, config: ImshowConfig) -> ImshowPanel {
        let cube = Array3::from_shape_fn((3, 4, 6), |(t, r, c)| (1 + t * 100 + r * 10 + c) as f32);
        let sequence = Sequence::from_cube(cube, Some(vec![0.0, 1.0, 2.0])).unwrap();
        let axes = figure.add_axes(Rect::new(0, 0, 60, 40));
        ImshowPanel::new("cam", axes, sequence, CoordinateFrame::identity(), config).unwrap()
    }

    #[test]
    fn per_panel_colorbar_is_created_once() {
        let mut figure = Figure::new(100, 60);
        let mut p = panel(&mut figure, ImshowConfig::default());
        let sources = BTreeMap::new();
        for _ in 0..2 {
            let mut ctx = PanelContext {
                figure: &mut figure,
                reporter: &SilentReporter,
                shared_scale: None,
                shared_colorbar: None,
                colorbar_axes: &[],
                sources: &sources,
                time_offset: 0.0,
            };
            p.initialize_plot(None, &mut ctx).unwrap();
        }
        assert_eq!(figure.colorbar_count(), 1);
    }

    #[test]
    fn mean_subtraction_centres_frames() {
        let mut figure = Figure::new(100, 60);
        let config = ImshowConfig {
            processing: Processing::SubtractMean,
            ..ImshowConfig::default()
        };
        let p = panel(&mut figure, config);
        let frame = p.prepared_frame(1).unwrap().unwrap();
        assert!(frame.iter().all(|v| v.abs() < 1e-3));
    }

    #[test]
    fn hidden_time_label_is_not_drawn() {
        let mut figure = Figure::new(100, 60);
        let mut p = panel(&mut figure, ImshowConfig::default());
        p.core.show_time_label = false;
        let sources = BTreeMap::new();
        let mut ctx = PanelContext {
            figure: &mut figure,
            reporter: &SilentReporter,
            shared_scale: None,
            shared_colorbar: None,
            colorbar_axes: &[],
            sources: &sources,
            time_offset: 0.0,
        };
        p.initialize_plot(Some(2.0), &mut ctx).unwrap();
        assert!(p.core.element("time").is_none());
        assert_eq!(p.core.cursor, Some(2));
    }
}
