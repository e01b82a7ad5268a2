//! Display panels: one axes, one data source, one update cursor.
//!
//! Panels draw into a shared [`Figure`] through a [`PanelContext`] that the
//! owning illustration assembles for each call. `initialize_plot` draws from
//! scratch; `advance_to` mutates already-drawn artists in place and does
//! nothing when the displayed timestep would not change.

mod imshow;
mod processing;
mod timeseries;
mod zoom;

use std::collections::BTreeMap;

use crate::colorscale::ColorScale;
use crate::error::Result;
use crate::report::Reporter;
use crate::scene::{ArtistId, ArtistKind, AxesId, Figure, Rect};

pub use imshow::ImshowPanel;
pub use timeseries::TimeseriesPanel;
pub use zoom::ZoomPanel;

/// Where a zoom panel can find its source's current display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceView {
    pub axes: AxesId,
    /// `None` while the source has nothing drawn, e.g. an empty sequence.
    pub image: Option<ArtistId>,
    pub timestep: Option<usize>,
}

/// Shared state handed to a panel for one plot/update call.
pub struct PanelContext<'a> {
    pub figure: &'a mut Figure,
    pub reporter: &'a dyn Reporter,
    /// Illustration-wide scale; `None` when each panel scales itself.
    pub shared_scale: Option<&'a ColorScale>,
    /// Illustration-wide colorbar slot; `None` when colorbars are per panel.
    pub shared_colorbar: Option<&'a mut Option<ArtistId>>,
    /// Axes a shared colorbar is attached to.
    pub colorbar_axes: &'a [AxesId],
    /// Views of panels registered earlier in the same pass.
    pub sources: &'a BTreeMap<String, SourceView>,
    /// Subtracted from displayed times.
    pub time_offset: f64,
}

/// State every panel kind carries.
#[derive(Clone, Debug)]
pub struct PanelCore {
    pub name: String,
    pub axes: AxesId,
    /// Currently displayed timestep.
    pub cursor: Option<usize>,
    /// Artists drawn by `initialize_plot`, by role.
    pub elements: BTreeMap<String, ArtistId>,
    /// Cleared by time-label condensation.
    pub show_time_label: bool,
    /// Per-panel colorbar; survives re-plots.
    pub colorbar: Option<ArtistId>,
}

impl PanelCore {
    pub fn new(name: impl Into<String>, axes: AxesId) -> Self {
        Self {
            name: name.into(),
            axes,
            cursor: None,
            elements: BTreeMap::new(),
            show_time_label: true,
            colorbar: None,
        }
    }

    /// Remove everything this panel drew (except its colorbar).
    pub fn clear(&mut self, figure: &mut Figure) {
        for (_, id) in std::mem::take(&mut self.elements) {
            figure.remove(id);
        }
        self.cursor = None;
    }

    pub fn element(&self, role: &str) -> Option<ArtistId> {
        self.elements.get(role).copied()
    }

    /// Create the colorbar for `scale` unless one already exists, either the
    /// illustration's shared one or this panel's own.
    pub fn ensure_colorbar(&mut self, ctx: &mut PanelContext<'_>, scale: &ColorScale) {
        match ctx.shared_colorbar.as_deref_mut() {
            Some(slot) => {
                if slot.is_none() {
                    let axes: Vec<AxesId> = if ctx.colorbar_axes.is_empty() {
                        vec![self.axes]
                    } else {
                        ctx.colorbar_axes.to_vec()
                    };
                    *slot = add_colorbar(ctx.figure, scale, axes);
                }
            }
            None => {
                if self.colorbar.is_none() {
                    self.colorbar = add_colorbar(ctx.figure, scale, vec![self.axes]);
                }
            }
        }
    }
}

/// Strip to the right of the union of `axes`.
fn add_colorbar(figure: &mut Figure, scale: &ColorScale, axes: Vec<AxesId>) -> Option<ArtistId> {
    let union = axes
        .iter()
        .filter_map(|id| figure.axes(*id).map(|a| a.rect))
        .reduce(|a, b| a.union(&b))?;
    let rect = Rect::new(union.right() + 6, union.y, 10, union.height);
    Some(figure.add_artist(
        None,
        0,
        ArtistKind::Colorbar {
            scale: scale.clone(),
            axes,
            rect,
        },
    ))
}

/// Label for a displayed time. Synthetic axes show the frame index.
pub fn time_label(time: f64, timestep: usize, synthetic: bool, offset: f64) -> String {
    if synthetic {
        format!("i = {timestep}")
    } else if offset != 0.0 {
        format!("{offset:.0} + {:.5}", time - offset)
    } else {
        format!("{time:.5}")
    }
}

/// One display unit.
pub enum Panel {
    Imshow(ImshowPanel),
    Zoom(ZoomPanel),
    Timeseries(TimeseriesPanel),
}

impl Panel {
    pub fn core(&self) -> &PanelCore {
        match self {
            Panel::Imshow(p) => &p.core,
            Panel::Zoom(p) => &p.core,
            Panel::Timeseries(p) => &p.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut PanelCore {
        match self {
            Panel::Imshow(p) => &mut p.core,
            Panel::Zoom(p) => &mut p.core,
            Panel::Timeseries(p) => &mut p.core,
        }
    }

    pub fn name(&self) -> &str {
        &self.core().name
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Panel::Imshow(_) => "imshow",
            Panel::Zoom(_) => "zoom",
            Panel::Timeseries(_) => "timeseries",
        }
    }

    /// Draw from scratch at `time` (or the first frame).
    pub fn initialize_plot(&mut self, time: Option<f64>, ctx: &mut PanelContext<'_>) -> Result<()> {
        match self {
            Panel::Imshow(p) => p.initialize_plot(time, ctx),
            Panel::Zoom(p) => p.initialize_plot(ctx),
            Panel::Timeseries(p) => p.initialize_plot(time, ctx),
        }
    }

    /// Move to `time`. Returns whether anything was redrawn.
    pub fn advance_to(&mut self, time: f64, ctx: &mut PanelContext<'_>) -> Result<bool> {
        match self {
            Panel::Imshow(p) => p.advance_to(time, ctx),
            Panel::Zoom(p) => p.advance_to(ctx),
            Panel::Timeseries(p) => p.advance_to(time, ctx),
        }
    }

    /// Native times of the panel's data.
    pub fn times(&self) -> Vec<f64> {
        match self {
            Panel::Imshow(p) => p.sequence().times().to_vec(),
            Panel::Zoom(_) => Vec::new(),
            Panel::Timeseries(p) => p.times(),
        }
    }

    /// True if the panel's time axis is a frame index rather than real time.
    pub fn has_synthetic_time(&self) -> bool {
        match self {
            Panel::Imshow(p) => p.sequence().is_synthetic_time(),
            _ => false,
        }
    }

    /// Panels whose image takes part in shared scales and colorbars.
    pub fn is_image_bearing(&self) -> bool {
        matches!(self, Panel::Imshow(p) if p.config().ingredients.image)
    }

    pub fn draws_time_label(&self) -> bool {
        matches!(self, Panel::Imshow(p) if p.config().ingredients.time)
    }

    /// What a zoom panel cut from this panel would read.
    pub fn source_view(&self) -> Option<SourceView> {
        match self {
            Panel::Imshow(p) => p.source_view(),
            _ => None,
        }
    }
}
