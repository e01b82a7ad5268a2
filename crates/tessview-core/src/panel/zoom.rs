use ndarray::Array2;

use crate::colorscale::ColorScale;
use crate::config::ZoomConfig;
use crate::consts::OUTLINE_ZORDER;
use crate::error::{Result, TessviewError};
use crate::geometry::Bounds;
use crate::scene::{ArtistId, ArtistKind, AxesId, Figure};

use super::{PanelContext, PanelCore, SourceView};

/// A magnified cutout of another image panel.
pub struct ZoomPanel {
    pub(super) core: PanelCore,
    config: ZoomConfig,
    /// Position among the illustration's zooms; orders outlines.
    registration: usize,
}

impl ZoomPanel {
    pub fn new(name: impl Into<String>, axes: AxesId, config: ZoomConfig, registration: usize) -> Self {
        Self {
            core: PanelCore::new(name, axes),
            config,
            registration,
        }
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn source(&self) -> &str {
        &self.config.source
    }

    /// Integer-aligned box of `size` centred on `position`.
    pub fn cutout_bounds(&self) -> Bounds {
        let (w, h) = self.config.size;
        let (cx, cy) = self.config.position;
        let x0 = (cx - w as f64 / 2.0).round();
        let y0 = (cy - h as f64 / 2.0).round();
        Bounds {
            xmin: x0,
            xmax: x0 + w as f64,
            ymin: y0,
            ymax: y0 + h as f64,
        }
    }

    fn source_view(&self, ctx: &PanelContext<'_>) -> Result<SourceView> {
        ctx.sources
            .get(&self.config.source)
            .copied()
            .ok_or_else(|| TessviewError::UnknownPanel(self.config.source.clone()))
    }

    pub fn initialize_plot(&mut self, ctx: &mut PanelContext<'_>) -> Result<()> {
        self.core.clear(ctx.figure);
        let view = self.source_view(ctx)?;
        let bounds = self.cutout_bounds();

        if let Some(axes) = ctx.figure.axes_mut(self.core.axes) {
            axes.set_limits(bounds);
            axes.title = self.config.title.clone();
        }

        let outline = ctx.figure.add_artist(
            Some(view.axes),
            OUTLINE_ZORDER + self.registration as i32,
            ArtistKind::Outline {
                bounds,
                color: self.config.outline_color,
            },
        );
        self.core.elements.insert("outline".into(), outline);

        let Some((source, scale, extent)) = view.image.and_then(|id| image_parts(ctx.figure, id)) else {
            ctx.reporter.warning(&format!(
                "{}: source '{}' has no image to zoom into",
                self.core.name, self.config.source
            ));
            return Ok(());
        };
        let data = cutout(&source, &extent, &bounds);
        let image = ctx.figure.add_artist(
            Some(self.core.axes),
            0,
            ArtistKind::Image {
                data,
                scale,
                extent: bounds,
            },
        );
        self.core.elements.insert("image".into(), image);
        self.core.cursor = view.timestep;
        Ok(())
    }

    /// Re-cut when the source has moved to another timestep.
    pub fn advance_to(&mut self, ctx: &mut PanelContext<'_>) -> Result<bool> {
        let view = self.source_view(ctx)?;
        if view.timestep == self.core.cursor {
            return Ok(false);
        }
        let Some(id) = self.core.element("image") else {
            return Ok(false);
        };
        let Some((source, _, extent)) = view.image.and_then(|id| image_parts(ctx.figure, id)) else {
            return Ok(false);
        };
        let bounds = self.cutout_bounds();
        ctx.figure.set_image_extent(id, cutout(&source, &extent, &bounds), bounds);
        self.core.cursor = view.timestep;
        Ok(true)
    }
}

fn image_parts(figure: &Figure, id: ArtistId) -> Option<(Array2<f32>, ColorScale, Bounds)> {
    match &figure.artist(id)?.kind {
        ArtistKind::Image { data, scale, extent } => Some((data.clone(), scale.clone(), *extent)),
        _ => None,
    }
}

/// Copy the pixels of `source` (spanning `extent`) that fall inside `region`.
/// Pixels outside the source are NaN.
fn cutout(source: &Array2<f32>, extent: &Bounds, region: &Bounds) -> Array2<f32> {
    let (rows, cols) = source.dim();
    let w = region.width().max(0.0) as usize;
    let h = region.height().max(0.0) as usize;
    let col0 = (region.xmin - extent.xmin) as i64;
    let row0 = (region.ymin - extent.ymin) as i64;
    Array2::from_shape_fn((h, w), |(r, c)| {
        let (sr, sc) = (row0 + r as i64, col0 + c as i64);
        if sr >= 0 && sc >= 0 && (sr as usize) < rows && (sc as usize) < cols {
            source[[sr as usize, sc as usize]]
        } else {
            f32::NAN
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutout_pads_with_nan() {
        let source = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f32);
        let extent = Bounds::from_shape((4, 4));
        let region = Bounds {
            xmin: 2.0,
            xmax: 5.0,
            ymin: -1.0,
            ymax: 1.0,
        };
        let cut = cutout(&source, &extent, &region);
        assert_eq!(cut.dim(), (2, 3));
        assert!(cut[[0, 0]].is_nan());
        assert_eq!(cut[[1, 0]], 2.0);
        assert_eq!(cut[[1, 1]], 3.0);
        assert!(cut[[1, 2]].is_nan());
    }

    #[test]
    fn bounds_are_centred() {
        let config = ZoomConfig {
            position: (10.0, 20.0),
            size: (4, 6),
            ..ZoomConfig::default()
        };
        let zoom = ZoomPanel::new("z", AxesId(0), config, 0);
        let b = zoom.cutout_bounds();
        assert_eq!((b.xmin, b.xmax, b.ymin, b.ymax), (8.0, 12.0, 17.0, 23.0));
    }
}
