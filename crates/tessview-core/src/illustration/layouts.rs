//! Grid variants: one camera, one camera with a zoom, four cameras, one
//! camera split into its CCDs, and a free-form list of panels.

use std::sync::Arc;

use crate::config::{IllustrationConfig, ImshowConfig, TimeseriesConfig, ZoomConfig};
use crate::consts::COLORBAR_GUTTER;
use crate::error::{Result, TessviewError};
use crate::geometry::{Bounds, CoordinateFrame, Orientation};
use crate::panel::{ImshowPanel, Panel, TimeseriesPanel, ZoomPanel};
use crate::report::Reporter;
use crate::scene::{fill_within, fit_within, Figure, GridSpec, Rect};
use crate::sequence::Sequence;

use super::Illustration;

/// Width taken from an image cell for its own colorbar.
const PANEL_COLORBAR_RESERVE: u32 = 24;
/// Share of a timeseries cell given to the curve when a histogram sits
/// beside it.
const TIMESERIES_SHARE: f64 = 0.8;

/// CCD placement inside a camera grid, as `(ccd, row, col)`.
const CCD_GRID: [(u8, usize, usize); 4] = [(4, 0, 0), (3, 0, 1), (1, 1, 0), (2, 1, 1)];

/// An image panel waiting to be placed.
pub struct ImageInput {
    pub name: String,
    pub sequence: Sequence,
    pub imshow: ImshowConfig,
}

impl ImageInput {
    pub fn new(name: impl Into<String>, sequence: Sequence) -> Self {
        Self {
            name: name.into(),
            sequence,
            imshow: ImshowConfig::default(),
        }
    }

    pub fn with_config(mut self, imshow: ImshowConfig) -> Self {
        self.imshow = imshow;
        self
    }
}

pub struct ZoomInput {
    pub name: String,
    pub zoom: ZoomConfig,
}

impl ZoomInput {
    pub fn new(name: impl Into<String>, zoom: ZoomConfig) -> Self {
        Self {
            name: name.into(),
            zoom,
        }
    }
}

pub struct TimeseriesInput {
    pub name: String,
    pub timeseries: TimeseriesConfig,
}

impl TimeseriesInput {
    pub fn new(name: impl Into<String>, timeseries: TimeseriesConfig) -> Self {
        Self {
            name: name.into(),
            timeseries,
        }
    }
}

/// Accumulates axes and panels for one figure.
struct Builder {
    figure: Figure,
    panels: Vec<Panel>,
    config: IllustrationConfig,
    orientation: Orientation,
    zooms: usize,
}

impl Builder {
    fn new(config: IllustrationConfig) -> Result<Self> {
        let orientation = config.orientation()?;
        Ok(Self {
            figure: Figure::new(config.figure.width, config.figure.height),
            panels: Vec::new(),
            config,
            orientation,
            zooms: 0,
        })
    }

    fn grid(&self, rows: usize, cols: usize) -> Result<GridSpec> {
        self.fitted(GridSpec::new(rows, cols), true)
    }

    /// Reserve the shared colorbar strip when asked to, then reject grids
    /// whose cells vanish at the figure size.
    fn fitted(&self, grid: GridSpec, colorbar: bool) -> Result<GridSpec> {
        let grid = if colorbar && self.config.share_colorbar {
            grid.with_gutter(COLORBAR_GUTTER)
        } else {
            grid
        };
        if grid.has_empty_cell(self.figure.width, self.figure.height) {
            return Err(TessviewError::Config(format!(
                "a {}x{} figure is too small for a {}x{} panel grid",
                self.figure.width, self.figure.height, grid.rows, grid.cols
            )));
        }
        Ok(grid)
    }

    fn cell(&self, grid: &GridSpec, row: usize, col: usize, colspan: usize) -> Rect {
        grid.rect(self.figure.width, self.figure.height, row, col, colspan)
    }

    /// Place an image panel in `cell`, keeping the aspect of the reoriented
    /// frame. `frame_name` is used unless the panel config names one.
    fn add_image(&mut self, cell: Rect, input: ImageInput, frame_name: Option<String>) -> Result<()> {
        let frame = match input.imshow.frame.clone().or(frame_name) {
            Some(name) => CoordinateFrame::lookup(&name)?,
            None => CoordinateFrame::identity(),
        }
        .with_orientation(self.orientation);

        let display = frame.transform_bounds(Bounds::from_shape(input.sequence.shape()))?;
        let mut cell = cell;
        if !self.config.share_colorbar && input.imshow.ingredients.colorbar {
            cell.width = cell.width.saturating_sub(PANEL_COLORBAR_RESERVE);
        }
        let rect = fill_within(cell, display.width() as u32, display.height() as u32);
        let axes = self.figure.add_axes(rect);

        let panel = ImshowPanel::new(input.name, axes, input.sequence, frame, input.imshow)?;
        self.panels.push(Panel::Imshow(panel));
        Ok(())
    }

    fn add_zoom(&mut self, cell: Rect, input: ZoomInput) {
        let (w, h) = input.zoom.size;
        let factor = input.zoom.factor.max(0.0);
        let rect = fit_within(
            cell,
            (w as f64 * factor).round() as u32,
            (h as f64 * factor).round() as u32,
        );
        let axes = self.figure.add_axes(rect);
        let panel = ZoomPanel::new(input.name, axes, input.zoom, self.zooms);
        self.zooms += 1;
        self.panels.push(Panel::Zoom(panel));
    }

    fn add_timeseries(&mut self, cell: Rect, input: TimeseriesInput) {
        if input.timeseries.histogram {
            let main_width = (cell.width as f64 * TIMESERIES_SHARE) as u32;
            let gap = 4u32.min(cell.width.saturating_sub(main_width));
            let main = Rect::new(cell.x, cell.y, main_width, cell.height);
            let side = Rect::new(
                cell.x + main_width + gap,
                cell.y,
                cell.width.saturating_sub(main_width + gap),
                cell.height,
            );
            let axes = self.figure.add_axes(main);
            let hist = self.figure.add_axes(side);
            let panel = TimeseriesPanel::new(input.name, axes, input.timeseries).with_histogram_axes(hist);
            self.panels.push(Panel::Timeseries(panel));
        } else {
            let axes = self.figure.add_axes(cell);
            self.panels
                .push(Panel::Timeseries(TimeseriesPanel::new(input.name, axes, input.timeseries)));
        }
    }

    fn finish(self, reporter: Arc<dyn Reporter>) -> Result<Illustration> {
        Illustration::new(self.figure, self.panels, self.config, reporter)
    }
}

fn camera_frame(camera: u8) -> String {
    format!("cam{camera}")
}

/// One camera's full frame.
pub fn single_camera(
    camera: u8,
    image: ImageInput,
    config: IllustrationConfig,
    reporter: Arc<dyn Reporter>,
) -> Result<Illustration> {
    let mut builder = Builder::new(config)?;
    let grid = builder.grid(1, 1)?;
    let cell = builder.cell(&grid, 0, 0, 1);
    builder.add_image(cell, image, Some(camera_frame(camera)))?;
    builder.finish(reporter)
}

/// One camera beside a magnified inset of it. A zoom without a source
/// points at the camera panel.
pub fn single_camera_with_zoom(
    camera: u8,
    image: ImageInput,
    mut zoom: ZoomInput,
    config: IllustrationConfig,
    reporter: Arc<dyn Reporter>,
) -> Result<Illustration> {
    if zoom.zoom.source.is_empty() {
        zoom.zoom.source = image.name.clone();
    }
    let mut builder = Builder::new(config)?;
    let grid = builder.grid(1, 2)?;
    let left = builder.cell(&grid, 0, 0, 1);
    let right = builder.cell(&grid, 0, 1, 1);
    builder.add_image(left, image, Some(camera_frame(camera)))?;
    builder.add_zoom(right, zoom);
    builder.finish(reporter)
}

/// Cameras 1 to 4 side by side; `images` are in camera order.
pub fn four_cameras(
    images: Vec<ImageInput>,
    config: IllustrationConfig,
    reporter: Arc<dyn Reporter>,
) -> Result<Illustration> {
    if images.len() != 4 {
        return Err(TessviewError::Config(format!(
            "four-camera layout needs 4 image panels, got {}",
            images.len()
        )));
    }
    let mut builder = Builder::new(config)?;
    let grid = builder.grid(1, 4)?;
    for (i, image) in images.into_iter().enumerate() {
        let cell = builder.cell(&grid, 0, i, 1);
        builder.add_image(cell, image, Some(camera_frame(i as u8 + 1)))?;
    }
    builder.finish(reporter)
}

/// The four CCDs of one camera in their focal-plane arrangement; `images`
/// are in CCD order 1 to 4.
pub fn camera_of_ccds(
    camera: u8,
    images: Vec<ImageInput>,
    config: IllustrationConfig,
    reporter: Arc<dyn Reporter>,
) -> Result<Illustration> {
    if images.len() != 4 {
        return Err(TessviewError::Config(format!(
            "camera-of-CCDs layout needs 4 image panels, got {}",
            images.len()
        )));
    }
    let mut builder = Builder::new(config)?;
    let grid = builder.grid(2, 2)?;
    let mut slots: Vec<Option<ImageInput>> = images.into_iter().map(Some).collect();
    for (ccd, row, col) in CCD_GRID {
        let Some(image) = slots[ccd as usize - 1].take() else {
            continue;
        };
        let cell = builder.cell(&grid, row, col, 1);
        builder.add_image(cell, image, Some(format!("cam{camera}/ccd{ccd}")))?;
    }
    builder.finish(reporter)
}

/// Image and zoom panels across the top row, one full-width row per
/// timeseries below.
pub fn generic(
    images: Vec<ImageInput>,
    zooms: Vec<ZoomInput>,
    timeseries: Vec<TimeseriesInput>,
    config: IllustrationConfig,
    reporter: Arc<dyn Reporter>,
) -> Result<Illustration> {
    let top = images.len() + zooms.len();
    if top == 0 && timeseries.is_empty() {
        return Err(TessviewError::Config("illustration has no panels".into()));
    }
    let image_rows = usize::from(top > 0);
    let rows = image_rows + timeseries.len();
    let cols = top.max(1);

    let mut weights = vec![3; image_rows];
    weights.extend(std::iter::repeat(1).take(timeseries.len()));

    let mut builder = Builder::new(config)?;
    let grid = builder.fitted(
        GridSpec::new(rows, cols).with_row_weights(weights),
        !images.is_empty(),
    )?;

    let mut col = 0;
    for image in images {
        let cell = builder.cell(&grid, 0, col, 1);
        builder.add_image(cell, image, None)?;
        col += 1;
    }
    for zoom in zooms {
        let cell = builder.cell(&grid, 0, col, 1);
        builder.add_zoom(cell, zoom);
        col += 1;
    }
    for (i, series) in timeseries.into_iter().enumerate() {
        let cell = builder.cell(&grid, image_rows + i, 0, cols);
        builder.add_timeseries(cell, series);
    }
    builder.finish(reporter)
}
