use std::collections::BTreeMap;

use ndarray::Array2;

use crate::colorscale::ColorScale;
use crate::geometry::Bounds;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxesId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtistId(pub u64);

/// Pixel rectangle, origin at the top-left of the figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// One plotting region with its own data limits.
#[derive(Clone, Debug)]
pub struct Axes {
    pub rect: Rect,
    pub xlim: (f64, f64),
    pub ylim: (f64, f64),
    pub title: Option<String>,
    pub frame_on: bool,
}

impl Axes {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            xlim: (0.0, 1.0),
            ylim: (0.0, 1.0),
            title: None,
            frame_on: true,
        }
    }

    pub fn set_limits(&mut self, bounds: Bounds) {
        self.xlim = (bounds.xmin, bounds.xmax);
        self.ylim = (bounds.ymin, bounds.ymax);
    }

    pub fn limits(&self) -> Bounds {
        Bounds {
            xmin: self.xlim.0,
            xmax: self.xlim.1,
            ymin: self.ylim.0,
            ymax: self.ylim.1,
        }
    }

    /// Data coordinates to figure pixels; y grows upward in data space.
    pub fn data_to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let fx = span_fraction(x, self.xlim);
        let fy = span_fraction(y, self.ylim);
        let r = &self.rect;
        (
            (r.x as f64 + fx * r.width as f64) as f32,
            (r.y as f64 + (1.0 - fy) * r.height as f64) as f32,
        )
    }

    /// Figure pixel centre to data coordinates.
    pub fn pixel_to_data(&self, px: u32, py: u32) -> (f64, f64) {
        let r = &self.rect;
        let fx = (px as f64 + 0.5 - r.x as f64) / r.width.max(1) as f64;
        let fy = 1.0 - (py as f64 + 0.5 - r.y as f64) / r.height.max(1) as f64;
        (
            self.xlim.0 + fx * (self.xlim.1 - self.xlim.0),
            self.ylim.0 + fy * (self.ylim.1 - self.ylim.0),
        )
    }
}

fn span_fraction(v: f64, (lo, hi): (f64, f64)) -> f64 {
    if (hi - lo).abs() < f64::EPSILON {
        0.5
    } else {
        (v - lo) / (hi - lo)
    }
}

/// Everything that can be drawn.
#[derive(Clone, Debug)]
pub enum ArtistKind {
    /// Pixel data placed over `extent` in data coordinates.
    Image {
        data: Array2<f32>,
        scale: ColorScale,
        extent: Bounds,
    },
    /// Unfilled rectangle in data coordinates.
    Outline { bounds: Bounds, color: [u8; 4] },
    /// Full-height vertical line at data `x`.
    VLine { x: f64, color: [u8; 4] },
    Polyline {
        points: Vec<(f64, f64)>,
        color: [u8; 4],
    },
    /// Horizontal histogram bars: `edges` along y, `counts` along x.
    Bars {
        edges: Vec<f64>,
        counts: Vec<f64>,
        color: [u8; 4],
    },
    Arrow {
        label: String,
        start: (f64, f64),
        end: (f64, f64),
        color: [u8; 4],
    },
    /// Text anchored at a fraction of its axes. Kept for callers; not
    /// rasterized.
    Text { text: String, anchor: (f64, f64) },
    /// Gradient strip beside the union of `axes`.
    Colorbar {
        scale: ColorScale,
        axes: Vec<AxesId>,
        rect: Rect,
    },
}

#[derive(Clone, Debug)]
pub struct Artist {
    pub axes: Option<AxesId>,
    pub zorder: i32,
    pub kind: ArtistKind,
}

/// A retained scene: axes plus artists addressed by stable ids.
///
/// Panels keep the ids of what they drew and mutate those artists in place
/// when the displayed timestep changes.
#[derive(Clone, Debug)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 4],
    axes: Vec<Axes>,
    artists: BTreeMap<ArtistId, Artist>,
    next_id: u64,
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: [255, 255, 255, 255],
            axes: Vec::new(),
            artists: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn add_axes(&mut self, rect: Rect) -> AxesId {
        self.axes.push(Axes::new(rect));
        AxesId(self.axes.len() - 1)
    }

    pub fn axes(&self, id: AxesId) -> Option<&Axes> {
        self.axes.get(id.0)
    }

    pub fn axes_mut(&mut self, id: AxesId) -> Option<&mut Axes> {
        self.axes.get_mut(id.0)
    }

    pub fn all_axes(&self) -> impl Iterator<Item = (AxesId, &Axes)> {
        self.axes.iter().enumerate().map(|(i, a)| (AxesId(i), a))
    }

    pub fn add_artist(&mut self, axes: Option<AxesId>, zorder: i32, kind: ArtistKind) -> ArtistId {
        let id = ArtistId(self.next_id);
        self.next_id += 1;
        self.artists.insert(id, Artist { axes, zorder, kind });
        id
    }

    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artists.get(&id)
    }

    pub fn remove(&mut self, id: ArtistId) -> Option<Artist> {
        self.artists.remove(&id)
    }

    /// Artists in draw order: z-order, then creation order.
    pub fn artists_in_order(&self) -> Vec<(ArtistId, &Artist)> {
        let mut ordered: Vec<(ArtistId, &Artist)> =
            self.artists.iter().map(|(id, a)| (*id, a)).collect();
        ordered.sort_by_key(|(id, a)| (a.zorder, *id));
        ordered
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn colorbar_count(&self) -> usize {
        self.artists
            .values()
            .filter(|a| matches!(a.kind, ArtistKind::Colorbar { .. }))
            .count()
    }

    /// Replace an image artist's pixels. Returns false if `id` is not an image.
    pub fn set_image(&mut self, id: ArtistId, pixels: Array2<f32>) -> bool {
        match self.artists.get_mut(&id).map(|a| &mut a.kind) {
            Some(ArtistKind::Image { data, .. }) => {
                *data = pixels;
                true
            }
            _ => false,
        }
    }

    /// Replace an image artist's pixels and extent.
    pub fn set_image_extent(&mut self, id: ArtistId, pixels: Array2<f32>, bounds: Bounds) -> bool {
        match self.artists.get_mut(&id).map(|a| &mut a.kind) {
            Some(ArtistKind::Image { data, extent, .. }) => {
                *data = pixels;
                *extent = bounds;
                true
            }
            _ => false,
        }
    }

    pub fn set_text(&mut self, id: ArtistId, value: impl Into<String>) -> bool {
        match self.artists.get_mut(&id).map(|a| &mut a.kind) {
            Some(ArtistKind::Text { text, .. }) => {
                *text = value.into();
                true
            }
            _ => false,
        }
    }

    pub fn set_vline(&mut self, id: ArtistId, value: f64) -> bool {
        match self.artists.get_mut(&id).map(|a| &mut a.kind) {
            Some(ArtistKind::VLine { x, .. }) => {
                *x = value;
                true
            }
            _ => false,
        }
    }

    pub fn set_bars(&mut self, id: ArtistId, new_edges: Vec<f64>, new_counts: Vec<f64>) -> bool {
        match self.artists.get_mut(&id).map(|a| &mut a.kind) {
            Some(ArtistKind::Bars { edges, counts, .. }) => {
                *edges = new_edges;
                *counts = new_counts;
                true
            }
            _ => false,
        }
    }

    /// Current pixels of an image artist.
    pub fn image_data(&self, id: ArtistId) -> Option<&Array2<f32>> {
        match self.artists.get(&id).map(|a| &a.kind) {
            Some(ArtistKind::Image { data, .. }) => Some(data),
            _ => None,
        }
    }

    pub fn text(&self, id: ArtistId) -> Option<&str> {
        match self.artists.get(&id).map(|a| &a.kind) {
            Some(ArtistKind::Text { text, .. }) => Some(text),
            _ => None,
        }
    }
}
