use std::str::FromStr;
use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TessviewError};

/// Extent of a coordinate system, in pixel-edge units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    /// Bounds covering an image of `(rows, cols)` pixels.
    pub fn from_shape((rows, cols): (usize, usize)) -> Self {
        Self {
            xmin: 0.0,
            xmax: cols as f64,
            ymin: 0.0,
            ymax: rows as f64,
        }
    }

    pub fn transposed(&self) -> Self {
        Self {
            xmin: self.ymin,
            xmax: self.ymax,
            ymin: self.xmin,
            ymax: self.xmax,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.xmin, self.ymin),
            (self.xmax, self.ymin),
            (self.xmin, self.ymax),
            (self.xmax, self.ymax),
        ]
    }
}

/// How one pixel grid sits relative to its parent. Applied in the order
/// transpose, flip x (columns), flip y (rows).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFlags {
    #[serde(default)]
    pub transpose: bool,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
}

impl FrameFlags {
    pub const fn new(transpose: bool, flip_x: bool, flip_y: bool) -> Self {
        Self {
            transpose,
            flip_x,
            flip_y,
        }
    }
}

/// Display layout of a grid of panels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl FromStr for Orientation {
    type Err = TessviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            other => Err(TessviewError::UnsupportedOrientation(other.to_string())),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// Named frame configurations. Composite names such as `cam2/ccd3` nest the
/// second frame inside the first.
const FRAME_TABLE: [(&str, FrameFlags); 9] = [
    ("identity", FrameFlags::new(false, false, false)),
    ("cam1", FrameFlags::new(false, false, false)),
    ("cam2", FrameFlags::new(false, false, false)),
    ("cam3", FrameFlags::new(false, true, true)),
    ("cam4", FrameFlags::new(false, true, true)),
    ("ccd1", FrameFlags::new(false, true, true)),
    ("ccd2", FrameFlags::new(false, true, true)),
    ("ccd3", FrameFlags::new(false, false, false)),
    ("ccd4", FrameFlags::new(false, false, false)),
];

/// One coordinate system in the CCD -> camera -> display chain.
///
/// A frame reorients pixel arrays and `(x, y)` pairs from its own grid into
/// its parent's, then hands the result to the parent. Frames are immutable;
/// a child that is smaller than its parent passes its own bounds up the chain
/// instead of the parent's.
#[derive(Clone, Debug)]
pub struct CoordinateFrame {
    pub name: String,
    pub flags: FrameFlags,
    pub bounds: Option<Bounds>,
    pub parent: Option<Arc<CoordinateFrame>>,
    pub orientation: Orientation,
}

impl CoordinateFrame {
    pub fn new(name: impl Into<String>, flags: FrameFlags) -> Self {
        Self {
            name: name.into(),
            flags,
            bounds: None,
            parent: None,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn identity() -> Self {
        Self::new("identity", FrameFlags::default())
    }

    /// Build a frame from the lookup table. `camN/ccdM` yields `ccdM` whose
    /// parent is `camN`.
    pub fn lookup(name: &str) -> Result<Self> {
        let mut parent: Option<Arc<CoordinateFrame>> = None;
        let mut frame = None;
        for part in name.split('/') {
            let part = part.trim().to_ascii_lowercase();
            let flags = FRAME_TABLE
                .iter()
                .find(|(key, _)| *key == part)
                .map(|(_, flags)| *flags)
                .ok_or_else(|| TessviewError::UnknownFrame(name.to_string()))?;
            if let Some(previous) = frame.take() {
                parent = Some(Arc::new(previous));
            }
            let mut current = CoordinateFrame::new(part, flags);
            current.parent = parent.take();
            frame = Some(current);
        }
        frame.ok_or_else(|| TessviewError::UnknownFrame(name.to_string()))
    }

    pub fn with_parent(mut self, parent: Arc<CoordinateFrame>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        if let Some(parent) = self.parent.take() {
            let parent = (*parent).clone().with_orientation(orientation);
            self.parent = Some(Arc::new(parent));
        }
        self
    }

    /// Number of frames in the chain, this one included.
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }

    fn check_orientation(&self) -> Result<()> {
        match self.orientation {
            Orientation::Horizontal => Ok(()),
            other => Err(TessviewError::UnsupportedOrientation(other.to_string())),
        }
    }

    /// Reorient a whole image through this frame and its ancestors.
    pub fn transform_image(&self, image: &Array2<f32>) -> Result<Array2<f32>> {
        Ok(self.transform_view(image.view())?.to_owned())
    }

    fn transform_view<'a>(&self, image: ArrayView2<'a, f32>) -> Result<ArrayView2<'a, f32>> {
        self.check_orientation()?;
        let mut view = image;
        if self.flags.transpose {
            view = view.reversed_axes();
        }
        if self.flags.flip_x {
            view.invert_axis(Axis(1));
        }
        if self.flags.flip_y {
            view.invert_axis(Axis(0));
        }
        match &self.parent {
            Some(parent) => parent.transform_view(view),
            None => Ok(view),
        }
    }

    /// Map an `(x, y)` point through this frame and its ancestors using the
    /// frame's own bounds.
    pub fn transform_xy(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let bounds = self.bounds.ok_or_else(|| {
            TessviewError::Config(format!("frame '{}' has no bounds", self.name))
        })?;
        let (x, y, _) = self.transform_xy_within(x, y, bounds)?;
        Ok((x, y))
    }

    /// Map `(x, y)` given explicit `bounds` for this level. Each ancestor
    /// receives the bounds produced by the level below it, not its own.
    /// Returns the mapped point and the final bounds.
    pub fn transform_xy_within(&self, x: f64, y: f64, bounds: Bounds) -> Result<(f64, f64, Bounds)> {
        self.check_orientation()?;
        let (mut x, mut y, mut b) = (x, y, bounds);
        if self.flags.transpose {
            std::mem::swap(&mut x, &mut y);
            b = b.transposed();
        }
        if self.flags.flip_x {
            x = b.xmin + b.xmax - x;
        }
        if self.flags.flip_y {
            y = b.ymin + b.ymax - y;
        }
        match &self.parent {
            Some(parent) => parent.transform_xy_within(x, y, b),
            None => Ok((x, y, b)),
        }
    }

    /// Bounds after the full chain of transforms.
    pub fn transform_bounds(&self, bounds: Bounds) -> Result<Bounds> {
        Ok(self.transform_xy_within(bounds.xmin, bounds.ymin, bounds)?.2)
    }

    /// Display-space segments showing the detector's +x and +y directions,
    /// starting a tenth of the way into the frame. Each entry is
    /// `(label, start, end)`.
    pub fn arrows(&self, bounds: Bounds) -> Result<Vec<(&'static str, (f64, f64), (f64, f64))>> {
        let length = 0.2 * bounds.width().min(bounds.height());
        let ox = bounds.xmin + 0.1 * bounds.width();
        let oy = bounds.ymin + 0.1 * bounds.height();
        let (sx, sy, _) = self.transform_xy_within(ox, oy, bounds)?;
        let (xx, xy, _) = self.transform_xy_within(ox + length, oy, bounds)?;
        let (yx, yy, _) = self.transform_xy_within(ox, oy + length, bounds)?;
        Ok(vec![("x", (sx, sy), (xx, xy)), ("y", (sx, sy), (yx, yy))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_builds_nested_chain() {
        let frame = CoordinateFrame::lookup("cam3/ccd1").unwrap();
        assert_eq!(frame.name, "ccd1");
        assert_eq!(frame.depth(), 2);
        assert_eq!(frame.parent.as_ref().unwrap().name, "cam3");
    }

    #[test]
    fn lookup_rejects_unknown_names() {
        assert!(matches!(
            CoordinateFrame::lookup("cam9"),
            Err(TessviewError::UnknownFrame(_))
        ));
    }

    #[test]
    fn parent_receives_child_bounds() {
        // A 10x4 quadrant transposed to 4x10 and then flipped in x by the
        // parent must flip against the 4-wide extent, not the parent's own.
        let parent = CoordinateFrame::new("p", FrameFlags::new(false, true, false)).with_bounds(
            Bounds {
                xmin: 0.0,
                xmax: 100.0,
                ymin: 0.0,
                ymax: 100.0,
            },
        );
        let child = CoordinateFrame::new("c", FrameFlags::new(true, false, false))
            .with_parent(Arc::new(parent))
            .with_bounds(Bounds::from_shape((4, 10)));
        let (x, y) = child.transform_xy(1.0, 3.0).unwrap();
        assert_eq!((x, y), (1.0, 1.0));
    }

    #[test]
    fn vertical_orientation_is_fatal() {
        let frame = CoordinateFrame::lookup("cam1")
            .unwrap()
            .with_orientation(Orientation::Vertical);
        let image = Array2::<f32>::zeros((2, 2));
        assert!(matches!(
            frame.transform_image(&image),
            Err(TessviewError::UnsupportedOrientation(_))
        ));
    }

    #[test]
    fn orientation_parsing() {
        assert_eq!("Horizontal".parse::<Orientation>().unwrap(), Orientation::Horizontal);
        assert!("diagonal".parse::<Orientation>().is_err());
    }
}
