use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as PixelRect;

use crate::colorscale::ColorScale;
use crate::error::{Result, TessviewError};
use crate::geometry::Bounds;

use super::figure::{ArtistKind, Axes, Figure, Rect};

const AXES_FRAME: Rgba<u8> = Rgba([90, 90, 90, 255]);
const TICK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

impl Figure {
    /// Rasterize the scene.
    pub fn render(&self) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, Rgba(self.background));

        for (_, artist) in self.artists_in_order() {
            let axes = artist.axes.and_then(|id| self.axes(id));
            match (&artist.kind, axes) {
                (ArtistKind::Image { data, scale, extent }, Some(axes)) => {
                    draw_image(&mut canvas, axes, data, scale, extent)
                }
                (ArtistKind::Outline { bounds, color }, Some(axes)) => {
                    let (x0, y1) = axes.data_to_pixel(bounds.xmin, bounds.ymin);
                    let (x1, y0) = axes.data_to_pixel(bounds.xmax, bounds.ymax);
                    let rect = PixelRect::at(x0.round() as i32, y0.round() as i32).of_size(
                        ((x1 - x0).round() as u32).max(1),
                        ((y1 - y0).round() as u32).max(1),
                    );
                    draw_hollow_rect_mut(&mut canvas, rect, Rgba(*color));
                }
                (ArtistKind::VLine { x, color }, Some(axes)) => {
                    let (px, _) = axes.data_to_pixel(*x, axes.ylim.0);
                    let top = axes.rect.y as f32;
                    let bottom = axes.rect.bottom() as f32 - 1.0;
                    draw_line_segment_mut(&mut canvas, (px, top), (px, bottom), Rgba(*color));
                }
                (ArtistKind::Polyline { points, color }, Some(axes)) => {
                    for pair in points.windows(2) {
                        let a = axes.data_to_pixel(pair[0].0, pair[0].1);
                        let b = axes.data_to_pixel(pair[1].0, pair[1].1);
                        draw_line_segment_mut(&mut canvas, a, b, Rgba(*color));
                    }
                }
                (ArtistKind::Bars { edges, counts, color }, Some(axes)) => {
                    for (i, &count) in counts.iter().enumerate() {
                        if count <= 0.0 || i + 1 >= edges.len() {
                            continue;
                        }
                        let (x0, y_lo) = axes.data_to_pixel(0.0, edges[i]);
                        let (x1, y_hi) = axes.data_to_pixel(count, edges[i + 1]);
                        let rect = PixelRect::at(x0.round() as i32, y_hi.round() as i32).of_size(
                            ((x1 - x0).round() as u32).max(1),
                            ((y_lo - y_hi).round() as u32).max(1),
                        );
                        draw_filled_rect_mut(&mut canvas, rect, Rgba(*color));
                    }
                }
                (ArtistKind::Arrow { start, end, color, .. }, Some(axes)) => {
                    draw_arrow(&mut canvas, axes, *start, *end, Rgba(*color))
                }
                (ArtistKind::Colorbar { scale, rect, .. }, _) => draw_colorbar(&mut canvas, scale, rect),
                _ => {}
            }
        }

        for (_, axes) in self.all_axes() {
            if axes.frame_on && axes.rect.width > 0 && axes.rect.height > 0 {
                let r = axes.rect;
                draw_hollow_rect_mut(
                    &mut canvas,
                    PixelRect::at(r.x as i32, r.y as i32).of_size(r.width, r.height),
                    AXES_FRAME,
                );
            }
        }

        canvas
    }

    /// Render and save, choosing the format from the file extension.
    pub fn savefig(&self, path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("png" | "tiff" | "tif" | "bmp") => {
                self.render().save(path)?;
                Ok(())
            }
            other => Err(TessviewError::UnsupportedFormat(format!(
                "cannot save a still figure as '{}'",
                other.unwrap_or("")
            ))),
        }
    }
}

fn draw_image(
    canvas: &mut RgbaImage,
    axes: &Axes,
    data: &ndarray::Array2<f32>,
    scale: &ColorScale,
    extent: &Bounds,
) {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 || extent.width() <= 0.0 || extent.height() <= 0.0 {
        return;
    }
    let r = axes.rect;
    for py in r.y..r.bottom().min(canvas.height()) {
        for px in r.x..r.right().min(canvas.width()) {
            let (x, y) = axes.pixel_to_data(px, py);
            let fx = (x - extent.xmin) / extent.width();
            let fy = (y - extent.ymin) / extent.height();
            if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
                continue;
            }
            let col = ((fx * cols as f64) as usize).min(cols - 1);
            let row = ((fy * rows as f64) as usize).min(rows - 1);
            let rgba = scale.rgba(data[[row, col]]);
            if rgba[3] > 0 {
                canvas.put_pixel(px, py, Rgba(rgba));
            }
        }
    }
}

fn draw_arrow(canvas: &mut RgbaImage, axes: &Axes, start: (f64, f64), end: (f64, f64), color: Rgba<u8>) {
    let a = axes.data_to_pixel(start.0, start.1);
    let b = axes.data_to_pixel(end.0, end.1);
    draw_line_segment_mut(canvas, a, b, color);

    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1.0 {
        return;
    }
    let head = (0.25 * len).min(8.0);
    let (ux, uy) = (dx / len, dy / len);
    for sign in [-1.0f32, 1.0] {
        let wing = (
            b.0 - head * ux + sign * 0.5 * head * uy,
            b.1 - head * uy - sign * 0.5 * head * ux,
        );
        draw_line_segment_mut(canvas, b, wing, color);
    }
}

fn draw_colorbar(canvas: &mut RgbaImage, scale: &ColorScale, rect: &Rect) {
    if rect.height == 0 || rect.width == 0 {
        return;
    }
    for dy in 0..rect.height {
        let t = 1.0 - (dy as f64 + 0.5) / rect.height as f64;
        let [r, g, b] = scale.cmap.sample(t);
        let y = rect.y + dy;
        if y >= canvas.height() {
            break;
        }
        for x in rect.x..rect.right().min(canvas.width()) {
            canvas.put_pixel(x, y, Rgba([r, g, b, 255]));
        }
    }
    draw_hollow_rect_mut(
        canvas,
        PixelRect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
        AXES_FRAME,
    );
    for &tick in &scale.ticks {
        if let Some(t) = scale.norm.normalize(tick) {
            let y = rect.y as f32 + ((1.0 - t) * rect.height as f64) as f32;
            let x = rect.right() as f32;
            draw_line_segment_mut(canvas, (x, y), (x + 4.0, y), TICK_COLOR);
        }
    }
}
