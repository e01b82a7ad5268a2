use super::figure::Rect;

/// Regular grid of cells inside a figure, with an optional strip on the
/// right kept free for a colorbar.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    /// Outer margin in pixels.
    pub margin: u32,
    /// Space between cells in pixels.
    pub gap: u32,
    /// Width reserved on the right, e.g. for a shared colorbar.
    pub gutter: u32,
    /// Relative row heights; empty means equal.
    pub row_weights: Vec<u32>,
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            margin: 16,
            gap: 12,
            gutter: 0,
            row_weights: Vec::new(),
        }
    }

    pub fn with_gutter(mut self, gutter: u32) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn with_row_weights(mut self, weights: Vec<u32>) -> Self {
        self.row_weights = weights;
        self
    }

    fn row_span(&self, height: u32, row: usize) -> (u32, u32) {
        let usable = height.saturating_sub(2 * self.margin + self.gap * (self.rows as u32 - 1));
        let weights: Vec<u32> = if self.row_weights.len() == self.rows {
            self.row_weights.clone()
        } else {
            vec![1; self.rows]
        };
        let total: u32 = weights.iter().sum::<u32>().max(1);
        let mut y = self.margin;
        for w in weights.iter().take(row) {
            y += usable * w / total + self.gap;
        }
        (y, usable * weights[row.min(self.rows - 1)] / total)
    }

    /// Cell at `(row, col)` spanning `colspan` columns.
    pub fn rect(&self, width: u32, height: u32, row: usize, col: usize, colspan: usize) -> Rect {
        let usable = width.saturating_sub(
            2 * self.margin + self.gutter + self.gap * (self.cols as u32 - 1),
        );
        let cell_w = usable / self.cols as u32;
        let colspan = colspan.clamp(1, self.cols - col.min(self.cols - 1)) as u32;
        let x = self.margin + col as u32 * (cell_w + self.gap);
        let (y, h) = self.row_span(height, row);
        Rect::new(x, y, cell_w * colspan + self.gap * (colspan - 1), h)
    }

    /// True if some cell collapses to zero width or height at this size.
    pub fn has_empty_cell(&self, width: u32, height: u32) -> bool {
        self.cells(width, height)
            .iter()
            .any(|cell| cell.width == 0 || cell.height == 0)
    }

    /// Every cell in row-major order.
    pub fn cells(&self, width: u32, height: u32) -> Vec<Rect> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| (row, col)))
            .map(|(row, col)| self.rect(width, height, row, col, 1))
            .collect()
    }
}

/// Centre a `width` x `height` box inside `cell`, shrinking it uniformly if
/// it does not fit.
pub fn fit_within(cell: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return cell;
    }
    let shrink = (cell.width as f64 / width as f64)
        .min(cell.height as f64 / height as f64)
        .min(1.0);
    let w = ((width as f64 * shrink).round() as u32).clamp(1, cell.width.max(1));
    let h = ((height as f64 * shrink).round() as u32).clamp(1, cell.height.max(1));
    Rect::new(
        cell.x + cell.width.saturating_sub(w) / 2,
        cell.y + cell.height.saturating_sub(h) / 2,
        w,
        h,
    )
}

/// Largest box with the aspect of `width` x `height` that fits in `cell`,
/// centred. Unlike [`fit_within`] this also scales up.
pub fn fill_within(cell: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return cell;
    }
    let scale = (cell.width as f64 / width as f64).min(cell.height as f64 / height as f64);
    fit_within(
        cell,
        (width as f64 * scale).floor() as u32,
        (height as f64 * scale).floor() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_do_not_overlap() {
        let grid = GridSpec::new(2, 2);
        let cells = grid.cells(400, 300);
        assert_eq!(cells.len(), 4);
        assert!(cells[0].right() <= cells[1].x);
        assert!(cells[0].bottom() <= cells[2].y);
    }

    #[test]
    fn gutter_shrinks_cells() {
        let plain = GridSpec::new(1, 2).rect(400, 200, 0, 1, 1);
        let gutter = GridSpec::new(1, 2).with_gutter(40).rect(400, 200, 0, 1, 1);
        assert!(gutter.right() < plain.right());
    }

    #[test]
    fn fit_within_keeps_aspect() {
        let cell = Rect::new(0, 0, 100, 100);
        assert_eq!(fit_within(cell, 40, 20), Rect::new(30, 40, 40, 20));
        let shrunk = fit_within(cell, 400, 200);
        assert_eq!((shrunk.width, shrunk.height), (100, 50));
    }

    #[test]
    fn fit_within_collapsed_cell() {
        let cell = Rect::new(10, 10, 0, 30);
        let rect = fit_within(cell, 20, 20);
        assert_eq!((rect.x, rect.width), (10, 1));
        assert!(rect.bottom() <= cell.bottom());
    }

    #[test]
    fn tiny_figure_has_empty_cells() {
        let grid = GridSpec::new(1, 2).with_gutter(48);
        assert!(grid.has_empty_cell(60, 60));
        assert!(!grid.has_empty_cell(400, 200));
    }

    #[test]
    fn fill_within_scales_up() {
        let cell = Rect::new(0, 0, 100, 60);
        assert_eq!(fill_within(cell, 10, 10), Rect::new(20, 0, 60, 60));
    }

    #[test]
    fn colspan_covers_row() {
        let grid = GridSpec::new(2, 3);
        let wide = grid.rect(600, 400, 1, 0, 3);
        let last = grid.rect(600, 400, 1, 2, 1);
        assert_eq!(wide.right(), last.right());
    }
}
