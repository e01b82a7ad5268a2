use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Mean image of `count` frames fetched one at a time by `image_at`.
///
/// Only the accumulator and the current frame are held, so file-backed
/// sequences never materialize the whole stack. Frames that fail to load are
/// skipped. NaN pixels are excluded per pixel.
pub fn running_mean<F>(count: usize, mut image_at: F) -> Option<Array2<f32>>
where
    F: FnMut(usize) -> Option<Array2<f32>>,
{
    let mut sum: Option<Array2<f64>> = None;
    let mut hits: Option<Array2<u32>> = None;

    for i in 0..count {
        let Some(frame) = image_at(i) else {
            continue;
        };
        let sum = sum.get_or_insert_with(|| Array2::zeros(frame.dim()));
        let hits = hits.get_or_insert_with(|| Array2::zeros(frame.dim()));
        if sum.dim() != frame.dim() {
            continue;
        }
        ndarray::Zip::from(&mut *sum)
            .and(&mut *hits)
            .and(&frame)
            .for_each(|s, n, &v| {
                if v.is_finite() {
                    *s += v as f64;
                    *n += 1;
                }
            });
    }

    let (sum, hits) = (sum?, hits?);
    let mut mean = Array2::<f32>::zeros(sum.dim());
    ndarray::Zip::from(&mut mean)
        .and(&sum)
        .and(&hits)
        .for_each(|m, &s, &n| {
            *m = if n > 0 { (s / n as f64) as f32 } else { f32::NAN };
        });
    Some(mean)
}

/// Per-pixel median across frames.
///
/// Uses `select_nth_unstable` for O(n) median without full sort.
/// Parallelizes at the row level for large frames. NaN values are ignored.
pub fn pixel_median(frames: &[Array2<f32>]) -> Option<Array2<f32>> {
    let first = frames.first()?;
    let (h, w) = first.dim();
    let n = frames.len();

    let median_row = |row: usize| -> Vec<f32> {
        let mut pixel_values = Vec::with_capacity(n);
        let mut row_result = vec![0.0f32; w];
        for (col, result) in row_result.iter_mut().enumerate() {
            pixel_values.clear();
            pixel_values.extend(
                frames
                    .iter()
                    .map(|f| f[[row, col]])
                    .filter(|v| v.is_finite()),
            );
            *result = compute_median(&mut pixel_values);
        }
        row_result
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        (0..h).into_par_iter().map(median_row).collect()
    } else {
        (0..h).map(median_row).collect()
    };

    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((h, w), flat).ok()
}

/// Median of a scratch buffer, reordering it in place. NaN when empty.
pub fn compute_median(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 0 {
        return f32::NAN;
    }
    if n == 1 {
        return values[0];
    }
    let mid = n / 2;
    if n % 2 == 1 {
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        let upper = values[mid];
        let lower = *values[..mid]
            .select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b))
            .1;
        (lower + upper) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_even_and_odd() {
        assert_eq!(compute_median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(compute_median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert!(compute_median(&mut []).is_nan());
    }

    #[test]
    fn running_mean_skips_missing_frames() {
        let frames = [
            Some(Array2::from_elem((2, 2), 1.0f32)),
            None,
            Some(Array2::from_elem((2, 2), 3.0f32)),
        ];
        let mean = running_mean(3, |i| frames[i].clone()).unwrap();
        assert_eq!(mean[[1, 1]], 2.0);
    }

    #[test]
    fn running_mean_of_nothing_is_none() {
        assert!(running_mean(0, |_| None).is_none());
    }
}
