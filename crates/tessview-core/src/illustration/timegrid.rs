use crate::consts::TIME_EPSILON;

/// Common time axis of an illustration's panels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeGrid {
    /// Sorted, de-duplicated times.
    pub times: Vec<f64>,
    /// Smallest positive gap between `times`; `None` with fewer than two.
    pub cadence: Option<f64>,
}

impl TimeGrid {
    pub fn first(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Reconcile several time axes. Times are rounded to a multiple of
    /// `round`, or of the finest cadence found when `round` is `None`, so
    /// near-coincident samples from different panels collapse together.
    pub fn resolve<I>(times: I, round: Option<f64>) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut all: Vec<f64> = times.into_iter().filter(|t| t.is_finite()).collect();
        all.sort_by(f64::total_cmp);

        let step = round
            .filter(|r| *r > 0.0)
            .or_else(|| min_positive_gap(&all));
        if let Some(step) = step {
            for t in &mut all {
                *t = (*t / step).round() * step;
            }
            all.sort_by(f64::total_cmp);
        }
        all.dedup_by(|a, b| (*a - *b).abs() <= TIME_EPSILON);

        let cadence = min_positive_gap(&all);
        Self { times: all, cadence }
    }
}

/// Smallest gap above `TIME_EPSILON` between consecutive sorted values.
pub fn min_positive_gap(sorted: &[f64]) -> Option<f64> {
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > TIME_EPSILON)
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_rounding_uses_finest_cadence() {
        let grid = TimeGrid::resolve([0.0, 0.5, 1.0 + 1e-12, 1.0, 1.5], None);
        assert_eq!(grid.times, vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(grid.cadence, Some(0.5));
    }

    #[test]
    fn empty_grid_has_no_cadence() {
        let grid = TimeGrid::resolve(Vec::new(), Some(1.0));
        assert!(grid.times.is_empty());
        assert_eq!(grid.cadence, None);
    }
}
