use ndarray::Array2;

use crate::config::Processing;
use crate::sequence::Sequence;

impl Processing {
    /// Apply to `image`, the frame at `timestep` of `sequence`.
    ///
    /// Returns `None` when the reference image cannot be formed (empty
    /// sequence, no neighbours); callers treat that as a data gap.
    pub fn apply(
        &self,
        sequence: &Sequence,
        timestep: usize,
        image: Array2<f32>,
    ) -> Option<Array2<f32>> {
        match self {
            Processing::None => Some(image),
            Processing::SubtractMean => subtract(image, sequence.mean()?),
            Processing::SubtractMedian => subtract(image, sequence.median()?),
            Processing::SubtractNeighbors { half_width } => {
                let reference = sequence.neighbor_mean(timestep, *half_width)?;
                subtract(image, &reference)
            }
        }
    }
}

fn subtract(image: Array2<f32>, reference: &Array2<f32>) -> Option<Array2<f32>> {
    if image.dim() != reference.dim() {
        return None;
    }
    Some(image - reference)
}
