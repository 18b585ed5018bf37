use ndarray::{ArrayView2, Axis};
use crate::drivers::TraceError;
/// Means of consecutive non-overlapping blocks of `block_size` samples.
///
/// A trailing partial block is dropped, so the output has `samples.len() / block_size` entries.
pub fn block_average(samples: &[f64], block_size: usize) -> Result<Vec<f64>, TraceError> {
    if block_size == 0 {
        return Err(TraceError::InvalidArgument(
            "block size must be at least 1".into(),
        ));
    }
    let blocks = samples.len() / block_size;
    let view = ArrayView2::from_shape((blocks, block_size), &samples[..blocks * block_size])?;
    let means = view
        .mean_axis(Axis(1))
        .ok_or_else(|| TraceError::InvalidArgument("empty averaging block".into()))?;
    Ok(means.to_vec())
}
/// Drops the leading `skip` entries of an averaged channel before it is plotted.
pub fn skip_settling(averaged: &[f64], skip: usize) -> Result<&[f64], TraceError> {
    averaged
        .get(skip..)
        .filter(|rest| !rest.is_empty())
        .ok_or(TraceError::InsufficientSamples {
            required: skip + 1,
            actual: averaged.len(),
        })
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn ramp_averages_to_block_midpoints() {
        let samples: Vec<f64> = (0..2000).map(|v| v as f64).collect();
        let averaged = block_average(&samples, 10).unwrap();
        assert_eq!(averaged.len(), 200);
        for (idx, value) in averaged.iter().enumerate() {
            assert!((value - (idx as f64 * 10.0 + 4.5)).abs() < 1e-9);
        }
        assert!((averaged[199] - 1994.5).abs() < 1e-9);
    }
    #[test]
    fn trailing_partial_block_is_dropped() {
        let samples = [1.0, 3.0, 5.0, 7.0, 100.0];
        assert_eq!(block_average(&samples, 2).unwrap(), vec![2.0, 6.0]);
        assert_eq!(block_average(&samples, 3).unwrap(), vec![3.0]);
        assert!(block_average(&samples, 6).unwrap().is_empty());
        assert!(block_average(&[], 4).unwrap().is_empty());
    }
    #[test]
    fn block_of_one_is_identity() {
        let samples = [0.25, -3.0, 7.5, 1e-9];
        assert_eq!(block_average(&samples, 1).unwrap(), samples.to_vec());
    }
    #[test]
    fn zero_block_size_is_invalid() {
        assert!(matches!(
            block_average(&[1.0, 2.0], 0),
            Err(TraceError::InvalidArgument(_))
        ));
    }
    #[test]
    fn settling_skip_requires_remaining_samples() {
        let averaged = [1.0, 2.0, 3.0];
        assert_eq!(skip_settling(&averaged, 2).unwrap(), &[3.0]);
        assert!(matches!(
            skip_settling(&averaged, 3),
            Err(TraceError::InsufficientSamples { required: 4, actual: 3 })
        ));
    }
}
