//! Deterministic train/test splitting

use crate::error::{AnalyticsError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split row indices into shuffled (train, test) sets.
///
/// The shuffle is driven entirely by `seed`, so the same inputs always
/// produce the same partition. The test set size is `n_rows *
/// test_fraction` rounded up, and both sides must end up non-empty.
pub fn train_test_split(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if n_rows < 2 {
        return Err(AnalyticsError::InsufficientData {
            rows: n_rows,
            cols: 0,
        });
    }
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(AnalyticsError::Statistics(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let test_len = ((n_rows as f64 * test_fraction).ceil() as usize).clamp(1, n_rows - 1);

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices[..test_len].to_vec();
    let train = indices[test_len..].to_vec();
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(5, 0.2, 42).unwrap();
        assert_eq!(test.len(), 1);
        assert_eq!(train.len(), 4);
    }

    #[test]
    fn test_split_partitions_rows() {
        let (mut train, mut test) = train_test_split(10, 0.3, 7).unwrap();
        train.append(&mut test);
        train.sort_unstable();
        assert_eq!(train, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = train_test_split(20, 0.2, 42).unwrap();
        let b = train_test_split(20, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(20, 0.2, 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_rejects_tiny_input() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(10, 0.0, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
    }
}
