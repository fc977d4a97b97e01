//! Seeded train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::Dataset;
use crate::{Error, Result};

/// Fraction of rows held out for testing when not configured.
pub const DEFAULT_TEST_FRACTION: f64 = 0.25;

/// Shuffle row indices and cut them into `(train, test)`.
///
/// The test set has `ceil(test_fraction * n)` rows. With `seed` set the split
/// is reproducible; without it the shuffle is seeded from entropy.
///
/// # Errors
///
/// Returns `InvalidInput` if `test_fraction` is outside `(0, 1)` or either
/// side of the split would be empty.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<(Dataset, Dataset)> {
    let (train, test) = split_indices(dataset.num_rows(), test_fraction, seed)?;
    Ok((dataset.take_rows(&train)?, dataset.take_rows(&test)?))
}

/// Index-level split used by [`train_test_split`].
///
/// # Errors
///
/// See [`train_test_split`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn split_indices(
    n_rows: usize,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<(Vec<u32>, Vec<u32>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::InvalidInput(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n_rows_u32 = u32::try_from(n_rows)
        .map_err(|_| Error::InvalidInput(format!("{n_rows} rows exceed split capacity")))?;

    let n_test = (test_fraction * n_rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(Error::InvalidInput(format!(
            "cannot split {n_rows} rows with test fraction {test_fraction}"
        )));
    }

    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut permutation: Vec<u32> = (0..n_rows_u32).collect();
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok((train, permutation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, test) = split_indices(10, 0.25, Some(42)).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let a = split_indices(50, 0.25, Some(7)).unwrap();
        let b = split_indices(50, 0.25, Some(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_rejects_degenerate_sizes() {
        assert!(split_indices(1, 0.25, Some(1)).is_err());
        assert!(split_indices(10, 0.0, Some(1)).is_err());
        assert!(split_indices(10, 1.0, Some(1)).is_err());
    }
}
