//! Score normalisation functions.

use tracing::warn;

/// Divide every score by the maximum score.
/// Returns normalised scores in the same order as input, in (0, 1] for
/// positive scores.
///
/// When every score is zero there is no meaningful maximum; the result is
/// all zeros rather than NaN, and a warning is logged.
pub fn max_normalise(scores: &[u32]) -> Vec<f64> {
    let Some(&max) = scores.iter().max() else {
        return vec![];
    };

    if max == 0 {
        warn!(count = scores.len(), "All related scores are zero; normalising to 0.0");
        return vec![0.0; scores.len()];
    }

    let max = f64::from(max);
    scores.iter().map(|&s| f64::from(s) / max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_normalise_basic() {
        let normed = max_normalise(&[10, 20, 40]);
        assert!((normed[0] - 0.25).abs() < 1e-12);
        assert!((normed[1] - 0.5).abs() < 1e-12);
        assert!((normed[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_normalise_keeps_input_order() {
        let normed = max_normalise(&[3, 1, 2]);
        assert_eq!(normed, vec![1.0, 1.0 / 3.0, 2.0 / 3.0]);
    }

    #[test]
    fn test_max_normalise_empty() {
        assert!(max_normalise(&[]).is_empty());
    }

    #[test]
    fn test_max_normalise_all_zero_is_zero_not_nan() {
        let normed = max_normalise(&[0, 0, 0]);
        assert_eq!(normed, vec![0.0, 0.0, 0.0]);
        assert!(normed.iter().all(|v| !v.is_nan()));
    }
}
