//! Small-sample fallback: per-column deviation counting.
//!
//! Each cell is compared against the mean and sample standard deviation of
//! the *other* rows in its column. With the cell included, a single
//! outlier among n rows can never sit more than `(n-1)/sqrt(n)` standard
//! deviations out (2.67 for n = 9), so a 3-sigma rule would never fire on
//! the batches this path exists for.

use statrs::statistics::Statistics;

/// Relative tolerance for "differs from a constant column".
const CONSTANT_TOLERANCE: f64 = 1e-9;

/// Whether `value` deviates from `others` by more than `threshold`
/// standard deviations.
fn deviates(value: f64, others: &[f64], threshold: f64) -> bool {
    if others.len() < 2 {
        return false;
    }
    let mean = others.iter().mean();
    let std_dev = others.iter().std_dev();
    let diff = (value - mean).abs();

    if !std_dev.is_finite() || std_dev <= 0.0 {
        // Every other row agrees exactly; any real difference stands out.
        return diff > CONSTANT_TOLERANCE * mean.abs().max(1.0);
    }
    diff / std_dev > threshold
}

/// Count, per row, the columns where the row deviates beyond `threshold`.
///
/// `columns` is column-major with equal-length columns.
pub fn score(columns: &[Vec<f64>], threshold: f64) -> Vec<u32> {
    let rows = columns.first().map_or(0, Vec::len);
    let mut counts = vec![0u32; rows];
    let mut others = Vec::with_capacity(rows.saturating_sub(1));

    for column in columns {
        for (i, &value) in column.iter().enumerate() {
            others.clear();
            others.extend(
                column
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &v)| v),
            );
            if deviates(value, &others, threshold) {
                counts[i] += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_outlier_among_nine() {
        let spi = vec![1.0, 0.98, 1.02, 0.99, 1.01, 1.0, 0.97, 1.03, 0.3];
        let counts = score(&[spi], 3.0);
        assert_eq!(counts, vec![0, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_constant_column_flags_nothing() {
        let counts = score(&[vec![1.0; 6]], 3.0);
        assert!(counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_constant_others_flag_the_odd_one() {
        let mut col = vec![5.0; 8];
        col.push(5.5);
        let counts = score(&[col], 3.0);
        assert_eq!(counts[8], 1);
        assert_eq!(counts.iter().sum::<u32>(), 1);
    }

    #[test]
    fn test_counts_span_columns() {
        let a = vec![1.0, 1.01, 0.99, 1.0, 1.02, 0.98, 9.0];
        let b = vec![10.0, 10.1, 9.9, 10.0, 10.2, 9.8, -50.0];
        let counts = score(&[a, b], 3.0);
        assert_eq!(counts[6], 2);
        assert_eq!(counts[..6].iter().sum::<u32>(), 0);
    }

    #[test]
    fn test_tiny_batches() {
        assert_eq!(score(&[vec![1.0, 100.0]], 3.0), vec![0, 0]);
        assert!(score(&[], 3.0).is_empty());
    }
}
