use crate::analyzers::types::Summary;
use crate::analyzers::utility::{mean, quantile, stddev};

/// Count, mean, sample std, min, quartiles and max of a sample.
///
/// Returns `None` for an empty sample.
pub fn describe(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let avg = mean(values);

    Some(Summary {
        count: values.len(),
        mean: avg,
        std: stddev(values, avg),
        min: sorted[0],
        p25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        p75: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_empty() {
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_describe_unsorted_input() {
        let s = describe(&[4.0, 0.0, 2.0, 6.0, 8.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.p25, 2.0);
        assert_eq!(s.median, 4.0);
        assert_eq!(s.p75, 6.0);
        assert_eq!(s.max, 8.0);
        assert!((s.std - 10f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_describe_single_value() {
        let s = describe(&[3.5]).unwrap();
        assert_eq!(s.median, 3.5);
        assert!(s.std.is_nan());
    }
}
