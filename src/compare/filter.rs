/// Plausible temperature band; readings outside it are treated as sensor glitches.
pub const OUTLIER_MIN: f64 = 19.0;
pub const OUTLIER_MAX: f64 = 200.0;
pub const OUTLIER_WINDOW: usize = 5;

/// Mean of the centered window around each index, shrinking at the edges.
pub fn centered_rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let before = window / 2;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + window - before).min(values.len());
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Replace values outside `[min, max]` with the centered rolling mean of the raw series.
pub fn filter_outliers(values: &[f64], window: usize, min: f64, max: f64) -> Vec<f64> {
    let rolling = centered_rolling_mean(values, window);
    values
        .iter()
        .zip(rolling)
        .map(|(&value, mean)| if value < min || value > max { mean } else { value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_uses_partial_windows_at_the_edges() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let means = centered_rolling_mean(&values, 5);
        assert_eq!(means, vec![2.0, 2.5, 3.0, 4.0, 4.5, 5.0]);
    }

    #[test]
    fn even_window_leans_backwards() {
        let means = centered_rolling_mean(&[0.0, 4.0, 8.0, 12.0], 4);
        // windows: [0..2), [0..3), [0..4), [1..4)
        assert_eq!(means, vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn only_out_of_band_values_are_replaced() {
        let values = [100.0, 100.0, 500.0, 100.0, 100.0];
        let filtered = filter_outliers(&values, OUTLIER_WINDOW, OUTLIER_MIN, OUTLIER_MAX);
        assert_eq!(filtered[0], 100.0);
        assert_eq!(filtered[2], 180.0);
        assert_eq!(filtered[4], 100.0);

        let cold = filter_outliers(&[20.0, 5.0, 20.0], 5, OUTLIER_MIN, OUTLIER_MAX);
        assert_eq!(cold[1], 15.0);
    }

    #[test]
    fn empty_series_stays_empty() {
        assert!(filter_outliers(&[], 5, OUTLIER_MIN, OUTLIER_MAX).is_empty());
    }
}
