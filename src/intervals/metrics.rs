use crate::models::Interval;

/// Sum of span lengths. Expects a merged set; overlapping input double counts.
pub fn watched_duration(intervals: &[Interval]) -> f64 {
    intervals.iter().map(Interval::len).sum()
}

/// Share of `duration` covered by `watched_secs`, in `[0, 100]`.
///
/// Returns 0 when the duration is unknown (non-positive or non-finite).
/// Values past 100 only happen when spans run past the nominal duration and
/// are clamped.
pub fn progress_percent(watched_secs: f64, duration: f64) -> f64 {
    if !(duration.is_finite() && duration > 0.0) || !watched_secs.is_finite() {
        return 0.0;
    }
    (watched_secs / duration * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_sums_span_lengths() {
        let intervals = [Interval::new(0.0, 15.0), Interval::new(20.0, 25.0)];
        assert_eq!(watched_duration(&intervals), 20.0);
        assert_eq!(watched_duration(&[]), 0.0);
    }

    #[test]
    fn percent_is_zero_without_duration() {
        assert_eq!(progress_percent(30.0, 0.0), 0.0);
        assert_eq!(progress_percent(30.0, -5.0), 0.0);
        assert_eq!(progress_percent(30.0, f64::NAN), 0.0);
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(progress_percent(700.0, 596.0), 100.0);
        assert_eq!(progress_percent(-1.0, 596.0), 0.0);
        assert!((progress_percent(298.0, 596.0) - 50.0).abs() < 1e-9);
    }
}
