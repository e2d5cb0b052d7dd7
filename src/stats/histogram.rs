//! Probe-length histogram using HdrHistogram
//!
//! Records how many boxes each draw had to inspect before its ball was placed.
//! Chaining always inspects one box and double choice two; the open-addressing
//! strategies inspect one box plus one per collision.
//!
//! # Example
//!
//! ```
//! use hashsim::stats::histogram::ProbeHistogram;
//!
//! let mut hist = ProbeHistogram::new();
//! hist.record(1);
//! hist.record(1);
//! hist.record(4);
//!
//! assert_eq!(hist.len(), 3);
//! assert_eq!(hist.max(), Some(4));
//! ```

use hdrhistogram::Histogram;

/// Highest probe count tracked with full precision
const MAX_TRACKABLE_PROBES: u64 = 1_000_000_000;

const SIGNIFICANT_DIGITS: u8 = 3;

// hdrhistogram rejects high < 2 * low and more than 5 significant digits
const _: () = assert!(MAX_TRACKABLE_PROBES >= 2 && SIGNIFICANT_DIGITS <= 5);

/// Probe-length histogram wrapper
///
/// Tracks probe counts from 1 to one billion with 3 significant digits; larger
/// values are clamped.
#[derive(Debug, Clone)]
pub struct ProbeHistogram {
    histogram: Histogram<u64>,
}

impl ProbeHistogram {
    pub fn new() -> Self {
        let histogram = Histogram::new_with_bounds(1, MAX_TRACKABLE_PROBES, SIGNIFICANT_DIGITS)
            .expect("Failed to create histogram with valid bounds");

        Self { histogram }
    }

    /// Record the number of boxes one draw inspected
    #[inline]
    pub fn record(&mut self, probes: u64) {
        let value = probes.clamp(1, MAX_TRACKABLE_PROBES);
        // Clamped above, so recording cannot go out of range
        let _ = self.histogram.record(value);
    }

    /// Probe count at a percentile (0.0 - 100.0), `None` when empty
    pub fn percentile(&self, percentile: f64) -> Option<u64> {
        if self.histogram.len() == 0 {
            return None;
        }
        Some(self.histogram.value_at_percentile(percentile))
    }

    pub fn max(&self) -> Option<u64> {
        if self.histogram.len() == 0 {
            return None;
        }
        Some(self.histogram.max())
    }

    pub fn mean(&self) -> Option<f64> {
        if self.histogram.len() == 0 {
            return None;
        }
        Some(self.histogram.mean())
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }
}

impl Default for ProbeHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_empty() {
        let hist = ProbeHistogram::new();
        assert!(hist.is_empty());
        assert_eq!(hist.max(), None);
        assert_eq!(hist.mean(), None);
        assert_eq!(hist.percentile(50.0), None);
    }

    #[test]
    fn test_histogram_records() {
        let mut hist = ProbeHistogram::new();
        for probes in [1, 1, 1, 2, 5] {
            hist.record(probes);
        }
        assert_eq!(hist.len(), 5);
        assert_eq!(hist.max(), Some(5));
        assert_eq!(hist.percentile(50.0), Some(1));
        let mean = hist.mean().unwrap();
        assert!((mean - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_histogram_clamps_to_upper_bound() {
        let mut hist = ProbeHistogram::default();
        hist.record(u64::MAX);
        hist.record(MAX_TRACKABLE_PROBES);

        assert_eq!(hist.len(), 2);
        let max = hist.max().unwrap();
        assert!(max >= MAX_TRACKABLE_PROBES);
        assert!(max <= MAX_TRACKABLE_PROBES + MAX_TRACKABLE_PROBES / 1000);
    }

    #[test]
    fn test_histogram_clamps_zero() {
        let mut hist = ProbeHistogram::new();
        hist.record(0);
        assert_eq!(hist.max(), Some(1));
    }
}
