//! Per-request samples and running statistics

use serde::{Deserialize, Serialize};

/// One processed request as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Virtual time of the request, in seconds since the run started
    pub relative_time_secs: f64,
    /// Target rate after the strategy saw this outcome
    pub target_rpm: f64,
    /// Throughput measured by the server right after this request
    pub actual_rpm: f64,
    pub was_good: bool,
}

/// Monotonic counters kept across retention eviction and pause/resume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedStats {
    pub total_requests: u64,
    pub good_requests: u64,
    pub sum_rpm: f64,
    pub rpm_sample_count: u64,
}

impl AccumulatedStats {
    pub fn record(&mut self, sample: &SamplePoint) {
        self.total_requests += 1;
        if sample.was_good {
            self.good_requests += 1;
        }
        self.sum_rpm += sample.actual_rpm;
        self.rpm_sample_count += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn bad_requests(&self) -> u64 {
        self.total_requests - self.good_requests
    }

    /// Percentage of successful requests; 100 before the first request.
    pub fn success_rate_percent(&self) -> f64 {
        if self.total_requests == 0 {
            return 100.0;
        }
        self.good_requests as f64 / self.total_requests as f64 * 100.0
    }

    pub fn average_rpm(&self) -> f64 {
        if self.rpm_sample_count == 0 {
            return 0.0;
        }
        self.sum_rpm / self.rpm_sample_count as f64
    }

    /// Average throughput scaled by the success rate.
    pub fn expected_good_rpm(&self) -> f64 {
        if self.rpm_sample_count == 0 {
            return 0.0;
        }
        self.average_rpm() * self.success_rate_percent() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(actual_rpm: f64, was_good: bool) -> SamplePoint {
        SamplePoint {
            relative_time_secs: 0.0,
            target_rpm: 60.0,
            actual_rpm,
            was_good,
        }
    }

    #[test]
    fn test_empty_stats() {
        let stats = AccumulatedStats::default();
        assert_eq!(stats.success_rate_percent(), 100.0);
        assert_eq!(stats.average_rpm(), 0.0);
        assert_eq!(stats.expected_good_rpm(), 0.0);
    }

    #[test]
    fn test_derived_values() {
        let mut stats = AccumulatedStats::default();
        stats.record(&sample(40.0, true));
        stats.record(&sample(60.0, true));
        stats.record(&sample(80.0, false));
        stats.record(&sample(60.0, true));

        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.bad_requests(), 1);
        assert_eq!(stats.success_rate_percent(), 75.0);
        assert_eq!(stats.average_rpm(), 60.0);
        assert_eq!(stats.expected_good_rpm(), 45.0);

        stats.reset();
        assert_eq!(stats, AccumulatedStats::default());
    }
}
