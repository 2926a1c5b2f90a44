//! End-of-run summary combining accumulated statistics with RPM percentiles

use crate::error::MetricsError;
use hdrhistogram::Histogram as HdrHistogram;
use ratesim_core::SimulationSnapshot;
use serde::Serialize;

/// RPM values are recorded in hundredths.
const SCALE: f64 = 100.0;
/// Highest recordable RPM; larger values saturate.
const MAX_RECORDABLE_RPM: u64 = 1_000_000;

/// Percentiles of one RPM series over the retained window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RpmPercentiles {
    pub count: u64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}

impl RpmPercentiles {
    fn from_values(values: impl Iterator<Item = f64>) -> Result<Self, MetricsError> {
        let mut hist = HdrHistogram::<u64>::new_with_bounds(1, MAX_RECORDABLE_RPM * SCALE as u64, 3)
            .map_err(|e| MetricsError::Histogram(e.to_string()))?;

        for value in values.filter(|v| v.is_finite()) {
            hist.saturating_record((value.max(0.0) * SCALE).round() as u64);
        }

        if hist.is_empty() {
            return Ok(Self::default());
        }
        let unscale = |v: u64| v as f64 / SCALE;
        Ok(Self {
            count: hist.len(),
            mean: hist.mean() / SCALE,
            p50: unscale(hist.value_at_quantile(0.5)),
            p95: unscale(hist.value_at_quantile(0.95)),
            p99: unscale(hist.value_at_quantile(0.99)),
            max: unscale(hist.max()),
        })
    }
}

/// Headline numbers of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub strategy: String,
    pub final_time_secs: f64,
    pub total_requests: u64,
    pub good_requests: u64,
    pub bad_requests: u64,
    /// 100 before the first request
    pub success_rate_percent: f64,
    pub average_rpm: f64,
    /// Average throughput scaled by the success rate
    pub expected_good_rpm: f64,
    pub final_target_rpm: f64,
    /// Over the retained samples only
    pub target_rpm: RpmPercentiles,
    /// Over the retained samples only
    pub actual_rpm: RpmPercentiles,
}

impl RunSummary {
    pub fn from_snapshot(snapshot: &SimulationSnapshot) -> Result<Self, MetricsError> {
        let stats = &snapshot.stats;
        Ok(Self {
            strategy: snapshot.strategy.to_string(),
            final_time_secs: snapshot.time.as_secs_f64(),
            total_requests: stats.total_requests,
            good_requests: stats.good_requests,
            bad_requests: stats.bad_requests(),
            success_rate_percent: stats.success_rate_percent(),
            average_rpm: stats.average_rpm(),
            expected_good_rpm: stats.expected_good_rpm(),
            final_target_rpm: snapshot.target_rpm,
            target_rpm: RpmPercentiles::from_values(snapshot.samples.iter().map(|s| s.target_rpm))?,
            actual_rpm: RpmPercentiles::from_values(snapshot.samples.iter().map(|s| s.actual_rpm))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles_at_hundredth_resolution() {
        let values = (1..=100).map(|i| i as f64);
        let p = RpmPercentiles::from_values(values).unwrap();
        assert_eq!(p.count, 100);
        assert!((p.p50 - 50.0).abs() < 0.1);
        assert!((p.p99 - 99.0).abs() < 0.1);
        assert!((p.max - 100.0).abs() < 0.1);
        assert!((p.mean - 50.5).abs() < 0.1);
    }

    #[test]
    fn test_empty_and_non_finite_values() {
        let p = RpmPercentiles::from_values([f64::NAN, f64::INFINITY].into_iter()).unwrap();
        assert_eq!(p, RpmPercentiles::default());
    }
}
