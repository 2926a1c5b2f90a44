//! Time-bucketed views over the retained sample window
//!
//! Samples are keyed by how long before the newest sample they happened, so
//! every key is zero or negative. Two independent passes run newest to oldest:
//!
//! - **Fine** buckets keep the most recent sample in each bucket, carrying
//!   target and measured RPM for a rate chart.
//! - **Coarse** buckets count good and bad outcomes for a bar chart, limited to
//!   the last few buckets.
//!
//! Aggregation is recomputed from scratch on every call, so aggregating the
//! same window twice gives the same result.

use ratesim_core::SamplePoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Bucketing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Width of a fine bucket, in seconds
    pub fine_bucket_secs: f64,
    /// Fine buckets keyed at or before `-fine_lookback_secs` are dropped
    pub fine_lookback_secs: f64,
    /// Width of a coarse bucket, in seconds
    pub coarse_bucket_secs: f64,
    /// Number of coarse buckets kept
    pub coarse_bucket_count: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            fine_bucket_secs: 0.5,
            fine_lookback_secs: 30.0,
            coarse_bucket_secs: 2.0,
            coarse_bucket_count: 15,
        }
    }
}

impl AggregatorConfig {
    /// Replaces non-positive or non-finite widths and horizons with defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        Self {
            fine_bucket_secs: positive(self.fine_bucket_secs, defaults.fine_bucket_secs),
            fine_lookback_secs: positive(self.fine_lookback_secs, defaults.fine_lookback_secs),
            coarse_bucket_secs: positive(self.coarse_bucket_secs, defaults.coarse_bucket_secs),
            coarse_bucket_count: self.coarse_bucket_count.max(1),
        }
    }
}

/// Most recent sample of one fine bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FineBucket {
    /// Bucket start relative to the newest sample, `<= 0`
    pub time_ago_secs: f64,
    pub target_rpm: f64,
    pub actual_rpm: f64,
    pub was_good: bool,
}

/// Outcome counts of one coarse bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoarseBucket {
    /// Bucket start relative to the newest sample, `<= 0`
    pub time_ago_secs: f64,
    pub good: u64,
    pub bad: u64,
}

impl CoarseBucket {
    pub fn total(&self) -> u64 {
        self.good + self.bad
    }
}

/// Both bucket series, each time-ascending (oldest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedSeries {
    pub fine: Vec<FineBucket>,
    pub coarse: Vec<CoarseBucket>,
}

/// Buckets a sample window into fine and coarse series.
///
/// # Example
///
/// ```rust
/// use ratesim_core::SamplePoint;
/// use ratesim_metrics::TimeSeriesAggregator;
///
/// let samples: Vec<SamplePoint> = (0..10)
///     .map(|i| SamplePoint {
///         relative_time_secs: i as f64 * 0.25,
///         target_rpm: 240.0,
///         actual_rpm: 240.0,
///         was_good: i % 3 != 0,
///     })
///     .collect();
///
/// let series = TimeSeriesAggregator::default().aggregate(&samples);
/// assert_eq!(series.coarse.iter().map(|b| b.total()).sum::<u64>(), 10);
/// assert_eq!(series.fine.last().unwrap().time_ago_secs, 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeSeriesAggregator {
    config: AggregatorConfig,
}

impl TimeSeriesAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Aggregate `samples`, which must be ordered oldest first.
    pub fn aggregate(&self, samples: &[SamplePoint]) -> AggregatedSeries {
        let Some(latest) = samples.last().map(|s| s.relative_time_secs) else {
            return AggregatedSeries::default();
        };

        let fine_width = self.config.fine_bucket_secs;
        let coarse_width = self.config.coarse_bucket_secs;
        let coarse_horizon = -(self.config.coarse_bucket_count as f64) * coarse_width;

        let mut fine: BTreeMap<i64, FineBucket> = BTreeMap::new();
        let mut coarse: BTreeMap<i64, CoarseBucket> = BTreeMap::new();

        for sample in samples.iter().rev() {
            let time_ago = sample.relative_time_secs - latest;

            let fine_index = bucket_index(time_ago, fine_width);
            let fine_key = fine_index as f64 * fine_width;
            if fine_key > -self.config.fine_lookback_secs {
                fine.entry(fine_index).or_insert(FineBucket {
                    time_ago_secs: fine_key,
                    target_rpm: sample.target_rpm,
                    actual_rpm: sample.actual_rpm,
                    was_good: sample.was_good,
                });
            }

            let coarse_index = bucket_index(time_ago, coarse_width);
            let coarse_key = coarse_index as f64 * coarse_width;
            if coarse_key > coarse_horizon {
                let bucket = coarse.entry(coarse_index).or_insert(CoarseBucket {
                    time_ago_secs: coarse_key,
                    ..CoarseBucket::default()
                });
                if sample.was_good {
                    bucket.good += 1;
                } else {
                    bucket.bad += 1;
                }
            }
        }

        trace!(
            samples = samples.len(),
            fine = fine.len(),
            coarse = coarse.len(),
            "Aggregated sample window"
        );

        // BTreeMap iterates ascending, which is oldest first for keys <= 0.
        AggregatedSeries {
            fine: fine.into_values().collect(),
            coarse: coarse.into_values().collect(),
        }
    }
}

fn bucket_index(time_ago_secs: f64, width: f64) -> i64 {
    (time_ago_secs / width).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64, rpm: f64, was_good: bool) -> SamplePoint {
        SamplePoint {
            relative_time_secs: t,
            target_rpm: rpm,
            actual_rpm: rpm,
            was_good,
        }
    }

    #[test]
    fn test_empty_window() {
        let series = TimeSeriesAggregator::default().aggregate(&[]);
        assert!(series.fine.is_empty());
        assert!(series.coarse.is_empty());
    }

    #[test]
    fn test_fine_bucket_keeps_most_recent_sample() {
        // Relative to 10.0: -0.4 and -0.3 share bucket -0.5, 0.0 is its own.
        let samples = [
            sample(9.6, 10.0, true),
            sample(9.7, 20.0, true),
            sample(10.0, 30.0, true),
        ];
        let series = TimeSeriesAggregator::default().aggregate(&samples);
        assert_eq!(series.fine.len(), 2);
        assert_eq!(series.fine[0].time_ago_secs, -0.5);
        assert_eq!(series.fine[0].target_rpm, 20.0);
        assert_eq!(series.fine[1].time_ago_secs, 0.0);
        assert_eq!(series.fine[1].target_rpm, 30.0);
    }

    #[test]
    fn test_coarse_counts_and_horizon() {
        // One sample per second for 40 seconds.
        let samples: Vec<_> = (0..=40)
            .map(|i| sample(i as f64, 60.0, i % 4 != 0))
            .collect();
        let series = TimeSeriesAggregator::default().aggregate(&samples);

        // Keys -28, -26, ..., 0 survive; -30 is at the horizon and dropped.
        assert_eq!(series.coarse.len(), 15);
        assert_eq!(series.coarse.first().unwrap().time_ago_secs, -28.0);
        assert_eq!(series.coarse.last().unwrap().time_ago_secs, 0.0);
        // Bucket 0 holds only the newest sample, the others two each.
        assert_eq!(series.coarse.last().unwrap().total(), 1);
        assert!(series.coarse[..14].iter().all(|b| b.total() == 2));
    }

    #[test]
    fn test_fine_lookback_is_bounded() {
        let samples: Vec<_> = (0..=100)
            .map(|i| sample(i as f64, 60.0, true))
            .collect();
        let series = TimeSeriesAggregator::default().aggregate(&samples);
        assert!(series.fine.iter().all(|b| b.time_ago_secs > -30.0));
        assert_eq!(series.fine.len(), 30);
    }

    #[test]
    fn test_output_is_time_ascending() {
        let samples: Vec<_> = (0..50)
            .map(|i| sample(i as f64 * 0.3, 60.0, i % 2 == 0))
            .collect();
        let series = TimeSeriesAggregator::default().aggregate(&samples);
        assert!(series
            .fine
            .windows(2)
            .all(|w| w[0].time_ago_secs < w[1].time_ago_secs));
        assert!(series
            .coarse
            .windows(2)
            .all(|w| w[0].time_ago_secs < w[1].time_ago_secs));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let samples: Vec<_> = (0..200)
            .map(|i| sample(i as f64 * 0.17, 50.0 + i as f64, i % 5 != 0))
            .collect();
        let aggregator = TimeSeriesAggregator::default();
        assert_eq!(aggregator.aggregate(&samples), aggregator.aggregate(&samples));
    }

    #[test]
    fn test_config_normalization() {
        let config = AggregatorConfig {
            fine_bucket_secs: 0.0,
            fine_lookback_secs: f64::NAN,
            coarse_bucket_secs: -1.0,
            coarse_bucket_count: 0,
        }
        .normalized();
        assert_eq!(config.fine_bucket_secs, 0.5);
        assert_eq!(config.fine_lookback_secs, 30.0);
        assert_eq!(config.coarse_bucket_secs, 2.0);
        assert_eq!(config.coarse_bucket_count, 1);
    }
}
