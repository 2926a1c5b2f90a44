//! A `metrics::Recorder` that captures the driver's counters and gauges in memory.
//!
//! The driver emits `ratesim_requests_total{outcome}`, `ratesim_target_rpm` and
//! `ratesim_actual_rpm` through the `metrics` facade. Installing this recorder
//! locally around a run collects them without touching global state:
//!
//! ```rust,no_run
//! # use std::sync::{Arc, Mutex};
//! # use ratesim_metrics::{CapturedMetrics, with_captured_metrics};
//! let captured = Arc::new(Mutex::new(CapturedMetrics::default()));
//! with_captured_metrics(&captured, || {
//!     metrics::counter!("ratesim_requests_total", "outcome" => "good").increment(1);
//! });
//! let captured = captured.lock().unwrap();
//! assert_eq!(captured.counter("ratesim_requests_total", &[("outcome", "good")]), Some(1));
//! ```

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Metric values keyed by `name{label=value,...}` with labels sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapturedMetrics {
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, f64>,
    pub histograms: BTreeMap<String, Vec<f64>>,
}

impl CapturedMetrics {
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        self.counters.get(&render_key(name, labels)).copied()
    }

    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.gauges.get(&render_key(name, labels)).copied()
    }

    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Option<&[f64]> {
        self.histograms
            .get(&render_key(name, labels))
            .map(Vec::as_slice)
    }
}

fn render_key(name: &str, labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let mut labels = labels.to_vec();
    labels.sort_unstable();
    let rendered: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{name}{{{}}}", rendered.join(","))
}

fn owned_key(key: &Key) -> String {
    let labels: Vec<(&str, &str)> = key.labels().map(|l| (l.key(), l.value())).collect();
    render_key(key.name(), &labels)
}

type Shared = Arc<Mutex<CapturedMetrics>>;

fn lock(store: &Shared) -> MutexGuard<'_, CapturedMetrics> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Recorder writing into a shared [`CapturedMetrics`].
#[derive(Debug, Clone)]
pub struct CapturingRecorder {
    store: Shared,
}

impl CapturingRecorder {
    pub fn new(store: Shared) -> Self {
        Self { store }
    }
}

/// Run `f` with a [`CapturingRecorder`] installed for the current thread.
pub fn with_captured_metrics<T>(store: &Shared, f: impl FnOnce() -> T) -> T {
    let recorder = CapturingRecorder::new(store.clone());
    metrics::with_local_recorder(&recorder, f)
}

struct Handle {
    store: Shared,
    key: String,
}

impl metrics::CounterFn for Handle {
    fn increment(&self, value: u64) {
        *lock(&self.store).counters.entry(self.key.clone()).or_default() += value;
    }

    fn absolute(&self, value: u64) {
        lock(&self.store).counters.insert(self.key.clone(), value);
    }
}

impl metrics::GaugeFn for Handle {
    fn increment(&self, value: f64) {
        *lock(&self.store).gauges.entry(self.key.clone()).or_default() += value;
    }

    fn decrement(&self, value: f64) {
        *lock(&self.store).gauges.entry(self.key.clone()).or_default() -= value;
    }

    fn set(&self, value: f64) {
        lock(&self.store).gauges.insert(self.key.clone(), value);
    }
}

impl metrics::HistogramFn for Handle {
    fn record(&self, value: f64) {
        lock(&self.store)
            .histograms
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

impl CapturingRecorder {
    fn handle(&self, key: &Key) -> Arc<Handle> {
        Arc::new(Handle {
            store: self.store.clone(),
            key: owned_key(key),
        })
    }
}

impl Recorder for CapturingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(self.handle(key))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(self.handle(key))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(self.handle(key))
    }
}
