//! Snapshot extraction
//!
//! Normalizes one raw benchmark test run into a flat `MetricSnapshot`:
//! one optional scalar per tracked metric plus percentile distributions
//! for the sampled frame-timing family. Extraction is a pure function of
//! its inputs; a missing test name is an expected, reportable condition,
//! not an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::MetricRegistry;
use crate::raw::RawReport;

/// Percentile summary for a sampled metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
}

/// Normalized metric values for one named test run
///
/// Scalar values are `None` when the metric was absent from the raw data,
/// which is distinct from a genuine `Some(0.0)` measurement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Whether the named test existed in the raw report
    pub found: bool,

    /// Median value per tracked metric; `None` = not present in raw data
    pub metrics: BTreeMap<String, Option<f64>>,

    /// Percentile distributions for sampled metrics present in the report
    pub percentiles: BTreeMap<String, PercentileSet>,

    /// Repeat iterations the medians were taken over
    pub sample_count: u64,

    /// Total wall time of the test run in nanoseconds
    pub total_duration_ns: u64,
}

impl MetricSnapshot {
    /// Snapshot for a test that was not present in the raw report
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Value of a tracked metric, `None` when unmeasured
    pub fn value(&self, metric_name: &str) -> Option<f64> {
        self.metrics.get(metric_name).copied().flatten()
    }
}

/// Extract a snapshot for `test_name` from a raw report
///
/// Every metric declared in the registry gets a key in the result; absent
/// metrics map to `None`. Percentile metrics are included only when the
/// report actually sampled them.
pub fn extract(registry: &MetricRegistry, report: &RawReport, test_name: &str) -> MetricSnapshot {
    let Some(bench) = report.find_benchmark(test_name) else {
        return MetricSnapshot::not_found();
    };

    let mut metrics = BTreeMap::new();
    for descriptor in &registry.metrics {
        let value = bench.metrics.get(&descriptor.name).map(|m| m.median);
        metrics.insert(descriptor.name.clone(), value);
    }

    let mut percentiles = BTreeMap::new();
    for name in &registry.percentile_metrics {
        if let Some(sampled) = bench.sampled_metrics.get(name) {
            percentiles.insert(
                name.clone(),
                PercentileSet {
                    p50: sampled.p50,
                    p90: sampled.p90,
                    p99: sampled.p99,
                },
            );
        }
    }

    MetricSnapshot {
        found: true,
        metrics,
        percentiles,
        sample_count: bench.repeat_iterations,
        total_duration_ns: bench.total_run_time_ns,
    }
}

/// Extract snapshots for every tracked test in the registry
pub fn extract_all(registry: &MetricRegistry, report: &RawReport) -> BTreeMap<String, MetricSnapshot> {
    registry
        .tracked_tests
        .iter()
        .map(|test| (test.clone(), extract(registry, report, test)))
        .collect()
}
