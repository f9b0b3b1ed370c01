//! Raw benchmark report model
//!
//! Serde mapping of the Macrobenchmark JSON output as emitted by the
//! benchmark harness. Field names follow the report's camelCase; everything
//! is defaulted so a partially populated report still deserializes — the
//! extractor decides what absence means.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One raw benchmark report: a list of test runs plus device context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub benchmarks: Vec<RawBenchmark>,

    #[serde(default)]
    pub context: RawContext,
}

/// One named test run inside a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBenchmark {
    #[serde(default)]
    pub name: String,

    /// Scalar metrics with median over repeated samples
    #[serde(default)]
    pub metrics: HashMap<String, RawMetric>,

    /// Distribution metrics reported as percentiles
    #[serde(default, rename = "sampledMetrics")]
    pub sampled_metrics: HashMap<String, RawSampledMetric>,

    #[serde(default, rename = "totalRunTimeNs")]
    pub total_run_time_ns: u64,

    #[serde(default, rename = "repeatIterations")]
    pub repeat_iterations: u64,
}

/// A scalar metric record; only the median is consumed downstream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetric {
    #[serde(default)]
    pub median: f64,

    #[serde(default)]
    pub minimum: Option<f64>,

    #[serde(default)]
    pub maximum: Option<f64>,
}

/// A sampled metric record with percentile summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSampledMetric {
    #[serde(default, rename = "P50")]
    pub p50: f64,

    #[serde(default, rename = "P90")]
    pub p90: f64,

    #[serde(default, rename = "P99")]
    pub p99: f64,
}

/// Device and system context the report was collected on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContext {
    #[serde(default)]
    pub build: RawBuild,

    #[serde(default, rename = "cpuCoreCount")]
    pub cpu_core_count: u32,

    #[serde(default, rename = "cpuMaxFreqHz")]
    pub cpu_max_freq_hz: u64,

    #[serde(default, rename = "memTotalBytes")]
    pub mem_total_bytes: u64,

    #[serde(default, rename = "cpuLocked")]
    pub cpu_locked: bool,

    #[serde(default, rename = "compilationMode")]
    pub compilation_mode: String,
}

/// Device build descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBuild {
    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub version: RawVersion,
}

/// OS version block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVersion {
    #[serde(default)]
    pub sdk: u32,
}

impl RawReport {
    /// Read and parse a raw report from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let report = serde_json::from_str(&content)?;
        Ok(report)
    }

    /// Locate a test run by exact name
    pub fn find_benchmark(&self, test_name: &str) -> Option<&RawBenchmark> {
        self.benchmarks.iter().find(|b| b.name == test_name)
    }

    /// Names of all test runs in the report
    pub fn benchmark_names(&self) -> Vec<&str> {
        self.benchmarks.iter().map(|b| b.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "benchmarks": [
            {
                "name": "atlasGenerationThroughZoomInteractions",
                "metrics": {
                    "AtlasManager.generateAtlasSumMs": {"median": 1520.4, "minimum": 1480.0, "maximum": 1610.2},
                    "memoryGpuMaxKb": {"median": 98304.0}
                },
                "sampledMetrics": {
                    "frameDurationCpuMs": {"P50": 7.1, "P90": 12.6, "P99": 21.9}
                },
                "totalRunTimeNs": 52000000000,
                "repeatIterations": 5
            }
        ],
        "context": {
            "build": {"model": "Pixel 6", "brand": "google", "version": {"sdk": 33}},
            "cpuCoreCount": 8,
            "cpuMaxFreqHz": 2802000000,
            "memTotalBytes": 7812030464,
            "cpuLocked": true,
            "compilationMode": "speed"
        }
    }"#;

    #[test]
    fn test_parse_sample_report() {
        let report: RawReport = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(report.benchmarks.len(), 1);

        let bench = report
            .find_benchmark("atlasGenerationThroughZoomInteractions")
            .unwrap();
        assert_eq!(bench.repeat_iterations, 5);
        assert_eq!(
            bench.metrics["AtlasManager.generateAtlasSumMs"].median,
            1520.4
        );
        assert_eq!(bench.sampled_metrics["frameDurationCpuMs"].p90, 12.6);

        assert_eq!(report.context.build.model, "Pixel 6");
        assert_eq!(report.context.build.version.sdk, 33);
        assert!(report.context.cpu_locked);
    }

    #[test]
    fn test_missing_fields_default() {
        let report: RawReport = serde_json::from_str(r#"{"benchmarks": [{"name": "x"}]}"#).unwrap();
        let bench = report.find_benchmark("x").unwrap();
        assert!(bench.metrics.is_empty());
        assert_eq!(bench.total_run_time_ns, 0);
        assert_eq!(report.context.build.model, "");
    }

    #[test]
    fn test_find_benchmark_is_exact_match() {
        let report: RawReport = serde_json::from_str(SAMPLE).unwrap();
        assert!(report.find_benchmark("atlasGeneration").is_none());
    }
}
