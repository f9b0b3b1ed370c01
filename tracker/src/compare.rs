//! Comparison engine
//!
//! Diffs two snapshots into per-metric signed deltas and classifies each
//! change against a significance policy. The engine is read-only over its
//! inputs; thresholding is a fixed-percentage heuristic, not a statistical
//! test, and the bands live behind a trait so a variance-aware policy can
//! be swapped in later without touching the comparison structure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::{MetricDescriptor, MetricRegistry, UnitKind};
use crate::snapshot::MetricSnapshot;
use crate::timeline::TimelineEntry;

/// Significance class of one metric change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Meaningful improvement beyond the significance band
    Improved,
    /// Meaningful regression beyond the significance band
    Regressed,
    /// Within run-to-run variance, or not comparable (zero/absent baseline)
    Noise,
    /// Neutral metric moved beyond its band; "more" is not inherently
    /// better or worse here
    Changed,
    /// Metric absent in the baseline, measured in the candidate
    Appeared,
    /// Metric measured in the baseline, absent in the candidate
    Vanished,
}

/// Per-metric comparison outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric: String,
    pub baseline_value: Option<f64>,
    pub candidate_value: Option<f64>,
    /// `None` when either side is absent or the baseline is zero
    pub absolute_delta: Option<f64>,
    /// Percent change relative to the baseline; `None` when undefined
    pub percent_delta: Option<f64>,
    pub classification: Classification,
}

/// Classification policy over a computed percent delta
pub trait SignificancePolicy {
    fn classify(&self, descriptor: &MetricDescriptor, percent_delta: f64) -> Classification;
}

/// Fixed-percentage significance bands
///
/// Time metrics use an asymmetric-looking but symmetric ±15% band mapped
/// onto improved/regressed; other kinds use a tighter ±5% band with a
/// neutral label.
#[derive(Debug, Clone)]
pub struct FixedBandPolicy {
    pub time_band_percent: f64,
    pub neutral_band_percent: f64,
}

impl Default for FixedBandPolicy {
    fn default() -> Self {
        Self {
            time_band_percent: 15.0,
            neutral_band_percent: 5.0,
        }
    }
}

impl SignificancePolicy for FixedBandPolicy {
    fn classify(&self, descriptor: &MetricDescriptor, percent_delta: f64) -> Classification {
        match descriptor.unit_kind {
            UnitKind::TimeMs => {
                let band = self.time_band_percent;
                // lower is better for time; flip when a profile says otherwise
                let signed = if descriptor.higher_is_worse {
                    percent_delta
                } else {
                    -percent_delta
                };
                if signed <= -band {
                    Classification::Improved
                } else if signed >= band {
                    Classification::Regressed
                } else {
                    Classification::Noise
                }
            }
            UnitKind::MemoryKb | UnitKind::Count => {
                if percent_delta.abs() < self.neutral_band_percent {
                    Classification::Noise
                } else {
                    Classification::Changed
                }
            }
        }
    }
}

/// Entry-level comparison: per-test metric results plus a headline verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryComparison {
    pub baseline_label: String,
    pub candidate_label: String,
    /// test name -> metric name -> result, for tests present in both entries
    pub tests: BTreeMap<String, BTreeMap<String, ComparisonResult>>,
    /// Verdict on the profile's primary metric; `None` when either entry
    /// lacks the primary test or metric
    pub headline: Option<ComparisonResult>,
}

/// First-to-latest change of one time metric across a timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricChange {
    pub metric: String,
    pub first: f64,
    pub latest: f64,
    pub percent_delta: f64,
}

/// Comparison engine over a metric registry and a significance policy
pub struct ComparisonEngine {
    registry: MetricRegistry,
    policy: Box<dyn SignificancePolicy + Send + Sync>,
}

impl ComparisonEngine {
    /// Engine with the default fixed-band policy
    pub fn new(registry: MetricRegistry) -> Self {
        Self::with_policy(registry, Box::new(FixedBandPolicy::default()))
    }

    pub fn with_policy(
        registry: MetricRegistry,
        policy: Box<dyn SignificancePolicy + Send + Sync>,
    ) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Compare one metric pair
    pub fn compare_metric(
        &self,
        descriptor: &MetricDescriptor,
        baseline: Option<f64>,
        candidate: Option<f64>,
    ) -> ComparisonResult {
        let (absolute_delta, percent_delta, classification) = match (baseline, candidate) {
            // both unmeasured: nothing changed
            (None, None) => (None, None, Classification::Noise),
            (None, Some(_)) => (None, None, Classification::Appeared),
            (Some(_), None) => (None, None, Classification::Vanished),
            (Some(base), Some(cand)) => {
                if base == 0.0 {
                    // division-by-zero avoidance is a classification
                    // outcome, not an error
                    (None, None, Classification::Noise)
                } else {
                    let delta = cand - base;
                    let percent = delta / base * 100.0;
                    (
                        Some(delta),
                        Some(percent),
                        self.policy.classify(descriptor, percent),
                    )
                }
            }
        };

        ComparisonResult {
            metric: descriptor.name.clone(),
            baseline_value: baseline,
            candidate_value: candidate,
            absolute_delta,
            percent_delta,
            classification,
        }
    }

    /// Compare two snapshots metric by metric
    ///
    /// Every tracked metric appears in the result, including unmeasured
    /// ones, so callers can render a complete table.
    pub fn compare(
        &self,
        baseline: &MetricSnapshot,
        candidate: &MetricSnapshot,
    ) -> BTreeMap<String, ComparisonResult> {
        self.registry
            .metrics
            .iter()
            .map(|descriptor| {
                let result = self.compare_metric(
                    descriptor,
                    baseline.value(&descriptor.name),
                    candidate.value(&descriptor.name),
                );
                (descriptor.name.clone(), result)
            })
            .collect()
    }

    /// Compare two timeline entries over every test present in both
    pub fn compare_entry(
        &self,
        baseline: &TimelineEntry,
        candidate: &TimelineEntry,
    ) -> EntryComparison {
        let mut tests = BTreeMap::new();
        for test in &self.registry.tracked_tests {
            let (Some(base_snap), Some(cand_snap)) =
                (baseline.snapshots.get(test), candidate.snapshots.get(test))
            else {
                continue;
            };
            if !base_snap.found || !cand_snap.found {
                continue;
            }
            tests.insert(test.clone(), self.compare(base_snap, cand_snap));
        }

        let headline = tests
            .get(&self.registry.primary_test)
            .and_then(|metrics| metrics.get(&self.registry.primary_metric))
            .cloned();

        EntryComparison {
            baseline_label: baseline.label.clone(),
            candidate_label: candidate.label.clone(),
            tests,
            headline,
        }
    }

    /// First-to-latest progress over the primary test's time metrics,
    /// sorted most-improved first
    pub fn improvement_summary(&self, entries: &[TimelineEntry]) -> Vec<MetricChange> {
        let (Some(first), Some(latest)) = (entries.first(), entries.last()) else {
            return Vec::new();
        };
        if entries.len() < 2 {
            return Vec::new();
        }

        let primary = &self.registry.primary_test;
        let (Some(first_snap), Some(latest_snap)) =
            (first.snapshots.get(primary), latest.snapshots.get(primary))
        else {
            return Vec::new();
        };

        let mut changes: Vec<MetricChange> = self
            .registry
            .metrics
            .iter()
            .filter(|m| m.unit_kind == UnitKind::TimeMs)
            .filter_map(|descriptor| {
                let first_value = first_snap.value(&descriptor.name)?;
                let latest_value = latest_snap.value(&descriptor.name)?;
                if first_value <= 0.0 {
                    return None;
                }
                Some(MetricChange {
                    metric: descriptor.name.clone(),
                    first: first_value,
                    latest: latest_value,
                    percent_delta: (latest_value - first_value) / first_value * 100.0,
                })
            })
            .collect();

        changes.sort_by(|a, b| {
            a.percent_delta
                .partial_cmp(&b.percent_delta)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::extract;

    fn engine() -> ComparisonEngine {
        ComparisonEngine::new(MetricRegistry::atlas())
    }

    fn time_descriptor() -> MetricDescriptor {
        MetricRegistry::atlas()
            .descriptor("AtlasManager.generateAtlasSumMs")
            .unwrap()
            .clone()
    }

    fn memory_descriptor() -> MetricDescriptor {
        MetricRegistry::atlas().descriptor("memoryGpuMaxKb").unwrap().clone()
    }

    #[test]
    fn test_classification_bands() {
        let engine = engine();
        let descriptor = time_descriptor();

        let improved = engine.compare_metric(&descriptor, Some(100.0), Some(80.0));
        assert_eq!(improved.percent_delta, Some(-20.0));
        assert_eq!(improved.classification, Classification::Improved);

        let noise = engine.compare_metric(&descriptor, Some(100.0), Some(95.0));
        assert_eq!(noise.percent_delta, Some(-5.0));
        assert_eq!(noise.classification, Classification::Noise);

        let regressed = engine.compare_metric(&descriptor, Some(100.0), Some(120.0));
        assert_eq!(regressed.percent_delta, Some(20.0));
        assert_eq!(regressed.classification, Classification::Regressed);
    }

    #[test]
    fn test_band_boundaries_inclusive() {
        let engine = engine();
        let descriptor = time_descriptor();

        let at_improve = engine.compare_metric(&descriptor, Some(100.0), Some(85.0));
        assert_eq!(at_improve.classification, Classification::Improved);

        let at_regress = engine.compare_metric(&descriptor, Some(100.0), Some(115.0));
        assert_eq!(at_regress.classification, Classification::Regressed);

        let just_inside = engine.compare_metric(&descriptor, Some(100.0), Some(114.9));
        assert_eq!(just_inside.classification, Classification::Noise);
    }

    #[test]
    fn test_zero_baseline_is_noise_not_error() {
        let engine = engine();
        let result = engine.compare_metric(&time_descriptor(), Some(0.0), Some(50.0));
        assert_eq!(result.classification, Classification::Noise);
        assert_eq!(result.percent_delta, None);
        assert_eq!(result.absolute_delta, None);
    }

    #[test]
    fn test_absence_classifications() {
        let engine = engine();
        let descriptor = time_descriptor();

        assert_eq!(
            engine.compare_metric(&descriptor, None, None).classification,
            Classification::Noise
        );
        assert_eq!(
            engine.compare_metric(&descriptor, None, Some(5.0)).classification,
            Classification::Appeared
        );
        assert_eq!(
            engine.compare_metric(&descriptor, Some(5.0), None).classification,
            Classification::Vanished
        );
    }

    #[test]
    fn test_neutral_metrics_use_tighter_band() {
        let engine = engine();
        let descriptor = memory_descriptor();

        let small = engine.compare_metric(&descriptor, Some(1000.0), Some(1040.0));
        assert_eq!(small.classification, Classification::Noise);

        let large = engine.compare_metric(&descriptor, Some(1000.0), Some(1100.0));
        assert_eq!(large.classification, Classification::Changed);
    }

    #[test]
    fn test_self_compare_is_all_noise() {
        let registry = MetricRegistry::atlas();
        let report = serde_json::from_str(
            r#"{"benchmarks": [{
                "name": "atlasGenerationThroughZoomInteractions",
                "metrics": {
                    "AtlasManager.generateAtlasSumMs": {"median": 1520.4},
                    "PhotoLODProcessor.scaleBitmapSumMs": {"median": 431.2},
                    "memoryGpuMaxKb": {"median": 98304.0}
                }
            }]}"#,
        )
        .unwrap();
        let snapshot = extract(&registry, &report, "atlasGenerationThroughZoomInteractions");

        let engine = ComparisonEngine::new(registry);
        let results = engine.compare(&snapshot, &snapshot);
        for result in results.values() {
            assert_eq!(result.classification, Classification::Noise, "{}", result.metric);
            if result.baseline_value.map(|v| v != 0.0).unwrap_or(false) {
                assert_eq!(result.percent_delta, Some(0.0));
            }
        }
    }

    #[test]
    fn test_custom_policy_is_pluggable() {
        struct AlwaysRegressed;
        impl SignificancePolicy for AlwaysRegressed {
            fn classify(&self, _: &MetricDescriptor, _: f64) -> Classification {
                Classification::Regressed
            }
        }

        let engine =
            ComparisonEngine::with_policy(MetricRegistry::atlas(), Box::new(AlwaysRegressed));
        let result = engine.compare_metric(&time_descriptor(), Some(100.0), Some(100.1));
        assert_eq!(result.classification, Classification::Regressed);
    }
}
