//! Profile configuration for tracked metrics
//!
//! A profile declares which named metrics are tracked for one subsystem
//! under optimization, their semantic kind, and which benchmark tests feed
//! them. The registry is an explicit immutable configuration object passed
//! to extraction and comparison — never process-global state — so several
//! profiles can coexist in one process.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, ProfileResult};

/// Semantic kind of a tracked metric, driving classification policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Wall-clock duration in milliseconds; lower is better
    TimeMs,
    /// Memory footprint in kilobytes
    MemoryKb,
    /// Dimensionless count
    Count,
}

/// A single tracked metric declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// Metric name as it appears in the raw benchmark report
    pub name: String,

    /// Semantic kind
    pub unit_kind: UnitKind,

    /// Whether a larger value indicates worse performance
    pub higher_is_worse: bool,

    /// Human-readable description for reporting
    #[serde(default)]
    pub description: String,
}

impl MetricDescriptor {
    fn time(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            unit_kind: UnitKind::TimeMs,
            higher_is_worse: true,
            description: description.to_string(),
        }
    }

    fn memory(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            unit_kind: UnitKind::MemoryKb,
            higher_is_worse: true,
            description: description.to_string(),
        }
    }
}

/// Immutable registry of tracked metrics for one optimization profile
///
/// Loaded once per profile; fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRegistry {
    /// Profile name (keys the persisted timeline)
    pub name: String,

    /// Scalar metrics tracked per test run
    pub metrics: Vec<MetricDescriptor>,

    /// Metrics reported as percentile distributions (frame-timing family)
    pub percentile_metrics: Vec<String>,

    /// Benchmark test names to extract from every raw report
    pub tracked_tests: Vec<String>,

    /// Test carrying the headline end-to-end metric
    pub primary_test: String,

    /// Metric keyed to the headline verdict
    pub primary_metric: String,

    /// Aggressive optimization target in milliseconds
    pub target_time_ms: f64,

    /// Realistic reference time in milliseconds
    pub reference_time_ms: f64,
}

impl MetricRegistry {
    /// Names of built-in profiles
    pub fn builtin_names() -> Vec<String> {
        vec!["atlas".to_string()]
    }

    /// Resolve a built-in profile by name
    pub fn builtin(name: &str) -> ProfileResult<Self> {
        match name {
            "atlas" => Ok(Self::atlas()),
            other => Err(ProfileError::UnknownProfile {
                name: other.to_string(),
                available: Self::builtin_names(),
            }),
        }
    }

    /// Atlas texture system optimization profile
    pub fn atlas() -> Self {
        let metrics = vec![
            // Primary optimization targets
            MetricDescriptor::time("PhotoLODProcessor.scaleBitmapSumMs", "Bitmap scaling operations"),
            MetricDescriptor::time("AtlasGenerator.softwareCanvasSumMs", "Software canvas rendering"),
            // Supporting atlas metrics
            MetricDescriptor::time("PhotoLODProcessor.loadBitmapSumMs", "Bitmap loading I/O"),
            MetricDescriptor::time("AtlasGenerator.createAtlasBitmapSumMs", "Atlas bitmap creation"),
            MetricDescriptor::time("AtlasManager.updateVisibleCellsSumMs", "Atlas coordination"),
            MetricDescriptor::time("AtlasManager.generateAtlasSumMs", "Atlas generation total"),
            MetricDescriptor::time("AtlasManager.selectLODLevelSumMs", "LOD level selection"),
            // Disk I/O operations
            MetricDescriptor::time(
                "PhotoLODProcessor.diskOpenInputStreamSumMs",
                "Disk I/O - ContentResolver file access",
            ),
            MetricDescriptor::time(
                "PhotoLODProcessor.diskReadFileHeaderSumMs",
                "Disk I/O - File header reading",
            ),
            // Memory I/O operations
            MetricDescriptor::time(
                "PhotoLODProcessor.memoryDecodeBoundsSumMs",
                "Memory I/O - Bitmap bounds decoding",
            ),
            MetricDescriptor::time(
                "PhotoLODProcessor.memoryDecodeBitmapSumMs",
                "Memory I/O - Full bitmap decoding",
            ),
            MetricDescriptor::time(
                "PhotoLODProcessor.memorySampleSizeCalcSumMs",
                "Memory I/O - Sample size calculation",
            ),
            // Hardware-accelerated scaling
            MetricDescriptor::time("PhotoScaler.scaleSumMs", "PhotoScaler main operations"),
            MetricDescriptor::time(
                "PhotoScaler.createScaledBitmapSumMs",
                "Hardware-accelerated bitmap scaling",
            ),
            MetricDescriptor::time("PhotoScaler.createCroppedBitmapSumMs", "Bitmap cropping operations"),
            MetricDescriptor::time("PhotoScaler.calculateDimensionsSumMs", "Size calculation algorithms"),
            // Memory management
            MetricDescriptor::time("Atlas.bitmapAllocateSumMs", "Bitmap memory allocation"),
            MetricDescriptor::time("Atlas.bitmapRecycleSumMs", "Bitmap memory recycling"),
            MetricDescriptor::time("Atlas.atlasCleanupSumMs", "Atlas memory cleanup"),
            MetricDescriptor::time("Atlas.processedPhotoCleanupSumMs", "Processed photo cleanup"),
            // Texture packing algorithm
            MetricDescriptor::time("TexturePacker.packAlgorithmSumMs", "Main texture packing algorithm"),
            MetricDescriptor::time("TexturePacker.sortImagesSumMs", "Image sorting by height"),
            MetricDescriptor::time("TexturePacker.packSingleImageSumMs", "Individual image packing"),
            MetricDescriptor::time("TexturePacker.findShelfFitSumMs", "Shelf fitting algorithm"),
            MetricDescriptor::time("TexturePacker.createNewShelfSumMs", "New shelf creation"),
            // Memory footprint
            MetricDescriptor::memory("memoryGpuMaxKb", "Peak GPU memory"),
            MetricDescriptor::memory("memoryHeapSizeMaxKb", "Peak heap size"),
            MetricDescriptor::memory("memoryRssAnonMaxKb", "Peak anonymous RSS"),
            MetricDescriptor::memory("memoryRssFileMaxKb", "Peak file-backed RSS"),
        ];

        Self {
            name: "atlas".to_string(),
            metrics,
            percentile_metrics: vec![
                "frameDurationCpuMs".to_string(),
                "frameOverrunMs".to_string(),
            ],
            tracked_tests: vec![
                "atlasGenerationThroughZoomInteractions".to_string(),
                "atlasGenerationThroughPanInteractions".to_string(),
            ],
            primary_test: "atlasGenerationThroughZoomInteractions".to_string(),
            primary_metric: "AtlasManager.generateAtlasSumMs".to_string(),
            target_time_ms: 300.0,
            reference_time_ms: 1600.0,
        }
    }

    /// Load a profile definition from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> ProfileResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|_| ProfileError::FileNotFound {
            path: path.to_string_lossy().to_string(),
        })?;
        let registry: MetricRegistry =
            toml::from_str(&content).map_err(|e| ProfileError::ParseError {
                reason: e.to_string(),
            })?;
        registry.validate()?;
        Ok(registry)
    }

    /// Validate internal consistency of the profile definition
    pub fn validate(&self) -> ProfileResult<()> {
        if self.name.is_empty() {
            return Err(ProfileError::InvalidDefinition {
                reason: "profile name is empty".to_string(),
            });
        }
        if self.metrics.is_empty() {
            return Err(ProfileError::InvalidDefinition {
                reason: "profile tracks no metrics".to_string(),
            });
        }
        if self.tracked_tests.is_empty() {
            return Err(ProfileError::InvalidDefinition {
                reason: "profile tracks no benchmark tests".to_string(),
            });
        }
        if !self.tracked_tests.contains(&self.primary_test) {
            return Err(ProfileError::InvalidDefinition {
                reason: format!("primary test '{}' is not a tracked test", self.primary_test),
            });
        }
        if !self.metrics.iter().any(|m| m.name == self.primary_metric) {
            return Err(ProfileError::InvalidDefinition {
                reason: format!("primary metric '{}' is not a tracked metric", self.primary_metric),
            });
        }
        Ok(())
    }

    /// Look up a tracked metric descriptor by name
    pub fn descriptor(&self, metric_name: &str) -> Option<&MetricDescriptor> {
        self.metrics.iter().find(|m| m.name == metric_name)
    }

    /// Names of tracked time metrics, the default comparison set
    pub fn time_metric_names(&self) -> Vec<&str> {
        self.metrics
            .iter()
            .filter(|m| m.unit_kind == UnitKind::TimeMs)
            .map(|m| m.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_atlas_profile_is_valid() {
        let registry = MetricRegistry::atlas();
        registry.validate().unwrap();
        assert_eq!(registry.name, "atlas");
        assert!(registry.descriptor("AtlasManager.generateAtlasSumMs").is_some());
        assert!(registry.descriptor("nonexistent").is_none());
    }

    #[test]
    fn test_unknown_builtin_profile() {
        let error = MetricRegistry::builtin("unknown").unwrap_err();
        assert!(matches!(error, ProfileError::UnknownProfile { .. }));
    }

    #[test]
    fn test_time_metric_filter() {
        let registry = MetricRegistry::atlas();
        let time_metrics = registry.time_metric_names();
        assert!(time_metrics.contains(&"PhotoLODProcessor.scaleBitmapSumMs"));
        assert!(!time_metrics.contains(&"memoryGpuMaxKb"));
    }

    #[test]
    fn test_profile_roundtrip_through_toml() {
        let registry = MetricRegistry::atlas();
        let serialized = toml::to_string(&registry).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serialized.as_bytes()).unwrap();

        let loaded = MetricRegistry::from_toml_file(file.path()).unwrap();
        assert_eq!(loaded.name, registry.name);
        assert_eq!(loaded.metrics.len(), registry.metrics.len());
        assert_eq!(loaded.primary_metric, registry.primary_metric);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut registry = MetricRegistry::atlas();
        registry.primary_metric = "NotTracked.metric".to_string();
        assert!(matches!(
            registry.validate().unwrap_err(),
            ProfileError::InvalidDefinition { .. }
        ));
    }
}
