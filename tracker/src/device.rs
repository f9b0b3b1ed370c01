//! Device context and consistency checking
//!
//! Benchmark numbers from different hardware are not directly comparable.
//! The checker compares every context against the first and reports which
//! field diverged; a non-empty result is advisory, never a hard failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::raw::RawContext;

/// Clock frequency tolerance before two devices count as different
pub const FREQ_TOLERANCE_HZ: u64 = 100_000_000;

/// Immutable descriptor of the environment a snapshot was collected on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceContext {
    pub model: String,
    pub brand: String,
    pub os_sdk: u32,
    pub cpu_cores: u32,
    pub cpu_max_freq_hz: u64,
    pub mem_total_bytes: u64,
    pub cpu_locked: bool,
    pub compilation_mode: String,
}

impl DeviceContext {
    /// Build a context from the raw report's context block
    pub fn from_raw(raw: &RawContext) -> Self {
        Self {
            model: raw.build.model.clone(),
            brand: raw.build.brand.clone(),
            os_sdk: raw.build.version.sdk,
            cpu_cores: raw.cpu_core_count,
            cpu_max_freq_hz: raw.cpu_max_freq_hz,
            mem_total_bytes: raw.mem_total_bytes,
            cpu_locked: raw.cpu_locked,
            compilation_mode: raw.compilation_mode.clone(),
        }
    }

    /// Short human-readable summary, e.g. "google Pixel 6 (SDK 33, 8 cores)"
    pub fn summary(&self) -> String {
        format!(
            "{} {} (SDK {}, {} cores)",
            self.brand, self.model, self.os_sdk, self.cpu_cores
        )
    }
}

/// The device field that diverged between two contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceField {
    Model,
    OsVersion,
    ClockFrequency,
}

impl fmt::Display for DeviceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceField::Model => "model",
            DeviceField::OsVersion => "os_version",
            DeviceField::ClockFrequency => "clock_frequency",
        };
        f.write_str(name)
    }
}

/// One detected divergence between a context and the reference context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    /// Index of the diverging context in the checked sequence
    pub index: usize,
    pub field: DeviceField,
    pub reference: String,
    pub actual: String,
}

/// Compare every context against the first
///
/// Model and OS version must match exactly; clock frequency may differ by
/// up to [`FREQ_TOLERANCE_HZ`]. Returns one record per diverging context,
/// naming the first field found different.
pub fn check_consistency(contexts: &[DeviceContext]) -> Vec<Inconsistency> {
    let Some(reference) = contexts.first() else {
        return Vec::new();
    };

    let mut inconsistencies = Vec::new();
    for (index, context) in contexts.iter().enumerate().skip(1) {
        if context.model != reference.model {
            inconsistencies.push(Inconsistency {
                index,
                field: DeviceField::Model,
                reference: format!("{} {}", reference.brand, reference.model),
                actual: format!("{} {}", context.brand, context.model),
            });
        } else if context.os_sdk != reference.os_sdk {
            inconsistencies.push(Inconsistency {
                index,
                field: DeviceField::OsVersion,
                reference: format!("SDK {}", reference.os_sdk),
                actual: format!("SDK {}", context.os_sdk),
            });
        } else if context.cpu_max_freq_hz.abs_diff(reference.cpu_max_freq_hz) > FREQ_TOLERANCE_HZ {
            inconsistencies.push(Inconsistency {
                index,
                field: DeviceField::ClockFrequency,
                reference: format!("{} MHz", reference.cpu_max_freq_hz / 1_000_000),
                actual: format!("{} MHz", context.cpu_max_freq_hz / 1_000_000),
            });
        }
    }

    inconsistencies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(model: &str, sdk: u32, freq_hz: u64) -> DeviceContext {
        DeviceContext {
            model: model.to_string(),
            brand: "google".to_string(),
            os_sdk: sdk,
            cpu_cores: 8,
            cpu_max_freq_hz: freq_hz,
            mem_total_bytes: 8 * 1024 * 1024 * 1024,
            cpu_locked: true,
            compilation_mode: "speed".to_string(),
        }
    }

    #[test]
    fn test_frequency_within_tolerance_is_consistent() {
        let contexts = vec![
            pixel("Pixel6", 33, 2_400_000_000),
            pixel("Pixel6", 33, 2_410_000_000),
            pixel("Pixel4", 30, 2_000_000_000),
        ];

        let report = check_consistency(&contexts);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].index, 2);
        assert_eq!(report[0].field, DeviceField::Model);
    }

    #[test]
    fn test_frequency_beyond_tolerance_flagged() {
        let contexts = vec![
            pixel("Pixel6", 33, 2_400_000_000),
            pixel("Pixel6", 33, 2_600_000_000),
        ];

        let report = check_consistency(&contexts);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].field, DeviceField::ClockFrequency);
        assert!(report[0].actual.contains("2600 MHz"));
    }

    #[test]
    fn test_sdk_mismatch_flagged() {
        let contexts = vec![pixel("Pixel6", 33, 2_400_000_000), pixel("Pixel6", 30, 2_400_000_000)];
        let report = check_consistency(&contexts);
        assert_eq!(report[0].field, DeviceField::OsVersion);
    }

    #[test]
    fn test_empty_and_single_are_consistent() {
        assert!(check_consistency(&[]).is_empty());
        assert!(check_consistency(&[pixel("Pixel6", 33, 2_400_000_000)]).is_empty());
    }
}
