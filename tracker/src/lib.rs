//! Perfline tracker core library
//!
//! This library maintains a longitudinal record of benchmark runs for a
//! subsystem under optimization and computes regression/improvement signals
//! between runs. It covers the timeline data model and comparison engine:
//! raw snapshot normalization, the persisted ordered history (append,
//! baseline replace/update, prune), significance-classified diffing, and
//! device consistency checking. Argument parsing and terminal/report
//! formatting live in the CLI crate.

pub mod compare;
pub mod device;
pub mod error;
pub mod profile;
pub mod raw;
pub mod snapshot;
pub mod storage;
pub mod timeline;

// Re-export commonly used types
pub use compare::{Classification, ComparisonEngine, ComparisonResult, FixedBandPolicy, SignificancePolicy};
pub use device::{check_consistency, DeviceContext, Inconsistency};
pub use error::{ProfileError, Result, TimelineError, TrackerError};
pub use profile::{MetricDescriptor, MetricRegistry, UnitKind};
pub use raw::RawReport;
pub use snapshot::{extract, extract_all, MetricSnapshot, PercentileSet};
pub use storage::{FileBackend, MemoryBackend, TimelineBackend};
pub use timeline::{resolve_insertion, EntryMode, Provenance, TimelineEntry, TimelineStore};
