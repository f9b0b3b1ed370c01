//! Timeline entries, baseline policy, and the persisted store
//!
//! A timeline is an ordered sequence of benchmark runs for one optimization
//! profile. Order is insertion order except the baseline, which is pinned
//! to index 0. Every mutation computes the full new sequence in memory,
//! persists it as a whole, and only then commits it — there is no partial
//! update state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::device::DeviceContext;
use crate::error::{TimelineError, TimelineResult};
use crate::snapshot::MetricSnapshot;
use crate::storage::TimelineBackend;

/// Marker appended to a provenance tag when the benchmarked build
/// contained uncommitted changes
pub const DIRTY_SUFFIX: &str = "-dirty";

/// How a new entry interacts with the existing timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Standard run: append to the end
    Optimization,
    /// Replace any existing baseline, pin to index 0
    Baseline,
    /// Replace the current baseline in place, preserving entry order
    UpdateBaseline,
}

/// Opaque source-state tag supplied by the caller (commit id plus an
/// optional dirty marker); the core only applies the suffix convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provenance(String);

impl Provenance {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the tag marks an uncommitted source state
    pub fn is_dirty(&self) -> bool {
        self.0.ends_with(DIRTY_SUFFIX)
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One benchmark run recorded in the timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Collection time, ISO-8601 in the persisted form
    pub timestamp: DateTime<Utc>,

    /// Label naming the optimization under test; unique per append unless
    /// the caller explicitly forces a duplicate
    pub label: String,

    pub mode: EntryMode,

    pub device: DeviceContext,

    /// Extracted snapshots keyed by test name
    pub snapshots: BTreeMap<String, MetricSnapshot>,

    pub provenance: Provenance,

    /// Name of the raw report file this entry was extracted from
    pub source_file: String,
}

impl TimelineEntry {
    /// Build an entry from a raw report: extract every tracked test and
    /// capture device context and provenance
    pub fn from_report(
        registry: &crate::profile::MetricRegistry,
        report: &crate::raw::RawReport,
        label: impl Into<String>,
        mode: EntryMode,
        provenance: Provenance,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            label: label.into(),
            mode,
            device: DeviceContext::from_raw(&report.context),
            snapshots: crate::snapshot::extract_all(registry, report),
            provenance,
            source_file: source_file.into(),
        }
    }

    /// Baseline predicate: explicit mode, or a label that names itself a
    /// baseline (defensive against manually edited timelines)
    pub fn is_baseline(&self) -> bool {
        self.mode == EntryMode::Baseline || self.label.to_lowercase().contains("baseline")
    }

    /// Headline value: the primary metric of the primary test
    pub fn headline_value(&self, primary_test: &str, primary_metric: &str) -> Option<f64> {
        self.snapshots.get(primary_test)?.value(primary_metric)
    }
}

/// Pure insertion policy: how an incoming entry reshapes the sequence.
/// No I/O here, which keeps the policy testable without a file system.
pub fn resolve_insertion(
    mut existing: Vec<TimelineEntry>,
    mut incoming: TimelineEntry,
    mode: EntryMode,
) -> Vec<TimelineEntry> {
    match mode {
        EntryMode::Optimization => {
            existing.push(incoming);
            existing
        }
        EntryMode::Baseline => {
            // all pre-existing baselines go, even if a prior manual edit
            // violated the at-most-one invariant
            let before = existing.len();
            existing.retain(|entry| !entry.is_baseline());
            let removed = before - existing.len();
            if removed > 0 {
                debug!(removed, "replaced existing baseline entries");
            }
            incoming.mode = EntryMode::Baseline;
            existing.insert(0, incoming);
            existing
        }
        EntryMode::UpdateBaseline => {
            // normalized to Baseline so the baseline predicate keeps
            // matching the replacement
            incoming.mode = EntryMode::Baseline;
            if existing.is_empty() {
                existing.push(incoming);
                return existing;
            }
            let index = existing.iter().position(|e| e.is_baseline()).unwrap_or(0);
            existing[index] = incoming;
            existing
        }
    }
}

/// Ordered, persisted timeline for one profile
///
/// Loaded fully into memory; every mutation writes the full history back
/// through the backend.
#[derive(Debug)]
pub struct TimelineStore<B: TimelineBackend> {
    profile: String,
    backend: B,
    entries: Vec<TimelineEntry>,
}

impl<B: TimelineBackend> TimelineStore<B> {
    /// Open a store, starting empty when nothing is persisted yet.
    /// Persisted-but-unparsable data is an error, never silently discarded.
    pub fn open(backend: B, profile: impl Into<String>) -> TimelineResult<Self> {
        let profile = profile.into();
        let entries = match backend.read(&profile)? {
            Some(payload) => Self::parse(&profile, &payload)?,
            None => Vec::new(),
        };
        Ok(Self { profile, backend, entries })
    }

    /// Open a store that must already exist
    pub fn open_existing(backend: B, profile: impl Into<String>) -> TimelineResult<Self> {
        let profile = profile.into();
        let payload = backend.read(&profile)?.ok_or_else(|| TimelineError::NotFound {
            profile: profile.clone(),
        })?;
        let entries = Self::parse(&profile, &payload)?;
        Ok(Self { profile, backend, entries })
    }

    fn parse(profile: &str, payload: &str) -> TimelineResult<Vec<TimelineEntry>> {
        serde_json::from_str(payload).map_err(|e| TimelineError::CorruptData {
            profile: profile.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current baseline entry, if any
    pub fn baseline(&self) -> Option<&TimelineEntry> {
        self.entries.iter().find(|e| e.is_baseline())
    }

    pub fn find_by_label(&self, label: &str) -> Option<(usize, &TimelineEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.label == label)
    }

    /// Append a run, refusing duplicate labels; the caller decides whether
    /// to force, rename, or abort
    pub fn append(&mut self, entry: TimelineEntry) -> TimelineResult<()> {
        if self.entries.iter().any(|e| e.label == entry.label) {
            return Err(TimelineError::DuplicateLabel { label: entry.label });
        }
        self.force_append(entry)
    }

    /// Append without the duplicate-label check
    pub fn force_append(&mut self, entry: TimelineEntry) -> TimelineResult<()> {
        let next = resolve_insertion(self.entries.clone(), entry, EntryMode::Optimization);
        self.commit(next)
    }

    /// Remove every existing baseline and pin the new one to index 0
    pub fn replace_baseline(&mut self, entry: TimelineEntry) -> TimelineResult<()> {
        let next = resolve_insertion(self.entries.clone(), entry, EntryMode::Baseline);
        self.commit(next)
    }

    /// Replace the current baseline in place, preserving positions;
    /// appends as baseline when the store is empty
    pub fn update_baseline(&mut self, entry: TimelineEntry) -> TimelineResult<()> {
        let next = resolve_insertion(self.entries.clone(), entry, EntryMode::UpdateBaseline);
        self.commit(next)
    }

    /// Remove entries by index; the whole request is rejected when any
    /// index is out of range, and removal is computed against the original
    /// index set
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> TimelineResult<Vec<TimelineEntry>> {
        let invalid: Vec<usize> = indices.iter().copied().filter(|&i| i >= self.entries.len()).collect();
        if !invalid.is_empty() {
            return Err(TimelineError::IndexRange {
                invalid,
                len: self.entries.len(),
            });
        }

        let mut kept = Vec::with_capacity(self.entries.len() - indices.len());
        let mut removed = Vec::with_capacity(indices.len());
        for (index, entry) in self.entries.iter().enumerate() {
            if indices.contains(&index) {
                removed.push(entry.clone());
            } else {
                kept.push(entry.clone());
            }
        }

        self.commit(kept)?;
        Ok(removed)
    }

    /// Remove every entry recorded against an uncommitted source state
    pub fn prune_dirty(&mut self) -> TimelineResult<Vec<TimelineEntry>> {
        let dirty: BTreeSet<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.provenance.is_dirty())
            .map(|(i, _)| i)
            .collect();

        if dirty.is_empty() {
            return Ok(Vec::new());
        }
        self.remove(&dirty)
    }

    /// Discard the whole persisted timeline; `true` when one existed
    pub fn clear(&mut self) -> TimelineResult<bool> {
        let existed = self.backend.delete(&self.profile)?;
        self.entries.clear();
        Ok(existed)
    }

    /// Back up the persisted timeline before a destructive mutation
    pub fn backup(&self, reason: &str) -> TimelineResult<Option<std::path::PathBuf>> {
        self.backend.backup(&self.profile, reason)
    }

    /// Persist the full new sequence, then commit it in memory
    fn commit(&mut self, next: Vec<TimelineEntry>) -> TimelineResult<()> {
        let baselines = next.iter().filter(|e| e.mode == EntryMode::Baseline).count();
        if baselines > 1 {
            // should be unreachable through the public operations
            warn!(baselines, profile = %self.profile, "timeline holds multiple baseline entries");
        }

        let payload = serde_json::to_string_pretty(&next).map_err(|e| {
            TimelineError::Storage(format!("serializing timeline: {e}"))
        })?;
        self.backend.write(&self.profile, &payload)?;
        self.entries = next;
        Ok(())
    }
}
