//! Timeline persistence backends
//!
//! The store treats persistence as a key-value interface: one opaque JSON
//! payload per profile. Every write replaces the whole payload, so a crash
//! mid-write must never leave a readable-but-inconsistent partial record —
//! the file backend writes to a temp file in the same directory and renames
//! it into place.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{TimelineError, TimelineResult};

/// Key-value persistence for per-profile timelines
pub trait TimelineBackend {
    /// Read the persisted payload, `None` when nothing exists yet
    fn read(&self, profile: &str) -> TimelineResult<Option<String>>;

    /// Atomically replace the persisted payload
    fn write(&self, profile: &str, payload: &str) -> TimelineResult<()>;

    /// Copy the current payload aside before a destructive mutation.
    /// Returns the backup location, `None` when there is nothing to back up.
    fn backup(&self, profile: &str, reason: &str) -> TimelineResult<Option<PathBuf>>;

    /// Remove the persisted payload entirely; `true` when something existed
    fn delete(&self, profile: &str) -> TimelineResult<bool>;
}

impl<T: TimelineBackend + ?Sized> TimelineBackend for &T {
    fn read(&self, profile: &str) -> TimelineResult<Option<String>> {
        (**self).read(profile)
    }

    fn write(&self, profile: &str, payload: &str) -> TimelineResult<()> {
        (**self).write(profile, payload)
    }

    fn backup(&self, profile: &str, reason: &str) -> TimelineResult<Option<PathBuf>> {
        (**self).backup(profile, reason)
    }

    fn delete(&self, profile: &str) -> TimelineResult<bool> {
        (**self).delete(profile)
    }
}

/// File-based backend: one `<profile>_timeline.json` per profile
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the timeline file for a profile
    pub fn timeline_path(&self, profile: &str) -> PathBuf {
        self.root.join(format!("{profile}_timeline.json"))
    }

    fn io_error(context: &str, error: std::io::Error) -> TimelineError {
        TimelineError::Storage(format!("{context}: {error}"))
    }
}

impl TimelineBackend for FileBackend {
    fn read(&self, profile: &str) -> TimelineResult<Option<String>> {
        let path = self.timeline_path(profile);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| Self::io_error(&format!("reading {}", path.display()), e))
    }

    fn write(&self, profile: &str, payload: &str) -> TimelineResult<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| Self::io_error(&format!("creating {}", self.root.display()), e))?;

        let path = self.timeline_path(profile);
        // temp file in the same directory so the rename stays on one filesystem
        let mut temp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| Self::io_error("creating temp file", e))?;
        temp.write_all(payload.as_bytes())
            .map_err(|e| Self::io_error("writing temp file", e))?;
        temp.persist(&path)
            .map_err(|e| Self::io_error(&format!("replacing {}", path.display()), e.error))?;

        debug!(profile, path = %path.display(), "timeline persisted");
        Ok(())
    }

    fn backup(&self, profile: &str, reason: &str) -> TimelineResult<Option<PathBuf>> {
        let path = self.timeline_path(profile);
        if !path.exists() {
            return Ok(None);
        }

        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let backup_path = self
            .root
            .join(format!("{profile}_timeline_backup_{reason}_{stamp}.json"));
        fs::copy(&path, &backup_path)
            .map_err(|e| Self::io_error(&format!("backing up to {}", backup_path.display()), e))?;

        info!(profile, backup = %backup_path.display(), "timeline backup created");
        Ok(Some(backup_path))
    }

    fn delete(&self, profile: &str) -> TimelineResult<bool> {
        let path = self.timeline_path(profile);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| Self::io_error(&format!("removing {}", path.display()), e))?;
        Ok(true)
    }
}

/// In-memory backend for tests and policy experimentation
#[derive(Debug, Default)]
pub struct MemoryBackend {
    payloads: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimelineBackend for MemoryBackend {
    fn read(&self, profile: &str) -> TimelineResult<Option<String>> {
        let payloads = self.payloads.lock().expect("backend lock poisoned");
        Ok(payloads.get(profile).cloned())
    }

    fn write(&self, profile: &str, payload: &str) -> TimelineResult<()> {
        let mut payloads = self.payloads.lock().expect("backend lock poisoned");
        payloads.insert(profile.to_string(), payload.to_string());
        Ok(())
    }

    fn backup(&self, _profile: &str, _reason: &str) -> TimelineResult<Option<PathBuf>> {
        Ok(None)
    }

    fn delete(&self, profile: &str) -> TimelineResult<bool> {
        let mut payloads = self.payloads.lock().expect("backend lock poisoned");
        Ok(payloads.remove(profile).is_some())
    }
}
