//! Error handling for the perfline tracker core
//!
//! This module provides the error types for timeline persistence, profile
//! configuration, and snapshot extraction. Missing metrics or test runs are
//! deliberately NOT errors — they surface as absent values in the extracted
//! snapshot instead.

use std::io;

use thiserror::Error;

/// The main error type for the tracker core
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Timeline storage and mutation errors
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Profile configuration errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Timeline storage related errors
#[derive(Error, Debug)]
pub enum TimelineError {
    /// The requested profile has no persisted timeline
    #[error("No timeline found for profile: {profile}")]
    NotFound { profile: String },

    /// Persisted data exists but does not parse as a timeline.
    /// Never silently replaced with an empty timeline.
    #[error("Corrupt timeline data for profile {profile}: {reason}")]
    CorruptData { profile: String, reason: String },

    /// An entry with this label already exists; the caller decides
    /// whether to force the append, rename, or abort
    #[error("Timeline entry with label '{label}' already exists")]
    DuplicateLabel { label: String },

    /// Removal indices outside the valid range; the whole request
    /// is rejected, no partial removal happens
    #[error("Indices {invalid:?} out of range (valid: 0..{len})")]
    IndexRange { invalid: Vec<usize>, len: usize },

    /// Backend read/write failure
    #[error("Timeline storage error: {0}")]
    Storage(String),
}

/// Profile configuration errors
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Unknown profile '{name}'. Available: {available:?}")]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("Profile file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid profile definition: {reason}")]
    InvalidDefinition { reason: String },

    #[error("Profile parsing error: {reason}")]
    ParseError { reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TrackerError>;

/// A specialized result type for timeline operations
pub type TimelineResult<T> = std::result::Result<T, TimelineError>;

/// A specialized result type for profile operations
pub type ProfileResult<T> = std::result::Result<T, ProfileError>;

impl TrackerError {
    /// Check if this error is recoverable by the caller
    pub fn is_recoverable(&self) -> bool {
        match self {
            TrackerError::Timeline(TimelineError::NotFound { .. }) => true,
            TrackerError::Timeline(TimelineError::DuplicateLabel { .. }) => true,
            TrackerError::Timeline(TimelineError::IndexRange { .. }) => true,
            TrackerError::Timeline(TimelineError::CorruptData { .. }) => false,
            TrackerError::Timeline(TimelineError::Storage(_)) => false,
            TrackerError::Profile(_) => true,
            TrackerError::Io(io_error) => {
                matches!(io_error.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
            }
            TrackerError::Serialization(_) => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TrackerError::Timeline(_) => "timeline",
            TrackerError::Profile(_) => "profile",
            TrackerError::Io(_) => "io",
            TrackerError::Serialization(_) => "serialization",
        }
    }
}
