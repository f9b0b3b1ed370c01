use perfline_tracker::{ProfileError, TimelineError, TrackerError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Benchmark file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation cancelled by user")]
    Cancelled,
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Profile(_) => 1,
            CliError::Io(_) => 2,
            CliError::InvalidArgument(_) => 3,
            CliError::FileNotFound { .. } => 5,
            CliError::Timeline(TimelineError::NotFound { .. }) => 6,
            CliError::Timeline(TimelineError::CorruptData { .. }) => 65,
            CliError::Timeline(_) => 7,
            CliError::Tracker(_) => 8,
            CliError::Json(_) => 9,
            CliError::Cancelled => 130, // Standard Unix signal for SIGINT
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Format error for user-friendly display
pub fn format_error(error: &CliError) -> String {
    match error {
        CliError::FileNotFound { path } => {
            format!("Benchmark file not found: {}\n\nPlease check that the file exists and is accessible.", path)
        }
        CliError::Timeline(TimelineError::NotFound { profile }) => {
            format!("No timeline found for profile '{}'.\n\nCollect a run first with 'perflinectl collect <file> <label>'.", profile)
        }
        CliError::Timeline(TimelineError::CorruptData { profile, reason }) => {
            format!(
                "Corrupt timeline data for profile '{}': {}\n\nThe timeline was NOT modified. Inspect or restore it manually before retrying.",
                profile, reason
            )
        }
        CliError::Timeline(TimelineError::DuplicateLabel { label }) => {
            format!(
                "An entry labeled '{}' already exists.\n\nRe-run with --force to add a duplicate, or pick a new label (e.g. '{}_v2').",
                label, label
            )
        }
        CliError::Timeline(TimelineError::IndexRange { invalid, len }) => {
            format!(
                "Invalid indices {:?}; valid range is 0..{}.\n\nNothing was removed. Use 'perflinectl list' to see entry indices.",
                invalid, len
            )
        }
        CliError::Cancelled => "Operation cancelled by user.".to_string(),
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let cancelled = CliError::Cancelled;
        assert_eq!(cancelled.exit_code(), 130);

        let not_found = CliError::Timeline(TimelineError::NotFound {
            profile: "atlas".to_string(),
        });
        assert_eq!(not_found.exit_code(), 6);

        let corrupt = CliError::Timeline(TimelineError::CorruptData {
            profile: "atlas".to_string(),
            reason: "eof".to_string(),
        });
        assert_eq!(corrupt.exit_code(), 65);
    }

    #[test]
    fn test_duplicate_label_hint() {
        let error = CliError::Timeline(TimelineError::DuplicateLabel {
            label: "bitmap_pooling".to_string(),
        });
        let message = format_error(&error);
        assert!(message.contains("--force"));
        assert!(message.contains("bitmap_pooling_v2"));
    }
}
