//! Provenance tag from the local git checkout
//!
//! The tracker core treats provenance as an opaque string; this module is
//! the only place that knows it comes from git. Benchmarks collected with
//! uncommitted changes get the `-dirty` suffix so they can be pruned later.

use std::path::Path;
use std::process::Command;

use perfline_tracker::Provenance;
use tracing::warn;

/// Resolve the current commit tag, suffixed with `-dirty` when the working
/// tree has uncommitted changes outside the results directory.
/// Falls back to `unknown` when git is unavailable.
pub fn provenance(repo_dir: &Path, results_dir_name: &str) -> Provenance {
    let commit = match run_git(repo_dir, &["rev-parse", "--short", "HEAD"]) {
        Some(output) => output,
        None => {
            warn!("could not determine git commit; recording provenance as unknown");
            return Provenance::unknown();
        }
    };

    let dirty = run_git(repo_dir, &["status", "--porcelain"])
        .map(|status| {
            status
                .lines()
                // churn in the results directory is expected output, not source change
                .any(|line| !line.trim().is_empty() && !line.contains(results_dir_name))
        })
        .unwrap_or(false);

    if dirty {
        Provenance::new(format!("{commit}-dirty"))
    } else {
        Provenance::new(commit)
    }
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}
