use std::io::{self, Write};

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use perfline_tracker::compare::{EntryComparison, MetricChange};
use perfline_tracker::{
    Classification, ComparisonResult, Inconsistency, MetricRegistry, TimelineEntry, UnitKind,
};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub struct OutputManager {
    format: OutputFormat,
    colored: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn paint(&self, styled: StyledObject<String>) -> String {
        if self.colored {
            styled.to_string()
        } else {
            styled.force_styling(false).to_string()
        }
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", self.paint(style("✓".to_string()).green()), message);
    }

    pub fn print_info(&self, message: &str) {
        println!("{}", message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", self.paint(style("⚠".to_string()).yellow()), message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", self.paint(style("✗".to_string()).red()), message);
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner
    }

    /// Ask a y/N question on stdin
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        print!("{} (y/N): ", prompt);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    pub fn print_timeline(&self, entries: &[TimelineEntry], registry: &MetricRegistry) -> Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(entries)?);
            return Ok(());
        }

        println!(
            "{:>3}  {:<19}  {:<24}  {:<16}  {:<16}  {:>10}  {}",
            "#", "Timestamp", "Label", "Mode", "Provenance", "Total ms", "Device"
        );
        println!("{}", "-".repeat(110));

        for (index, entry) in entries.iter().enumerate() {
            let headline = entry
                .headline_value(&registry.primary_test, &registry.primary_metric)
                .map(|v| format_value(v))
                .unwrap_or_else(|| "-".to_string());

            let mode = format!("{:?}", entry.mode).to_lowercase();
            let mode = if entry.is_baseline() {
                self.paint(style(mode).cyan())
            } else {
                mode
            };

            println!(
                "{:>3}  {:<19}  {:<24}  {:<16}  {:<16}  {:>10}  {}",
                index,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                truncate(&entry.label, 24),
                mode,
                truncate(entry.provenance.as_str(), 16),
                headline,
                entry.device.model,
            );
        }

        println!("{}", "-".repeat(110));
        println!("Total entries: {}", entries.len());
        Ok(())
    }

    pub fn print_device_report(&self, entries: &[TimelineEntry], inconsistencies: &[Inconsistency]) {
        if self.is_json() {
            return;
        }

        if inconsistencies.is_empty() {
            if let Some(first) = entries.first() {
                println!("Device: {}", first.device.summary());
            }
            return;
        }

        self.print_warning("DEVICE INCONSISTENCY: results from different hardware may not be comparable");
        for inconsistency in inconsistencies {
            let label = entries
                .get(inconsistency.index)
                .map(|e| e.label.as_str())
                .unwrap_or("?");
            println!(
                "  entry {} ({}): {} is {} vs {}",
                inconsistency.index, label, inconsistency.field, inconsistency.actual, inconsistency.reference
            );
        }
    }

    pub fn print_comparison(
        &self,
        comparison: &EntryComparison,
        registry: &MetricRegistry,
        all_metrics: bool,
    ) -> Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(comparison)?);
            return Ok(());
        }

        println!(
            "Comparing {} -> {}",
            self.paint(style(comparison.baseline_label.clone()).bold()),
            self.paint(style(comparison.candidate_label.clone()).bold()),
        );

        for (test, results) in &comparison.tests {
            println!("\n{}", self.paint(style(test.clone()).bold()));
            println!(
                "{:<50}{:>12}{:>12}{:>22}",
                "Metric", "Baseline", "Candidate", "Change"
            );
            println!("{}", "-".repeat(96));

            for result in results.values() {
                let descriptor = registry.descriptor(&result.metric);
                let is_time = descriptor
                    .map(|d| d.unit_kind == UnitKind::TimeMs)
                    .unwrap_or(false);
                if !all_metrics && !is_time {
                    continue;
                }
                // skip rows where neither run measured the metric
                if result.baseline_value.is_none() && result.candidate_value.is_none() {
                    continue;
                }

                println!(
                    "{:<50}{:>12}{:>12}{:>22}",
                    truncate(&result.metric, 48),
                    result.baseline_value.map(format_value).unwrap_or_else(|| "-".into()),
                    result.candidate_value.map(format_value).unwrap_or_else(|| "-".into()),
                    self.format_change(result),
                );
            }
        }

        match &comparison.headline {
            Some(headline) => {
                println!(
                    "\nHeadline ({}): {}",
                    registry.primary_metric,
                    self.format_change(headline)
                );
            }
            None => println!("\nNo headline comparison: primary metric missing from one of the runs"),
        }
        Ok(())
    }

    pub fn print_improvement_summary(&self, changes: &[MetricChange]) {
        if self.is_json() || changes.is_empty() {
            return;
        }

        println!("\n{}", self.paint(style("Progress since baseline".to_string()).bold()));
        println!("{:<50}{:>12}{:>12}{:>18}", "Metric", "Before", "After", "Change");
        println!("{}", "-".repeat(92));

        let mut shown = false;
        for change in changes {
            // only meaningful movement is worth a row
            if change.percent_delta.abs() <= 1.0 {
                continue;
            }
            let arrow = if change.percent_delta < 0.0 { "↓" } else { "↑" };
            let text = format!("{:+.1} ({}{:.1}%)", change.latest - change.first, arrow, change.percent_delta.abs());
            let styled = if change.percent_delta <= -15.0 {
                self.paint(style(text).green())
            } else if change.percent_delta >= 15.0 {
                self.paint(style(text).red())
            } else {
                self.paint(style(text).dim())
            };
            println!(
                "{:<50}{:>12}{:>12}{:>18}",
                truncate(&change.metric, 48),
                format_value(change.first),
                format_value(change.latest),
                styled,
            );
            shown = true;
        }
        if !shown {
            println!("No significant changes detected (>1% threshold)");
        }
    }

    pub fn format_change(&self, result: &ComparisonResult) -> String {
        let text = match (result.absolute_delta, result.percent_delta) {
            (Some(delta), Some(percent)) => {
                if delta == 0.0 {
                    "0.0".to_string()
                } else {
                    let arrow = if delta < 0.0 { "↓" } else { "↑" };
                    format!("{:+.1} ({}{:.1}%)", delta, arrow, percent.abs())
                }
            }
            _ => match result.classification {
                Classification::Appeared => "appeared".to_string(),
                Classification::Vanished => "vanished".to_string(),
                _ => "n/a".to_string(),
            },
        };

        let styled = match result.classification {
            Classification::Improved => style(text).green(),
            Classification::Regressed => style(text).red(),
            Classification::Changed => style(text).blue(),
            Classification::Appeared | Classification::Vanished => style(text).yellow(),
            Classification::Noise => style(text).dim(),
        };
        self.paint(styled)
    }
}

/// Fixed-precision value formatting: more digits for small magnitudes
pub fn format_value(value: f64) -> String {
    if value.abs() < 1.0 {
        format!("{:.3}", value)
    } else if value.abs() < 10.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_precision() {
        assert_eq!(format_value(0.1234), "0.123");
        assert_eq!(format_value(5.678), "5.68");
        assert_eq!(format_value(1520.44), "1520.4");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a_very_long_metric_name", 10), "a_very_...");
    }

    #[test]
    fn test_format_change_uncolored() {
        let output = OutputManager::new(OutputFormat::Table, false);
        let result = ComparisonResult {
            metric: "AtlasManager.generateAtlasSumMs".to_string(),
            baseline_value: Some(100.0),
            candidate_value: Some(80.0),
            absolute_delta: Some(-20.0),
            percent_delta: Some(-20.0),
            classification: Classification::Improved,
        };
        let text = output.format_change(&result);
        assert!(text.contains("-20.0"));
        assert!(text.contains("↓20.0%"));
        // no ANSI escapes when color is off
        assert!(!text.contains('\u{1b}'));
    }
}
