//! Output formatting and reporting
//!
//! Human output goes to stdout with optional colors; JSON and YAML print the
//! provider records only so they can be piped into documentation generators.

use colored::*;
use ruledoc_core::{Result, RuleSetProvider, RuledocError};
use std::path::PathBuf;
use std::time::Duration;

use crate::OutputFormat;

/// Summary statistics for a collection run
#[derive(Debug, Clone, Default)]
pub struct CollectSummary {
    pub files_scanned: usize,
    pub providers: usize,
    pub files_with_parse_errors: usize,
    pub failures: Vec<FailedFile>,
    pub duration: Duration,
}

/// A file whose provider could not be collected
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub file_path: PathBuf,
    pub message: String,
}

impl CollectSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    /// Format and print collection results
    pub fn print_results(
        &self,
        providers: &[RuleSetProvider],
        summary: &CollectSummary,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                print!("{}", self.render_human(providers, summary));
                Ok(())
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(providers).map_err(|e| {
                    RuledocError::internal_error(format!("Failed to serialize JSON: {e}"))
                })?;
                println!("{json}");
                Ok(())
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(providers).map_err(|e| {
                    RuledocError::internal_error(format!("Failed to serialize YAML: {e}"))
                })?;
                print!("{yaml}");
                Ok(())
            }
        }
    }

    /// Render providers and the run summary as terminal text
    pub fn render_human(&self, providers: &[RuleSetProvider], summary: &CollectSummary) -> String {
        let mut out = String::new();

        if providers.is_empty() {
            out.push_str("No rule set providers found\n");
        }

        for provider in providers {
            let status = if provider.active {
                self.paint("active", |s| s.green())
            } else {
                self.paint("inactive", |s| s.dimmed())
            };
            out.push_str(&format!(
                "{} ({})\n",
                self.paint(&provider.name, |s| s.bold()),
                status
            ));

            if provider.description.is_empty() {
                out.push_str(&format!(
                    "  {}\n",
                    self.paint("(no description)", |s| s.yellow())
                ));
            } else {
                for line in provider.description.lines() {
                    out.push_str(&format!("  {line}\n"));
                }
            }

            out.push_str(&format!(
                "  Rules ({}): {}\n\n",
                provider.rules.len(),
                provider.rules.join(", ")
            ));
        }

        for failure in &summary.failures {
            out.push_str(&format!(
                "{} {}: {}\n",
                self.paint("error", |s| s.red().bold()),
                failure.file_path.display(),
                failure.message
            ));
        }

        out.push_str(&self.render_summary(summary));
        out
    }

    fn render_summary(&self, summary: &CollectSummary) -> String {
        let mut out = format!("\n{}\n", self.paint("Summary:", |s| s.bold()));
        out.push_str(&format!("  Files scanned: {}\n", summary.files_scanned));
        out.push_str(&format!("  Providers found: {}\n", summary.providers));
        if summary.files_with_parse_errors > 0 {
            out.push_str(&format!(
                "  Files with syntax errors: {}\n",
                self.paint(&summary.files_with_parse_errors.to_string(), |s| s.yellow())
            ));
        }
        if summary.has_failures() {
            out.push_str(&format!(
                "  Failures: {}\n",
                self.paint(&summary.failures.len().to_string(), |s| s.red())
            ));
        }
        out.push_str(&format!(
            "  Completed in {}\n",
            utils::format_duration(summary.duration)
        ));
        out
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Progress reporter for long-running operations
pub struct ProgressReporter {
    enabled: bool,
    total: usize,
}

impl ProgressReporter {
    pub fn new(enabled: bool, total: usize) -> Self {
        Self { enabled, total }
    }

    pub fn update(&self, current: usize, message: &str) {
        if !self.enabled {
            return;
        }

        let percentage = if self.total > 0 {
            (current * 100) / self.total
        } else {
            100
        };

        eprint!("\r{} [{}/{}] {}%", message, current, self.total, percentage);
    }

    pub fn finish(&self, message: &str) {
        if self.enabled {
            eprintln!("\r{message} Complete!");
        }
    }
}

/// Utility functions for output formatting
pub mod utils {
    /// Format duration in human-readable format
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_ms = duration.as_millis();

        if total_ms < 1000 {
            format!("{total_ms}ms")
        } else if total_ms < 60_000 {
            format!("{:.1}s", total_ms as f64 / 1000.0)
        } else {
            let minutes = total_ms / 60_000;
            let seconds = (total_ms % 60_000) as f64 / 1000.0;
            format!("{minutes}m {seconds:.1}s")
        }
    }
}
