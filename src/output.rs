use console::style;
use std::path::Path;

use crate::orchestrator::{BatchReport, FileStatus};
use crate::scaffold::PreviewEntry;

/// Operator-facing summaries. Progress lines go through `tracing`.
pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn print_step(&self, content: &str) {
        println!("\n{}", style(format!("--- {content} ---")).cyan().bold());
    }

    pub fn print_success(&self, content: &str) {
        println!("{} {}", style("✅").green(), style(content).green().bold());
    }

    pub fn print_error(&self, content: &str) {
        eprintln!("{} {}", style("Error:").red().bold(), content);
    }

    pub fn print_hint(&self, content: &str) {
        println!("{}", style(content).yellow().dim());
    }

    pub fn print_analysis_report(&self, report: &BatchReport, artifact_path: &Path) {
        for outcome in &report.outcomes {
            match &outcome.status {
                FileStatus::Analyzed => {
                    println!("  {} {}", style("✓").green(), outcome.path);
                }
                FileStatus::Fallback(reason) => {
                    println!("  {} {} {}", style("!").yellow().bold(), outcome.path, style("(fallback)").yellow());
                    if self.verbose {
                        println!("      {}", style(reason).dim());
                    }
                }
                FileStatus::Skipped => {
                    println!("  {} {} {}", style("-").dim(), outcome.path, style("(not found, skipped)").dim());
                }
            }
        }

        let analyzed = report.artifact.len().saturating_sub(report.fallback_count());
        println!(
            "{} analyzed, {} fallback, {} skipped -> {}",
            style(analyzed).green().bold(),
            style(report.fallback_count()).yellow(),
            style(report.skipped_count()).dim(),
            artifact_path.display()
        );
    }

    pub fn print_previews(&self, entries: &[PreviewEntry]) {
        println!("{}", style("Previews:").bold());
        for entry in entries {
            println!("  {} {}", style(&entry.url).cyan(), style(&entry.original_path).dim());
        }
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
