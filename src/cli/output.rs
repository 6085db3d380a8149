//! CLI output formatting

use crate::core::report::{OperationOutcome, RunReport, RunStatus};
use crate::execution::runner::RunEvent;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the plan
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 1 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Resolving => style("RESOLVING").dim().to_string(),
        RunStatus::Executing => style("EXECUTING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
        RunStatus::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

/// Format a run event for display
pub fn format_run_event(event: &RunEvent) -> String {
    match event {
        RunEvent::RunStarted { run_id, plan } => format!(
            "{} Starting run {} ({} operations)",
            ROCKET,
            style(&run_id.to_string()[..8]).dim(),
            plan.len()
        ),
        RunEvent::OperationStarted {
            name,
            position,
            total,
        } => format!(
            "{} [{}/{}] {}",
            SPINNER,
            position + 1,
            total,
            style(name).cyan()
        ),
        RunEvent::OperationSucceeded { name, duration_ms } => format!(
            "{} {} ({})",
            CHECK,
            style(name).cyan(),
            style(format_duration(Duration::from_millis(*duration_ms))).dim()
        ),
        RunEvent::OperationFailed { name, error } => {
            format!("{} {}: {}", CROSS, style(name).cyan(), style(error).red())
        }
        RunEvent::OperationSkipped { name, reason } => {
            format!("{} {} ({})", SKIP, style(name).cyan(), style(reason).dim())
        }
        RunEvent::RunCompleted { status, .. } => {
            format!("{} Run {}", INFO, format_status(*status))
        }
    }
}

/// One summary line per operation in the report
pub fn format_report(report: &RunReport) -> String {
    let mut lines = Vec::with_capacity(report.results.len() + 1);

    for result in &report.results {
        let line = match &result.outcome {
            OperationOutcome::Succeeded { duration_ms } => format!(
                "  {} {}: {} ({})",
                CHECK,
                style(&result.name).bold(),
                style("succeeded").green(),
                format_duration(Duration::from_millis(*duration_ms))
            ),
            OperationOutcome::Failed { error, .. } => format!(
                "  {} {}: {} - {}",
                CROSS,
                style(&result.name).bold(),
                style("failed").red(),
                error
            ),
            OperationOutcome::Skipped { reason } => format!(
                "  {} {}: {} ({})",
                SKIP,
                style(&result.name).bold(),
                style("skipped").dim(),
                reason
            ),
        };
        lines.push(line);
    }

    lines.push(format!(
        "\n{} {} - {} succeeded, {} failed, {} skipped",
        format_status(report.status),
        style(&report.run_id.to_string()[..8]).dim(),
        report.succeeded(),
        report.failed(),
        report.skipped()
    ));

    lines.join("\n")
}
