// Output formatting and display for CLI

use crate::config::WatchConfig;
use crate::runner::RunReport;
use colored::*;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

/// Print a formatted table of configured watchers
pub fn print_watchers(configs: &[WatchConfig]) {
    #[derive(Tabled)]
    struct WatcherRow {
        #[tabled(rename = "Directory")]
        watch_dir: String,
        #[tabled(rename = "Target")]
        target: String,
        #[tabled(rename = "Pending")]
        pending: String,
        #[tabled(rename = "Messages")]
        message_threshold: usize,
        #[tabled(rename = "Pending Max")]
        pending_threshold: usize,
        #[tabled(rename = "Dry Run")]
        dry_run: String,
    }

    let rows: Vec<WatcherRow> = configs
        .iter()
        .map(|c| WatcherRow {
            watch_dir: c.watch_dir.display().to_string(),
            target: c.target_pattern.clone(),
            pending: c.pending_pattern.clone(),
            message_threshold: c.message_threshold,
            pending_threshold: c.pending_threshold,
            dry_run: if c.dry_run { "yes" } else { "no" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    println!("{}", "✓ Configuration is valid".green().bold());
    println!("\n{}\n", table);
    println!(
        "{}",
        format!("Total: {} watcher(s)", configs.len())
            .dimmed()
            .italic()
    );
}

/// Print the outcome of a watch pass to stderr
pub fn print_report(report: &RunReport, watchers: usize) {
    if report.is_success() {
        eprintln!(
            "{} {} watcher(s) checked, {} alert(s) delivered",
            "✓".green().bold(),
            watchers,
            report.alerts
        );
    } else {
        eprintln!(
            "{} {} watcher(s) checked, {} alert(s) delivered, {} failed",
            "✗".red().bold(),
            watchers,
            report.alerts,
            report.failed
        );
    }
}

/// Print an error message to stderr
pub fn print_error(error: &str) {
    eprintln!("{} {}", "✗ Error:".red().bold(), error);
}
