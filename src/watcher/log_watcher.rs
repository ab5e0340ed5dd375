use crate::alert::{Alert, Level};
use crate::config::WatchConfig;
use crate::error::Result;
use crate::watcher::parser::LogSummary;
use crate::watcher::{FilePattern, Watcher};
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const LOG_ALERT_TITLE: &str = "Log alert";
pub const PENDING_ALERT_TITLE: &str = "Pending log files";

/// Watches a directory of time-sliced alert files written by a log shipper
/// (td-agent `type file` output) and summarizes them per tag.
///
/// Deletion is two-phase: `watch()` only reads and remembers which files it
/// summarized; `after_success()` removes exactly those files once the caller
/// has delivered the alert.
pub struct LogWatcher {
    name: String,
    config: WatchConfig,
    target: FilePattern,
    pending: FilePattern,
    /// Files summarized by the last `watch()`, consumed by `after_success()`
    target_paths: Option<Vec<PathBuf>>,
}

impl LogWatcher {
    pub fn new(config: WatchConfig) -> Result<Self> {
        config.validate()?;

        let target = FilePattern::new(&config.target_pattern)?;
        let pending = FilePattern::new(&config.pending_pattern)?;

        Ok(Self {
            name: format!("log:{}", config.watch_dir.display()),
            config,
            target,
            pending,
            target_paths: None,
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Files captured by the most recent `watch()` that are still awaiting removal
    pub fn target_paths(&self) -> &[PathBuf] {
        self.target_paths.as_deref().unwrap_or(&[])
    }

    /// No ready files: warn when unrotated files pile up
    fn check_pending(&self, started: DateTime<Local>) -> Result<Vec<Alert>> {
        let paths = self.pending.discover(&self.config.watch_dir)?;

        if paths.len() < self.config.pending_threshold {
            debug!(
                "{} pending file(s) in {} (threshold {})",
                paths.len(),
                self.config.watch_dir.display(),
                self.config.pending_threshold
            );
            return Ok(Vec::new());
        }

        warn!(
            "{} pending file(s) in {} reached threshold {}",
            paths.len(),
            self.config.watch_dir.display(),
            self.config.pending_threshold
        );

        let listing: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let body = format!(
            "{} file(s) matching {} have not been rotated yet:\n{}",
            paths.len(),
            self.config.watch_dir.join(self.pending.as_str()).display(),
            listing.join("\n")
        );

        Ok(vec![Alert::new(started, Level::Warn, PENDING_ALERT_TITLE, body)])
    }
}

impl Watcher for LogWatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn watch(&mut self) -> Result<Vec<Alert>> {
        let started = Local::now();

        // A failed pass must not leave an older set behind for after_success
        self.target_paths = None;
        let paths = self.target.discover(&self.config.watch_dir)?;

        if paths.is_empty() {
            self.target_paths = Some(Vec::new());
            return self.check_pending(started);
        }

        info!(
            "Summarizing {} alert file(s) in {}",
            paths.len(),
            self.config.watch_dir.display()
        );

        let mut summary = LogSummary::new(self.config.message_threshold);
        for path in &paths {
            summary.read_file(path)?;
        }
        self.target_paths = Some(paths);

        Ok(vec![Alert::new(
            started,
            summary.level(),
            LOG_ALERT_TITLE,
            summary.render(),
        )])
    }

    fn after_success(&mut self) -> Result<()> {
        let Some(paths) = self.target_paths.take() else {
            return Ok(());
        };

        for path in &paths {
            if self.config.dry_run {
                info!("Would remove: {}", path.display());
                continue;
            }

            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        Ok(())
    }
}
