// Watchers - sources of alerts

mod log_watcher;
pub mod parser;
mod pattern;

pub use log_watcher::{LogWatcher, LOG_ALERT_TITLE, PENDING_ALERT_TITLE};
pub use parser::{LogSummary, TagSummary};
pub use pattern::FilePattern;

use crate::alert::Alert;
use crate::error::Result;

/// Capability shared by every alert source.
///
/// `watch()` must not modify the filesystem. Any cleanup of consumed input
/// belongs in `after_success()`, which the caller invokes only after the
/// alerts returned by the preceding `watch()` were delivered.
pub trait Watcher {
    /// Short identifier used in logs and reports
    fn name(&self) -> &str;

    /// Inspect the source and return the alerts to deliver
    fn watch(&mut self) -> Result<Vec<Alert>>;

    /// Acknowledge delivery of the last `watch()` result
    fn after_success(&mut self) -> Result<()>;
}
