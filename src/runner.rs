// One pass over every configured watcher

use crate::notify::Notifier;
use crate::watcher::Watcher;
use tracing::{debug, error, info};

/// Outcome of a single pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Alerts handed to the notifier
    pub alerts: usize,
    /// Watchers whose alerts were delivered and acknowledged
    pub notified: usize,
    /// Watchers that failed to watch, deliver or clean up
    pub failed: usize,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Run `watch -> notify -> after_success` for every watcher.
///
/// `after_success` is only reached when the notifier accepted the alerts.
/// A failing watcher is logged and counted; the remaining watchers still run.
pub fn run_once(watchers: &mut [Box<dyn Watcher>], notifier: &mut dyn Notifier) -> RunReport {
    let mut report = RunReport::default();

    for watcher in watchers.iter_mut() {
        let alerts = match watcher.watch() {
            Ok(alerts) => alerts,
            Err(e) => {
                error!("Watcher {} failed: {}", watcher.name(), e);
                report.failed += 1;
                continue;
            }
        };

        if alerts.is_empty() {
            debug!("Watcher {} produced no alerts", watcher.name());
        } else {
            if let Err(e) = notifier.notify(&alerts) {
                error!(
                    "Failed to deliver {} alert(s) from {}: {}",
                    alerts.len(),
                    watcher.name(),
                    e
                );
                report.failed += 1;
                continue;
            }
            info!("Delivered {} alert(s) from {}", alerts.len(), watcher.name());
            report.alerts += alerts.len();
            report.notified += 1;
        }

        if let Err(e) = watcher.after_success() {
            error!("Cleanup for {} failed: {}", watcher.name(), e);
            report.failed += 1;
        }
    }

    report
}
