// Alert records produced by watchers

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Alert severity. `Error` is strictly more severe than `Warn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Warn,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// A single alert handed to a notifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// When the watch pass that produced this alert started
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn new(
        timestamp: DateTime<Local>,
        level: Level,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            title: title.into(),
            body: body.into(),
        }
    }
}
