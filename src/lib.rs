// Library exports for alertwatch

pub mod alert;
pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod runner;
pub mod watcher;

pub use alert::{Alert, Level};
pub use error::{AlertWatchError, Result};
