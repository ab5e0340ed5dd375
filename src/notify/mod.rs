// Notify module - delivery of alerts produced by watchers

use crate::alert::{Alert, Level};
use crate::error::{AlertWatchError, Result};
use colored::*;
use std::io::Write;

/// Receives alerts from the runner. Returning `Ok` confirms delivery and
/// allows the watcher to clean up its input.
pub trait Notifier {
    fn notify(&mut self, alerts: &[Alert]) -> Result<()>;
}

/// How the console notifier renders alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Colored, human-readable blocks
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes alerts to stdout (or any writer)
pub struct ConsoleNotifier {
    format: OutputFormat,
    writer: Box<dyn Write>,
}

impl ConsoleNotifier {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::with_writer(format, Box::new(std::io::stdout()))
    }

    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write>) -> Self {
        Self { format, writer }
    }

    fn write_text(&mut self, alert: &Alert) -> std::io::Result<()> {
        let badge = match alert.level {
            Level::Warn => format!("[{}]", alert.level).yellow().bold(),
            Level::Error => format!("[{}]", alert.level).red().bold(),
        };

        writeln!(
            self.writer,
            "{} {} {}",
            badge,
            alert.title.bold(),
            alert.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        )?;
        writeln!(self.writer, "{}", alert.body.trim_end())?;
        writeln!(self.writer)
    }

    fn write_json(&mut self, alert: &Alert) -> Result<()> {
        serde_json::to_writer(&mut self.writer, alert)
            .map_err(|e| AlertWatchError::NotifyError(format!("Failed to encode alert: {}", e)))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, alerts: &[Alert]) -> Result<()> {
        for alert in alerts {
            match self.format {
                OutputFormat::Text => self.write_text(alert)?,
                OutputFormat::Json => self.write_json(alert)?,
            }
        }

        self.writer
            .flush()
            .map_err(|e| AlertWatchError::NotifyError(format!("Failed to flush output: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer that keeps its bytes reachable after being boxed
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn sample_alert(level: Level) -> Alert {
        Alert::new(Local::now(), level, "Log alert", "[app.error] 1 message(s)\nboom\n")
    }

    #[test]
    fn test_text_output_contains_title_and_body() {
        let buffer = SharedBuffer::default();
        let mut notifier = ConsoleNotifier::with_writer(OutputFormat::Text, Box::new(buffer.clone()));

        notifier.notify(&[sample_alert(Level::Error)]).unwrap();

        let output = buffer.contents();
        assert!(output.contains("ERROR"));
        assert!(output.contains("Log alert"));
        assert!(output.contains("[app.error] 1 message(s)\nboom"));
    }

    #[test]
    fn test_json_output_is_one_line_per_alert() {
        let buffer = SharedBuffer::default();
        let mut notifier = ConsoleNotifier::with_writer(OutputFormat::Json, Box::new(buffer.clone()));

        notifier
            .notify(&[sample_alert(Level::Warn), sample_alert(Level::Error)])
            .unwrap();

        let output = buffer.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["level"], "WARN");
        assert_eq!(first["title"], "Log alert");
        let second: Alert = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.level, Level::Error);
    }
}
