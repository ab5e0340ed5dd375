// Parsing of tab-delimited alert lines and per-tag aggregation

use crate::alert::Level;
use crate::error::{AlertWatchError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Tag suffix that escalates an alert to `Level::Error`
pub const ERROR_TAG_SUFFIX: &str = ".error";

/// Marker line shown after the samples of a truncated tag
pub const SNIP_MARKER: &str = "...";

/// One successfully parsed alert line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub tag: String,
    pub message: String,
}

/// Why a line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected at least 3 tab-separated fields, found {0}")]
    MissingFields(usize),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("payload has no string \"message\" field")]
    MissingMessage,
}

/// Parse one line of the form `<time>\t<tag>\t<json>[\t...]`
pub fn parse_line(line: &str) -> std::result::Result<ParsedLine, LineError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return Err(LineError::MissingFields(fields.len()));
    }

    let payload: serde_json::Value =
        serde_json::from_str(fields[2]).map_err(|e| LineError::InvalidJson(e.to_string()))?;

    let message = payload
        .get("message")
        .and_then(|m| m.as_str())
        .ok_or(LineError::MissingMessage)?;

    Ok(ParsedLine {
        tag: fields[1].to_string(),
        message: message.to_string(),
    })
}

/// Decode bytes as UTF-8, dropping any invalid sequences
pub fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Count and retained samples for one tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSummary {
    pub count: usize,
    pub samples: Vec<String>,
}

impl TagSummary {
    pub fn is_truncated(&self) -> bool {
        self.count > self.samples.len()
    }
}

/// Messages grouped by tag across every file of one watch pass
#[derive(Debug, Clone)]
pub struct LogSummary {
    message_threshold: usize,
    tags: BTreeMap<String, TagSummary>,
    skipped: usize,
}

impl LogSummary {
    pub fn new(message_threshold: usize) -> Self {
        Self {
            message_threshold,
            tags: BTreeMap::new(),
            skipped: 0,
        }
    }

    /// Count a message for `tag`, keeping it only while under the threshold
    pub fn record(&mut self, tag: &str, message: String) {
        let entry = self.tags.entry(tag.to_string()).or_default();
        entry.count += 1;
        if entry.count <= self.message_threshold {
            entry.samples.push(message);
        }
    }

    /// Read and aggregate every line of an alert file.
    ///
    /// The file is streamed line by line. Malformed lines are skipped with a
    /// warning; read failures abort.
    pub fn read_file(&mut self, path: &Path) -> Result<()> {
        let read_error = |e: std::io::Error| AlertWatchError::LogFileError {
            path: path.to_path_buf(),
            source: e,
        };
        let reader = BufReader::new(File::open(path).map_err(read_error)?);

        let mut parsed = 0usize;
        for (index, raw) in reader.split(b'\n').enumerate() {
            let raw = raw.map_err(read_error)?;
            let raw = raw.strip_suffix(b"\r").unwrap_or(&raw[..]);
            let line = decode_ignoring_invalid(raw);
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&line) {
                Ok(ParsedLine { tag, message }) => {
                    self.record(&tag, message);
                    parsed += 1;
                }
                Err(e) => {
                    warn!(
                        "Skipping malformed line {} in {}: {}",
                        index + 1,
                        path.display(),
                        e
                    );
                    self.skipped += 1;
                }
            }
        }

        debug!("Parsed {} line(s) from {}", parsed, path.display());
        Ok(())
    }

    pub fn tags(&self) -> &BTreeMap<String, TagSummary> {
        &self.tags
    }

    pub fn get(&self, tag: &str) -> Option<&TagSummary> {
        self.tags.get(tag)
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// `Error` if any tag carries the error suffix, otherwise `Warn`
    pub fn level(&self) -> Level {
        if self.tags.keys().any(|tag| tag.ends_with(ERROR_TAG_SUFFIX)) {
            Level::Error
        } else {
            Level::Warn
        }
    }

    /// Human-readable body: tags in lexicographic order, each followed by
    /// its samples, a snip marker when truncated, and a blank line.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for (tag, summary) in &self.tags {
            lines.push(format!("[{}] {} message(s)", tag, summary.count));
            lines.extend(summary.samples.iter().cloned());
            if summary.count > self.message_threshold {
                lines.push(SNIP_MARKER.to_string());
            }
            lines.push(String::new());
        }

        if self.skipped > 0 {
            lines.push(format!("({} malformed line(s) skipped)", self.skipped));
        }

        lines.join("\n")
    }
}
