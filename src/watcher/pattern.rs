use crate::error::{AlertWatchError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// A file name glob (`*`, `?` and `[...]` classes) compiled to an anchored regex
#[derive(Debug, Clone)]
pub struct FilePattern {
    pattern: String,
    regex: Regex,
}

impl FilePattern {
    /// Compile a file name pattern.
    ///
    /// Supports `*`, `?` and `[seq]` / `[!seq]` character classes (with
    /// `a-z` ranges); an unclosed `[` matches itself. Path separators are
    /// rejected because patterns only ever match entries directly inside the
    /// watch directory.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.contains('/') || pattern.contains(std::path::MAIN_SEPARATOR) {
            return Err(AlertWatchError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern must be a file name, not a path".to_string(),
            });
        }

        let regex_pattern = glob_to_regex(pattern);

        let regex = Regex::new(&regex_pattern).map_err(|e| AlertWatchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Check a bare file name against the pattern
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// List regular files in `dir` whose names match, sorted by path.
    ///
    /// Entries with non UTF-8 names are never matched.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| AlertWatchError::WatchDirError {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AlertWatchError::WatchDirError {
                path: dir.to_path_buf(),
                source: e,
            })?;

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            if !self.matches(name) {
                continue;
            }

            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

/// Translate a glob into an anchored regex
fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `start`. A `]` right after
/// `[` or `[!` is part of the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn translate_class(body: &[char]) -> String {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut class = String::from(if negated { "[^" } else { "[" });
    for (idx, &c) in body.iter().enumerate() {
        let is_range = c == '-' && idx > 0 && idx + 1 < body.len();
        match c {
            _ if is_range => class.push('-'),
            '\\' | '[' | ']' | '^' | '&' | '~' | '-' => {
                class.push('\\');
                class.push(c);
            }
            _ => class.push(c),
        }
    }
    class.push(']');
    class
}
