use crate::error::{AlertWatchError, Result};
use crate::watcher::FilePattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET_PATTERN: &str = "alert.????????_????_*.log";
pub const DEFAULT_PENDING_PATTERN: &str = "alert.????????_????*";
pub const DEFAULT_MESSAGE_THRESHOLD: usize = 15;
pub const DEFAULT_PENDING_THRESHOLD: usize = 3;

/// Settings for one watched alert directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Directory the log shipper writes alert files into
    pub watch_dir: PathBuf,

    /// File name pattern of rotated files that are ready to be processed
    #[serde(default = "default_target_pattern")]
    pub target_pattern: String,

    /// File name pattern of files still being written
    #[serde(default = "default_pending_pattern")]
    pub pending_pattern: String,

    /// Maximum number of sample messages kept per tag
    #[serde(default = "default_message_threshold")]
    pub message_threshold: usize,

    /// Number of pending files at which a stalled-rotation alert is raised
    #[serde(default = "default_pending_threshold")]
    pub pending_threshold: usize,

    /// Log removals instead of deleting processed files
    #[serde(default)]
    pub dry_run: bool,
}

// Default value functions for serde
fn default_target_pattern() -> String {
    DEFAULT_TARGET_PATTERN.to_string()
}

fn default_pending_pattern() -> String {
    DEFAULT_PENDING_PATTERN.to_string()
}

fn default_message_threshold() -> usize {
    DEFAULT_MESSAGE_THRESHOLD
}

fn default_pending_threshold() -> usize {
    DEFAULT_PENDING_THRESHOLD
}

impl WatchConfig {
    /// Create a configuration for `watch_dir` with every other setting at its default
    pub fn new<P: Into<PathBuf>>(watch_dir: P) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            target_pattern: default_target_pattern(),
            pending_pattern: default_pending_pattern(),
            message_threshold: default_message_threshold(),
            pending_threshold: default_pending_threshold(),
            dry_run: false,
        }
    }

    /// Load watcher configurations from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<Vec<WatchConfig>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AlertWatchError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let configs = match extension {
            "toml" => Self::parse_toml(&contents)?,
            "json" => Self::parse_json(&contents)?,
            _ => {
                return Err(AlertWatchError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        let configs: Vec<WatchConfig> = configs
            .into_iter()
            .map(|mut config| {
                config.expand_env_vars();
                config
            })
            .collect();

        for config in &configs {
            config.validate()?;
        }

        Ok(configs)
    }

    /// Parse TOML configuration file
    fn parse_toml(contents: &str) -> Result<Vec<WatchConfig>> {
        let config_file: ConfigFile = toml::from_str(contents)
            .map_err(|e| AlertWatchError::InvalidConfig(format!("Failed to parse TOML: {}", e)))?;
        config_file.into_configs()
    }

    /// Parse JSON configuration file
    fn parse_json(contents: &str) -> Result<Vec<WatchConfig>> {
        let config_file: ConfigFile = serde_json::from_str(contents)
            .map_err(|e| AlertWatchError::InvalidConfig(format!("Failed to parse JSON: {}", e)))?;
        config_file.into_configs()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.watch_dir.as_os_str().is_empty() {
            return Err(AlertWatchError::MissingConfigField("watch_dir".to_string()));
        }

        if self.target_pattern.is_empty() {
            return Err(AlertWatchError::MissingConfigField(
                "target_pattern".to_string(),
            ));
        }

        if self.pending_pattern.is_empty() {
            return Err(AlertWatchError::MissingConfigField(
                "pending_pattern".to_string(),
            ));
        }

        FilePattern::new(&self.target_pattern)?;
        FilePattern::new(&self.pending_pattern)?;

        if self.message_threshold == 0 {
            return Err(AlertWatchError::ConfigValidationError(
                "message_threshold must be at least 1".to_string(),
            ));
        }

        if self.pending_threshold == 0 {
            return Err(AlertWatchError::ConfigValidationError(
                "pending_threshold must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Expand environment variables in the watch directory
    fn expand_env_vars(&mut self) {
        let dir = self.watch_dir.to_string_lossy();
        self.watch_dir = PathBuf::from(Self::expand_env_in_string(&dir));
    }

    /// Expand `$VAR` and `${VAR}` references in a string.
    ///
    /// A bare name runs over `[A-Za-z0-9_]`. Unset variables, a lone `$` and
    /// an unterminated `${` are left as written.
    fn expand_env_in_string(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut rest = s;

        while let Some(pos) = rest.find('$') {
            result.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
                match braced.find('}') {
                    Some(close) => (&braced[..close], close + 2),
                    None => ("", 0),
                }
            } else {
                let len = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..len], len)
            };

            let reference = &rest[pos..pos + 1 + consumed];
            let value = if name.is_empty() || name.contains(['=', '\0']) {
                None
            } else {
                std::env::var(name).ok()
            };
            result.push_str(value.as_deref().unwrap_or(reference));
            rest = &rest[pos + 1 + consumed..];
        }

        result.push_str(rest);
        result
    }
}

/// On-disk layout: either one flat watcher or a `watchers` list
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Multiple { watchers: Vec<WatchConfig> },
    Single(WatchConfig),
}

impl ConfigFile {
    fn into_configs(self) -> Result<Vec<WatchConfig>> {
        match self {
            ConfigFile::Single(config) => Ok(vec![config]),
            ConfigFile::Multiple { watchers } => {
                if watchers.is_empty() {
                    Err(AlertWatchError::InvalidConfig(
                        "No watcher configuration found in file".to_string(),
                    ))
                } else {
                    Ok(watchers)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_watch_config_defaults() {
        let config = WatchConfig::new("/var/log/easy-alert");

        assert_eq!(config.target_pattern, "alert.????????_????_*.log");
        assert_eq!(config.pending_pattern, "alert.????????_????*");
        assert_eq!(config.message_threshold, 15);
        assert_eq!(config.pending_threshold, 3);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_watch_dir() {
        let config = WatchConfig::new("");
        assert!(matches!(
            config.validate(),
            Err(AlertWatchError::MissingConfigField(_))
        ));
    }

    #[test]
    fn test_validate_zero_thresholds() {
        let mut config = WatchConfig::new("/tmp");
        config.message_threshold = 0;
        assert!(matches!(
            config.validate(),
            Err(AlertWatchError::ConfigValidationError(_))
        ));

        let mut config = WatchConfig::new("/tmp");
        config.pending_threshold = 0;
        assert!(matches!(
            config.validate(),
            Err(AlertWatchError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_validate_empty_pattern() {
        let mut config = WatchConfig::new("/tmp");
        config.pending_pattern = String::new();
        assert!(matches!(
            config.validate(),
            Err(AlertWatchError::MissingConfigField(_))
        ));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("ALERTWATCH_TEST_ROOT", "/srv/td-agent");

        let mut config = WatchConfig::new("${ALERTWATCH_TEST_ROOT}/alert");
        config.expand_env_vars();
        assert_eq!(config.watch_dir, PathBuf::from("/srv/td-agent/alert"));

        let mut config = WatchConfig::new("$ALERTWATCH_TEST_ROOT/alert");
        config.expand_env_vars();
        assert_eq!(config.watch_dir, PathBuf::from("/srv/td-agent/alert"));
    }

    #[test]
    fn test_expand_env_keeps_unset_longer_name() {
        std::env::set_var("ALERTWATCH_PFX", "/short");
        std::env::remove_var("ALERTWATCH_PFX_DIR");

        assert_eq!(
            WatchConfig::expand_env_in_string("$ALERTWATCH_PFX_DIR/alert"),
            "$ALERTWATCH_PFX_DIR/alert"
        );
        assert_eq!(
            WatchConfig::expand_env_in_string("${ALERTWATCH_PFX_DIR}/alert"),
            "${ALERTWATCH_PFX_DIR}/alert"
        );
        assert_eq!(
            WatchConfig::expand_env_in_string("${ALERTWATCH_PFX}_DIR/alert"),
            "/short_DIR/alert"
        );
    }

    #[test]
    fn test_expand_env_leaves_stray_dollars() {
        assert_eq!(WatchConfig::expand_env_in_string("/var/$"), "/var/$");
        assert_eq!(WatchConfig::expand_env_in_string("/a/${}/b"), "/a/${}/b");
        assert_eq!(
            WatchConfig::expand_env_in_string("/a/${UNCLOSED"),
            "/a/${UNCLOSED"
        );
        assert_eq!(WatchConfig::expand_env_in_string("/a$-b"), "/a$-b");
    }

    #[test]
    fn test_parse_toml_single() {
        let toml_content = r#"
            watch_dir = "/var/log/easy-alert"
            message_threshold = 5
        "#;

        let configs = WatchConfig::parse_toml(toml_content).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].watch_dir, PathBuf::from("/var/log/easy-alert"));
        assert_eq!(configs[0].message_threshold, 5);
        assert_eq!(configs[0].pending_threshold, 3);
    }

    #[test]
    fn test_parse_toml_multiple() {
        let toml_content = r#"
            [[watchers]]
            watch_dir = "/var/log/app1"

            [[watchers]]
            watch_dir = "/var/log/app2"
            pending_threshold = 10
            dry_run = true
        "#;

        let configs = WatchConfig::parse_toml(toml_content).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].watch_dir, PathBuf::from("/var/log/app1"));
        assert_eq!(configs[1].pending_threshold, 10);
        assert!(configs[1].dry_run);
    }

    #[test]
    fn test_parse_json_single() {
        let json_content = r#"{ "watch_dir": "/var/log/easy-alert", "target_pattern": "*.log" }"#;

        let configs = WatchConfig::parse_json(json_content).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].target_pattern, "*.log");
    }

    #[test]
    fn test_parse_json_empty_watchers() {
        let result = WatchConfig::parse_json(r#"{ "watchers": [] }"#);
        assert!(matches!(result, Err(AlertWatchError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file_unsupported_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "watch_dir: /tmp").unwrap();

        let result = WatchConfig::from_file(&config_path);
        assert!(matches!(result, Err(AlertWatchError::InvalidConfig(_))));
    }
}
