// CLI module - User-facing command-line interface

mod output;

pub use output::print_error;

use crate::config::WatchConfig;
use crate::error::{AlertWatchError, Result};
use crate::notify::{ConsoleNotifier, OutputFormat};
use crate::runner::run_once;
use crate::watcher::{LogWatcher, Watcher};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// alertwatch - summarize shipped alert logs and raise alerts
#[derive(Parser)]
#[command(name = "alertwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one watch pass and print the resulting alerts
    Run(RunArgs),

    /// Validate a configuration file and show the watchers it defines
    Check {
        /// Path to a .toml or .json configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Path to a .toml or .json configuration file
    #[arg(short, long, required_unless_present = "watch_dir")]
    config: Option<PathBuf>,

    /// Watch a single directory without a configuration file
    #[arg(short, long, conflicts_with = "config")]
    watch_dir: Option<PathBuf>,

    /// File name pattern of ready files [default: alert.????????_????_*.log]
    ///
    /// Matched against file names directly inside the watch directory, so it
    /// may not contain a path separator. Supports `*`, `?` and `[...]`.
    #[arg(long, conflicts_with = "config")]
    target_pattern: Option<String>,

    /// File name pattern of files not yet rotated [default: alert.????????_????*]
    ///
    /// Matched against file names directly inside the watch directory, so it
    /// may not contain a path separator. Supports `*`, `?` and `[...]`.
    #[arg(long, conflicts_with = "config")]
    pending_pattern: Option<String>,

    /// Maximum sample messages kept per tag [default: 15]
    #[arg(long, conflicts_with = "config")]
    message_threshold: Option<usize>,

    /// Pending file count that raises an alert [default: 3]
    #[arg(long, conflicts_with = "config")]
    pending_threshold: Option<usize>,

    /// Only log which files would be removed
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Alert output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: FormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    /// Run the CLI application
    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        init_logging(cli.verbose);
        cli.execute()
    }

    /// Execute the parsed command
    fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Run(args) => run_command(args),
            Commands::Check { config } => {
                let configs = WatchConfig::from_file(config)?;
                output::print_watchers(&configs);
                Ok(())
            }
        }
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout only carries alerts.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_command(args: &RunArgs) -> Result<()> {
    let configs = build_configs(args)?;

    let mut watchers: Vec<Box<dyn Watcher>> = Vec::with_capacity(configs.len());
    for config in configs {
        watchers.push(Box::new(LogWatcher::new(config)?));
    }

    let mut notifier = ConsoleNotifier::stdout(args.format.into());
    let report = run_once(&mut watchers, &mut notifier);
    output::print_report(&report, watchers.len());

    if report.is_success() {
        Ok(())
    } else {
        Err(AlertWatchError::Other(format!(
            "{} of {} watcher(s) failed",
            report.failed,
            watchers.len()
        )))
    }
}

/// Resolve watcher configurations from either a file or the inline flags
fn build_configs(args: &RunArgs) -> Result<Vec<WatchConfig>> {
    let mut configs = match (&args.config, &args.watch_dir) {
        (Some(path), _) => WatchConfig::from_file(path)?,
        (None, Some(dir)) => {
            let mut config = WatchConfig::new(dir);
            if let Some(ref pattern) = args.target_pattern {
                config.target_pattern = pattern.clone();
            }
            if let Some(ref pattern) = args.pending_pattern {
                config.pending_pattern = pattern.clone();
            }
            if let Some(threshold) = args.message_threshold {
                config.message_threshold = threshold;
            }
            if let Some(threshold) = args.pending_threshold {
                config.pending_threshold = threshold;
            }
            config.validate()?;
            vec![config]
        }
        (None, None) => {
            return Err(AlertWatchError::MissingConfigField(
                "--config or --watch-dir".to_string(),
            ))
        }
    };

    if args.dry_run {
        for config in &mut configs {
            config.dry_run = true;
        }
    }

    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Run(args) => args,
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_build_configs_from_watch_dir() {
        let args = parse(&[
            "alertwatch",
            "run",
            "--watch-dir",
            "/var/log/easy-alert",
            "--message-threshold",
            "5",
            "--dry-run",
        ]);

        let configs = build_configs(&args).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].watch_dir, PathBuf::from("/var/log/easy-alert"));
        assert_eq!(configs[0].message_threshold, 5);
        assert_eq!(configs[0].pending_threshold, 3);
        assert_eq!(configs[0].target_pattern, crate::config::DEFAULT_TARGET_PATTERN);
        assert!(configs[0].dry_run);
    }

    #[test]
    fn test_run_requires_a_source() {
        assert!(Cli::try_parse_from(["alertwatch", "run"]).is_err());
    }

    #[test]
    fn test_config_conflicts_with_watch_dir() {
        assert!(Cli::try_parse_from([
            "alertwatch",
            "run",
            "--config",
            "a.toml",
            "--watch-dir",
            "/tmp"
        ])
        .is_err());
    }

    #[test]
    fn test_inline_thresholds_are_validated() {
        let args = parse(&[
            "alertwatch",
            "run",
            "--watch-dir",
            "/tmp",
            "--pending-threshold",
            "0",
        ]);
        assert!(matches!(
            build_configs(&args),
            Err(AlertWatchError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_inline_pattern_must_be_a_file_name() {
        let args = parse(&[
            "alertwatch",
            "run",
            "--watch-dir",
            "/tmp",
            "--target-pattern",
            "nested/alert.*.log",
        ]);
        assert!(matches!(
            build_configs(&args),
            Err(AlertWatchError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_pattern_help_mentions_file_names() {
        let help = Cli::command()
            .find_subcommand_mut("run")
            .unwrap()
            .render_long_help()
            .to_string();
        assert!(help.contains("directly inside the watch directory"));
    }
}
