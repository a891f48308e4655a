//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// GovDash - governance analytics aggregator
///
/// Reads the governance, surge, anomaly, quality-drift and load tables,
/// aggregates them into one analytics report, and either writes the report
/// to a file or serves it over HTTP for the dashboard.
///
/// Examples:
///   govdash --data-dir ./data
///   govdash --data-dir ./data --format markdown --output report.md
///   govdash --serve --bind 0.0.0.0:3000
///   govdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding the five CSV tables
    ///
    /// Overrides `[data] dir` from the config file.
    #[arg(short, long, value_name = "DIR", env = "GOVDASH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Serve the report over HTTP instead of writing a file
    #[arg(long)]
    pub serve: bool,

    /// Address for the HTTP server
    #[arg(long, value_name = "ADDR", env = "GOVDASH_BIND")]
    pub bind: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .govdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Per-file read timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .govdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format (default), the same body the server returns
    #[default]
    Json,
    /// Markdown format
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref bind) = self.bind {
            if bind.parse::<SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {}", bind));
            }
        }

        if self.serve && self.output.is_some() {
            return Err("--output has no effect with --serve".to_string());
        }

        if let Some(ref dir) = self.data_dir {
            if !dir.exists() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Data path is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Build the log filter: `directives` (usually `RUST_LOG`) refine the
/// default level picked from the flags. Malformed directives are ignored.
pub fn log_filter(level: tracing::Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_args() -> Args {
        Args {
            data_dir: None,
            output: None,
            format: OutputFormat::Json,
            serve: false,
            bind: None,
            config: None,
            timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "govdash",
            "--format",
            "markdown",
            "--output",
            "report.md",
            "--timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.output, Some(PathBuf::from("report.md")));
        assert_eq!(args.timeout, Some(5));
        assert!(!args.serve);
    }

    #[test]
    fn test_validation_defaults_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bind_address() {
        let mut args = make_args();
        args.bind = Some("not-an-address".to_string());
        assert!(args.validate().is_err());

        args.bind = Some("127.0.0.1:8080".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_output_with_serve() {
        let mut args = make_args();
        args.serve = true;
        args.output = Some(PathBuf::from("x.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_data_dir() {
        let mut args = make_args();
        args.data_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(args.validate().is_err());

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.csv");
        std::fs::write(&file, "a\n1").unwrap();
        args.data_dir = Some(file);
        assert!(args.validate().is_err());

        args.data_dir = Some(dir.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_filter_defaults_to_flag_level() {
        let filter = log_filter(tracing::Level::DEBUG, None);
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_log_filter_applies_directives() {
        let filter = log_filter(tracing::Level::INFO, Some("govdash::server=trace"));
        let rendered = filter.to_string();

        assert!(rendered.contains("govdash::server=trace"));
        assert!(rendered.contains("info"));
    }
}
