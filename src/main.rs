//! GovDash - governance analytics aggregator
//!
//! Reads five district-level CSV tables, folds them into one analytics
//! report, and either writes the report to disk or serves it over HTTP
//! for the dashboard.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime or configuration error (missing table, bad config, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod server;
mod source;
mod table;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::ReportMetadata;
use source::{DataSource, SourceConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so `general.verbose` can raise the level
    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("GovDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    let result = if args.serve {
        run_server(&config).await
    } else {
        run_report(&args, &config).await
    };

    if let Err(e) = result {
        error!("GovDash failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .govdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the data directory, file names, and bind address.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` refines the level.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(cli::log_filter(level, directives.as_deref()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Explicit config path must exist and parse
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // A malformed default file is an error too; only a missing one falls back
    Ok(Config::load_default()?.unwrap_or_default())
}

/// Serve the report over HTTP until SIGINT or SIGTERM.
async fn run_server(config: &Config) -> Result<()> {
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

    let source = DataSource::new(SourceConfig::from(&config.data));
    if !source.dir().is_dir() {
        warn!(
            "Data directory {} does not exist yet; /api/analytics will fail until it does",
            source.dir().display()
        );
    }

    println!("🌐 Serving analytics on http://{}", addr);
    println!("   Data: {}", source.dir().display());
    println!("   Endpoints: /api/analytics, /api/models, /healthz");

    let listener = server::bind(addr).await?;
    server::serve(listener, source).await
}

/// Build one report and write it to the output file.
async fn run_report(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let source = DataSource::new(SourceConfig::from(&config.data));

    println!("📥 Loading tables from: {}", source.dir().display());
    let spinner = (!args.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Aggregating tables...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = source.report().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let report = result.context("Failed to load analytics data")?;

    let duration = start_time.elapsed().as_secs_f64();

    println!("📝 Generating report...");
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            let metadata = ReportMetadata {
                generated_at: Utc::now(),
                data_dir: source.dir().display().to_string(),
                duration_seconds: duration,
            };
            report::generate_markdown_report(&report, &metadata)
        }
    };

    let output_path = Path::new(&config.general.output);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let summary = &report.summary;
    println!("\n📊 Analytics Summary:");
    println!("   Districts: {}", summary.total_districts);
    println!(
        "   Authentications: {}",
        report::format_number(summary.total_authentications)
    );
    println!(
        "   Anomalies: {} | Avg QDI: {:.2}",
        summary.anomaly_count, summary.avg_qdi
    );
    println!(
        "   Surge - 🔴 Critical: {} | 🟠 Elevated: {} | 🟢 Normal: {}",
        summary.critical_surge, summary.elevated_surge, summary.normal_surge
    );
    println!("   Duration: {:.2}s", duration);
    println!(
        "\n✅ Report complete! Saved to: {}",
        output_path.display()
    );

    Ok(())
}
