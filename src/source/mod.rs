//! Source table loading.
//!
//! Resolves the five logical tables to files, reads them concurrently and
//! parses them. A load either yields every table or fails as a whole.

use crate::analysis::build_report;
use crate::models::AnalyticsReport;
use crate::table::{parse_table, TableSet};
use futures::future::try_join_all;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The five logical source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Governance,
    Surge,
    Anomaly,
    QualityDrift,
    Load,
}

impl TableKind {
    /// Every table, in load order.
    pub const ALL: [TableKind; 5] = [
        TableKind::Governance,
        TableKind::Surge,
        TableKind::Anomaly,
        TableKind::QualityDrift,
        TableKind::Load,
    ];

    /// Logical name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Governance => "governance",
            TableKind::Surge => "surge",
            TableKind::Anomaly => "anomaly",
            TableKind::QualityDrift => "quality-drift",
            TableKind::Load => "load",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error types for loading source tables.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {table} table at {path}: {source}")]
    Read {
        table: TableKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out after {seconds}s reading {table} table at {path}")]
    Timeout {
        table: TableKind,
        path: PathBuf,
        seconds: u64,
    },
}

/// Configuration for locating and reading the tables.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Directory holding the files.
    pub dir: PathBuf,
    pub governance: String,
    pub surge: String,
    pub anomaly: String,
    pub quality_drift: String,
    pub load: String,
    /// Bound on each individual file read.
    pub read_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::from(&crate::config::DataConfig::default())
    }
}

impl From<&crate::config::DataConfig> for SourceConfig {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            governance: config.governance.clone(),
            surge: config.surge.clone(),
            anomaly: config.anomaly.clone(),
            quality_drift: config.quality_drift.clone(),
            load: config.load.clone(),
            read_timeout: Duration::from_secs(config.read_timeout_seconds),
        }
    }
}

/// Reads the source tables from a directory.
#[derive(Debug, Clone)]
pub struct DataSource {
    config: SourceConfig,
}

impl DataSource {
    /// Create a new data source.
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Directory the tables are read from.
    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Resolve a table to its file path.
    pub fn path_for(&self, kind: TableKind) -> PathBuf {
        let file = match kind {
            TableKind::Governance => &self.config.governance,
            TableKind::Surge => &self.config.surge,
            TableKind::Anomaly => &self.config.anomaly,
            TableKind::QualityDrift => &self.config.quality_drift,
            TableKind::Load => &self.config.load,
        };
        self.config.dir.join(file)
    }

    /// Read one table's raw text, bounded by the read timeout. Invalid UTF-8
    /// is replaced with U+FFFD rather than failing the load.
    pub async fn read_table(&self, kind: TableKind) -> Result<String, SourceError> {
        let path = self.path_for(kind);
        debug!(table = %kind, path = %path.display(), "reading table");

        match tokio::time::timeout(self.config.read_timeout, tokio::fs::read(&path)).await {
            Ok(Ok(bytes)) => match String::from_utf8(bytes) {
                Ok(content) => Ok(content),
                Err(e) => {
                    warn!(
                        table = %kind,
                        path = %path.display(),
                        "table is not valid UTF-8, decoding lossily"
                    );
                    Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
                }
            },
            Ok(Err(source)) => Err(SourceError::Read {
                table: kind,
                path,
                source,
            }),
            Err(_) => Err(SourceError::Timeout {
                table: kind,
                path,
                seconds: self.config.read_timeout.as_secs(),
            }),
        }
    }

    /// Read and parse all five tables. Reads run concurrently; the first
    /// failure aborts the whole load.
    pub async fn load(&self) -> Result<TableSet, SourceError> {
        let start = Instant::now();
        let reads = TableKind::ALL.iter().map(|&kind| self.read_table(kind));
        let mut contents = try_join_all(reads).await?.into_iter();

        let mut next = || contents.next().map(|c| parse_table(&c)).unwrap_or_default();
        let tables = TableSet {
            governance: next(),
            surge: next(),
            anomaly: next(),
            quality_drift: next(),
            load: next(),
        };

        info!(
            governance = tables.governance.len(),
            surge = tables.surge.len(),
            anomaly = tables.anomaly.len(),
            quality_drift = tables.quality_drift.len(),
            load = tables.load.len(),
            elapsed = ?start.elapsed(),
            "loaded source tables"
        );

        Ok(tables)
    }

    /// Load every table and build the analytics report.
    pub async fn report(&self) -> Result<AnalyticsReport, SourceError> {
        let tables = self.load().await?;
        Ok(build_report(&tables))
    }
}
