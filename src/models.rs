//! Data models for the analytics report.
//!
//! This module contains the structures returned to dashboard consumers.
//! Field names serialize in camelCase; that shape is the wire contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity attached to a policy brief.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefSeverity {
    /// Informational finding
    Info,
    /// Needs attention soon
    Warning,
    /// Needs immediate intervention
    Critical,
}

impl fmt::Display for BriefSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BriefSeverity::Info => write!(f, "Info"),
            BriefSeverity::Warning => write!(f, "Warning"),
            BriefSeverity::Critical => write!(f, "Critical"),
        }
    }
}

impl BriefSeverity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            BriefSeverity::Info => "🔵",
            BriefSeverity::Warning => "🟠",
            BriefSeverity::Critical => "🔴",
        }
    }
}

/// Headline counts and totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_districts: usize,
    pub total_authentications: f64,
    /// Anomaly rows flagged with `is_anomaly` of 1 or -1.
    pub anomaly_count: usize,
    /// Mean governance QDI, rounded to two decimals. Zero for an empty table.
    #[serde(rename = "avgQDI")]
    pub avg_qdi: f64,
    pub critical_surge: usize,
    pub elevated_surge: usize,
    /// Surge rows at "Normal" or "Low".
    pub normal_surge: usize,
    pub needs_audit: usize,
    pub high_load: usize,
    pub moderate_load: usize,
    pub optimal_load: usize,
    pub critical_priority: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
}

/// Quality-drift status distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QdiStats {
    pub critical: usize,
    pub concern: usize,
    pub watch: usize,
    pub good: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAnomaly {
    pub state: String,
    pub district: String,
    pub severity: f64,
    pub total_auth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSurge {
    pub state: String,
    pub district: String,
    pub surge_score: f64,
    pub avg_demand: f64,
    pub peak_demand: f64,
    pub growth_rate: f64,
}

/// Per-state rollup of governance rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateData {
    pub state: String,
    pub total_auth: f64,
    pub districts: usize,
    /// Rows whose `is_anomaly` is truthy (any non-zero number or non-empty text).
    pub anomalies: usize,
    #[serde(rename = "avgQDI")]
    pub avg_qdi: f64,
    pub critical_surge: usize,
}

/// One point of the fixed demand trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub demand: u64,
    pub predicted: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyByState {
    /// Display name, shortened past twelve characters.
    pub state: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionDistrict {
    pub state: String,
    pub district: String,
    pub priority_score: f64,
    pub priority_level: String,
    pub surge_level: String,
    pub qdi_status: String,
    pub load_status: String,
    pub recommendation: String,
}

/// Narrative brief built from summary counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyBrief {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub severity: BriefSeverity,
    pub icon: String,
}

/// The consolidated analytics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub qdi_stats: QdiStats,
    pub top_anomalies: Vec<TopAnomaly>,
    pub top_surge: Vec<TopSurge>,
    pub state_data: Vec<StateData>,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub anomaly_by_state: Vec<AnomalyByState>,
    pub attention_districts: Vec<AttentionDistrict>,
    pub policy_briefs: Vec<PolicyBrief>,
}

/// Run details printed alongside a rendered report. Never part of the JSON
/// body, which must stay identical for identical inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Directory the tables were read from.
    pub data_dir: String,
    /// Load and aggregation time in seconds.
    pub duration_seconds: f64,
}

/// Scores for one of the upstream models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Static model fixtures served alongside the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFixtures {
    pub model_performance: Vec<ModelPerformance>,
    pub feature_importance: Vec<FeatureImportance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief_severity_serializes_lowercase() {
        let json = serde_json::to_string(&BriefSeverity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_brief_severity_ordering() {
        assert!(BriefSeverity::Info < BriefSeverity::Warning);
        assert!(BriefSeverity::Warning < BriefSeverity::Critical);
    }

    #[test]
    fn test_summary_field_names() {
        let value = serde_json::to_value(Summary::default()).unwrap();
        let obj = value.as_object().unwrap();

        for key in [
            "totalDistricts",
            "totalAuthentications",
            "anomalyCount",
            "avgQDI",
            "criticalSurge",
            "elevatedSurge",
            "normalSurge",
            "needsAudit",
            "highLoad",
            "moderateLoad",
            "optimalLoad",
            "criticalPriority",
            "highPriority",
            "mediumPriority",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 14);
    }

    #[test]
    fn test_state_data_field_names() {
        let data = StateData {
            state: "Kerala".to_string(),
            total_auth: 10.0,
            districts: 1,
            anomalies: 0,
            avg_qdi: 1.5,
            critical_surge: 0,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["avgQDI"], 1.5);
        assert_eq!(value["totalAuth"], 10.0);
        assert_eq!(value["criticalSurge"], 0);
    }
}
