//! Policy briefs and demand-stress scoring.

use crate::models::{BriefSeverity, PolicyBrief, Summary};

/// The five narrative briefs, filled from summary counts.
pub fn policy_briefs(summary: &Summary) -> Vec<PolicyBrief> {
    vec![
        brief(
            1,
            "Critical Surge Alert",
            format!(
                "{} districts experiencing critical demand surge requiring immediate capacity expansion",
                summary.critical_surge
            ),
            BriefSeverity::Critical,
            "alert",
        ),
        brief(
            2,
            "Quality Drift Warning",
            format!(
                "{} districts need technical audit due to unusual biometric/demographic ratios",
                summary.needs_audit
            ),
            BriefSeverity::Warning,
            "quality",
        ),
        brief(
            3,
            "Anomaly Detection",
            format!(
                "{} districts flagged by ML model with behavioral anomalies",
                summary.anomaly_count
            ),
            BriefSeverity::Info,
            "anomaly",
        ),
        brief(
            4,
            "High Load Districts",
            format!(
                "{} districts under high load, {} moderate - resource reallocation recommended",
                summary.high_load, summary.moderate_load
            ),
            BriefSeverity::Warning,
            "load",
        ),
        brief(
            5,
            "Priority Action Required",
            format!(
                "{} critical and {} high priority districts need immediate intervention",
                summary.critical_priority, summary.high_priority
            ),
            BriefSeverity::Critical,
            "priority",
        ),
    ]
}

fn brief(
    id: u32,
    title: &str,
    description: String,
    severity: BriefSeverity,
    icon: &str,
) -> PolicyBrief {
    PolicyBrief {
        id,
        title: title.to_string(),
        description,
        severity,
        icon: icon.to_string(),
    }
}

/// Weighted surge pressure as a percentage: critical districts weigh 3,
/// elevated 2, normal 1. `None` when there are no districts.
pub fn demand_stress_percent(critical: usize, elevated: usize, normal: usize) -> Option<u32> {
    let total = critical + elevated + normal;
    if total == 0 {
        return None;
    }

    let weighted = (critical * 3 + elevated * 2 + normal) as f64;
    Some((weighted / (total * 3) as f64 * 100.0).round() as u32)
}
