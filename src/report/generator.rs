//! Report rendering.
//!
//! JSON is the wire format shared with the HTTP endpoint. Markdown is a
//! human-readable rendering for offline review.

use crate::analysis::demand_stress_percent;
use crate::models::{AnalyticsReport, ReportMetadata, Summary};
use anyhow::Result;

/// Generate the JSON report.
pub fn generate_json_report(report: &AnalyticsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AnalyticsReport, metadata: &ReportMetadata) -> String {
    let mut output = String::new();

    output.push_str("# Governance Analytics Report\n\n");
    output.push_str(&generate_metadata_section(metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_briefs_section(report));
    output.push_str(&generate_anomalies_section(report));
    output.push_str(&generate_surge_section(report));
    output.push_str(&generate_states_section(report));
    output.push_str(&generate_attention_section(report));
    output.push_str(&generate_footer());

    output
}

/// Compact rendering of large counts: `1.23B`, `4.56M`, `7.8K`.
pub fn format_number(num: f64) -> String {
    if num >= 1_000_000_000.0 {
        format!("{:.2}B", num / 1_000_000_000.0)
    } else if num >= 1_000_000.0 {
        format!("{:.2}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.1}K", num / 1_000.0)
    } else {
        num.to_string()
    }
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Data Directory:** `{}`\n", metadata.data_dir));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_summary_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Districts | Authentications | Anomalies | Avg QDI |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {:.2} |\n\n",
        summary.total_districts,
        format_number(summary.total_authentications),
        summary.anomaly_count,
        summary.avg_qdi
    ));

    section.push_str("### Demand Surge\n\n");
    section.push_str("| Critical | Elevated | Normal |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        summary.critical_surge, summary.elevated_surge, summary.normal_surge
    ));

    if let Some(stress) = demand_stress_percent(
        summary.critical_surge,
        summary.elevated_surge,
        summary.normal_surge,
    ) {
        section.push_str(&format!("**Demand stress:** {}%\n\n", stress));
    }

    section.push_str("### Load and Priority\n\n");
    section.push_str("| High Load | Moderate Load | Optimal Load | Needs Audit |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        summary.high_load, summary.moderate_load, summary.optimal_load, summary.needs_audit
    ));
    section.push_str("| Critical Priority | High Priority | Medium Priority |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        summary.critical_priority, summary.high_priority, summary.medium_priority
    ));

    section
}

fn generate_briefs_section(report: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Policy Briefs\n\n");
    for brief in &report.policy_briefs {
        section.push_str(&format!(
            "- {} **{}** ({}): {}\n",
            brief.severity.emoji(),
            brief.title,
            brief.severity,
            brief.description
        ));
    }
    section.push('\n');

    section
}

fn generate_anomalies_section(report: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Top Anomalies\n\n");
    if report.top_anomalies.is_empty() {
        section.push_str("No flagged anomalies.\n\n");
        return section;
    }

    section.push_str("| State | District | Severity | Authentications |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");
    for a in &report.top_anomalies {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} |\n",
            a.state,
            a.district,
            a.severity,
            format_number(a.total_auth)
        ));
    }
    section.push('\n');

    if !report.anomaly_by_state.is_empty() {
        section.push_str("### Anomalies by State\n\n");
        section.push_str("| State | Count |\n");
        section.push_str("|:---|:---:|\n");
        for s in &report.anomaly_by_state {
            section.push_str(&format!("| {} | {} |\n", s.state, s.count));
        }
        section.push('\n');
    }

    section
}

fn generate_surge_section(report: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Critical Surge Districts\n\n");
    if report.top_surge.is_empty() {
        section.push_str("No districts at critical surge.\n\n");
        return section;
    }

    section.push_str("| State | District | Surge Score | Avg Demand | Peak Demand | Growth |\n");
    section.push_str("|:---|:---|:---:|:---:|:---:|:---:|\n");
    for s in &report.top_surge {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} | {} | {:.1}% |\n",
            s.state,
            s.district,
            s.surge_score,
            format_number(s.avg_demand),
            format_number(s.peak_demand),
            s.growth_rate * 100.0
        ));
    }
    section.push('\n');

    section
}

fn generate_states_section(report: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## States by Authentication Volume\n\n");
    if report.state_data.is_empty() {
        section.push_str("No governance rows.\n\n");
        return section;
    }

    section.push_str("| State | Authentications | Districts | Anomalies | Avg QDI |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    for s in &report.state_data {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.2} |\n",
            s.state,
            format_number(s.total_auth),
            s.districts,
            s.anomalies,
            s.avg_qdi
        ));
    }
    section.push('\n');

    section
}

fn generate_attention_section(report: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Districts Needing Attention\n\n");
    if report.attention_districts.is_empty() {
        section.push_str("No critical or high priority districts.\n\n");
        return section;
    }

    for d in &report.attention_districts {
        section.push_str(&format!(
            "### {}, {} ({} priority, score {:.2})\n\n",
            d.district, d.state, d.priority_level, d.priority_score
        ));
        section.push_str(&format!(
            "*Surge: {} | QDI: {} | Load: {}*\n\n",
            d.surge_level, d.qdi_status, d.load_status
        ));
        if !d.recommendation.is_empty() {
            section.push_str(&format!("> 💡 {}\n\n", d.recommendation));
        }
    }

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by govdash*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build_report;
    use crate::table::{parse_table, TableSet};
    use chrono::Utc;

    fn create_test_report() -> AnalyticsReport {
        let tables = TableSet {
            governance: parse_table(
                "state,district,total_auth_sum,is_anomaly,QDI,priority_level,priority_score,surge_level,qdi_status,load_status,recommendation\n\
                 Bihar,Patna,2500000,1,2.5,Critical,8.5,Critical,Concern,High,Deploy mobile units",
            ),
            surge: parse_table(
                "state,district,avg_demand,peak_demand,avg_growth_rate,surge_score,surge_level\n\
                 Bihar,Patna,1500,4200,0.25,180.5,Critical",
            ),
            anomaly: parse_table(
                "state,district,total_auth_sum,is_anomaly,anomaly_severity\nBihar,Patna,2500000,-1,3.75",
            ),
            ..TableSet::default()
        };
        build_report(&tables)
    }

    fn create_test_metadata() -> ReportMetadata {
        ReportMetadata {
            generated_at: Utc::now(),
            data_dir: "data".to_string(),
            duration_seconds: 0.25,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1_234_000_000.0), "1.23B");
        assert_eq!(format_number(4_560_000.0), "4.56M");
        assert_eq!(format_number(7_800.0), "7.8K");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(12.5), "12.5");
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report(), &create_test_metadata());

        assert!(markdown.contains("# Governance Analytics Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("2.50M"));
        assert!(markdown.contains("Critical Surge Alert"));
        assert!(markdown.contains("| Bihar | Patna | 3.75 |"));
        assert!(markdown.contains("**Demand stress:** 100%"));
        assert!(markdown.contains("Deploy mobile units"));
    }

    #[test]
    fn test_markdown_empty_sections() {
        let report = build_report(&TableSet::default());
        let markdown = generate_markdown_report(&report, &create_test_metadata());

        assert!(markdown.contains("No flagged anomalies."));
        assert!(markdown.contains("No districts at critical surge."));
        assert!(!markdown.contains("Demand stress"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"qdiStats\""));
        assert!(json.contains("\"topAnomalies\""));
        assert!(json.contains("\"attentionDistricts\""));
        assert!(json.contains("\"policyBriefs\""));
        assert!(!json.contains("generated"));
    }

    #[test]
    fn test_json_report_is_deterministic() {
        let report = create_test_report();
        assert_eq!(
            generate_json_report(&report).unwrap(),
            generate_json_report(&report).unwrap()
        );
    }
}
