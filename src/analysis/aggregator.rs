//! Table aggregation and ranking.
//!
//! Each table is scanned independently. Sorts are stable and use a total
//! order over the numeric accessor, so text in a numeric column sorts as zero
//! instead of poisoning the comparison.

use crate::analysis::briefs::policy_briefs;
use crate::analysis::fixtures::monthly_trend;
use crate::models::{
    AnalyticsReport, AnomalyByState, AttentionDistrict, QdiStats, StateData, Summary, TopAnomaly,
    TopSurge,
};
use crate::table::{Row, TableSet};
use std::collections::HashMap;
use tracing::debug;

pub const TOP_ANOMALIES: usize = 10;
pub const TOP_SURGE: usize = 10;
pub const TOP_STATES: usize = 15;
pub const TOP_ANOMALY_STATES: usize = 8;
pub const TOP_ATTENTION: usize = 15;

/// State names longer than this are shortened in the anomaly histogram.
pub const STATE_LABEL_CHARS: usize = 12;

/// Build the full report from the five parsed tables.
pub fn build_report(tables: &TableSet) -> AnalyticsReport {
    let summary = summarize(tables);
    let qdi_stats = qdi_stats(&tables.quality_drift);

    debug!(
        districts = summary.total_districts,
        anomalies = summary.anomaly_count,
        "summary computed"
    );

    AnalyticsReport {
        qdi_stats,
        top_anomalies: top_anomalies(&tables.anomaly, TOP_ANOMALIES),
        top_surge: top_surge(&tables.surge, TOP_SURGE),
        state_data: state_rollup(&tables.governance, TOP_STATES),
        monthly_trend: monthly_trend(),
        anomaly_by_state: anomaly_by_state(&tables.anomaly, TOP_ANOMALY_STATES),
        attention_districts: attention_districts(&tables.governance, TOP_ATTENTION),
        policy_briefs: policy_briefs(&summary),
        summary,
    }
}

/// An anomaly row counts as flagged when `is_anomaly` is 1 or -1.
pub fn is_flagged(row: &Row) -> bool {
    row.equals("is_anomaly", 1.0) || row.equals("is_anomaly", -1.0)
}

fn count_where(rows: &[Row], pred: impl Fn(&Row) -> bool) -> usize {
    rows.iter().filter(|&r| pred(r)).count()
}

/// Compute the summary block.
pub fn summarize(tables: &TableSet) -> Summary {
    let governance = &tables.governance;
    let total_districts = governance.len();

    let total_authentications: f64 = governance
        .iter()
        .map(|r| r.number("total_auth_sum"))
        .sum();
    let qdi_sum: f64 = governance.iter().map(|r| r.number("QDI")).sum();
    let avg_qdi = if total_districts == 0 {
        0.0
    } else {
        round2(qdi_sum / total_districts as f64)
    };

    let surge = &tables.surge;
    let qdi = &tables.quality_drift;
    let load = &tables.load;

    Summary {
        total_districts,
        total_authentications,
        anomaly_count: count_where(&tables.anomaly, is_flagged),
        avg_qdi,
        critical_surge: count_where(surge, |r| r.is("surge_level", "Critical")),
        elevated_surge: count_where(surge, |r| r.is("surge_level", "Elevated")),
        normal_surge: count_where(surge, |r| {
            r.is("surge_level", "Normal") || r.is("surge_level", "Low")
        }),
        needs_audit: count_where(qdi, |r| r.equals("needs_audit", 1.0)),
        high_load: count_where(load, |r| r.is("load_status", "High")),
        moderate_load: count_where(load, |r| r.is("load_status", "Moderate")),
        optimal_load: count_where(load, |r| r.is("load_status", "Optimal")),
        critical_priority: count_where(governance, |r| r.is("priority_level", "Critical")),
        high_priority: count_where(governance, |r| r.is("priority_level", "High")),
        medium_priority: count_where(governance, |r| r.is("priority_level", "Medium")),
    }
}

/// Distribution of `qdi_status` over the quality-drift table.
pub fn qdi_stats(rows: &[Row]) -> QdiStats {
    QdiStats {
        critical: count_where(rows, |r| r.is("qdi_status", "Critical")),
        concern: count_where(rows, |r| r.is("qdi_status", "Concern")),
        watch: count_where(rows, |r| r.is("qdi_status", "Watch")),
        good: count_where(rows, |r| r.is("qdi_status", "Good")),
    }
}

/// Rows matching `pred`, stable-sorted descending by `key`, truncated to `n`.
fn top_by<'a>(
    rows: &'a [Row],
    pred: impl Fn(&Row) -> bool,
    key: &str,
    n: usize,
) -> Vec<&'a Row> {
    let mut selected: Vec<&Row> = rows.iter().filter(|&r| pred(r)).collect();
    selected.sort_by(|a, b| b.number(key).total_cmp(&a.number(key)));
    selected.truncate(n);
    selected
}

/// Most severe flagged anomalies.
pub fn top_anomalies(rows: &[Row], n: usize) -> Vec<TopAnomaly> {
    top_by(rows, is_flagged, "anomaly_severity", n)
        .into_iter()
        .map(|r| TopAnomaly {
            state: r.text("state"),
            district: r.text("district"),
            severity: r.number("anomaly_severity"),
            total_auth: r.number("total_auth_sum"),
        })
        .collect()
}

/// Highest-scoring districts at the "Critical" surge level.
pub fn top_surge(rows: &[Row], n: usize) -> Vec<TopSurge> {
    top_by(rows, |r| r.is("surge_level", "Critical"), "surge_score", n)
        .into_iter()
        .map(|r| TopSurge {
            state: r.text("state"),
            district: r.text("district"),
            surge_score: r.number("surge_score"),
            avg_demand: r.number("avg_demand"),
            peak_demand: r.number("peak_demand"),
            growth_rate: r.number("avg_growth_rate"),
        })
        .collect()
}

/// Group governance rows by state, keeping first-seen order before the sort.
///
/// `anomalies` uses truthiness of `is_anomaly`, not the flagged rule used by
/// the summary: a text value or any non-zero number counts here.
pub fn state_rollup(rows: &[Row], n: usize) -> Vec<StateData> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(StateData, f64)> = Vec::new();

    for row in rows {
        let state = row.text("state");
        let slot = *index.entry(state.clone()).or_insert_with(|| {
            groups.push((
                StateData {
                    state,
                    total_auth: 0.0,
                    districts: 0,
                    anomalies: 0,
                    avg_qdi: 0.0,
                    critical_surge: 0,
                },
                0.0,
            ));
            groups.len() - 1
        });

        let (data, qdi_sum) = &mut groups[slot];
        data.total_auth += row.number("total_auth_sum");
        data.districts += 1;
        data.anomalies += usize::from(row.truthy("is_anomaly"));
        data.critical_surge += usize::from(row.is("surge_level", "Critical"));
        *qdi_sum += row.number("QDI");
    }

    let mut states: Vec<StateData> = groups
        .into_iter()
        .map(|(mut data, qdi_sum)| {
            data.avg_qdi = qdi_sum / data.districts as f64;
            data
        })
        .collect();

    states.sort_by(|a, b| b.total_auth.total_cmp(&a.total_auth));
    states.truncate(n);
    states
}

/// Count flagged anomalies per state.
pub fn anomaly_by_state(rows: &[Row], n: usize) -> Vec<AnomalyByState> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for row in rows.iter().filter(|r| is_flagged(r)) {
        let state = row.text("state");
        match index.get(&state) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(state.clone(), counts.len());
                counts.push((state, 1));
            }
        }
    }

    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    counts.truncate(n);

    counts
        .into_iter()
        .map(|(state, count)| AnomalyByState {
            state: state_label(&state),
            count,
        })
        .collect()
}

/// Shorten a state name for chart labels.
pub fn state_label(state: &str) -> String {
    if state.chars().count() > STATE_LABEL_CHARS {
        let head: String = state.chars().take(STATE_LABEL_CHARS).collect();
        format!("{}...", head)
    } else {
        state.to_string()
    }
}

/// Governance rows at "Critical" or "High" priority, most urgent first.
pub fn attention_districts(rows: &[Row], n: usize) -> Vec<AttentionDistrict> {
    top_by(
        rows,
        |r| r.is("priority_level", "Critical") || r.is("priority_level", "High"),
        "priority_score",
        n,
    )
    .into_iter()
    .map(|r| AttentionDistrict {
        state: r.text("state"),
        district: r.text("district"),
        priority_score: r.number("priority_score"),
        priority_level: r.text("priority_level"),
        surge_level: r.text("surge_level"),
        qdi_status: r.text("qdi_status"),
        load_status: r.text("load_status"),
        recommendation: r.text("recommendation"),
    })
    .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
