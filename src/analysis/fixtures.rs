//! Presentation fixtures.
//!
//! These series are static placeholders shown next to the computed report.
//! They are not derived from the input tables.

use crate::models::{FeatureImportance, ModelFixtures, ModelPerformance, MonthlyTrend};

const MONTHLY_TREND: [(&str, u64, u64); 10] = [
    ("Mar", 280_000, 275_000),
    ("Apr", 320_000, 315_000),
    ("May", 380_000, 370_000),
    ("Jun", 420_000, 410_000),
    ("Jul", 480_000, 465_000),
    ("Aug", 520_000, 510_000),
    ("Sep", 580_000, 570_000),
    ("Oct", 640_000, 625_000),
    ("Nov", 700_000, 690_000),
    ("Dec", 750_000, 745_000),
];

// (name, accuracy, precision, recall, f1)
const MODEL_PERFORMANCE: [(&str, f64, f64, f64, f64); 3] = [
    ("Isolation Forest", 94.7, 92.3, 96.1, 94.2),
    ("XGBoost Regressor", 97.9, 95.8, 98.2, 97.0),
    ("QDI Calculator", 89.5, 88.2, 91.0, 89.6),
];

const FEATURE_IMPORTANCE: [(&str, f64); 6] = [
    ("Rolling Mean (7-day)", 0.342),
    ("Rolling Mean (14-day)", 0.289),
    ("Total Auth Requests", 0.156),
    ("District Load Index", 0.098),
    ("Peak Hour Volume", 0.067),
    ("Day of Week", 0.048),
];

/// The fixed ten-month demand series.
pub fn monthly_trend() -> Vec<MonthlyTrend> {
    MONTHLY_TREND
        .iter()
        .map(|&(month, demand, predicted)| MonthlyTrend {
            month: month.to_string(),
            demand,
            predicted,
        })
        .collect()
}

/// Model scores and feature weights for the analytics page.
pub fn model_fixtures() -> ModelFixtures {
    ModelFixtures {
        model_performance: MODEL_PERFORMANCE
            .iter()
            .map(|&(name, accuracy, precision, recall, f1)| ModelPerformance {
                name: name.to_string(),
                accuracy,
                precision,
                recall,
                f1,
            })
            .collect(),
        feature_importance: FEATURE_IMPORTANCE
            .iter()
            .map(|&(feature, importance)| FeatureImportance {
                feature: feature.to_string(),
                importance,
            })
            .collect(),
    }
}
