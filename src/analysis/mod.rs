//! Analytics aggregation.
//!
//! Turns the five parsed tables into the consolidated report.

pub mod aggregator;
pub mod briefs;
pub mod fixtures;

pub use aggregator::*;
pub use briefs::{demand_stress_percent, policy_briefs};
pub use fixtures::{model_fixtures, monthly_trend};
