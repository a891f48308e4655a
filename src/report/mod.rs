//! Report output.

pub mod generator;

pub use generator::{format_number, generate_json_report, generate_markdown_report};
