//! JSON output for reports.
//!
//! Serializes the Report for scripting and piping.

use super::Report;

pub fn render(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
