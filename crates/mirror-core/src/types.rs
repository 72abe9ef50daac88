//! Per-request result model: the final response plus telemetry on every stage.
//!
//! Durations serialize as human-readable strings (`"1.2ms"`), timestamps as RFC 3339 UTC.

use crate::selection::ToolSelection;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

fn duration_str<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:?}", d))
}

/// Envelope returned by the detailed processing surface.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub input: String,
    pub result: ProcessResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub final_response: String,
    pub processing_details: ProcessingDetails,
    pub metadata: ProcessMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingDetails {
    pub selection: SelectionSummary,
    pub tool_executions: Vec<ToolExecutionRecord>,
    pub profile_update: ProfileUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionSummary {
    /// Number of registered tools offered to selection.
    pub tools_considered: usize,
    pub tools_selected: Vec<ToolSelection>,
    #[serde(serialize_with = "duration_str")]
    pub duration: Duration,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
    /// Selected tool is not registered.
    Skipped,
}

/// Outcome of one selection. Exactly one record exists per selection, in selection order.
#[derive(Debug, Clone, Serialize)]
pub struct ToolExecutionRecord {
    pub tool_name: String,
    pub input: String,
    pub output: String,
    #[serde(serialize_with = "duration_str")]
    pub duration: Duration,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolExecutionRecord {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub changes_made: String,
    pub profile_length_before: usize,
    pub profile_length_after: usize,
    #[serde(serialize_with = "duration_str")]
    pub duration: Duration,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetadata {
    #[serde(serialize_with = "duration_str")]
    pub total_duration: Duration,
    pub timestamp: DateTime<Utc>,
    /// Number of selections that ran successfully.
    pub tools_executed: usize,
    pub llm_calls_made: u32,
    pub environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_wire_shape() {
        let rec = ToolExecutionRecord {
            tool_name: "missing".into(),
            input: "hi".into(),
            output: String::new(),
            duration: Duration::from_micros(1500),
            status: ExecutionStatus::Skipped,
            error: Some("tool not found".into()),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["status"], "skipped");
        assert_eq!(v["duration"], "1.5ms");
        assert_eq!(v["error"], "tool not found");

        let ok = ToolExecutionRecord {
            status: ExecutionStatus::Success,
            error: None,
            ..rec
        };
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["status"], "success");
        assert!(v.get("error").is_none());
    }
}
