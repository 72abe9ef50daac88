//! Extracting the selection list from a free-form model reply.

use super::ToolSelection;
use crate::error::LlmError;
use serde::Deserialize;

#[derive(Deserialize)]
struct RawSelection {
    tool_name: String,
    reason: String,
}

/// Decode the JSON array between the first `[` and the last `]` of `reply`.
///
/// Surrounding prose is ignored. Missing delimiters, invalid JSON, or objects without both
/// `tool_name` and `reason` are parse failures.
pub fn parse_tool_selections(reply: &str) -> Result<Vec<ToolSelection>, LlmError> {
    let start = reply
        .find('[')
        .ok_or_else(|| LlmError::Parse("no JSON array found in reply".to_string()))?;
    let end = reply
        .rfind(']')
        .ok_or_else(|| LlmError::Parse("no JSON array found in reply".to_string()))?;
    if end < start {
        return Err(LlmError::Parse("array delimiters out of order".to_string()));
    }

    let raw: Vec<RawSelection> =
        serde_json::from_str(&reply[start..=end]).map_err(|e| LlmError::Parse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .map(|r| ToolSelection::new(r.tool_name, r.reason))
        .collect())
}
