//! Prompt template for model-driven tool selection.

use crate::tools::ToolDescriptor;

/// Placeholders: `{user_input}`, `{tools_json}`, `{max_tools}`.
pub const TOOL_SELECTION_TEMPLATE: &str = r#"Given this user input: "{user_input}"

Select the most appropriate tools from this list:
{tools_json}

Return a JSON array of tool selections with this format:
[
  {
    "tool_name": "tool_name",
    "reason": "explanation for why this tool was selected"
  }
]

IMPORTANT:
- You can select 0-{max_tools} tools based on what's most appropriate
- If no tools are suitable for this input, return an empty array: []
- Only select tools that would genuinely help process this specific input
- Don't force a selection if none of the tools are relevant"#;

/// Build the selection prompt with the full descriptor set serialized as JSON.
pub fn tool_selection_prompt(user_input: &str, tools: &[ToolDescriptor], max_tools: usize) -> String {
    let tools_json = serde_json::to_string_pretty(tools).unwrap_or_else(|_| "[]".to_string());
    let max_tools = max_tools.to_string();
    render(
        TOOL_SELECTION_TEMPLATE,
        &[
            ("{user_input}", user_input),
            ("{tools_json}", &tools_json),
            ("{max_tools}", &max_tools),
        ],
    )
}

/// Single left-to-right pass over `template`. Substituted text is never rescanned, so
/// braces inside user input or descriptions come through verbatim.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match vars.iter().find(|(key, _)| tail.starts_with(*key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
