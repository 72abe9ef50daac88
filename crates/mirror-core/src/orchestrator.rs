//! Request pipeline: discover tools, select, execute each selection, aggregate, record.
//!
//! ```text
//! START -> DISCOVER_TOOLS -> SELECT_TOOLS -> (EXECUTE_TOOL)* -> AGGREGATE -> UPDATE_PROFILE -> DONE
//! ```
//!
//! Only a malformed descriptor set aborts a request. Tool failures are isolated per
//! selection, and a profile write failure is reported in telemetry, not to the caller.

use crate::error::OrchestratorError;
use crate::profile::ProfileStore;
use crate::selection::{SelectionService, ToolSelection};
use crate::tools::{Tool, ToolDescriptor, ToolRegistry};
use crate::types::{
    ExecutionStatus, ProcessMetadata, ProcessResponse, ProcessResult, ProcessingDetails,
    ProfileUpdate, SelectionSummary, ToolExecutionRecord,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const TOOL_NOT_FOUND: &str = "tool not found";
const PROFILE_CHANGE: &str = "Added user input to profile";

/// Coordinates registry, selection service and profile store for each request.
///
/// Cheap to share: every component sits behind an `Arc`.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    profile: Arc<dyn ProfileStore>,
    selection: Arc<SelectionService>,
    environment: String,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ToolRegistry>,
        profile: Arc<dyn ProfileStore>,
        selection: Arc<SelectionService>,
    ) -> Self {
        Self {
            registry,
            profile,
            selection,
            environment: "development".to_string(),
        }
    }

    /// Environment label reported in response metadata.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn profile(&self) -> &Arc<dyn ProfileStore> {
        &self.profile
    }

    pub fn llm_available(&self) -> bool {
        self.selection.llm_available()
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Run the pipeline and return only the final response text.
    pub async fn process(&self, input: &str) -> Result<String, OrchestratorError> {
        let response = self.process_detailed(input).await?;
        Ok(response.result.final_response)
    }

    /// Run the pipeline and return the response with full telemetry.
    pub async fn process_detailed(&self, input: &str) -> Result<ProcessResponse, OrchestratorError> {
        let started = Instant::now();
        tracing::info!(input_len = input.len(), "processing input");

        // One snapshot serves selection and execution alike.
        let listed = self.registry.list();
        let tools: Vec<ToolDescriptor> = listed.iter().map(|t| ToolDescriptor::of(t.as_ref())).collect();
        let snapshot: HashMap<&str, &Arc<dyn Tool>> = listed.iter().map(|t| (t.name(), t)).collect();
        tracing::debug!(tools = tools.len(), "discovered tools");

        let select_started = Instant::now();
        let outcome = self.selection.select(input, &tools).await.map_err(|e| {
            tracing::error!(error = %e, "tool selection failed");
            OrchestratorError::from(e)
        })?;
        let selection = SelectionSummary {
            tools_considered: tools.len(),
            tools_selected: outcome.selections.clone(),
            duration: select_started.elapsed(),
            used_fallback: outcome.used_fallback,
        };

        let mut tool_executions = Vec::with_capacity(outcome.selections.len());
        let mut outputs = Vec::new();
        for sel in &outcome.selections {
            let record = execute_selection(&snapshot, sel, input).await;
            if record.is_success() {
                outputs.push(format!("{}: {}", record.tool_name, record.output));
            }
            tool_executions.push(record);
        }

        let final_response = aggregate(input, &outputs);
        let profile_update = self.update_profile(input).await;
        let tools_executed = tool_executions.iter().filter(|r| r.is_success()).count();
        let total_duration = started.elapsed();

        tracing::info!(
            tools_executed,
            used_fallback = selection.used_fallback,
            elapsed_ms = total_duration.as_millis() as u64,
            "input processed"
        );

        Ok(ProcessResponse {
            input: input.to_string(),
            result: ProcessResult {
                final_response,
                processing_details: ProcessingDetails {
                    selection,
                    tool_executions,
                    profile_update,
                },
                metadata: ProcessMetadata {
                    total_duration,
                    timestamp: Utc::now(),
                    tools_executed,
                    llm_calls_made: 1,
                    environment: self.environment.clone(),
                },
            },
        })
    }

    async fn update_profile(&self, input: &str) -> ProfileUpdate {
        let started = Instant::now();
        match self.profile.append(input).await {
            Ok(write) => ProfileUpdate {
                changes_made: PROFILE_CHANGE.to_string(),
                profile_length_before: write.length_before,
                profile_length_after: write.length_after,
                duration: started.elapsed(),
                success: true,
            },
            Err(e) => {
                tracing::warn!(error = %e, "profile update failed");
                // Nothing was written, so the last readable length stands for both sides.
                let length = self.profile.read().await.map(|p| p.len()).unwrap_or(0);
                ProfileUpdate {
                    changes_made: String::new(),
                    profile_length_before: length,
                    profile_length_after: length,
                    duration: started.elapsed(),
                    success: false,
                }
            }
        }
    }
}

async fn execute_selection(
    snapshot: &HashMap<&str, &Arc<dyn Tool>>,
    sel: &ToolSelection,
    input: &str,
) -> ToolExecutionRecord {
    let started = Instant::now();
    let Some(tool) = snapshot.get(sel.tool_name.as_str()) else {
        tracing::warn!(tool = %sel.tool_name, "selected tool not registered, skipping");
        return record(sel, input, String::new(), started.elapsed(), ExecutionStatus::Skipped, Some(TOOL_NOT_FOUND.to_string()));
    };

    tracing::debug!(tool = %sel.tool_name, reason = %sel.reason, "executing tool");
    match tool.execute(input).await {
        Ok(output) => {
            let elapsed = started.elapsed();
            tracing::debug!(tool = %sel.tool_name, elapsed_ms = elapsed.as_millis() as u64, "tool succeeded");
            record(sel, input, output, elapsed, ExecutionStatus::Success, None)
        }
        Err(e) => {
            tracing::warn!(tool = %sel.tool_name, error = %e, "tool execution failed");
            record(sel, input, String::new(), started.elapsed(), ExecutionStatus::Error, Some(e.message))
        }
    }
}

fn record(
    sel: &ToolSelection,
    input: &str,
    output: String,
    duration: Duration,
    status: ExecutionStatus,
    error: Option<String>,
) -> ToolExecutionRecord {
    ToolExecutionRecord {
        tool_name: sel.tool_name.clone(),
        input: input.to_string(),
        output,
        duration,
        status,
        error,
    }
}

/// Combine successful `"<tool>: <output>"` lines into the final response.
pub fn aggregate(input: &str, outputs: &[String]) -> String {
    match outputs {
        [] => format!("Acknowledged: {}", input),
        [only] => format!("Processed with 1 tools: {}", only),
        many => format!("Processed with {} tools: [{}]", many.len(), many.join("; ")),
    }
}
