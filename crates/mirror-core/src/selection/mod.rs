//! Selection service: decide which tools should act on an input.
//!
//! With a model client configured, the model is asked once; any failure of that call or of
//! parsing its reply drops to the deterministic fallback. Without a client, the fallback is
//! the only strategy. Model errors never leave this module.

mod parse;
mod prompt;

pub use parse::parse_tool_selections;
pub use prompt::{tool_selection_prompt, TOOL_SELECTION_TEMPLATE};

use crate::config::MirrorConfig;
use crate::error::{LlmError, SelectionError};
use crate::llm::{AnthropicClient, LlmClient};
use crate::tools::ToolDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub const FALLBACK_REASON: &str = "Fallback selection - first available tool";
pub const DEFAULT_MAX_SELECTIONS: usize = 3;

/// A tool chosen for an input, with the rationale for choosing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSelection {
    pub tool_name: String,
    pub reason: String,
}

impl ToolSelection {
    pub fn new(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            reason: reason.into(),
        }
    }
}

/// Selections plus which strategy produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub selections: Vec<ToolSelection>,
    pub used_fallback: bool,
}

/// Deterministic policy: the first descriptor, or nothing when there are none.
pub fn fallback_selection(descriptors: &[ToolDescriptor]) -> Vec<ToolSelection> {
    match descriptors.first() {
        Some(first) => {
            tracing::debug!(tool = %first.name, "fallback selected first available tool");
            vec![ToolSelection::new(first.name.clone(), FALLBACK_REASON)]
        }
        None => {
            tracing::debug!("no tools available for fallback");
            Vec::new()
        }
    }
}

pub struct SelectionService {
    client: Option<Arc<dyn LlmClient>>,
    max_selections: usize,
}

impl SelectionService {
    pub fn new(client: Option<Arc<dyn LlmClient>>) -> Self {
        Self {
            client,
            max_selections: DEFAULT_MAX_SELECTIONS,
        }
    }

    /// No model configured: every request uses the fallback policy.
    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn from_config(cfg: &MirrorConfig) -> Self {
        let client = AnthropicClient::from_config(cfg).map(|c| Arc::new(c) as Arc<dyn LlmClient>);
        if client.is_some() {
            tracing::info!(model = %cfg.llm_model, "LLM tool selection enabled");
        } else {
            tracing::warn!("no LLM credential configured, tool selection runs in fallback mode");
        }
        Self::new(client).with_max_selections(cfg.max_selections)
    }

    pub fn with_max_selections(mut self, max: usize) -> Self {
        self.max_selections = max;
        self
    }

    pub fn llm_available(&self) -> bool {
        self.client.is_some()
    }

    /// Choose tools for `input` from `descriptors`, in the order they should run.
    ///
    /// Fails only when the descriptor set itself is malformed.
    pub async fn select(
        &self,
        input: &str,
        descriptors: &[ToolDescriptor],
    ) -> Result<SelectionOutcome, SelectionError> {
        validate_descriptors(descriptors)?;

        if descriptors.is_empty() {
            return Ok(SelectionOutcome {
                selections: Vec::new(),
                used_fallback: self.client.is_none(),
            });
        }

        let Some(client) = self.client.as_ref() else {
            return Ok(self.fallback(descriptors));
        };

        tracing::debug!(tools = descriptors.len(), "asking model to select tools");
        match self.select_with_model(client.as_ref(), input, descriptors).await {
            Ok(selections) => {
                if selections.is_empty() {
                    tracing::info!("model decided no tools are needed");
                }
                for (i, sel) in selections.iter().enumerate() {
                    tracing::info!(rank = i + 1, tool = %sel.tool_name, reason = %sel.reason, "model selected tool");
                }
                Ok(SelectionOutcome {
                    selections,
                    used_fallback: false,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "model tool selection failed, falling back");
                Ok(self.fallback(descriptors))
            }
        }
    }

    async fn select_with_model(
        &self,
        client: &dyn LlmClient,
        input: &str,
        descriptors: &[ToolDescriptor],
    ) -> Result<Vec<ToolSelection>, LlmError> {
        let prompt = tool_selection_prompt(input, descriptors, self.max_selections);
        let reply = client.complete(&prompt).await?;
        let mut selections = parse_tool_selections(&reply)?;
        if selections.len() > self.max_selections {
            tracing::warn!(
                selected = selections.len(),
                cap = self.max_selections,
                "model selected too many tools, truncating"
            );
            selections.truncate(self.max_selections);
        }
        Ok(selections)
    }

    fn fallback(&self, descriptors: &[ToolDescriptor]) -> SelectionOutcome {
        SelectionOutcome {
            selections: fallback_selection(descriptors),
            used_fallback: true,
        }
    }
}

fn validate_descriptors(descriptors: &[ToolDescriptor]) -> Result<(), SelectionError> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    for (i, d) in descriptors.iter().enumerate() {
        if d.name.trim().is_empty() {
            return Err(SelectionError::EmptyToolName(i));
        }
        if !seen.insert(d.name.as_str()) {
            return Err(SelectionError::DuplicateTool(d.name.clone()));
        }
    }
    Ok(())
}
