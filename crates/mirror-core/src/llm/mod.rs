//! External model access. The selection service talks to the model only through [`LlmClient`].

mod anthropic;

pub use anthropic::AnthropicClient;

use crate::error::LlmError;

/// One prompt in, one text reply out. Single attempt; no retry at this layer.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Shortens long prompts and replies for log lines.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}
