use super::Tool;
use crate::error::ExecutionError;

/// Returns the input with a fixed `Echo: ` prefix. Never fails.
pub struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes back the input with a prefix. Useful for testing and simple responses."
    }

    async fn execute(&self, input: &str) -> Result<String, ExecutionError> {
        tracing::debug!(input_len = input.len(), "echo tool executing");
        Ok(format!("Echo: {}", input))
    }
}
