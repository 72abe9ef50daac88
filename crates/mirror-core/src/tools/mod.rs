//! Capability handlers (tools) and the registry the orchestrator resolves them from.

mod echo;
mod time;

pub use echo::EchoTool;
pub use time::{Clock, FixedClock, SystemClock, TimeTool};

use crate::error::ExecutionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Trait implemented by every capability the orchestrator can run.
///
/// A tool only reads its argument and returns text. It must not touch the registry,
/// the profile store, or other tools.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used for selection and lookup.
    fn name(&self) -> &str;

    /// Human-readable description, shown to the model during selection.
    fn description(&self) -> &str;

    async fn execute(&self, input: &str) -> Result<String, ExecutionError>;
}

/// Name and description of a registered tool, as offered to the selection service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn of(tool: &dyn Tool) -> Self {
        Self::new(tool.name(), tool.description())
    }
}

/// Registry of tools keyed by name.
///
/// Built at startup and read-mostly afterwards; registration takes the write lock so it
/// stays safe if it ever happens under live traffic.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Registry pre-loaded with the built-in `echo` and `time` tools.
    pub fn with_builtin_tools() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(TimeTool::new()));
        registry
    }

    /// Insert or replace the tool under its name. Last registration wins.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let previous = self
            .tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), tool);
        if previous.is_some() {
            tracing::debug!(tool = %name, "tool re-registered, previous handler replaced");
        } else {
            tracing::debug!(tool = %name, "tool registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let found = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        if found.is_none() {
            tracing::debug!(tool = %name, "tool not found");
        }
        found
    }

    /// All registered tools, sorted by name so "first" is stable across runs.
    pub fn list(&self) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    /// Snapshot of descriptors in [`list`](Self::list) order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.list().iter().map(|t| ToolDescriptor::of(t.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, &'static str);

    #[async_trait::async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            self.1
        }
        async fn execute(&self, _input: &str) -> Result<String, ExecutionError> {
            Ok(self.1.to_string())
        }
    }

    #[test]
    fn builtin_tools_are_registered() {
        let registry = ToolRegistry::with_builtin_tools();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("time").is_some());
        assert!(registry.get("weather").is_none());
    }

    #[test]
    fn list_is_sorted_by_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Named("zeta", "z")));
        registry.register(Arc::new(Named("alpha", "a")));
        registry.register(Arc::new(Named("mid", "m")));
        let names: Vec<String> = registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn re_registration_overwrites() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Named("dup", "first")));
        registry.register(Arc::new(Named("dup", "second")));
        assert_eq!(registry.len(), 1);
        let tool = registry.get("dup").unwrap();
        assert_eq!(tool.execute("").await.unwrap(), "second");
        assert_eq!(registry.descriptors()[0].description, "second");
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }
}
