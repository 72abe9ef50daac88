//! User profile: an append-only text log of everything the user has said.
//!
//! The profile is the only state shared across concurrent requests. Reads may run in
//! parallel; an append excludes everyone else, and the before/after lengths it reports
//! are taken under that same write guard.

use crate::error::StoreError;
use tokio::sync::RwLock;

pub const PROFILE_HEADER: &str = "User Profile\n===========\n\n";

/// Format of one profile line for a processed input.
pub fn format_entry(entry: &str) -> String {
    format!("• {}\n", entry)
}

/// Byte lengths of the profile around a single append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileWrite {
    pub length_before: usize,
    pub length_after: usize,
}

/// Storage contract for the profile. Only the orchestrator writes to it.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    async fn read(&self) -> Result<String, StoreError>;

    /// Append one bullet line and report the lengths measured atomically with the write.
    async fn append(&self, entry: &str) -> Result<ProfileWrite, StoreError>;
}

/// Process-lifetime in-memory profile.
pub struct InMemoryProfile {
    text: RwLock<String>,
}

impl InMemoryProfile {
    pub fn new() -> Self {
        Self {
            text: RwLock::new(PROFILE_HEADER.to_string()),
        }
    }
}

impl Default for InMemoryProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfile {
    async fn read(&self) -> Result<String, StoreError> {
        let text = self.text.read().await;
        tracing::debug!(profile_length = text.len(), "profile read");
        Ok(text.clone())
    }

    async fn append(&self, entry: &str) -> Result<ProfileWrite, StoreError> {
        let mut text = self.text.write().await;
        let length_before = text.len();
        text.push_str(&format_entry(entry));
        let length_after = text.len();
        tracing::debug!(length_before, length_after, "profile entry appended");
        Ok(ProfileWrite {
            length_before,
            length_after,
        })
    }
}
