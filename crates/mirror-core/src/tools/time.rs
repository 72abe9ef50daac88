//! Wall-clock tool. The one place ambient time enters the pipeline, so the clock is injectable.

use super::Tool;
use crate::error::ExecutionError;
use chrono::{DateTime, FixedOffset, Local};
use std::sync::Arc;

/// Human-readable pattern, e.g. `Monday, January 2, 2006 at 3:04 PM +00:00`.
const TIME_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M %p %Z";

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local wall time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Ignores its input and reports the current date and time.
pub struct TimeTool {
    clock: Arc<dyn Clock>,
}

impl TimeTool {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for TimeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "Returns the current date and time. Useful when user asks about time, scheduling, or needs temporal context."
    }

    async fn execute(&self, _input: &str) -> Result<String, ExecutionError> {
        let formatted = self.clock.now().format(TIME_FORMAT);
        Ok(format!("Current time: {}", formatted))
    }
}
