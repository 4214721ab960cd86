use crate::decorator::Priority;
use serde::{Deserialize, Serialize};

pub struct ChannelRoute {
    pub min_priority: Priority,
    pub channel_index: usize,
}

impl ChannelRoute {
    pub fn should_send(&self, priority: Priority) -> bool {
        priority >= self.min_priority
    }
}

/// Assigns a priority to alerts whose condition matches a glob pattern
/// (e.g., `"*Hypoxemia*"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityRoute {
    pub pattern: String,
    pub priority: Priority,
}

impl PriorityRoute {
    pub fn matches(&self, condition: &str) -> bool {
        self.pattern == "*" || glob_match::glob_match(&self.pattern, condition)
    }
}

/// First matching route wins; unmatched conditions get [`Priority::Medium`].
pub fn resolve_priority(routes: &[PriorityRoute], condition: &str) -> Priority {
    routes
        .iter()
        .find(|r| r.matches(condition))
        .map(|r| r.priority)
        .unwrap_or(Priority::Medium)
}

/// Built-in priorities for the standard alert conditions.
pub fn default_priority_routes() -> Vec<PriorityRoute> {
    [
        ("*Hypoxemia*", Priority::Critical),
        ("Critical*", Priority::Critical),
        ("Low Saturation*", Priority::High),
        ("*Rapid Drop*", Priority::High),
        ("*Trend Alert", Priority::High),
        ("ECG*", Priority::High),
        ("*has exceeded*", Priority::High),
        ("*has dropped below*", Priority::High),
    ]
    .into_iter()
    .map(|(pattern, priority)| PriorityRoute {
        pattern: pattern.to_string(),
        priority,
    })
    .collect()
}
