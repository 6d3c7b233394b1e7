//! Processing history: one entry per function applied to a data set

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provenance record of a processing step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier for this entry
    pub id: Uuid,
    /// Name of the function that produced the data, e.g. `proc_variance`
    pub operation: String,
    /// Parameters the function was called with
    pub parameters: serde_json::Value,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl HistoryEntry {
    pub fn new(operation: &str, parameters: serde_json::Value) -> Self {
        HistoryEntry {
            id: Uuid::new_v4(),
            operation: operation.to_string(),
            parameters,
            timestamp_ms: now_millis(),
        }
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
