//! Conversation store settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Live conversations kept in memory; the least recently used is
    /// evicted past this cap.
    pub max_threads: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_threads: 1000 }
    }
}
