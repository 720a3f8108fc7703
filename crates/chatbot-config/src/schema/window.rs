//! History window (trimming) settings.

use serde::{Deserialize, Serialize};

/// Role a trimmed window has to start on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StartOn {
    #[default]
    User,
    Assistant,
    /// No alignment; the window may start on any turn.
    Any,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Token budget for the history sent with each invocation.
    pub max_tokens: u32,
    /// Keep a leading system turn of the history when trimming.
    ///
    /// The engine renders the system instruction on every invocation and
    /// never stores it, so stored histories have no system turn and this has
    /// no effect there. It only matters to callers that trim histories which
    /// carry their own system turn.
    pub include_system: bool,
    pub allow_partial: bool,
    pub start_on: StartOn,
    /// Characters per token for the approximate counter.
    pub chars_per_token: u32,
    /// Fixed cost charged per turn for role framing.
    pub message_overhead: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_tokens: 65,
            include_system: true,
            allow_partial: false,
            start_on: StartOn::User,
            chars_per_token: 4,
            message_overhead: 3,
        }
    }
}
