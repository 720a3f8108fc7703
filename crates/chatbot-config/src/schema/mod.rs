//! Configuration schema types for the chatbot.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod model;
mod prompt;
mod server;
mod store;
mod system;
mod window;

pub use model::*;
pub use prompt::*;
pub use server::*;
pub use store::*;
pub use system::*;
pub use window::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Every option has a default matching the stock deployment; only
/// override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ChatbotConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub prompt: PromptConfig,
    pub window: WindowConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}
