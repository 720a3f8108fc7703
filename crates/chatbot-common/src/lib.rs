pub mod dotenv;
pub mod errors;
pub mod id;

pub use dotenv::load_dotenv;
pub use errors::{ChatbotError, ConfigError};
pub use id::{new_correlation_id, new_id, DEFAULT_THREAD_ID};

pub type Result<T> = std::result::Result<T, ChatbotError>;
