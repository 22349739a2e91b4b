pub mod agent;
pub mod config;
pub mod error;
pub mod models;
pub mod prompt;
pub mod query;
pub mod tools;
pub mod transcript;

pub use agent::{Agent, AgentBuilder, Message};
pub use error::{RcaError, Result};
pub use models::LLMBackend;
pub use query::{QueryFailure, TokenBudget};
