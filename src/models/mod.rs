use crate::agent::Message;
use crate::error::Result;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;

/// The core trait that any Model backend must implement.
pub trait LLMBackend {
    /// Generate the next assistant reply for the conversation so far.
    ///
    /// `messages` starts with the system message, followed by alternating
    /// user/assistant turns.
    fn generate(&mut self, messages: &[Message]) -> Result<String>;
}
