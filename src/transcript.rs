use crate::agent::Message;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Writes the conversation as pretty JSON, creating parent directories as needed.
pub fn save_transcript(path: &Path, messages: &[Message]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(messages)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), messages = messages.len(), "transcript saved");
    Ok(())
}
