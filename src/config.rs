use crate::agent::DEFAULT_MAX_TURNS;
use crate::models::{anthropic, openai};
use crate::query::{DEFAULT_ROW_LIMIT, TokenBudget, budget::DEFAULT_TOKEN_LIMIT};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
const ANTHROPIC_KEY_PLACEHOLDER: &str = "sk-ant-xxxx";

#[derive(Parser, Debug, Clone)]
#[command(name = "rca-agent", version, about = "Root cause analysis agent over parquet telemetry.")]
pub struct CliArgs {
    /// Initial query to start the agent; omit for interactive mode
    #[arg(long)]
    pub query: Option<String>,

    /// Path to save the conversation as JSON (with --query)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Directory relative file paths are resolved against
    #[arg(long, env = "RCA_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    #[arg(long, env = "RCA_PROVIDER", value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long, env = "RCA_MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "RCA_MAX_TURNS", default_value_t = DEFAULT_MAX_TURNS)]
    pub max_turns: usize,

    /// Default row cap for query_parquet_files
    #[arg(long, env = "RCA_ROW_LIMIT", default_value_t = DEFAULT_ROW_LIMIT)]
    pub row_limit: usize,

    /// Estimated-token budget for a single tool result
    #[arg(long, env = "RCA_TOKEN_LIMIT", default_value_t = DEFAULT_TOKEN_LIMIT)]
    pub token_limit: usize,
}

impl CliArgs {
    pub fn budget(&self) -> TokenBudget {
        TokenBudget::new(self.token_limit)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    Openai,
}

impl ProviderKind {
    fn key_var(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => ANTHROPIC_KEY_VAR,
            ProviderKind::Openai => OPENAI_KEY_VAR,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => anthropic::DEFAULT_MODEL,
            ProviderKind::Openai => openai::DEFAULT_MODEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderChoice {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error(
        "ANTHROPIC_API_KEY is still the default placeholder.\nPlease edit the .env file and add your actual API key."
    )]
    Placeholder,

    #[error("Please set ANTHROPIC_API_KEY or OPENAI_API_KEY environment variable.")]
    Missing,

    #[error("{0} is not set for the requested provider.")]
    MissingFor(&'static str),
}

/// Picks the model provider from the available credentials.
///
/// Anthropic wins when its key is present, unless a provider is requested
/// explicitly. `lookup` abstracts the environment for testing.
pub fn select_provider(
    requested: Option<ProviderKind>,
    model: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ProviderChoice, CredentialError> {
    let anthropic_key = lookup(ANTHROPIC_KEY_VAR).filter(|k| !k.trim().is_empty());
    if anthropic_key.as_deref() == Some(ANTHROPIC_KEY_PLACEHOLDER) {
        return Err(CredentialError::Placeholder);
    }
    let openai_key = lookup(OPENAI_KEY_VAR).filter(|k| !k.trim().is_empty());

    if anthropic_key.is_none() && openai_key.is_none() {
        return Err(CredentialError::Missing);
    }

    let kind = requested.unwrap_or(if anthropic_key.is_some() {
        ProviderKind::Anthropic
    } else {
        ProviderKind::Openai
    });

    let api_key = match kind {
        ProviderKind::Anthropic => anthropic_key,
        ProviderKind::Openai => openai_key,
    }
    .ok_or(CredentialError::MissingFor(kind.key_var()))?;

    Ok(ProviderChoice {
        kind,
        api_key,
        model: model.unwrap_or(kind.default_model()).to_string(),
    })
}
