use anyhow::Context;
use clap::Parser;
use rca_agent::config::{self, CliArgs, CredentialError, ProviderKind};
use rca_agent::models::{AnthropicBackend, LLMBackend, OpenAiBackend};
use rca_agent::prompt::RCA_SYSTEM_PROMPT;
use rca_agent::tools::{GetSchema, ListTablesInDirectory, QueryParquetFiles};
use rca_agent::transcript::save_transcript;
use rca_agent::Agent;
use std::io::{self, Write};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

fn main() -> anyhow::Result<()> {
    // .env가 없어도 무시
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "rca_agent=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();

    let choice = match config::select_provider(args.provider, args.model.as_deref(), |key| {
        std::env::var(key).ok()
    }) {
        Ok(choice) => choice,
        Err(err @ CredentialError::Placeholder) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
        Err(err) => {
            println!("{}", err);
            return Ok(());
        }
    };

    let backend: Box<dyn LLMBackend> = match choice.kind {
        ProviderKind::Anthropic => Box::new(AnthropicBackend::new(choice.api_key, &choice.model)?),
        ProviderKind::Openai => Box::new(OpenAiBackend::new(choice.api_key, &choice.model)?),
    };
    tracing::info!(provider = ?choice.kind, model = %choice.model, "model backend ready");

    let query_tool = QueryParquetFiles::new()?
        .with_data_dir(&args.data_dir)
        .with_budget(args.budget())
        .with_default_limit(args.row_limit);

    let mut agent = Agent::builder("rca-agent", backend, RCA_SYSTEM_PROMPT)
        .with_tool(ListTablesInDirectory::new().with_data_dir(&args.data_dir))
        .with_tool(GetSchema::new()?.with_data_dir(&args.data_dir))
        .with_tool(query_tool)
        .max_turns(args.max_turns)
        .build();

    match &args.query {
        Some(query) => run_once(&mut agent, query, &args),
        None => run_interactive(&mut agent),
    }
}

fn run_once(agent: &mut Agent, query: &str, args: &CliArgs) -> anyhow::Result<()> {
    println!("🤖 RCA Agent running with query: {}", query);
    println!("Agent is thinking...");

    let response = match agent.chat(query) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            std::process::exit(1);
        }
    };
    println!("\nAgent: {}", response);

    if let Some(output) = &args.output {
        save_transcript(output, agent.history())
            .with_context(|| format!("saving transcript to {}", output.display()))?;
        println!("Output saved to {}", output.display());
    }
    Ok(())
}

fn run_interactive(agent: &mut Agent) -> anyhow::Result<()> {
    println!("🤖 RCA Agent Initialized.");
    println!("You can now ask the agent to analyze your parquet files.");
    println!(
        "Example: 'Analyze the logs in /data/logs to find why the checkout service failed around 10:00 AM.'"
    );

    loop {
        print!("\nUser: ");
        io::stdout().flush()?;

        let mut input = String::new();
        // EOF (Ctrl-D)면 종료
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        println!("\nAgent is thinking...");
        match agent.chat(input) {
            Ok(response) => println!("\nAgent: {}", response),
            Err(e) => println!("An error occurred: {}", e),
        }
    }

    Ok(())
}
