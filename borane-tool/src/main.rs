mod chat;
mod config;
mod error;
mod models;

#[cfg(test)]
#[path = "../../borane-openrouter/tests/common/mod.rs"]
mod test_server;

use std::io;

use borane_openrouter::{GenerationParams, OpenRouterClient};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::chat::ChatSession;
use crate::config::{
    MODEL_ENV, client_config, load_api_key, load_config, load_env_file, resolve_model,
};

#[derive(Parser)]
#[command(name = "bor", version)]
#[command(about = "Chat with LLMs through OpenRouter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with a model: one reply for PROMPT, or an interactive session without it
    Chat {
        /// Prompt for a single turn
        prompt: Vec<String>,

        /// Model to use (overrides OPENROUTER_MODEL and the config file)
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt to start the conversation with
        #[arg(long)]
        system: Option<String>,

        #[arg(long, default_value_t = 0.7)]
        temperature: f32,

        #[arg(long, default_value_t = 4096)]
        max_tokens: u32,
    },

    /// List available models
    Models {
        /// Only show model ids containing this text
        #[arg(long)]
        filter: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    load_env_file();
    let config = load_config()?;
    let api_key = load_api_key(&config)?;
    let client = OpenRouterClient::with_config(api_key, client_config(&config))?;
    debug!(
        base_url = %client.config().base_url,
        timeout = ?client.config().timeout,
        "Client ready"
    );

    match cli.command {
        Command::Chat {
            prompt,
            model,
            system,
            temperature,
            max_tokens,
        } => {
            let model = resolve_model(model, std::env::var(MODEL_ENV).ok(), &config);
            let params = GenerationParams {
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
                ..Default::default()
            };

            let mut session = ChatSession::new(client, model, params);
            if let Some(system) = system {
                session = session.with_system_prompt(system);
            }

            let mut out = io::stdout();
            if prompt.is_empty() {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                chat::run_interactive(&mut session, stdin, &mut out, chat::ctrl_c).await?;
            } else {
                chat::run_once(&mut session, &prompt.join(" "), &mut out).await?;
            }
        }
        Command::Models { filter } => {
            models::run(&client, filter.as_deref(), &mut io::stdout()).await?;
        }
    }

    Ok(())
}
