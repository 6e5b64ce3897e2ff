use clap::Parser;
use commands::Commands;
use connectors::MarketClient;
use error::CliError;
use std::sync::Arc;
use tools::ToolRegistry;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod server;

#[derive(Parser)]
#[command(name = "tickerdesk", version, about = "Market data tool server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr; stdout belongs to the JSON-RPC transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = Arc::new(MarketClient::new()?);
    let registry = ToolRegistry::with_defaults(client);

    match cli.command {
        Commands::Serve => server::run(registry).await?,
        Commands::Tools => {
            let json = serde_json::to_string_pretty(&registry.schemas())
                .map_err(CliError::JsonSerialize)?;
            println!("{json}");
        }
        Commands::Call { tool, params } => {
            let params = match params {
                Some(text) => serde_json::from_str(&text)?,
                None => serde_json::json!({}),
            };
            let output = registry.execute(&tool, params).await?;
            println!("{output}");
        }
    }

    Ok(())
}
