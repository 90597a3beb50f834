//! Command-line client for the agent chat backend.

mod commands;

use std::sync::Arc;

use agent_chat_stream::{ChatClientConfig, HttpTransport, LocationContext, init_observability};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agent-chat", version, about = "Stream replies from the agent chat backend")]
struct Cli {
    /// Backend root URL (overrides AGENT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the backend and its agent are ready
    Health,
    /// Send one message and stream the reply to stdout
    Ask {
        message: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Chat interactively; Ctrl-C stops the current reply, /quit exits
    Chat {
        #[command(flatten)]
        location: LocationArgs,
    },
}

/// Location context forwarded with every message.
#[derive(Args)]
struct LocationArgs {
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// IANA timezone, e.g. America/New_York
    #[arg(long)]
    timezone: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,
}

impl LocationArgs {
    fn into_context(self) -> Option<LocationContext> {
        let location = LocationContext {
            city: self.city,
            state: self.state,
            country: self.country,
            timezone: self.timezone,
            latitude: self.latitude,
            longitude: self.longitude,
        };
        (!location.is_empty()).then_some(location)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_observability();
    let cli = Cli::parse();

    let mut config = ChatClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    let transport = Arc::new(HttpTransport::new(config)?);

    match cli.command {
        Command::Health => commands::health(&transport).await,
        Command::Ask { message, location } => {
            commands::ask(transport, message, location.into_context()).await
        }
        Command::Chat { location } => commands::chat(transport, location.into_context()).await,
    }
}
