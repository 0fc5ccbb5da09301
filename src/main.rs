//! Cellmate - signed relay and conversation client for a local Ollama daemon
//!
//! One binary, two modes:
//! - `cellmate --serve` runs the inference relay in front of the daemon
//! - `cellmate` runs the interactive conversation client against a relay

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use cellmate::client::RelayClient;
use cellmate::config::{FileConfig, Settings};
use cellmate::transcript::TranscriptStore;
use cellmate::{relay, repl, scenario, secret, session};

#[derive(Parser)]
#[command(name = "cellmate")]
#[command(about = "Signed relay and conversation client for a local Ollama daemon")]
struct Args {
    /// Run as the inference relay instead of the conversation client
    #[arg(long)]
    serve: bool,

    /// Relay bind port (serve mode)
    #[arg(long, env = "CELLMATE_PORT")]
    port: Option<u16>,

    /// Relay bind host (serve mode)
    #[arg(long, env = "CELLMATE_HOST")]
    host: Option<String>,

    /// Relay URL the client talks to
    #[arg(long, env = "CELLMATE_RELAY_URL")]
    relay_url: Option<String>,

    /// Ollama daemon URL the relay forwards to
    #[arg(long, env = "CELLMATE_OLLAMA_URL")]
    ollama_url: Option<String>,

    /// Model requested by the client
    #[arg(long, env = "CELLMATE_MODEL")]
    model: Option<String>,

    /// Shared-secret file path
    #[arg(long, env = "CELLMATE_SECRET_FILE")]
    secret_file: Option<PathBuf>,

    /// Transcript file path
    #[arg(long, env = "CELLMATE_TRANSCRIPT")]
    transcript: Option<PathBuf>,

    /// Outbound request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.cellmate/.env or current dir)
    let env_path = dirs::home_dir()
        .map(|h| h.join(".cellmate").join(".env"))
        .filter(|p| p.exists());
    if let Some(path) = env_path {
        let _ = dotenvy::from_path(&path);
    } else {
        let _ = dotenvy::dotenv();
    }

    // Initialize logging
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    // Resolve values: CLI args > env vars (handled by clap) > config file > defaults
    let mut settings = Settings::from_file(FileConfig::load());
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(relay_url) = args.relay_url {
        settings.relay_url = relay_url;
    }
    if let Some(ollama_url) = args.ollama_url {
        settings.ollama_url = ollama_url;
    }
    if let Some(model) = args.model {
        settings.model = model;
    }
    if let Some(secret_file) = args.secret_file {
        settings.secret_file = secret_file;
    }
    if let Some(transcript) = args.transcript {
        settings.transcript = transcript;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }

    println!();
    println!("  Cellmate {}", env!("CARGO_PKG_VERSION"));
    println!("{}", "-".repeat(50));

    if args.serve {
        println!("Mode        relay");
        println!("Bind        {}", settings.bind_address());
        println!("Daemon      {}", settings.ollama_url);
        println!("Fallback    {}", settings.default_model);
        println!("{}", "-".repeat(50));
        println!();

        relay::run(&settings).await
    } else {
        println!("Mode        chat");
        println!("Relay       {}", settings.relay_url);
        println!("Model       {}", settings.model);
        println!("Transcript  {}", settings.transcript.display());
        println!("{}", "-".repeat(50));
        println!();

        let shared_secret = secret::load_or_prompt(&settings.secret_file)?;

        let client = RelayClient::new(
            settings.relay_url.clone(),
            settings.model.clone(),
            shared_secret,
            Duration::from_secs(settings.timeout_secs),
        );
        let store = TranscriptStore::new(settings.transcript.clone());
        let session = session::Session::new(store, client, scenario::default_system_prompt());

        repl::run(session).await
    }
}
