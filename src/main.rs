//! `forum-client` command line.
//!
//! Issues one call against the forum backend and prints the normalized
//! response. When the backend is down the answer comes from the local data
//! source and a single degraded-mode warning is logged.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use forum_client::auth::MemoryCredentialStore;
use forum_client::config::{self, ClientConfig};
use forum_client::observability::{logging, metrics};
use forum_client::{ApiClient, FormData, RequestDescriptor};

#[derive(Parser)]
#[command(name = "forum-client")]
#[command(about = "Resilient client for the campus forum API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and FORUM_BACKEND_API)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Bearer token to attach to every request
    #[arg(short, long)]
    token: Option<String>,

    /// Serve post creation from the local data source during outages
    #[arg(long)]
    offline_writes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET an arbitrary path
    Get {
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long, value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
    /// POST an arbitrary path
    Post {
        path: String,
        /// JSON body
        #[arg(long, conflicts_with = "form")]
        json: Option<String>,
        /// Multipart text field as key=value (repeatable)
        #[arg(long, value_parser = parse_pair)]
        form: Vec<(String, String)>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List the post feed
    Feed,
    /// List event posts
    Events,
    /// Show trending hashtags
    Trending,
    /// Show suggested users
    Suggestions,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default()?,
    };
    apply_flags(&mut config, &cli);

    logging::init_logging(&config.observability);
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::debug!(
        base_url = %config.api.base_url,
        fallback = config.fallback.enabled,
        substitute_writes = config.fallback.substitute_writes,
        "Configuration loaded"
    );

    let mut builder = ApiClient::builder(config);
    if let Some(token) = &cli.token {
        builder = builder.credentials(Arc::new(MemoryCredentialStore::with_token(token.clone())));
    }
    let client = builder.build()?;

    let request = match cli.command {
        Commands::Get { path, query } => RequestDescriptor::get(path).with_query(query),
        Commands::Post { path, json, form } => {
            let request = RequestDescriptor::post(path);
            if !form.is_empty() {
                let form = form
                    .into_iter()
                    .fold(FormData::new(), |form, (k, v)| form.text(k, v));
                request.with_form(form)
            } else {
                let body: Value = match json {
                    Some(text) => serde_json::from_str(&text)?,
                    None => json!({}),
                };
                request.with_json(body)
            }
        }
        Commands::Login { email, password } => RequestDescriptor::post("/api/auth/login")
            .with_json(json!({ "email": email, "password": password })),
        Commands::Feed => RequestDescriptor::get("/api/posts"),
        Commands::Events => RequestDescriptor::get("/api/posts/events"),
        Commands::Trending => RequestDescriptor::get("/api/posts/trending/hashtags"),
        Commands::Suggestions => RequestDescriptor::get("/api/users/suggestions"),
    };

    match client.send(request).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(payload) = e.payload() {
                eprintln!("Response: {}", serde_json::to_string_pretty(payload)?);
            }
            std::process::exit(1);
        }
    }
}

fn apply_flags(config: &mut ClientConfig, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if cli.offline_writes {
        config.fallback.substitute_writes = true;
    }
}
