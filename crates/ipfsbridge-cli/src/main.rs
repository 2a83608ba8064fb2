#![deny(unsafe_code)]

//! ipfsbridge CLI: drive a local IPFS daemon from the command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ipfsbridge_config::AppConfig;
use ipfsbridge_core::{Address, CancellationToken, IpfsClient, IpnsId, build_info};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ipfsbridge: typed access to an IPFS daemon's DAG, IPNS and pubsub APIs.
#[derive(Parser)]
#[command(name = "ipfsbridge", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "ipfsbridge.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the daemon's version and this client's build.
    Version,

    /// Generate a new ed25519 naming key.
    KeyGen {
        /// Local name for the key.
        name: String,
    },

    /// Store a JSON document as a pinned DAG node.
    DagPut {
        /// The document, as JSON text.
        json: String,
    },

    /// Fetch a DAG node as JSON.
    DagGet {
        /// `/ipfs/<cid>` or `/ipns/<id>`.
        address: Address,
    },

    /// Pin an address recursively.
    Pin { address: Address },

    /// Point a naming key at an address.
    NamePublish {
        /// IPNS id returned by `key-gen`.
        key: String,
        address: Address,
    },

    /// Resolve a naming key to a content id.
    NameResolve { key: String },

    /// Publish a message on a pubsub topic.
    Pub { topic: String, data: String },

    /// Print messages on a pubsub topic until Ctrl-C.
    Sub { topic: String },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose, &config))),
        )
        .with_writer(std::io::stderr)
        .init();

    if !cli.config.exists() {
        warn!(path = %cli.config.display(), "config file not found, using defaults");
    }

    let client = IpfsClient::new(&config);
    match cli.command {
        Commands::Version => {
            let daemon = client.version().await?;
            println!("daemon  {daemon}");
            println!("client  {}", build_info::version_string());
        }
        Commands::KeyGen { name } => {
            let id = client.key_gen(&name).await?;
            println!("{id}");
        }
        Commands::DagPut { json } => {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("dag-put expects a JSON document")?;
            let cid = client.dag_put(&value).await?;
            println!("{}", Address::Ipfs(cid));
        }
        Commands::DagGet { address } => {
            let value: serde_json::Value = client.dag_get(&address).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Pin { address } => {
            for cid in client.pin_add(&address).await? {
                println!("pinned {cid}");
            }
        }
        Commands::NamePublish { key, address } => {
            client.name_publish(&IpnsId::new(key), &address).await?;
            println!("published {address}");
        }
        Commands::NameResolve { key } => {
            let cid = client.name_resolve(&IpnsId::new(key)).await?;
            println!("{}", Address::Ipfs(cid));
        }
        Commands::Pub { topic, data } => {
            client.publish(&topic, data.as_bytes()).await?;
        }
        Commands::Sub { topic } => cmd_sub(&client, &topic).await?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
    }

    Ok(())
}

async fn cmd_sub(client: &IpfsClient, topic: &str) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, closing subscription");
            on_interrupt.cancel();
        }
    });

    let end = client
        .subscribe(topic, &cancel, |message| {
            println!("{}", message.to_wire());
        })
        .await?;
    info!(?end, "subscription finished");
    Ok(())
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
        println!("API endpoint: {}", config.daemon.api_url(""));
    }
    Ok(())
}

/// Read the config file (defaults when absent), then apply environment
/// overrides and re-validate.
async fn load_config(path: &Path) -> Result<AppConfig> {
    let config = if path.exists() {
        AppConfig::load(path).await?
    } else {
        AppConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// `-v` flags win over the configured level.
fn log_filter(verbose: u8, config: &AppConfig) -> String {
    match verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
