use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mirrorwatch::notify::{ChannelSink, DiscordChannel};
use mirrorwatch::store::SnapshotStore;
use mirrorwatch::watcher::Watcher;
use mirrorwatch::{listing, report};

const DEFAULT_URL: &str = "https://repo.protonvpn.com/fedora-42-unstable/";
const TOKEN_ENV: &str = "DISCORD_TOKEN";

#[derive(Parser)]
#[command(name = "mirrorwatch")]
#[command(about = "Watch a mirror directory listing for changes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Listing URL to watch
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Path of the persisted snapshot
    #[arg(long, default_value = "state.json")]
    state_file: PathBuf,

    /// Destination channel id (omit to detect and persist without posting)
    #[arg(long)]
    channel_id: Option<String>,

    /// Bot token (defaults to the DISCORD_TOKEN environment variable)
    #[arg(long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the listing periodically and report changes
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// Seconds between checks
        #[arg(long, default_value_t = 3600)]
        interval_secs: u64,
    },

    /// Run a single check and print the detected changes
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a saved listing page and print its entries
    Parse {
        path: PathBuf,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the persisted snapshot
    State {
        /// Path of the persisted snapshot
        #[arg(long, default_value = "state.json")]
        state_file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mirrorwatch=info")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            source,
            interval_secs,
        } => {
            let sink = resolve_sink(&source);
            let watcher = Watcher::new(source.url, SnapshotStore::new(source.state_file))?;
            watcher.run(
                Duration::from_secs(interval_secs),
                sink.as_ref().map(|s| s as &dyn ChannelSink),
            );
        }
        Commands::Check { source, json } => {
            let sink = resolve_sink(&source);
            let watcher = Watcher::new(source.url, SnapshotStore::new(source.state_file))?;
            let events = watcher.tick(sink.as_ref().map(|s| s as &dyn ChannelSink))?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&events).context("serialize events json")?
                );
            } else if events.is_empty() {
                println!("No changes detected.");
            } else {
                for event in &events {
                    println!("{}", report::line(event));
                }
            }
        }
        Commands::Parse { path, json } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("read listing {}", path.display()))?;
            let snapshot = listing::parse(&raw);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&snapshot).context("serialize snapshot json")?
                );
            } else {
                for (name, timestamp) in &snapshot {
                    println!("{name}  {timestamp}");
                }
            }
        }
        Commands::State { state_file } => {
            let snapshot = SnapshotStore::new(state_file).load();
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot).context("serialize snapshot json")?
            );
        }
    }

    Ok(())
}

/// Builds and resolves the destination channel. A missing credential or a
/// failed resolve is reported and leaves the watcher running without a
/// sink; changes are still detected and persisted.
fn resolve_sink(source: &SourceArgs) -> Option<DiscordChannel> {
    let channel_id = source.channel_id.as_ref()?;
    let token = match source
        .token
        .clone()
        .or_else(|| std::env::var(TOKEN_ENV).ok())
    {
        Some(token) => token,
        None => {
            error!(
                "--channel-id given but no token (set {} or pass --token); running without notifications",
                TOKEN_ENV
            );
            return None;
        }
    };

    let channel = match DiscordChannel::new(token, channel_id.clone()) {
        Ok(channel) => channel,
        Err(err) => {
            error!(err = format!("{err:#}"), "failed to build channel client");
            return None;
        }
    };
    match channel.resolve() {
        Ok(()) => {
            info!(channel_id = %channel_id, "destination channel resolved");
            Some(channel)
        }
        Err(err) => {
            error!(
                err = format!("{err:#}"),
                channel_id = %channel_id,
                "cannot resolve destination channel; running without notifications"
            );
            None
        }
    }
}
