//! Playlist Courier — Binary Entrypoint
//! Reads a chat transcript, extracts shared video links, and syncs the new
//! ones into a YouTube playlist.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use playlist_courier::config::{load_exclusions_default, load_exclusions_from, RemoteConfig};
use playlist_courier::pipeline::{run_sync, RunOptions};
use playlist_courier::report::format_outcomes;
use playlist_courier::source::signal::SignalSource;
use playlist_courier::source::whatsapp::WhatsAppSource;
use playlist_courier::source::{MessageSource, ParseMode};
use playlist_courier::youtube::YouTubeClient;

#[derive(Parser)]
#[command(name = "playlist-courier", about = "Sync chat-shared video links to a YouTube playlist")]
struct Cli {
    #[command(subcommand)]
    source: SourceCmd,

    /// Target playlist id (falls back to $YOUTUBE_PLAYLIST_ID)
    #[arg(long, global = true)]
    playlist: Option<String>,

    /// Exclusion list path (falls back to $PLAYLIST_EXCLUSIONS_PATH, then config/)
    #[arg(long, global = true)]
    exclusions: Option<PathBuf>,

    /// Abort on the first malformed record instead of skipping it
    #[arg(long, global = true)]
    strict: bool,

    /// Report what would be added without touching the playlist
    #[arg(long, global = true)]
    dry_run: bool,

    /// Write the deduplicated link records as JSON to this path
    #[arg(long, global = true)]
    metadata_out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SourceCmd {
    /// Read a conversation from the Signal Desktop database
    Signal {
        /// Path to Signal's encrypted db.sqlite
        #[arg(long)]
        db: PathBuf,
        /// Path to Signal's config.json (holds the decryption key)
        #[arg(long)]
        config: PathBuf,
        /// Conversation id to scan
        #[arg(long)]
        conversation: String,
    },
    /// Read an exported WhatsApp chat text file
    Whatsapp {
        /// Path to the exported _chat.txt
        export: PathBuf,
        /// Drop group/system notices (subject changes, encryption banners)
        #[arg(long)]
        skip_system_notices: bool,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("playlist_courier=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let remote = RemoteConfig::from_env(cli.playlist.clone())?;
    let excluded = match &cli.exclusions {
        Some(path) => load_exclusions_from(path)?,
        None => load_exclusions_default()?,
    };

    let source: Box<dyn MessageSource + Send + Sync> = match cli.source {
        SourceCmd::Signal {
            db,
            config,
            conversation,
        } => Box::new(SignalSource::new(db, config, conversation)),
        SourceCmd::Whatsapp {
            export,
            skip_system_notices,
        } => Box::new(WhatsAppSource::new(export).skip_system_notices(skip_system_notices)),
    };

    let client = YouTubeClient::new(remote.access_token, remote.playlist_id);
    let options = RunOptions {
        mode: Some(if cli.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }),
        dry_run: cli.dry_run,
        metadata_out: cli.metadata_out.clone(),
    };

    let (summary, results) = run_sync(source.as_ref(), &client, &excluded, &options).await?;

    if !results.is_empty() {
        print!("{}", format_outcomes(&results));
    }
    summary.log();
    Ok(summary.exit_code())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(error = ?e, "run aborted");
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}
