//! Video Streaming CLI - Database seeding and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the configured MongoDB deployment
//! vs-cli seed
//!
//! # Run the same seeding steps against an in-memory engine
//! vs-cli seed --dry-run
//!
//! # Check that a deployment is fully seeded
//! vs-cli verify
//!
//! # Hash an administrator password for ADMIN_PASSWORD_HASH
//! echo -n 'secret' | vs-cli hash-password
//! ```
//!
//! # Commands
//!
//! - `seed` - Create namespaces, credential, collections, indexes and admin
//! - `verify` - Report what is present; exits non-zero when incomplete
//! - `hash-password` - Argon2id hash of a password read from stdin

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "vs-cli")]
#[command(author, version, about = "Video streaming database tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database environment
    Seed {
        /// Run against an in-memory engine instead of MongoDB
        #[arg(long)]
        dry_run: bool,
    },
    /// Verify a seeded environment
    Verify,
    /// Hash a password read from stdin
    HashPassword,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Text output by default, JSON when `LOG_FORMAT=json`.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "video_streaming_seeder=info,vs_cli=info".into());

    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { dry_run } => {
            if dry_run {
                commands::seed::dry_run().await?;
            } else {
                commands::seed::run().await?;
            }
        }
        Commands::Verify => commands::verify::run().await?,
        Commands::HashPassword => commands::password::hash_from_stdin()?,
    }
    Ok(())
}
