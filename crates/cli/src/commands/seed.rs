//! Seed the database environment.
//!
//! # Environment Variables
//!
//! See [`video_streaming_seeder::config`]. `MONGODB_URI` and
//! `APP_DB_PASSWORD` are required.

use video_streaming_seeder::{MemoryStore, MongoStore, seed};

use super::load_plan;

/// Seed the configured MongoDB deployment.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the server cannot be
/// reached, or a seeding step fails with anything other than "already
/// exists".
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (config, plan) = load_plan()?;

    let store = MongoStore::connect(&config.database_url, &config.app_name).await?;

    seed(&store, &plan).await?;
    Ok(())
}

/// Run the seeding steps against an in-memory engine and print the outcome.
///
/// # Errors
///
/// Returns an error if configuration is invalid.
#[allow(clippy::print_stdout)]
pub async fn dry_run() -> Result<(), Box<dyn std::error::Error>> {
    let (_, plan) = load_plan()?;

    let store = MemoryStore::new();
    let report = seed(&store, &plan).await?;

    println!("{report}");
    Ok(())
}
