//! Inspect a seeded environment.

use video_streaming_seeder::{MongoStore, verify};

use super::load_plan;

/// Print the state of the configured deployment.
///
/// # Errors
///
/// Returns an error if the deployment cannot be read or is not fully seeded.
#[allow(clippy::print_stdout)]
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (config, plan) = load_plan()?;

    let store = MongoStore::connect(&config.database_url, &config.app_name).await?;
    let report = verify(&store, &plan).await?;

    println!("{report}");

    if !report.is_complete() {
        return Err("environment is not fully seeded".into());
    }
    Ok(())
}
