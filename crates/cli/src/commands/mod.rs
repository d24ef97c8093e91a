//! CLI subcommands.

pub mod password;
pub mod seed;
pub mod verify;

use chrono::Utc;
use video_streaming_seeder::{SeedConfig, SeedPlan};

/// Load configuration and resolve the plan before any connection is made.
fn load_plan() -> Result<(SeedConfig, SeedPlan), Box<dyn std::error::Error>> {
    let config = SeedConfig::from_env()?;
    let plan = SeedPlan::from_config(&config, Utc::now())?;
    Ok((config, plan))
}
