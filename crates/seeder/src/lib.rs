//! Video Streaming Seeder - Idempotent environment bootstrap.
//!
//! Brings a fresh or partially initialized MongoDB deployment to the state
//! the video streaming application needs:
//!
//! 1. Production and development namespaces
//! 2. A service credential with `readWrite` on both
//! 3. The `users`, `videos` and `video_metadata` collections
//! 4. Seven secondary indexes
//! 5. A bootstrap administrator account
//!
//! Re-running [`seed`] against an already seeded deployment changes nothing.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`plan`] - The resolved set of objects a run creates
//! - [`seed`] - The seeding run
//! - [`verify`] - Read-only inspection of a seeded deployment
//! - [`db`] - The `SeedStore` seam with MongoDB and in-memory backends
//! - [`password`] - Administrator password hashing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod password;
pub mod plan;
pub mod seed;
pub mod verify;

pub use config::{ConfigError, SeedConfig};
pub use db::{MemoryStore, MongoStore, SeedStore, StoreError};
pub use plan::SeedPlan;
pub use seed::{SeedReport, StepOutcome, seed};
pub use verify::{VerifyReport, verify};
