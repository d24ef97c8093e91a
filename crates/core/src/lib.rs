//! Video Streaming Core - Shared domain types.
//!
//! This crate provides the types shared by the seeder components:
//! - `seeder` - Seeding logic, configuration and database backends
//! - `cli` - Command-line entry point (`vs-cli`)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. It
//! describes *what* the application database must contain (namespaces,
//! collections, indexes, the bootstrap administrator) and leaves *how* to
//! the seeder.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes, roles, account flags and index specs
//! - [`schema`] - Collection names, stored field names and the index layout

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod schema;
pub mod types;

pub use types::*;
