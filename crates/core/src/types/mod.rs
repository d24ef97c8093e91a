//! Core types for the video streaming seeder.
//!
//! This module provides type-safe wrappers for the domain concepts the
//! seeder writes: namespaces, account identity, roles and indexes.

pub mod account;
pub mod credential;
pub mod email;
pub mod index;
pub mod namespace;
pub mod role;
pub mod username;

pub use account::{AccountFlags, AdminAccount};
pub use credential::{PasswordHash, PasswordHashError, RoleGrant};
pub use email::{Email, EmailError};
pub use index::{IndexDirection, IndexSpec};
pub use namespace::{Namespace, NamespaceError, NamespaceKind};
pub use role::{DatabaseRole, UserRole};
pub use username::{Username, UsernameError};
