//! # Launchpad Shared Library
//!
//! This crate contains the types, persistence layer, and business logic shared
//! between the Launchpad API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication utilities (passwords, JWTs, caller identity)
//! - `db`: Connection pooling and migrations
//! - `events`: Application change feed
//! - `portal`: The application portal service (the four portal operations)

pub mod auth;
pub mod db;
pub mod events;
pub mod models;
pub mod portal;

/// Current version of the Launchpad shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
