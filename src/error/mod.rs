//! Error types for the Stratus server application.
//!
//! Each domain keeps its own `thiserror` enum (configuration, upstream
//! providers, cache tier); this module aggregates them with external library
//! errors into a single `Error` used across the fallible assembly surfaces
//! (configuration, connection setup, database access). The public lookup
//! operations themselves are total and never surface these errors to callers.

pub mod cache;
pub mod config;
pub mod provider;

use thiserror::Error;

use crate::error::{config::ConfigError, provider::ProviderError};

/// Main error type for the Stratus server application.
///
/// Aggregates the domain-specific error types and external library errors
/// into a single unified error type, with `thiserror`'s `#[from]` enabling
/// conversion via the `?` operator.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Upstream weather provider error (transport, status, payload).
    #[error(transparent)]
    ProviderError(#[from] ProviderError),
    /// Database error (query failures, connection issues, migrations).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// Valkey/Redis error (connection, command execution).
    #[error(transparent)]
    RedisError(#[from] fred::error::Error),
}
