// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::EntityKind;

/// Errors raised by the synchronization layer.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The request never reached the server or the connection dropped.
    #[error("Network failure: {0}")]
    Network(String),

    /// The server answered with an unexpected status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a body that could not be understood.
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    /// The server refused the request, e.g. a duplicate remediation.
    #[error("Rejected by server: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            Self::Network(e.to_string())
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

/// Errors raised by the schedule calendar core.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Synchronization failed, local edits are kept unsynced.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The identifier is already taken in the collection.
    #[error("Duplicate {kind} identifier: {id}")]
    DuplicateIdentifier {
        /// Entity kind of the collection.
        kind: EntityKind,
        /// The colliding identifier.
        id: String,
    },

    /// No item with the identifier exists.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind of the collection.
        kind: EntityKind,
        /// The missing identifier.
        id: String,
    },

    /// A schedule date is not of the form `YYYY/MM/DD`.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Local key-value storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Storage(format!("Failed to run migrations: {e}"))
    }
}
