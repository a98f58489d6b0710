// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use jiff::Timestamp;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::Error;

mod journal;

pub use journal::Journal;

const DB_NAME: &str = "synccal.db";

/// Persistent key-value storage, the counterpart of a browser's local storage.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    /// Opens the storage in `state_dir`, or an in-memory one when `None`.
    pub async fn open(state_dir: Option<&Path>) -> Result<Self, Error> {
        let options = match state_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    Error::Storage(format!("Failed to create state directory: {e}"))
                })?;
                let filename = dir.join(DB_NAME);
                tracing::info!(path = %filename.display(), "connecting to SQLite database");
                SqliteConnectOptions::new()
                    .filename(filename)
                    .create_if_missing(true)
            }
            None => {
                tracing::info!("connecting to in-memory SQLite database");
                SqliteConnectOptions::new().in_memory(true)
            }
        };

        // every connection to an in-memory database sees its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("src/storage/migrations") // relative path from the crate root
            .run(&pool)
            .await?;

        Ok(Self { pool })
    }

    /// Value stored under the key.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM local_storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(value,)| value))
    }

    /// Stores a value under the key, replacing any previous one.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        const SQL: &str = "
INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

        tracing::debug!(key, "storing item");
        sqlx::query(SQL)
            .bind(key)
            .bind(value)
            .bind(Timestamp::now().to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes the key, returns whether it existed.
    pub async fn remove_item(&self, key: &str) -> Result<bool, Error> {
        tracing::debug!(key, "removing item");
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persistence of collections and conflicts, sharing this database.
    pub fn journal(&self) -> Journal {
        Journal::new(self.pool.clone())
    }

    /// Closes the database connection.
    pub async fn close(self) {
        tracing::debug!("closing database connection");
        self.pool.close().await;
    }
}

/// Remembers who is logged in across runs.
#[derive(Debug, Clone)]
pub struct Session {
    storage: LocalStorage,
}

impl Session {
    const KEY: &str = "logged_in_person";

    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Identifier of the logged-in person.
    pub async fn logged_in_person(&self) -> Result<Option<String>, Error> {
        let id = self.storage.get_item(Self::KEY).await?;
        Ok(id.filter(|a| !a.is_empty()))
    }

    pub async fn login(&self, person_id: &str) -> Result<(), Error> {
        tracing::info!(person_id, "logging in");
        self.storage.set_item(Self::KEY, person_id).await
    }

    pub async fn logout(&self) -> Result<(), Error> {
        tracing::info!("logging out");
        self.storage.remove_item(Self::KEY).await.map(|_| ())
    }

    /// The underlying storage.
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }
}
