// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

use crate::{
    ChangeOp, Collection, Conflict, ConflictCollector, ConflictEntry, Entity, Error,
    NotificationKind,
};

/// Keeps collections, their unsynced changes and collected conflicts across runs.
///
/// Every save replaces what was stored for the entity kind.
#[derive(Debug, Clone)]
pub struct Journal {
    pool: SqlitePool,
}

impl Journal {
    pub(super) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads the collection of `T` with its pending changes, empty if never saved.
    pub async fn load_collection<T: Entity>(&self) -> Result<Collection<T>, Error> {
        let kind = T::KIND;
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT item FROM entities WHERE kind = ? ORDER BY position")
                .bind(kind.as_ref())
                .fetch_all(&self.pool)
                .await?;
        let items = rows
            .iter()
            .map(|(item,)| decode::<T>(item))
            .collect::<Result<Vec<_>, _>>()?;

        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, op FROM pending_changes WHERE kind = ? ORDER BY position")
                .bind(kind.as_ref())
                .fetch_all(&self.pool)
                .await?;
        let mut journal = Vec::with_capacity(rows.len());
        for (id, op) in rows {
            match op_from_str(&op) {
                Some(op) => journal.push((id, op)),
                None => tracing::warn!(%kind, %id, %op, "unknown pending operation, skipped"),
            }
        }

        tracing::debug!(%kind, items = items.len(), pending = journal.len(), "collection loaded");
        Ok(Collection::restore(items, journal))
    }

    /// Replaces the stored collection of `T`.
    pub async fn save_collection<T: Entity>(&self, collection: &Collection<T>) -> Result<(), Error> {
        let kind = T::KIND;
        let items = collection
            .iter()
            .map(|a| -> Result<_, Error> { Ok((a.id().to_owned(), encode(a)?)) })
            .collect::<Result<Vec<_>, _>>()?;
        let journal = collection.journal();

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM entities WHERE kind = ?")
            .bind(kind.as_ref())
            .execute(&mut *tx)
            .await?;
        for (position, (id, item)) in items.iter().enumerate() {
            sqlx::query("INSERT INTO entities (kind, id, position, item) VALUES (?, ?, ?, ?)")
                .bind(kind.as_ref())
                .bind(id)
                .bind(position as i64)
                .bind(item)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM pending_changes WHERE kind = ?")
            .bind(kind.as_ref())
            .execute(&mut *tx)
            .await?;
        for (position, (id, op)) in journal.iter().enumerate() {
            sqlx::query("INSERT INTO pending_changes (kind, id, position, op) VALUES (?, ?, ?, ?)")
                .bind(kind.as_ref())
                .bind(id)
                .bind(position as i64)
                .bind(op_to_str(*op))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(%kind, items = items.len(), pending = journal.len(), "collection saved");
        Ok(())
    }

    /// Loads the conflicts on `T` still awaiting review.
    pub async fn load_conflicts<T: Entity>(&self) -> Result<ConflictCollector<T>, Error> {
        const SQL: &str = "
SELECT source, removed, local, server FROM conflicts
WHERE kind = ?
ORDER BY position
";

        let kind = T::KIND;
        let rows: Vec<(String, bool, String, Option<String>)> = sqlx::query_as(SQL)
            .bind(kind.as_ref())
            .fetch_all(&self.pool)
            .await?;

        let mut conflicts = Vec::with_capacity(rows.len());
        for (source, removed, local, server) in rows {
            let Some(source) = source_from_str(&source) else {
                tracing::warn!(%kind, %source, "unknown conflict source, skipped");
                continue;
            };
            let local = decode::<T>(&local)?;
            let entry = match removed {
                true => ConflictEntry::Removed(local),
                false => ConflictEntry::Changed {
                    local,
                    server: server.as_deref().map(decode::<T>).transpose()?,
                },
            };
            conflicts.push(Conflict { source, entry });
        }

        tracing::debug!(%kind, count = conflicts.len(), "conflicts loaded");
        Ok(ConflictCollector::restore(conflicts))
    }

    /// Replaces the stored conflicts on `T`.
    pub async fn save_conflicts<T: Entity>(
        &self,
        collector: &ConflictCollector<T>,
    ) -> Result<(), Error> {
        const SQL: &str = "
INSERT INTO conflicts (kind, id, position, source, removed, local, server)
VALUES (?, ?, ?, ?, ?, ?, ?)
";

        let kind = T::KIND;
        let rows = collector
            .conflicts()
            .iter()
            .map(|a| -> Result<_, Error> {
                let removed = matches!(a.entry, ConflictEntry::Removed(_));
                let server = a.server().map(encode).transpose()?;
                Ok((a.id().to_owned(), a.source, removed, encode(a.local())?, server))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM conflicts WHERE kind = ?")
            .bind(kind.as_ref())
            .execute(&mut *tx)
            .await?;
        for (position, (id, source, removed, local, server)) in rows.iter().enumerate() {
            sqlx::query(SQL)
                .bind(kind.as_ref())
                .bind(id)
                .bind(position as i64)
                .bind(source_to_str(*source))
                .bind(*removed)
                .bind(local)
                .bind(server)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(%kind, count = rows.len(), "conflicts saved");
        Ok(())
    }
}

fn encode<T: Entity>(item: &T) -> Result<String, Error> {
    serde_json::to_string(item)
        .map_err(|e| Error::Storage(format!("Failed to encode {} {}: {e}", T::KIND, item.id())))
}

fn decode<T: Entity>(item: &str) -> Result<T, Error> {
    serde_json::from_str(item)
        .map_err(|e| Error::Storage(format!("Failed to decode stored {}: {e}", T::KIND)))
}

fn op_to_str(op: ChangeOp) -> &'static str {
    match op {
        ChangeOp::Create => "create",
        ChangeOp::Update => "update",
        ChangeOp::Remove => "remove",
    }
}

fn op_from_str(op: &str) -> Option<ChangeOp> {
    match op {
        "create" => Some(ChangeOp::Create),
        "update" => Some(ChangeOp::Update),
        "remove" => Some(ChangeOp::Remove),
        _ => None,
    }
}

fn source_to_str(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Conflict => "conflict",
        NotificationKind::DuplicateId => "duplicate_id",
    }
}

fn source_from_str(kind: &str) -> Option<NotificationKind> {
    match kind {
        "conflict" => Some(NotificationKind::Conflict),
        "duplicate_id" => Some(NotificationKind::DuplicateId),
        _ => None,
    }
}
