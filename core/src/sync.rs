// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Contract of the synchronization layer.

use std::{cell::RefCell, fmt, rc::Rc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{EntityKind, SyncError};

/// Status reported by the server when a pass detected conflicts.
pub const STATUS_CONFLICT: u16 = 409;

/// Status reported by the server when a locally minted identifier is taken.
pub const STATUS_DUPLICATE: u16 = 422;

/// Registers an entity type and an optional filter for synchronization.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyncQuery {
    /// The entity type to synchronize.
    pub kind: EntityKind,

    /// Server-side filter, all items when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl SyncQuery {
    /// Synchronize every item of the kind.
    pub fn all(kind: EntityKind) -> Self {
        Self { kind, filter: None }
    }
}

/// Result of a completed synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Status reported by the server, if any.
    pub status: Option<u16>,
}

impl SyncReport {
    /// A pass without anything to report.
    pub fn ok() -> Self {
        Self { status: None }
    }

    /// A pass that detected conflicts.
    pub fn conflict() -> Self {
        Self {
            status: Some(STATUS_CONFLICT),
        }
    }

    /// Whether the server reported conflicts.
    pub fn is_conflict(&self) -> bool {
        self.status == Some(STATUS_CONFLICT)
    }

    /// Whether the server rejected a locally minted identifier.
    pub fn is_duplicate(&self) -> bool {
        self.status == Some(STATUS_DUPLICATE)
    }
}

/// How a write ended once its synchronization pass completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The server accepted the changes.
    Success,

    /// The server reported conflicts, local changes are kept for review.
    Conflict,

    /// The server could not be reached, local changes are kept unsynced.
    NetworkFailure(SyncError),
}

impl SyncOutcome {
    /// Whether the pass completed without conflicts.
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success)
    }
}

impl From<Result<SyncReport, SyncError>> for SyncOutcome {
    fn from(result: Result<SyncReport, SyncError>) -> Self {
        match result {
            Ok(report) if report.is_conflict() || report.is_duplicate() => SyncOutcome::Conflict,
            Ok(_) => SyncOutcome::Success,
            Err(err) => SyncOutcome::NetworkFailure(err),
        }
    }
}

/// A locally applied write and the outcome of the pass that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written<T> {
    /// The item as stored locally.
    pub item: T,

    /// Outcome of the synchronization pass.
    pub outcome: SyncOutcome,
}

/// Kind of a notification raised during a synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Local changes diverge from the server.
    Conflict,

    /// A locally minted identifier collides with one on the server.
    DuplicateId,
}

/// A notification raised by the sync manager.
///
/// The payload is kept as raw JSON, each consumer picks the part it owns:
/// `{"conflicted": {"<kind>": {"changed": [{"local": .., "server": ..}], "removed": [..]}}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncNotification {
    /// What happened.
    pub kind: NotificationKind,

    /// Raw payload.
    pub payload: serde_json::Value,
}

impl SyncNotification {
    /// Creates a notification.
    pub fn new(kind: NotificationKind, payload: serde_json::Value) -> Self {
        Self { kind, payload }
    }

    /// The conflicted section for an entity type, if present.
    pub fn conflicted(&self, kind: EntityKind) -> Option<&serde_json::Value> {
        self.payload.get("conflicted")?.get(kind.as_ref())
    }
}

/// Callback invoked for every notification.
pub type Callback = Rc<RefCell<dyn FnMut(&SyncNotification)>>;

/// Fans out notifications to subscribers, in subscription order.
#[derive(Default)]
pub struct SyncNotifier {
    subscribers: RefCell<Vec<Callback>>,
}

impl SyncNotifier {
    /// Creates a notifier without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    pub fn subscribe(&self, callback: Callback) {
        self.subscribers.borrow_mut().push(callback);
    }

    /// Delivers the notification to every subscriber.
    pub fn notify(&self, notification: &SyncNotification) {
        tracing::debug!(kind = ?notification.kind, "delivering sync notification");
        // a subscriber may subscribe others while being notified
        let subscribers = self.subscribers.borrow().clone();
        for sub in subscribers {
            (sub.borrow_mut())(notification);
        }
    }
}

impl fmt::Debug for SyncNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncNotifier")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

/// Performs network reconciliation between local collections and a server.
#[async_trait(?Send)]
pub trait SyncManager {
    /// Registers entity types for synchronization.
    fn add_queries(&self, queries: &[SyncQuery]);

    /// Runs one synchronization pass.
    ///
    /// Conflicts are reported through notifications delivered before the returned
    /// future resolves, and through the report status.
    async fn sync(&self) -> Result<SyncReport, SyncError>;

    /// Remaps a locally minted identifier to one confirmed by the user.
    async fn resolve_duplicate(
        &self,
        new_id: &str,
        old_id: &str,
        kind: EntityKind,
    ) -> Result<(), SyncError>;

    /// Marks a conflict on the identifier as acknowledged, so the next pass will not
    /// report it again.
    fn mark_resolved(&self, kind: EntityKind, id: &str);

    /// Subscribes to conflict and duplicate-id notifications.
    fn subscribe(&self, callback: Callback);
}

/// Shared handle on the sync manager which serializes synchronization passes.
///
/// A pass requested while another one is in flight waits for it to finish, then
/// runs its own pass, so local edits made in between are never skipped.
#[derive(Clone)]
pub struct Synchronizer {
    manager: Rc<dyn SyncManager>,
    in_flight: Rc<Mutex<()>>,
}

impl Synchronizer {
    /// Wraps a sync manager.
    pub fn new(manager: Rc<dyn SyncManager>) -> Self {
        Self {
            manager,
            in_flight: Rc::new(Mutex::new(())),
        }
    }

    /// Registers entity types for synchronization.
    pub fn add_queries(&self, queries: &[SyncQuery]) {
        self.manager.add_queries(queries);
    }

    /// Runs a synchronization pass once no other pass is in flight.
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        let _guard = self.in_flight.lock().await;
        tracing::debug!("synchronization pass started");
        let result = self.manager.sync().await;
        match &result {
            Ok(report) => tracing::debug!(status = ?report.status, "synchronization pass finished"),
            Err(err) => tracing::warn!(%err, "synchronization pass failed"),
        }
        result
    }

    /// Whether a pass is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Remaps a locally minted identifier.
    pub async fn resolve_duplicate(
        &self,
        new_id: &str,
        old_id: &str,
        kind: EntityKind,
    ) -> Result<(), SyncError> {
        tracing::debug!(%kind, new_id, old_id, "resolving duplicate identifier");
        self.manager.resolve_duplicate(new_id, old_id, kind).await
    }

    /// Marks a conflict as acknowledged.
    pub fn mark_resolved(&self, kind: EntityKind, id: &str) {
        tracing::debug!(%kind, id, "marking conflict as resolved");
        self.manager.mark_resolved(kind, id);
    }

    /// Subscribes to notifications.
    pub fn subscribe(&self, callback: Callback) {
        self.manager.subscribe(callback);
    }
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("busy", &self.is_busy())
            .finish()
    }
}
