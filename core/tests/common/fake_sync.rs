// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! A sync manager answering from a script instead of a server.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;
use synccal_core::{
    Callback, EntityKind, NotificationKind, SyncError, SyncManager, SyncNotification,
    SyncNotifier, SyncQuery, SyncReport,
};

/// Answer to the next synchronization pass.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Plain success.
    Ok,
    /// Conflict notification with the payload, status 409.
    Conflict(Value),
    /// Duplicate-id notification with the payload, status 422.
    Duplicate(Value),
    /// Transport failure.
    Fail(SyncError),
}

#[derive(Debug, Default)]
pub struct FakeSyncManager {
    script: RefCell<VecDeque<Scripted>>,
    notifier: SyncNotifier,
    pub queries: RefCell<Vec<SyncQuery>>,
    pub resolved: RefCell<Vec<(EntityKind, String)>>,
    /// `(kind, old_id, new_id)` of every remediation request.
    pub duplicates: RefCell<Vec<(EntityKind, String, String)>>,
    resolve_failure: RefCell<Option<SyncError>>,
    syncs: Cell<usize>,
    active: Cell<usize>,
    max_active: Cell<usize>,
}

impl FakeSyncManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answer of a future pass, passes beyond the script succeed.
    pub fn push(&self, answer: Scripted) {
        self.script.borrow_mut().push_back(answer);
    }

    /// Makes the next remediation request fail.
    pub fn fail_next_resolve(&self, err: SyncError) {
        *self.resolve_failure.borrow_mut() = Some(err);
    }

    /// Number of passes run.
    pub fn syncs(&self) -> usize {
        self.syncs.get()
    }

    /// Highest number of passes seen running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.get()
    }
}

#[async_trait(?Send)]
impl SyncManager for FakeSyncManager {
    fn add_queries(&self, queries: &[SyncQuery]) {
        self.queries.borrow_mut().extend_from_slice(queries);
    }

    async fn sync(&self) -> Result<SyncReport, SyncError> {
        self.syncs.set(self.syncs.get() + 1);
        self.active.set(self.active.get() + 1);
        self.max_active
            .set(self.max_active.get().max(self.active.get()));

        // give other tasks a chance to start a pass meanwhile
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        self.active.set(self.active.get() - 1);
        let answer = self.script.borrow_mut().pop_front().unwrap_or(Scripted::Ok);
        match answer {
            Scripted::Ok => Ok(SyncReport { status: Some(200) }),
            Scripted::Conflict(payload) => {
                self.notifier
                    .notify(&SyncNotification::new(NotificationKind::Conflict, payload));
                Ok(SyncReport::conflict())
            }
            Scripted::Duplicate(payload) => {
                self.notifier
                    .notify(&SyncNotification::new(NotificationKind::DuplicateId, payload));
                Ok(SyncReport { status: Some(422) })
            }
            Scripted::Fail(err) => Err(err),
        }
    }

    async fn resolve_duplicate(
        &self,
        new_id: &str,
        old_id: &str,
        kind: EntityKind,
    ) -> Result<(), SyncError> {
        self.duplicates
            .borrow_mut()
            .push((kind, old_id.to_owned(), new_id.to_owned()));
        match self.resolve_failure.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn mark_resolved(&self, kind: EntityKind, id: &str) {
        self.resolved.borrow_mut().push((kind, id.to_owned()));
    }

    fn subscribe(&self, callback: Callback) {
        self.notifier.subscribe(callback);
    }
}
