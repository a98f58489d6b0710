// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! JSON over HTTP sync manager.
//!
//! One pass is a single `POST {base_url}/sync` carrying the registered queries, the
//! pending changes of every attached collection and the identifiers whose conflicts
//! were acknowledged. The server answers with:
//!
//! - `200` and `{"snapshot": {"<kind>": [..]}}`, installed into the collections;
//! - `409` and a conflict payload, delivered as a conflict notification;
//! - `422` and a duplicate payload, delivered as a duplicate-id notification.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};

use crate::{
    AuthMethod, Callback, Collection, Entity, EntityKind, NotificationKind, STATUS_CONFLICT,
    STATUS_DUPLICATE, SyncConfig, SyncError, SyncManager, SyncNotification, SyncNotifier,
    SyncQuery, SyncReport,
};

/// A local collection the HTTP sync manager reconciles.
pub trait SyncTarget {
    /// Entity kind held by the collection.
    fn kind(&self) -> EntityKind;

    /// Pending changes as JSON and the journal position they cover.
    fn pending(&self) -> Result<(Value, u64), SyncError>;

    /// Drops changes accepted by the server.
    fn acknowledge(&self, seq: u64);

    /// Installs a server snapshot.
    fn install(&self, snapshot: Value) -> Result<(), SyncError>;

    /// Moves an item to a server-confirmed identifier.
    fn rename(&self, old_id: &str, new_id: &str);
}

impl<T: Entity> SyncTarget for RefCell<Collection<T>> {
    fn kind(&self) -> EntityKind {
        T::KIND
    }

    fn pending(&self) -> Result<(Value, u64), SyncError> {
        let (changes, seq) = self.borrow().changes();
        let changes =
            serde_json::to_value(changes).map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        Ok((changes, seq))
    }

    fn acknowledge(&self, seq: u64) {
        self.borrow_mut().acknowledge(seq);
    }

    fn install(&self, snapshot: Value) -> Result<(), SyncError> {
        let items: Vec<T> = serde_json::from_value(snapshot)
            .map_err(|e| SyncError::InvalidResponse(format!("{} snapshot: {e}", T::KIND)))?;
        self.borrow_mut().replace_all(items);
        Ok(())
    }

    fn rename(&self, old_id: &str, new_id: &str) {
        let mut collection = self.borrow_mut();
        if collection.contains(old_id)
            && let Err(err) = collection.rename(old_id, new_id)
        {
            tracing::warn!(%err, "failed to rename item after remediation");
        }
    }
}

/// Sync manager talking to a JSON sync server.
pub struct HttpSyncManager {
    client: Client,
    config: SyncConfig,
    targets: RefCell<Vec<Rc<dyn SyncTarget>>>,
    queries: RefCell<Vec<SyncQuery>>,
    resolved: RefCell<Vec<(EntityKind, String)>>,
    notifier: SyncNotifier,
}

impl HttpSyncManager {
    /// Creates a new sync manager.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            config,
            targets: RefCell::new(Vec::new()),
            queries: RefCell::new(Vec::new()),
            resolved: RefCell::new(Vec::new()),
            notifier: SyncNotifier::new(),
        })
    }

    /// Attaches a collection to reconcile.
    pub fn attach(&self, target: Rc<dyn SyncTarget>) {
        tracing::debug!(kind = %target.kind(), "attaching collection");
        self.targets.borrow_mut().push(target);
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, url: &str) -> RequestBuilder {
        let req = self.client.post(url);
        match &self.config.auth {
            AuthMethod::Basic { username, password } => req.basic_auth(username, Some(password)),
            AuthMethod::Bearer { token } => req.bearer_auth(token),
            AuthMethod::None => req,
        }
    }

    /// Targets whose kind is registered through a query.
    fn queried_targets(&self) -> Vec<Rc<dyn SyncTarget>> {
        let queries = self.queries.borrow();
        self.targets
            .borrow()
            .iter()
            .filter(|t| queries.iter().any(|q| q.kind == t.kind()))
            .cloned()
            .collect()
    }

    fn request_body(
        &self,
        targets: &[Rc<dyn SyncTarget>],
    ) -> Result<(Value, Vec<u64>), SyncError> {
        let mut changes = serde_json::Map::new();
        let mut seqs = Vec::with_capacity(targets.len());
        for target in targets {
            let (pending, seq) = target.pending()?;
            changes.insert(target.kind().to_string(), pending);
            seqs.push(seq);
        }

        let resolved: Vec<Value> = self
            .resolved
            .borrow()
            .iter()
            .map(|(kind, id)| json!({"kind": kind, "id": id}))
            .collect();

        let queries = self.queries.borrow().clone();
        let body = json!({
            "queries": queries,
            "changes": changes,
            "resolved": resolved,
        });
        Ok((body, seqs))
    }

    async fn read_json(resp: Response) -> Result<Value, SyncError> {
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    fn install(
        &self,
        targets: &[Rc<dyn SyncTarget>],
        seqs: &[u64],
        body: &Value,
    ) -> Result<(), SyncError> {
        let snapshot = body.get("snapshot");
        for (target, seq) in targets.iter().zip(seqs) {
            target.acknowledge(*seq);
            if let Some(items) = snapshot.and_then(|a| a.get(target.kind().as_ref())) {
                target.install(items.clone())?;
            }
        }
        self.resolved.borrow_mut().clear();
        Ok(())
    }
}

#[async_trait(?Send)]
impl SyncManager for HttpSyncManager {
    fn add_queries(&self, queries: &[SyncQuery]) {
        let mut registered = self.queries.borrow_mut();
        for query in queries {
            if !registered.contains(query) {
                tracing::debug!(kind = %query.kind, "registering sync query");
                registered.push(query.clone());
            }
        }
    }

    async fn sync(&self) -> Result<SyncReport, SyncError> {
        let targets = self.queried_targets();
        let (body, seqs) = self.request_body(&targets)?;

        let url = self.url("sync");
        tracing::debug!(%url, "sending sync request");
        let resp = self.build_request(&url).json(&body).send().await?;
        let status = resp.status();
        tracing::debug!(%status, "sync response received");

        match status {
            StatusCode::OK => {
                let body = Self::read_json(resp).await?;
                self.install(&targets, &seqs, &body)?;
                Ok(SyncReport {
                    status: Some(status.as_u16()),
                })
            }
            StatusCode::CONFLICT => {
                let payload = Self::read_json(resp).await?;
                self.notifier
                    .notify(&SyncNotification::new(NotificationKind::Conflict, payload));
                Ok(SyncReport {
                    status: Some(STATUS_CONFLICT),
                })
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                let payload = Self::read_json(resp).await?;
                if payload.get("conflicted").is_none() {
                    return Err(SyncError::Http(format!("{status}: {payload}")));
                }
                self.notifier
                    .notify(&SyncNotification::new(NotificationKind::DuplicateId, payload));
                Ok(SyncReport {
                    status: Some(STATUS_DUPLICATE),
                })
            }
            status => {
                let text = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read response".to_string());
                Err(SyncError::Http(format!("{status}: {text}")))
            }
        }
    }

    async fn resolve_duplicate(
        &self,
        new_id: &str,
        old_id: &str,
        kind: EntityKind,
    ) -> Result<(), SyncError> {
        let url = self.url("resolve-duplicate");
        let body = json!({"kind": kind, "old_id": old_id, "new_id": new_id});
        let resp = self.build_request(&url).json(&body).send().await?;

        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                let targets: Vec<_> = self
                    .targets
                    .borrow()
                    .iter()
                    .filter(|t| t.kind() == kind)
                    .cloned()
                    .collect();
                for target in targets {
                    target.rename(old_id, new_id);
                }
                Ok(())
            }
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                let text = resp.text().await.unwrap_or_default();
                Err(SyncError::Rejected(format!("{new_id}: {text}")))
            }
            status => {
                let text = resp.text().await.unwrap_or_default();
                Err(SyncError::Http(format!("{status}: {text}")))
            }
        }
    }

    fn mark_resolved(&self, kind: EntityKind, id: &str) {
        let mut resolved = self.resolved.borrow_mut();
        if !resolved.iter().any(|(k, i)| *k == kind && i == id) {
            resolved.push((kind, id.to_owned()));
        }
    }

    fn subscribe(&self, callback: Callback) {
        self.notifier.subscribe(callback);
    }
}

impl std::fmt::Debug for HttpSyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSyncManager")
            .field("base_url", &self.config.base_url)
            .field("targets", &self.targets.borrow().len())
            .field("queries", &self.queries.borrow())
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}
