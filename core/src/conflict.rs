// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::{Entity, NotificationKind, SyncNotification, Synchronizer};

/// A locally mutated item paired with the server's version of it.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ChangedItem<T> {
    /// Our version of the item.
    pub local: T,

    /// The server's version, absent if the server removed it.
    #[serde(default)]
    pub server: Option<T>,
}

/// Conflicts reported for one entity type by a single notification.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ConflictRecord<T> {
    /// Items changed locally that diverge from the server.
    #[serde(default)]
    pub changed: Vec<ChangedItem<T>>,

    /// Items removed locally but changed or removed on the server.
    #[serde(default)]
    pub removed: Vec<T>,
}

impl<T: Entity> ConflictRecord<T> {
    /// Extracts the record for `T` from a notification.
    ///
    /// Returns `None` when the notification has nothing for `T` or the section is malformed.
    pub fn from_notification(notification: &SyncNotification) -> Option<Self> {
        let section = notification.conflicted(T::KIND)?;
        match serde_json::from_value(section.clone()) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(kind = %T::KIND, %err, "ignoring malformed conflict payload");
                None
            }
        }
    }

    /// Whether the record carries no conflict.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// One conflicting item awaiting review.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictEntry<T> {
    /// Changed locally, diverged on the server.
    Changed {
        /// Our version.
        local: T,
        /// The server's version.
        server: Option<T>,
    },

    /// Removed locally, changed or removed on the server.
    Removed(T),
}

/// A conflict entry together with the notification that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict<T> {
    /// Which notification raised the conflict.
    pub source: NotificationKind,

    /// The conflicting item.
    pub entry: ConflictEntry<T>,
}

impl<T: Entity> Conflict<T> {
    /// Identifier of the conflicting item.
    pub fn id(&self) -> &str {
        match &self.entry {
            ConflictEntry::Changed { local, .. } => local.id(),
            ConflictEntry::Removed(item) => item.id(),
        }
    }

    /// Our version of the item.
    pub fn local(&self) -> &T {
        match &self.entry {
            ConflictEntry::Changed { local, .. } => local,
            ConflictEntry::Removed(item) => item,
        }
    }

    /// The server's version of the item, if known.
    pub fn server(&self) -> Option<&T> {
        match &self.entry {
            ConflictEntry::Changed { server, .. } => server.as_ref(),
            ConflictEntry::Removed(_) => None,
        }
    }
}

/// Accumulates conflicts of one entity type for user review and merge.
///
/// Entries are never dropped implicitly, only by [`ConflictCollector::resolve`] or
/// [`ConflictCollector::acknowledge_all`]. A later report on the same identifier
/// replaces the earlier entry in place.
#[derive(Debug, Clone)]
pub struct ConflictCollector<T: Entity> {
    conflicts: Vec<Conflict<T>>,
}

impl<T: Entity> Default for ConflictCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> ConflictCollector<T> {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self {
            conflicts: Vec::new(),
        }
    }

    /// Creates a collector holding conflicts kept from an earlier run.
    pub fn restore(conflicts: Vec<Conflict<T>>) -> Self {
        Self { conflicts }
    }

    /// Subscribes the collector to the synchronizer.
    ///
    /// `on_change` runs after a notification added entries, to present them.
    pub fn register_to<F>(that: Rc<RefCell<Self>>, sync: &Synchronizer, mut on_change: F)
    where
        F: FnMut(&[Conflict<T>]) + 'static,
    {
        let callback = Rc::new(RefCell::new(move |n: &SyncNotification| {
            let added = that.borrow_mut().collect(n);
            if added > 0 {
                let that = that.borrow();
                on_change(that.conflicts());
            }
        }));
        sync.subscribe(callback);
    }

    /// Takes the entries for `T` out of a notification, returns how many were recorded.
    pub fn collect(&mut self, notification: &SyncNotification) -> usize {
        let Some(record) = ConflictRecord::<T>::from_notification(notification) else {
            return 0;
        };

        let changed = record
            .changed
            .into_iter()
            .map(|a| ConflictEntry::Changed {
                local: a.local,
                server: a.server,
            });
        let removed = record.removed.into_iter().map(ConflictEntry::Removed);

        let mut count = 0;
        for entry in changed.chain(removed) {
            let conflict = Conflict {
                source: notification.kind,
                entry,
            };
            tracing::debug!(kind = %T::KIND, id = conflict.id(), "collecting conflict");
            match self.find(conflict.id()) {
                Some(index) => self.conflicts[index] = conflict,
                None => self.conflicts.push(conflict),
            }
            count += 1;
        }
        count
    }

    /// The collected conflicts, oldest first.
    pub fn conflicts(&self) -> &[Conflict<T>] {
        &self.conflicts
    }

    /// Number of conflicts awaiting review.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Whether nothing awaits review.
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Position of the conflict on the identifier.
    pub fn find(&self, id: &str) -> Option<usize> {
        self.conflicts.iter().position(|a| a.id() == id)
    }

    /// Removes a conflict once the user resolved it.
    pub fn resolve(&mut self, index: usize) -> Option<Conflict<T>> {
        if index >= self.conflicts.len() {
            return None;
        }
        let conflict = self.conflicts.remove(index);
        tracing::debug!(kind = %T::KIND, id = conflict.id(), "conflict resolved");
        Some(conflict)
    }

    /// Drops every conflict once the user acknowledged them.
    pub fn acknowledge_all(&mut self) -> Vec<Conflict<T>> {
        tracing::debug!(kind = %T::KIND, count = self.conflicts.len(), "acknowledging conflicts");
        std::mem::take(&mut self.conflicts)
    }

    /// Fields whose local value differs from the server's.
    pub fn diff(&self, index: usize) -> Vec<String> {
        let Some(conflict) = self.conflicts.get(index) else {
            return Vec::new();
        };
        let Some(server) = conflict.server() else {
            return Vec::new();
        };

        let (Some(local), Some(server)) = (to_object(conflict.local()), to_object(server)) else {
            return Vec::new();
        };

        let mut fields: Vec<String> = local
            .iter()
            .filter(|(k, v)| server.get(k.as_str()) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect();
        for k in server.keys() {
            if !local.contains_key(k) {
                fields.push(k.clone());
            }
        }
        fields.retain(|k| k != "id");
        fields.sort();
        fields
    }

    /// Our version with the listed fields taken from the server's version.
    pub fn merge(&self, index: usize, take_server: &[&str]) -> Option<T> {
        let conflict = self.conflicts.get(index)?;
        let mut merged = to_object(conflict.local())?;
        if let Some(server) = conflict.server().and_then(to_object) {
            for field in take_server.iter().filter(|f| **f != "id") {
                if let Some(v) = server.get(*field) {
                    merged.insert((*field).to_owned(), v.clone());
                }
            }
        }

        match serde_json::from_value(Value::Object(merged)) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(kind = %T::KIND, %err, "failed to merge conflict");
                None
            }
        }
    }
}

fn to_object<T: Entity>(item: &T) -> Option<serde_json::Map<String, Value>> {
    match serde_json::to_value(item) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
