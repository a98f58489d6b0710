// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

use serde::{Serialize, de::DeserializeOwned};

use crate::Error;

/// Kind of a synchronized entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A person who can log in and be invited to schedules.
    Person,

    /// A schedule on the calendar.
    Schedule,
}

impl AsRef<str> for EntityKind {
    fn as_ref(&self) -> &str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Schedule => "schedule",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// An item stored in a [`Collection`].
pub trait Entity: Clone + Serialize + DeserializeOwned + 'static {
    /// The kind of the entity.
    const KIND: EntityKind;

    /// The unique identifier of the item.
    fn id(&self) -> &str;

    /// Replace the identifier, used when a locally minted id is remapped.
    fn set_id(&mut self, id: String);
}

/// Operation recorded for an item that has not been synchronized yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    /// The item was created locally.
    Create,

    /// The item was modified locally.
    Update,

    /// The item was removed locally.
    Remove,
}

/// A pending local change, as sent to the server.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Change<T> {
    /// What happened to the item.
    pub op: ChangeOp,

    /// Identifier of the item.
    pub id: String,

    /// Current state of the item, absent for removals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
}

#[derive(Debug, Clone)]
struct Pending {
    id: String,
    op: ChangeOp,
    seq: u64,
}

/// Insertion ordered in-memory set of entities with a journal of unsynced changes.
#[derive(Debug, Clone)]
pub struct Collection<T: Entity> {
    items: Vec<T>,
    pending: Vec<Pending>,
    seq: u64,
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Collection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            pending: Vec::new(),
            seq: 0,
        }
    }

    /// Adds a new item, failing if the identifier is already taken.
    pub fn create(&mut self, item: T) -> Result<(), Error> {
        if self.contains(item.id()) {
            return Err(Error::DuplicateIdentifier {
                kind: T::KIND,
                id: item.id().to_owned(),
            });
        }

        tracing::debug!(kind = %T::KIND, id = item.id(), "creating item");
        self.record(item.id(), ChangeOp::Create);
        self.items.push(item);
        Ok(())
    }

    /// Get an item by its identifier.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|a| a.id() == id)
    }

    /// Get several items at once, in the order of `ids`. Unknown ids are skipped.
    pub fn get_many<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&T> {
        ids.iter().filter_map(|id| self.get(id.as_ref())).collect()
    }

    /// Whether an item with the identifier exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Replaces the stored item with the same identifier.
    pub fn set(&mut self, item: T) -> Result<(), Error> {
        let slot = self
            .items
            .iter_mut()
            .find(|a| a.id() == item.id())
            .ok_or_else(|| Error::NotFound {
                kind: T::KIND,
                id: item.id().to_owned(),
            })?;

        tracing::debug!(kind = %T::KIND, id = item.id(), "updating item");
        *slot = item;
        let id = slot.id().to_owned();
        self.record(&id, ChangeOp::Update);
        Ok(())
    }

    /// Removes the item, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|a| a.id() == id)?;
        tracing::debug!(kind = %T::KIND, id, "removing item");
        self.record(id, ChangeOp::Remove);
        Some(self.items.remove(index))
    }

    /// Moves an item to a new identifier, keeping its position and pending state.
    pub fn rename(&mut self, old_id: &str, new_id: &str) -> Result<(), Error> {
        if old_id == new_id {
            return Ok(());
        }
        if self.contains(new_id) {
            return Err(Error::DuplicateIdentifier {
                kind: T::KIND,
                id: new_id.to_owned(),
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|a| a.id() == old_id)
            .ok_or_else(|| Error::NotFound {
                kind: T::KIND,
                id: old_id.to_owned(),
            })?;

        tracing::debug!(kind = %T::KIND, old_id, new_id, "renaming item");
        item.set_id(new_id.to_owned());
        for p in self.pending.iter_mut().filter(|p| p.id == old_id) {
            p.id = new_id.to_owned();
        }
        Ok(())
    }

    /// Iterates over all items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection holds no item.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether there are local changes not yet acknowledged by the server.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Pending changes and the journal position they cover.
    ///
    /// The journal is left untouched; call [`Collection::acknowledge`] with the returned
    /// position once the server accepted the changes.
    pub fn changes(&self) -> (Vec<Change<T>>, u64) {
        let changes = self
            .pending
            .iter()
            .map(|p| Change {
                op: p.op,
                id: p.id.clone(),
                item: match p.op {
                    ChangeOp::Remove => None,
                    _ => self.get(&p.id).cloned(),
                },
            })
            .collect();
        (changes, self.seq)
    }

    /// Identifiers and operations of the pending changes, oldest first.
    pub fn journal(&self) -> Vec<(String, ChangeOp)> {
        self.pending.iter().map(|p| (p.id.clone(), p.op)).collect()
    }

    /// Rebuilds a collection from its items and a journal taken by [`Collection::journal`].
    pub fn restore(items: Vec<T>, journal: Vec<(String, ChangeOp)>) -> Self {
        let pending: Vec<Pending> = journal
            .into_iter()
            .zip(1..)
            .map(|((id, op), seq)| Pending { id, op, seq })
            .collect();
        let seq = pending.len() as u64;
        Self {
            items,
            pending,
            seq,
        }
    }

    /// Drops journal entries recorded up to `seq`. Entries touched later survive.
    pub fn acknowledge(&mut self, seq: u64) {
        self.pending.retain(|p| p.seq > seq);
    }

    /// Installs a server snapshot. Items with unacknowledged local changes keep their
    /// local state on top of the snapshot.
    pub fn replace_all(&mut self, snapshot: Vec<T>) {
        let mut items = snapshot;
        for p in &self.pending {
            match p.op {
                ChangeOp::Remove => items.retain(|a| a.id() != p.id),
                ChangeOp::Create | ChangeOp::Update => {
                    if let Some(local) = self.get(&p.id).cloned() {
                        match items.iter_mut().find(|a| a.id() == p.id) {
                            Some(slot) => *slot = local,
                            None => items.push(local),
                        }
                    }
                }
            }
        }

        tracing::debug!(kind = %T::KIND, count = items.len(), "installing snapshot");
        self.items = items;
    }

    fn record(&mut self, id: &str, op: ChangeOp) {
        self.seq += 1;
        let seq = self.seq;
        match self.pending.iter().position(|p| p.id == id) {
            Some(index) => {
                let prev = self.pending[index].op;
                match (prev, op) {
                    // never reached the server, nothing to tell it
                    (ChangeOp::Create, ChangeOp::Remove) => {
                        self.pending.remove(index);
                    }
                    (ChangeOp::Create, _) => self.pending[index].seq = seq,
                    // the server still holds the removed item
                    (ChangeOp::Remove, ChangeOp::Create) => {
                        self.pending[index].op = ChangeOp::Update;
                        self.pending[index].seq = seq;
                    }
                    (_, op) => {
                        self.pending[index].op = op;
                        self.pending[index].seq = seq;
                    }
                }
            }
            None => self.pending.push(Pending {
                id: id.to_owned(),
                op,
                seq,
            }),
        }
    }
}

/// Mints a fresh identifier not yet taken in the collection.
pub fn generate_id<T: Entity>(collection: &Collection<T>) -> Result<String, Error> {
    const ATTEMPTS: usize = 8;
    for _ in 0..ATTEMPTS {
        let id = uuid::Uuid::new_v4().to_string();
        if !collection.contains(&id) {
            return Ok(id);
        }
        tracing::debug!(kind = %T::KIND, %id, "generated identifier already taken, retrying");
    }
    Err(Error::DuplicateIdentifier {
        kind: T::KIND,
        id: "<generated>".to_owned(),
    })
}
