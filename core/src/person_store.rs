// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, fmt, rc::Rc};

use crate::conflict::ConflictRecord;
use crate::{
    Collection, Entity, EntityKind, Error, NotificationKind, Person, PersonDraft, SyncNotification,
    Synchronizer, UserPrompt, Written, generate_id,
};

type RemapListener = Box<dyn Fn(&str, &str)>;

/// CRUD on people, every write followed by a synchronization pass.
pub struct PersonStore {
    persons: Rc<RefCell<Collection<Person>>>,
    sync: Synchronizer,
    remap_listeners: RefCell<Vec<RemapListener>>,
}

impl PersonStore {
    /// Creates a store over the person collection.
    pub fn new(persons: Rc<RefCell<Collection<Person>>>, sync: Synchronizer) -> Self {
        Self {
            persons,
            sync,
            remap_listeners: RefCell::new(Vec::new()),
        }
    }

    /// Subscribes the store to conflict and duplicate-id notifications.
    ///
    /// Conflicting changes are re-applied, conflicting removals are removed, and the
    /// user is alerted. Duplicate identifiers ask the user for a corrected one.
    pub fn register_to(that: Rc<Self>, prompt: Rc<dyn UserPrompt>) {
        let sync = that.sync.clone();
        let callback = Rc::new(RefCell::new(move |n: &SyncNotification| {
            that.on_notification(n, prompt.as_ref());
        }));
        sync.subscribe(callback);
    }

    /// Called with `(old_id, new_id)` after a duplicate identifier has been remapped.
    pub fn on_remap(&self, listener: impl Fn(&str, &str) + 'static) {
        self.remap_listeners.borrow_mut().push(Box::new(listener));
    }

    /// The underlying collection.
    pub fn collection(&self) -> &Rc<RefCell<Collection<Person>>> {
        &self.persons
    }

    /// Registers a new person.
    ///
    /// With `previous_id`, the person was created before under a locally minted
    /// identifier which collided on the server; it is remapped to the draft's
    /// identifier first. If remapping fails, nothing is created.
    pub async fn register(
        &self,
        draft: PersonDraft,
        previous_id: Option<&str>,
    ) -> Result<Written<Person>, Error> {
        let id = match draft.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => generate_id(&self.persons.borrow())?,
        };

        let person = match previous_id {
            Some(old_id) => {
                self.sync
                    .resolve_duplicate(&id, old_id, EntityKind::Person)
                    .await?;

                let person = draft.into_person(id.clone());
                {
                    let mut persons = self.persons.borrow_mut();
                    if persons.contains(old_id) && !persons.contains(&id) {
                        persons.rename(old_id, &id)?;
                    }
                    match persons.contains(&id) {
                        true => persons.set(person.clone())?,
                        false => persons.create(person.clone())?,
                    }
                }

                for listener in self.remap_listeners.borrow().iter() {
                    listener(old_id, &id);
                }
                person
            }
            None => {
                let person = draft.into_person(id);
                self.persons.borrow_mut().create(person.clone())?;
                person
            }
        };

        tracing::info!(id = %person.id, "person registered");
        let outcome = self.sync.sync().await.into();
        Ok(Written {
            item: person,
            outcome,
        })
    }

    /// Replaces a person.
    pub async fn update(&self, person: Person) -> Result<Written<Person>, Error> {
        self.persons.borrow_mut().set(person.clone())?;
        tracing::info!(id = %person.id, "person updated");
        let outcome = self.sync.sync().await.into();
        Ok(Written {
            item: person,
            outcome,
        })
    }

    /// Deletes a person.
    pub async fn delete(&self, id: &str) -> Result<Written<Person>, Error> {
        let person = self
            .persons
            .borrow_mut()
            .remove(id)
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::Person,
                id: id.to_owned(),
            })?;

        tracing::info!(id, "person deleted");
        let outcome = self.sync.sync().await.into();
        Ok(Written {
            item: person,
            outcome,
        })
    }

    /// Get a person by identifier.
    pub fn get(&self, id: &str) -> Option<Person> {
        self.persons.borrow().get(id).cloned()
    }

    /// All people, in insertion order.
    pub fn list(&self) -> Vec<Person> {
        self.persons.borrow().iter().cloned().collect()
    }

    /// A free identifier derived from `id`: `id-2`, `id-3`, ...
    pub fn suggest_id(&self, id: &str) -> String {
        let persons = self.persons.borrow();
        (2..)
            .map(|n| format!("{id}-{n}"))
            .find(|a| !persons.contains(a))
            .unwrap_or_else(|| format!("{id}-{}", uuid::Uuid::new_v4()))
    }

    fn on_notification(&self, n: &SyncNotification, prompt: &dyn UserPrompt) {
        let Some(record) = ConflictRecord::<Person>::from_notification(n) else {
            return;
        };
        if record.is_empty() {
            return;
        }

        match n.kind {
            NotificationKind::Conflict => {
                let count = record.changed.len() + record.removed.len();
                {
                    let mut persons = self.persons.borrow_mut();
                    for item in record.changed {
                        tracing::debug!(id = %item.local.id, "re-applying conflicting person");
                        let result = match persons.contains(item.local.id()) {
                            true => persons.set(item.local),
                            false => persons.create(item.local),
                        };
                        if let Err(err) = result {
                            tracing::warn!(%err, "failed to re-apply person");
                        }
                    }
                    for item in record.removed {
                        tracing::debug!(id = %item.id, "removing conflicting person");
                        persons.remove(item.id());
                    }
                }
                prompt.alert(&format!(
                    "{count} person record(s) conflicted with the server, your changes were kept"
                ));
            }
            NotificationKind::DuplicateId => {
                let items = record
                    .changed
                    .into_iter()
                    .map(|a| a.local)
                    .chain(record.removed);
                for item in items {
                    let suggested = self.suggest_id(item.id());
                    prompt.alert(&format!("The id \"{}\" is already taken", item.id()));
                    prompt.remediate_duplicate(EntityKind::Person, item.id(), &suggested);
                }
            }
        }
    }
}

impl fmt::Debug for PersonStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonStore")
            .field("persons", &self.persons.borrow().len())
            .field("sync", &self.sync)
            .finish()
    }
}
