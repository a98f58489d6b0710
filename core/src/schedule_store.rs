// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, fmt, rc::Rc};

use crate::conflict::ConflictRecord;
use crate::{
    Collection, Entity, EntityKind, Error, NotificationKind, Person, Schedule, ScheduleDraft,
    SyncNotification, Synchronizer, UserPrompt, Written, generate_id,
};

/// CRUD on schedules, every write followed by a synchronization pass.
///
/// Conflicts on schedules are left to a [`crate::ConflictCollector`], the store only
/// reacts to duplicate identifiers.
pub struct ScheduleStore {
    schedules: Rc<RefCell<Collection<Schedule>>>,
    persons: Rc<RefCell<Collection<Person>>>,
    sync: Synchronizer,
    default_creator: RefCell<Option<String>>,
}

impl ScheduleStore {
    pub fn new(
        schedules: Rc<RefCell<Collection<Schedule>>>,
        persons: Rc<RefCell<Collection<Person>>>,
        sync: Synchronizer,
    ) -> Self {
        Self {
            schedules,
            persons,
            sync,
            default_creator: RefCell::new(None),
        }
    }

    /// Subscribes the store to duplicate-id notifications on schedules.
    pub fn register_to(that: Rc<Self>, prompt: Rc<dyn UserPrompt>) {
        let sync = that.sync.clone();
        let callback = Rc::new(RefCell::new(move |n: &SyncNotification| {
            if n.kind != NotificationKind::DuplicateId {
                return;
            }
            let Some(record) = ConflictRecord::<Schedule>::from_notification(n) else {
                return;
            };

            let items = record
                .changed
                .into_iter()
                .map(|a| a.local)
                .chain(record.removed);
            for item in items {
                let suggested = that.suggest_id(item.id());
                prompt.alert(&format!("The schedule id \"{}\" is already taken", item.id()));
                prompt.remediate_duplicate(EntityKind::Schedule, item.id(), &suggested);
            }
        }));
        sync.subscribe(callback);
    }

    /// The underlying collection.
    pub fn collection(&self) -> &Rc<RefCell<Collection<Schedule>>> {
        &self.schedules
    }

    /// Creator used when a draft names none, usually the logged-in person.
    pub fn set_default_creator(&self, person_id: Option<String>) {
        *self.default_creator.borrow_mut() = person_id;
    }

    /// Registers a new schedule.
    pub async fn register(&self, draft: ScheduleDraft) -> Result<Written<Schedule>, Error> {
        let mut draft = draft.normalize()?;
        if draft.creator_id.is_none() {
            draft.creator_id = self.default_creator.borrow().clone();
        }

        let schedule = {
            let mut schedules = self.schedules.borrow_mut();
            let schedule = draft.into_schedule(generate_id(&schedules)?);
            schedules.create(schedule.clone())?;
            schedule
        };

        tracing::info!(id = %schedule.id, "schedule registered");
        self.finish(schedule).await
    }

    /// Replaces the schedule `id` with the draft.
    ///
    /// With `acknowledged`, a conflict already shown to the user on this schedule is
    /// marked as resolved so it is not reported again.
    pub async fn update(
        &self,
        draft: ScheduleDraft,
        id: &str,
        acknowledged: bool,
    ) -> Result<Written<Schedule>, Error> {
        let schedule = draft.normalize()?.into_schedule(id.to_owned());
        self.schedules.borrow_mut().set(schedule.clone())?;
        if acknowledged {
            self.sync.mark_resolved(EntityKind::Schedule, id);
        }

        tracing::info!(id, acknowledged, "schedule updated");
        self.finish(schedule).await
    }

    /// Deletes a schedule.
    pub async fn delete(&self, id: &str, acknowledged: bool) -> Result<Written<Schedule>, Error> {
        let schedule = self
            .schedules
            .borrow_mut()
            .remove(id)
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::Schedule,
                id: id.to_owned(),
            })?;
        if acknowledged {
            self.sync.mark_resolved(EntityKind::Schedule, id);
        }

        tracing::info!(id, acknowledged, "schedule deleted");
        self.finish(schedule).await
    }

    /// Moves a schedule whose identifier collided on the server to `new_id`.
    ///
    /// The local collection is left untouched if the server refuses.
    pub async fn remediate(&self, old_id: &str, new_id: &str) -> Result<Written<Schedule>, Error> {
        self.sync
            .resolve_duplicate(new_id, old_id, EntityKind::Schedule)
            .await?;

        let schedule = {
            let mut schedules = self.schedules.borrow_mut();
            if schedules.contains(old_id) {
                schedules.rename(old_id, new_id)?;
            }
            schedules.get(new_id).cloned().ok_or_else(|| Error::NotFound {
                kind: EntityKind::Schedule,
                id: new_id.to_owned(),
            })?
        };

        tracing::info!(old_id, new_id, "schedule identifier remapped");
        self.finish(schedule).await
    }

    /// Get a schedule by identifier.
    pub fn get(&self, id: &str) -> Option<Schedule> {
        self.schedules.borrow().get(id).cloned()
    }

    /// All schedules, in insertion order.
    pub fn list(&self) -> Vec<Schedule> {
        self.schedules.borrow().iter().cloned().collect()
    }

    /// People attending the schedule, resolved on every call. Unknown ids are skipped.
    pub fn users_of(&self, schedule: &Schedule) -> Vec<Person> {
        let persons = self.persons.borrow();
        persons
            .get_many(schedule.user_ids.as_slice())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Display name of the creator, if known.
    pub fn creator_name(&self, schedule: &Schedule) -> Option<String> {
        let id = schedule.creator_id.as_deref()?;
        self.persons.borrow().get(id).map(|a| a.name.clone())
    }

    /// Rewrites references to a person whose identifier was remapped.
    ///
    /// Only local state is touched, the changes go out with the next pass.
    pub fn remap_user(&self, old_id: &str, new_id: &str) -> usize {
        let mut schedules = self.schedules.borrow_mut();
        let affected: Vec<Schedule> = schedules
            .iter()
            .filter(|s| {
                s.user_ids.iter().any(|a| a == old_id) || s.creator_id.as_deref() == Some(old_id)
            })
            .cloned()
            .collect();

        let count = affected.len();
        for mut schedule in affected {
            for user in schedule.user_ids.iter_mut().filter(|a| a.as_str() == old_id) {
                *user = new_id.to_owned();
            }
            let mut seen = Vec::with_capacity(schedule.user_ids.len());
            schedule.user_ids.retain(|a| {
                let first = !seen.contains(a);
                seen.push(a.clone());
                first
            });
            if schedule.creator_id.as_deref() == Some(old_id) {
                schedule.creator_id = Some(new_id.to_owned());
            }
            if let Err(err) = schedules.set(schedule) {
                tracing::warn!(%err, "failed to remap schedule user");
            }
        }

        tracing::debug!(old_id, new_id, count, "remapped schedule users");
        count
    }

    /// A free identifier derived from `id`: `id-2`, `id-3`, ...
    pub fn suggest_id(&self, id: &str) -> String {
        let schedules = self.schedules.borrow();
        (2..)
            .map(|n| format!("{id}-{n}"))
            .find(|a| !schedules.contains(a))
            .unwrap_or_else(|| format!("{id}-{}", uuid::Uuid::new_v4()))
    }

    async fn finish(&self, schedule: Schedule) -> Result<Written<Schedule>, Error> {
        let outcome = self.sync.sync().await.into();
        Ok(Written {
            item: schedule,
            outcome,
        })
    }
}

impl fmt::Debug for ScheduleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleStore")
            .field("schedules", &self.schedules.borrow().len())
            .field("default_creator", &self.default_creator.borrow())
            .field("sync", &self.sync)
            .finish()
    }
}
