// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use synccal_core::{
    Category, Collection, ConflictCollector, Person, PersonDraft, PersonStore, Schedule,
    ScheduleDraft, ScheduleStore, Synchronizer,
};

use crate::common::{FakeSyncManager, RecordingPrompt};

/// Creates a person draft without identifier.
#[must_use]
pub fn person_draft(name: &str, age: Option<u32>, organization: &str) -> PersonDraft {
    PersonDraft {
        id: None,
        name: name.to_string(),
        age,
        organization: organization.to_string(),
    }
}

/// Creates a schedule draft.
#[must_use]
pub fn schedule_draft(title: &str, category: Category, dates: &[&str]) -> ScheduleDraft {
    ScheduleDraft {
        title: title.to_string(),
        category,
        dates: dates.iter().map(|a| a.to_string()).collect(),
        ..Default::default()
    }
}

/// A schedule as the server would send it.
#[must_use]
pub fn schedule_json(id: &str, title: &str, dates: &[&str]) -> Value {
    json!({"id": id, "title": title, "category": "meeting", "dates": dates})
}

/// Wraps a conflict record for one entity type.
#[must_use]
pub fn conflict_payload(kind: &str, changed: Vec<(Value, Value)>, removed: Vec<Value>) -> Value {
    let changed: Vec<Value> = changed
        .into_iter()
        .map(|(local, server)| json!({"local": local, "server": server}))
        .collect();
    let mut section = serde_json::Map::new();
    section.insert(kind.to_string(), json!({"changed": changed, "removed": removed}));
    json!({ "conflicted": section })
}

/// Collections, stores and collaborators wired the way the application wires them.
pub struct Harness {
    pub manager: Rc<FakeSyncManager>,
    pub sync: Synchronizer,
    pub prompt: Rc<RecordingPrompt>,
    pub persons: Rc<RefCell<Collection<Person>>>,
    pub schedules: Rc<RefCell<Collection<Schedule>>>,
    pub person_store: Rc<PersonStore>,
    pub schedule_store: Rc<ScheduleStore>,
    pub conflicts: Rc<RefCell<ConflictCollector<Schedule>>>,
    /// Number of times the collector asked for a presentation pass.
    pub presented: Rc<RefCell<usize>>,
}

impl Harness {
    #[must_use]
    pub fn new() -> Self {
        let manager = Rc::new(FakeSyncManager::new());
        let sync = Synchronizer::new(manager.clone());
        let prompt = Rc::new(RecordingPrompt::default());

        let persons = Rc::new(RefCell::new(Collection::new()));
        let schedules = Rc::new(RefCell::new(Collection::new()));
        let person_store = Rc::new(PersonStore::new(persons.clone(), sync.clone()));
        let schedule_store = Rc::new(ScheduleStore::new(
            schedules.clone(),
            persons.clone(),
            sync.clone(),
        ));

        PersonStore::register_to(person_store.clone(), prompt.clone());
        ScheduleStore::register_to(schedule_store.clone(), prompt.clone());
        {
            let schedule_store = schedule_store.clone();
            person_store.on_remap(move |old, new| {
                schedule_store.remap_user(old, new);
            });
        }

        let conflicts = Rc::new(RefCell::new(ConflictCollector::new()));
        let presented = Rc::new(RefCell::new(0));
        {
            let presented = presented.clone();
            ConflictCollector::register_to(conflicts.clone(), &sync, move |_| {
                *presented.borrow_mut() += 1;
            });
        }

        Self {
            manager,
            sync,
            prompt,
            persons,
            schedules,
            person_store,
            schedule_store,
            conflicts,
            presented,
        }
    }
}
