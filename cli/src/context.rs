// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, error::Error, rc::Rc};

use synccal_core::{
    Collection, Config, ConflictCollector, Coordinator, HttpSyncManager, Journal, LocalStorage,
    Person, PersonStore, Schedule, ScheduleStore, Session, SyncConfig, SyncState, Synchronizer,
    UserPrompt,
};

use crate::prompt::TerminalPrompt;

/// Everything a command works with, wired once per run.
pub struct Context {
    pub config: Config,
    pub persons: Rc<RefCell<Collection<Person>>>,
    pub schedules: Rc<RefCell<Collection<Schedule>>>,
    pub sync: Synchronizer,
    pub person_store: Rc<PersonStore>,
    pub schedule_store: Rc<ScheduleStore>,
    pub conflicts: Rc<RefCell<ConflictCollector<Schedule>>>,
    pub session: Session,
    pub prompt: Rc<TerminalPrompt>,
    pub coordinator: Coordinator,
    journal: Journal,
}

impl Context {
    pub async fn new(mut config: Config, sync_config: SyncConfig) -> Result<Self, Box<dyn Error>> {
        config.normalize()?;
        let storage = LocalStorage::open(config.state_dir.as_deref()).await?;
        let journal = storage.journal();
        let session = Session::new(storage);

        // edits and conflicts left over by earlier runs
        let persons = Rc::new(RefCell::new(journal.load_collection::<Person>().await?));
        let schedules = Rc::new(RefCell::new(journal.load_collection::<Schedule>().await?));
        let conflicts = Rc::new(RefCell::new(journal.load_conflicts::<Schedule>().await?));

        let manager = HttpSyncManager::new(sync_config)?;
        manager.attach(persons.clone());
        manager.attach(schedules.clone());
        let sync = Synchronizer::new(Rc::new(manager));

        let prompt = Rc::new(TerminalPrompt::new());

        let person_store = Rc::new(PersonStore::new(persons.clone(), sync.clone()));
        PersonStore::register_to(person_store.clone(), prompt.clone());

        let schedule_store = Rc::new(ScheduleStore::new(
            schedules.clone(),
            persons.clone(),
            sync.clone(),
        ));
        ScheduleStore::register_to(schedule_store.clone(), prompt.clone());
        schedule_store.set_default_creator(session.logged_in_person().await?);

        {
            let schedule_store = schedule_store.clone();
            person_store.on_remap(move |old_id, new_id| {
                schedule_store.remap_user(old_id, new_id);
            });
        }

        {
            let prompt = prompt.clone();
            ConflictCollector::register_to(conflicts.clone(), &sync, move |conflicts| {
                tracing::info!(count = conflicts.len(), "schedule conflicts pending review");
                prompt.alert(&format!(
                    "{} schedule conflict(s) pending review, see `synccal conflicts`",
                    conflicts.len()
                ));
            });
        }

        let coordinator = Coordinator::new(sync.clone(), prompt.clone());
        Ok(Self {
            config,
            persons,
            schedules,
            sync,
            person_store,
            schedule_store,
            conflicts,
            session,
            prompt,
            coordinator,
            journal,
        })
    }

    /// Registers every entity type and pulls the server state.
    pub async fn startup(&mut self) -> SyncState {
        self.coordinator.startup().await
    }

    /// Drops the collected conflict on the schedule once the user re-submitted it.
    pub fn resolve_conflict(&self, id: &str) -> bool {
        let mut conflicts = self.conflicts.borrow_mut();
        match conflicts.find(id) {
            Some(index) => conflicts.resolve(index).is_some(),
            None => false,
        }
    }

    /// Saves the collections and pending conflicts, then closes the local storage.
    pub async fn close(self) -> Result<(), synccal_core::Error> {
        let saved = self.save().await;
        self.session.storage().clone().close().await;
        saved
    }

    async fn save(&self) -> Result<(), synccal_core::Error> {
        let persons = self.persons.borrow().clone();
        self.journal.save_collection(&persons).await?;
        let schedules = self.schedules.borrow().clone();
        self.journal.save_collection(&schedules).await?;
        let conflicts = self.conflicts.borrow().clone();
        self.journal.save_conflicts(&conflicts).await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
