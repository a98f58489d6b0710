// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Core of the schedule calendar: entity collections synchronized with a server,
//! store adapters that sync after every write, conflict collection and calendar
//! plotting.

mod calendar;
mod category;
mod collection;
mod config;
mod conflict;
mod coordinator;
mod error;
mod http;
mod person;
mod person_store;
mod prompt;
mod schedule;
mod schedule_store;
mod storage;
mod sync;

pub use crate::calendar::{CalendarPlotter, CellPlot, DayIndex, Strip};
pub use crate::category::Category;
pub use crate::collection::{Change, ChangeOp, Collection, Entity, EntityKind, generate_id};
pub use crate::config::{
    APP_NAME, AuthMethod, Config, DEFAULT_CELL_HEIGHT, Device, SyncConfig, expand_path,
    get_config_dir,
};
pub use crate::conflict::{ChangedItem, Conflict, ConflictCollector, ConflictEntry, ConflictRecord};
pub use crate::coordinator::{Coordinator, Region, SyncState, Viewport};
pub use crate::error::{Error, SyncError};
pub use crate::http::{HttpSyncManager, SyncTarget};
pub use crate::person::{Person, PersonDraft};
pub use crate::person_store::PersonStore;
pub use crate::prompt::{LogPrompt, UserPrompt};
pub use crate::schedule::{DATE_FORMAT, Schedule, ScheduleDraft, format_date, parse_date};
pub use crate::schedule_store::ScheduleStore;
pub use crate::storage::{Journal, LocalStorage, Session};
pub use crate::sync::{
    Callback, NotificationKind, STATUS_CONFLICT, STATUS_DUPLICATE, SyncManager, SyncNotification,
    SyncNotifier, SyncOutcome, SyncQuery, SyncReport, Synchronizer, Written,
};
