// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::Date;

use crate::{Category, Entity, EntityKind, Error};

/// The date format used by schedules, e.g. `2024/05/01`.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// A schedule on the calendar, spanning one or more days.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Schedule {
    /// The unique identifier of the schedule.
    pub id: String,

    /// Title shown on the calendar.
    pub title: String,

    /// Category, decides the style of the calendar strip.
    #[serde(default)]
    pub category: Category,

    /// Days the schedule occurs on, formatted as `YYYY/MM/DD`.
    #[serde(default)]
    pub dates: Vec<String>,

    /// Where it takes place.
    #[serde(default)]
    pub place: String,

    /// Start time, free form such as `10:00`.
    #[serde(default)]
    pub start_time: String,

    /// Finish time, free form such as `11:30`.
    #[serde(default)]
    pub finish_time: String,

    /// Detail text.
    #[serde(default)]
    pub detail: String,

    /// Identifiers of the people attending.
    #[serde(default)]
    pub user_ids: Vec<String>,

    /// Identifier of the person who registered the schedule.
    #[serde(default)]
    pub creator_id: Option<String>,
}

impl Schedule {
    /// Style class derived from the category.
    pub fn category_style(&self) -> &'static str {
        self.category.style()
    }

    /// Whether the schedule is a deadline.
    pub fn is_deadline(&self) -> bool {
        self.category.is_deadline()
    }

    /// The days of the schedule. Malformed entries are skipped.
    pub fn days(&self) -> impl Iterator<Item = Date> + '_ {
        self.dates.iter().filter_map(|s| match parse_date(s) {
            Ok(d) => Some(d),
            Err(err) => {
                tracing::warn!(id = %self.id, date = %s, %err, "skipping malformed schedule date");
                None
            }
        })
    }

    /// Whether the schedule occurs on the day.
    pub fn occurs_on(&self, date: Date) -> bool {
        self.days().any(|d| d == date)
    }
}

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Draft for a schedule, used for registering and editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDraft {
    /// Title shown on the calendar.
    pub title: String,

    /// Category of the schedule.
    pub category: Category,

    /// Days, formatted as `YYYY/MM/DD`.
    pub dates: Vec<String>,

    /// Where it takes place.
    pub place: String,

    /// Start time.
    pub start_time: String,

    /// Finish time.
    pub finish_time: String,

    /// Detail text.
    pub detail: String,

    /// People attending, empty slots are allowed and pruned on save.
    pub user_ids: Vec<String>,

    /// Person who registers the schedule.
    pub creator_id: Option<String>,
}

impl ScheduleDraft {
    /// Creates a draft carrying the state of an existing schedule.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            title: schedule.title.clone(),
            category: schedule.category,
            dates: schedule.dates.clone(),
            place: schedule.place.clone(),
            start_time: schedule.start_time.clone(),
            finish_time: schedule.finish_time.clone(),
            detail: schedule.detail.clone(),
            user_ids: schedule.user_ids.clone(),
            creator_id: schedule.creator_id.clone(),
        }
    }

    /// Validates dates and prunes empty or repeated user slots.
    pub(crate) fn normalize(mut self) -> Result<Self, Error> {
        let mut dates: Vec<String> = Vec::with_capacity(self.dates.len());
        for s in &self.dates {
            let date = format_date(parse_date(s)?);
            if !dates.contains(&date) {
                dates.push(date);
            }
        }
        self.dates = dates;

        let mut user_ids: Vec<String> = Vec::with_capacity(self.user_ids.len());
        for id in self.user_ids.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            if !user_ids.iter().any(|a| a == id) {
                user_ids.push(id.to_owned());
            }
        }
        self.user_ids = user_ids;

        self.creator_id = self.creator_id.filter(|a| !a.trim().is_empty());
        Ok(self)
    }

    pub(crate) fn into_schedule(self, id: String) -> Schedule {
        Schedule {
            id,
            title: self.title,
            category: self.category,
            dates: self.dates,
            place: self.place,
            start_time: self.start_time,
            finish_time: self.finish_time,
            detail: self.detail,
            user_ids: self.user_ids,
            creator_id: self.creator_id,
        }
    }
}

/// Parses a `YYYY/MM/DD` date.
pub fn parse_date(s: &str) -> Result<Date, Error> {
    Date::strptime(DATE_FORMAT, s.trim()).map_err(|e| Error::InvalidDate(format!("{s}: {e}")))
}

/// Formats a date as `YYYY/MM/DD`.
pub fn format_date(date: Date) -> String {
    date.strftime(DATE_FORMAT).to_string()
}
