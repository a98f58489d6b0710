// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use colored::Color;
use synccal_core::{Category, ConflictCollector, ConflictEntry, NotificationKind, Person, Schedule};

use crate::table::{Column, PaddingDirection, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonColumn {
    Id,
    Name,
    Age,
    Organization,
}

impl PersonColumn {
    pub fn columns(verbose: bool) -> Vec<Self> {
        use PersonColumn::*;
        match verbose {
            true => vec![Id, Name, Age, Organization],
            false => vec![Id, Name, Organization],
        }
    }
}

impl Column<Person> for PersonColumn {
    fn format(&self, data: &Person) -> String {
        match self {
            PersonColumn::Id => format!("#{}", data.id),
            PersonColumn::Name => data.name.clone(),
            PersonColumn::Age => data.age.map(|a| a.to_string()).unwrap_or_default(),
            PersonColumn::Organization => data.organization.clone(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            PersonColumn::Age => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn get_color(&self, _data: &Person) -> Option<Color> {
        match self {
            PersonColumn::Id => Some(Color::BrightBlack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleColumn {
    Id,
    Category,
    Dates,
    Time,
    Title,
    Place,
    Users,
}

impl ScheduleColumn {
    pub fn columns(verbose: bool) -> Vec<Self> {
        use ScheduleColumn::*;
        match verbose {
            true => vec![Id, Category, Dates, Time, Title, Place, Users],
            false => vec![Id, Category, Dates, Title],
        }
    }
}

impl Column<Schedule> for ScheduleColumn {
    fn format(&self, data: &Schedule) -> String {
        match self {
            ScheduleColumn::Id => format!("#{}", data.id),
            ScheduleColumn::Category => data.category.name().to_string(),
            ScheduleColumn::Dates => format_dates(&data.dates),
            ScheduleColumn::Time => match (data.start_time.as_str(), data.finish_time.as_str()) {
                ("", "") => String::new(),
                (start, finish) => format!("{start}~{finish}"),
            },
            ScheduleColumn::Title => data.title.clone(),
            ScheduleColumn::Place => data.place.clone(),
            ScheduleColumn::Users => data.user_ids.join(","),
        }
    }

    fn get_color(&self, data: &Schedule) -> Option<Color> {
        match self {
            ScheduleColumn::Id => Some(Color::BrightBlack),
            ScheduleColumn::Category => Some(category_color(data.category)),
            _ => None,
        }
    }
}

/// Terminal color of a category.
pub fn category_color(category: Category) -> Color {
    match category {
        Category::Meeting => Color::Blue,
        Category::Business => Color::Cyan,
        Category::Outing => Color::Green,
        Category::Holiday => Color::Magenta,
        Category::Deadline => Color::Red,
        Category::Other => Color::White,
    }
}

pub fn format_persons(persons: &[Person], verbose: bool) -> String {
    let columns = PersonColumn::columns(verbose);
    Table::new(&columns, persons).to_string()
}

pub fn format_schedules(schedules: &[Schedule], verbose: bool) -> String {
    let columns = ScheduleColumn::columns(verbose);
    Table::new(&columns, schedules).to_string()
}

/// One line per pending conflict, prefixed with its index.
pub fn describe_conflicts(collector: &ConflictCollector<Schedule>) -> Vec<String> {
    collector
        .conflicts()
        .iter()
        .enumerate()
        .map(|(i, conflict)| {
            let what = match &conflict.entry {
                ConflictEntry::Changed {
                    server: Some(_), ..
                } => match collector.diff(i) {
                    fields if fields.is_empty() => "changed on both sides".to_string(),
                    fields => format!("differs in {}", fields.join(", ")),
                },
                ConflictEntry::Changed { server: None, .. } => "removed on the server".to_string(),
                ConflictEntry::Removed(_) => "removed here, changed on the server".to_string(),
            };
            let taken = match conflict.source {
                NotificationKind::DuplicateId => " (id taken)",
                NotificationKind::Conflict => "",
            };
            format!(
                "[{i}] #{} {}: {what}{taken}",
                conflict.id(),
                conflict.local().title
            )
        })
        .collect()
}

fn format_dates(dates: &[String]) -> String {
    match dates {
        [] => String::new(),
        [one] => one.clone(),
        [first, .., last] => format!("{first}..{last} ({} days)", dates.len()),
    }
}
