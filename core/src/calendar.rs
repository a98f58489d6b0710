// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use jiff::civil::Date;

use crate::Schedule;

/// Schedules grouped by the days they occur on.
///
/// Rebuilt from scratch on every plot cycle. A schedule spanning several days is
/// listed under each of them, in the order the schedules were fed in.
#[derive(Debug, Clone, Default)]
pub struct DayIndex {
    days: HashMap<Date, Vec<Schedule>>,
}

impl DayIndex {
    /// Builds the index from all schedules.
    pub fn build<'a>(schedules: impl IntoIterator<Item = &'a Schedule>) -> Self {
        let mut days: HashMap<Date, Vec<Schedule>> = HashMap::new();
        for schedule in schedules {
            for day in schedule.days() {
                let list = days.entry(day).or_default();
                // a date listed twice must not plot the schedule twice
                if !list.iter().any(|a| a.id == schedule.id) {
                    list.push(schedule.clone());
                }
            }
        }

        tracing::debug!(days = days.len(), "day index rebuilt");
        Self { days }
    }

    /// Schedules on the day, in insertion order.
    pub fn get(&self, date: Date) -> &[Schedule] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of days with at least one schedule.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no day has a schedule.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// A colored indicator drawn inside a calendar cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip {
    /// Schedule drawn by the strip, `None` for the placeholder of an empty day.
    pub schedule_id: Option<String>,

    /// Title of the schedule.
    pub title: String,

    /// Style class of the schedule's category.
    pub style: Option<&'static str>,

    /// Height in cell units.
    pub height: u16,
}

impl Strip {
    /// Whether this is the placeholder of an empty day.
    pub fn is_placeholder(&self) -> bool {
        self.schedule_id.is_none()
    }
}

/// Everything drawn in one calendar cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPlot {
    /// The day of the cell.
    pub date: Date,

    /// Indicator strips, top to bottom.
    pub strips: Vec<Strip>,

    /// Whether a deadline marker is drawn.
    pub deadline: bool,
}

/// Derives calendar cell contents from a [`DayIndex`].
#[derive(Debug, Clone, Copy)]
pub struct CalendarPlotter {
    cell_height: u16,
}

impl CalendarPlotter {
    /// Creates a plotter for cells of the given height.
    pub fn new(cell_height: u16) -> Self {
        Self { cell_height }
    }

    /// Height of a calendar cell.
    pub fn cell_height(&self) -> u16 {
        self.cell_height
    }

    /// Changes the height of a calendar cell, e.g. after a resize.
    pub fn set_cell_height(&mut self, cell_height: u16) {
        self.cell_height = cell_height;
    }

    /// Height of each strip when `count` strips share a cell.
    pub fn strip_height(&self, count: usize) -> u16 {
        if count == 0 {
            return self.cell_height;
        }
        let count = count as i64;
        let height = (i64::from(self.cell_height) - 2 * count) / count;
        height.clamp(1, i64::from(u16::MAX)) as u16
    }

    /// Plots one day.
    pub fn plot_day(&self, index: &DayIndex, date: Date) -> CellPlot {
        let schedules = index.get(date);
        let regular: Vec<&Schedule> = schedules.iter().filter(|a| !a.is_deadline()).collect();
        let deadline = schedules.iter().any(Schedule::is_deadline);

        let strips = if regular.is_empty() {
            vec![Strip {
                schedule_id: None,
                title: String::new(),
                style: None,
                height: self.cell_height,
            }]
        } else {
            let height = self.strip_height(regular.len());
            regular
                .into_iter()
                .map(|a| Strip {
                    schedule_id: Some(a.id.clone()),
                    title: a.title.clone(),
                    style: Some(a.category_style()),
                    height,
                })
                .collect()
        };

        CellPlot {
            date,
            strips,
            deadline,
        }
    }

    /// Plots every day from `start` to `end`, both inclusive.
    pub fn plot_range(&self, index: &DayIndex, start: Date, end: Date) -> Vec<CellPlot> {
        let mut plots = Vec::new();
        let mut day = start;
        while day <= end {
            plots.push(self.plot_day(index, day));
            match day.tomorrow() {
                Ok(next) => day = next,
                Err(_) => break,
            }
        }
        plots
    }

    /// Plots every day of a month.
    pub fn plot_month(&self, index: &DayIndex, year: i16, month: i8) -> Vec<CellPlot> {
        let Ok(first) = Date::new(year, month, 1) else {
            tracing::warn!(year, month, "invalid month to plot");
            return Vec::new();
        };
        self.plot_range(index, first, first.last_of_month())
    }
}
