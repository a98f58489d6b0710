// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, rc::Rc};

use jiff::ToSpan;
use jiff::civil::Date;
use synccal_core::{
    CalendarPlotter, CellPlot, Collection, DayIndex, Region, Schedule, SyncState, Viewport,
};

use crate::tui::dispatcher::{Action, Dispatcher, EventKind, Target};

/// Rows around the grid: borders, weekday header and status line.
const CHROME_ROWS: u16 = 4;

/// A month never spans more than six weeks.
const MAX_WEEKS: u16 = 6;

const MIN_CELL_HEIGHT: u16 = 2;

/// State of the calendar screen.
#[derive(Debug)]
pub struct CalendarStore {
    schedules: Rc<RefCell<Collection<Schedule>>>,
    plotter: CalendarPlotter,
    preferred_cell_height: u16,
    index: DayIndex,

    /// The selected day, the shown month is the month of it.
    pub cursor: Date,
    pub cells: Vec<CellPlot>,
    pub state: SyncState,
    pub conflicts: usize,
}

impl CalendarStore {
    pub fn new(schedules: Rc<RefCell<Collection<Schedule>>>, cell_height: u16, cursor: Date) -> Self {
        Self {
            schedules,
            plotter: CalendarPlotter::new(cell_height),
            preferred_cell_height: cell_height,
            index: DayIndex::default(),
            cursor,
            cells: Vec::new(),
            state: SyncState::Idle,
            conflicts: 0,
        }
    }

    pub fn register_to(that: Rc<RefCell<Self>>, dispatcher: &mut Dispatcher) {
        let callback = Rc::new(RefCell::new(move |action: &Action| match action {
            Action::MoveDays(n) => that.borrow_mut().move_days(*n),
            Action::MoveMonths(n) => that.borrow_mut().move_months(*n),
            Action::Today => {
                let today = jiff::Zoned::now().date();
                that.borrow_mut().jump_to(today);
            }
            _ => (),
        }));
        dispatcher.on(Target::Calendar, EventKind::Navigate, callback);
    }

    pub fn year(&self) -> i16 {
        self.cursor.year()
    }

    pub fn month(&self) -> i8 {
        self.cursor.month()
    }

    /// Schedules of the selected day.
    pub fn selected(&self) -> &[Schedule] {
        self.index.get(self.cursor)
    }

    /// Rebuilds the day index from the collection and plots the shown month.
    pub fn replot(&mut self) {
        self.index = DayIndex::build(self.schedules.borrow().iter());
        self.cells = self
            .plotter
            .plot_month(&self.index, self.year(), self.month());
        tracing::debug!(
            year = self.year(),
            month = self.month(),
            days = self.index.len(),
            "calendar plotted"
        );
    }

    /// Fits the cells into the viewport, never above the configured height.
    pub fn resize(&mut self, viewport: Viewport) {
        let fitted = viewport.height.saturating_sub(CHROME_ROWS) / MAX_WEEKS;
        let height = fitted.clamp(MIN_CELL_HEIGHT, self.preferred_cell_height.max(MIN_CELL_HEIGHT));
        if height != self.plotter.cell_height() {
            self.plotter.set_cell_height(height);
            self.replot();
        }
    }

    pub fn move_days(&mut self, days: i32) {
        match self.cursor.checked_add(days.days()) {
            Ok(date) => self.jump_to(date),
            Err(err) => tracing::debug!(%err, "cursor out of range"),
        }
    }

    pub fn move_months(&mut self, months: i32) {
        match self.cursor.checked_add(months.months()) {
            Ok(date) => self.jump_to(date),
            Err(err) => tracing::debug!(%err, "cursor out of range"),
        }
    }

    pub fn jump_to(&mut self, date: Date) {
        let month_changed = (date.year(), date.month()) != (self.year(), self.month());
        self.cursor = date;
        if month_changed {
            self.replot();
        }
    }
}

/// Lets the coordinator replot and resize the calendar.
#[derive(Debug)]
pub struct CalendarRegion(Rc<RefCell<CalendarStore>>);

impl CalendarRegion {
    pub fn new(store: Rc<RefCell<CalendarStore>>) -> Self {
        Self(store)
    }
}

impl Region for CalendarRegion {
    fn replot(&mut self) {
        self.0.borrow_mut().replot();
    }

    fn resize(&mut self, viewport: Viewport) {
        self.0.borrow_mut().resize(viewport);
    }
}
