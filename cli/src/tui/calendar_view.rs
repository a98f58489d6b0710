// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, rc::Rc};

use jiff::civil::Date;
use ratatui::crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::symbols::border;
use ratatui::widgets::{Block, Paragraph};
use synccal_core::{Category, CellPlot, Schedule, SyncState, format_date};

use crate::tui::calendar_store::CalendarStore;
use crate::tui::component::{Component, Message};
use crate::tui::dialog::DialogContent;
use crate::tui::dispatcher::{Action, Dispatcher, EventKind, Target};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// The month grid.
#[derive(Debug)]
pub struct CalendarView {
    today: Date,
}

impl CalendarView {
    pub fn new(today: Date) -> Self {
        Self { today }
    }

    fn render_cell(&self, store: &CalendarStore, cell: &CellPlot, area: Rect, buf: &mut Buffer) {
        let mut style = Style::default();
        if cell.date == self.today {
            style = style.bold().underlined();
        }
        if cell.date == store.cursor {
            style = style.reversed();
        }
        buf.set_stringn(area.x, area.y, format!("{:>2}", cell.date.day()), 2, style);
        if cell.deadline && area.width > 4 {
            buf.set_stringn(area.x + 3, area.y, "!", 1, Style::default().red().bold());
        }

        let bottom = area.bottom();
        let mut y = area.y + 1;
        for strip in cell.strips.iter().filter(|a| !a.is_placeholder()) {
            if y >= bottom {
                break;
            }
            let height = strip.height.min(bottom - y);
            let strip_area = Rect::new(area.x, y, area.width.saturating_sub(1), height);
            let style = Style::default().bg(strip_color(strip.style)).fg(Color::Black);
            buf.set_style(strip_area, style);
            buf.set_stringn(
                strip_area.x,
                strip_area.y,
                &strip.title,
                strip_area.width as usize,
                style,
            );
            y += height;
        }
    }

    fn status_line(&self, store: &CalendarStore) -> Line<'static> {
        let state = match store.state {
            SyncState::Idle => "not synced".gray(),
            SyncState::Syncing => "syncing...".yellow(),
            SyncState::Success => "synced".green(),
            SyncState::Conflict => "conflict".yellow().bold(),
            SyncState::NetworkFailure => "offline".red().bold(),
        };
        let mut spans = vec![" ".into(), state];
        if store.conflicts > 0 {
            spans.push(format!(" | {} conflict(s)", store.conflicts).yellow());
        }
        spans.push(format!(" | {}", format_date(store.cursor)).into());
        Line::from(spans)
    }
}

impl Component<CalendarStore> for CalendarView {
    fn render(&self, store: &Rc<RefCell<CalendarStore>>, area: Rect, buf: &mut Buffer) {
        let store = store.borrow();
        let title = Line::from(format!(" {}/{:02} ", store.year(), store.month()).bold());
        let block = Block::bordered()
            .border_set(border::ROUNDED)
            .title(title.centered())
            .title_bottom(instructions().centered());
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(first) = store.cells.first() else {
            return;
        };
        if inner.width < 7 || inner.height < 3 {
            Paragraph::new("Terminal too small").render(inner, buf);
            return;
        }

        let [header, grid, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let offset = usize::try_from(first.date.weekday().to_monday_zero_offset()).unwrap_or(0);
        let weeks = (offset + store.cells.len()).div_ceil(7);
        let col_width = inner.width / 7;
        let row_height = grid.height / weeks.max(1) as u16;

        for (i, name) in WEEKDAYS.iter().enumerate() {
            let x = header.x + i as u16 * col_width;
            buf.set_stringn(x, header.y, name, col_width as usize, Style::default().bold());
        }

        if row_height > 0 {
            for (i, cell) in store.cells.iter().enumerate() {
                let pos = offset + i;
                let cell_area = Rect::new(
                    grid.x + (pos % 7) as u16 * col_width,
                    grid.y + (pos / 7) as u16 * row_height,
                    col_width,
                    row_height,
                );
                self.render_cell(&store, cell, cell_area, buf);
            }
        }

        self.status_line(&store).render(status, buf);
    }

    fn on_key(
        &mut self,
        dispatcher: &Dispatcher,
        _store: &Rc<RefCell<CalendarStore>>,
        key: KeyCode,
    ) -> Option<Message> {
        let navigate = match key {
            KeyCode::Left | KeyCode::Char('h') => Action::MoveDays(-1),
            KeyCode::Right | KeyCode::Char('l') => Action::MoveDays(1),
            KeyCode::Up | KeyCode::Char('k') => Action::MoveDays(-7),
            KeyCode::Down | KeyCode::Char('j') => Action::MoveDays(7),
            KeyCode::PageUp | KeyCode::Char('p') => Action::MoveMonths(-1),
            KeyCode::PageDown | KeyCode::Char('n') => Action::MoveMonths(1),
            KeyCode::Char('t') => Action::Today,
            KeyCode::Char('s') => return Some(Message::Sync),
            KeyCode::Char('c') => return Some(Message::ShowConflicts),
            KeyCode::Enter => return Some(Message::ShowDay),
            KeyCode::Char('q') | KeyCode::Esc => return Some(Message::Exit),
            _ => return None,
        };
        dispatcher.dispatch(Target::Calendar, EventKind::Navigate, &navigate);
        Some(Message::Handled)
    }
}

/// Dialog content listing the schedules of the selected day.
pub fn day_content(store: &CalendarStore) -> DialogContent {
    let lines = match store.selected() {
        [] => vec!["No schedules".to_string()],
        schedules => schedules.iter().map(describe_schedule).collect(),
    };
    DialogContent::new(format_date(store.cursor), lines)
}

fn describe_schedule(schedule: &Schedule) -> String {
    let mut line = format!(
        "#{} [{}] {}",
        schedule.id,
        schedule.category.name(),
        schedule.title
    );
    if !schedule.start_time.is_empty() || !schedule.finish_time.is_empty() {
        line.push_str(&format!(" {}~{}", schedule.start_time, schedule.finish_time));
    }
    if !schedule.place.is_empty() {
        line.push_str(&format!(" @ {}", schedule.place));
    }
    line
}

/// Background color of a strip drawn with a category style class.
fn strip_color(style: Option<&str>) -> Color {
    let category = style
        .and_then(|a| a.strip_prefix("category-"))
        .and_then(|a| a.parse::<Category>().ok());

    match category {
        Some(Category::Meeting) => Color::Blue,
        Some(Category::Business) => Color::Cyan,
        Some(Category::Outing) => Color::Green,
        Some(Category::Holiday) => Color::Magenta,
        Some(Category::Deadline) => Color::Red,
        Some(Category::Other) | None => Color::Gray,
    }
}

fn instructions() -> Line<'static> {
    Line::from(vec![
        " Move ".into(),
        "<Arrows>".blue().bold(),
        " Month ".into(),
        "<PgUp/PgDn>".blue().bold(),
        " Day ".into(),
        "<Enter>".blue().bold(),
        " Sync ".into(),
        "<s>".blue().bold(),
        " Conflicts ".into(),
        "<c>".blue().bold(),
        " Quit ".into(),
        "<q> ".blue().bold(),
    ])
}
