// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, error::Error, rc::Rc};

use jiff::{Zoned, civil::Date};
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use synccal_core::{SyncState, Viewport};

use crate::context::Context;
use crate::tui::calendar_store::{CalendarRegion, CalendarStore};
use crate::tui::calendar_view::{CalendarView, day_content};
use crate::tui::component::{Component, Message};
use crate::tui::conflict_view::conflict_dialog;
use crate::tui::dialog::{DialogContent, DialogPresenter, StyleOverrides};
use crate::tui::dispatcher::{Action, Dispatcher, EventKind, Target};

/// Opens the calendar on the given month until the user quits.
pub async fn run_calendar(ctx: &mut Context, year: i16, month: i8) -> Result<(), Box<dyn Error>> {
    let today = Zoned::now().date();
    let cursor = match (today.year(), today.month()) == (year, month) {
        true => today,
        false => Date::new(year, month, 1)?,
    };

    let store = CalendarStore::new(ctx.schedules.clone(), ctx.config.cell_height, cursor);
    let store = Rc::new(RefCell::new(store));
    ctx.coordinator
        .add_region(Box::new(CalendarRegion::new(store.clone())));
    ctx.coordinator.replot();

    let mut terminal = ratatui::init();
    let result = {
        let size = terminal.size()?;
        let viewport = Viewport::new(size.width, size.height);
        let dialog = DialogPresenter::new(ctx.config.device, viewport);
        let dialog = Rc::new(RefCell::new(dialog));

        let mut dispatcher = Dispatcher::new();
        CalendarStore::register_to(store.clone(), &mut dispatcher);
        DialogPresenter::register_to(dialog.clone(), &mut dispatcher);
        ctx.coordinator.on_resize(viewport);

        let mut app = App {
            store,
            dialog,
            dispatcher,
            view: CalendarView::new(today),
        };
        app.refresh_status(ctx);
        app.event_loop(ctx, &mut terminal).await
    }; // release the app before restoring the terminal
    ratatui::restore();
    result
}

struct App {
    store: Rc<RefCell<CalendarStore>>,
    dialog: Rc<RefCell<DialogPresenter>>,
    dispatcher: Dispatcher,
    view: CalendarView,
}

impl App {
    async fn event_loop(
        &mut self,
        ctx: &mut Context,
        terminal: &mut DefaultTerminal,
    ) -> Result<(), Box<dyn Error>> {
        loop {
            self.show_alerts(ctx);
            self.draw(terminal)?;

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.dialog.borrow().is_visible() {
                        let action = Action::Key(key.code);
                        self.dispatcher.dispatch(Target::Dialog, EventKind::Key, &action);
                        continue;
                    }

                    match self.view.on_key(&self.dispatcher, &self.store, key.code) {
                        Some(Message::Exit) => break Ok(()),
                        Some(Message::Sync) => {
                            self.store.borrow_mut().state = SyncState::Syncing;
                            self.draw(terminal)?;
                            ctx.coordinator.sync_now().await;
                            self.refresh_status(ctx);
                        }
                        Some(Message::ShowDay) => {
                            let content = day_content(&self.store.borrow());
                            self.dialog
                                .borrow_mut()
                                .show(content, StyleOverrides::default());
                        }
                        Some(Message::ShowConflicts) => {
                            let (content, overrides) = conflict_dialog(&ctx.conflicts.borrow());
                            self.dialog.borrow_mut().show(content, overrides);
                        }
                        Some(Message::Handled) | None => {}
                    }
                }
                Event::Resize(width, height) => {
                    let viewport = Viewport::new(width, height);
                    ctx.coordinator.on_resize(viewport);
                    let action = Action::Resize(viewport);
                    self.dispatcher.dispatch(Target::Screen, EventKind::Resize, &action);
                }
                _ => {}
            }
        }
    }

    fn draw(&self, terminal: &mut DefaultTerminal) -> Result<(), Box<dyn Error>> {
        terminal.draw(|frame| {
            let area = frame.area();
            self.view.render(&self.store, area, frame.buffer_mut());
            self.dialog.borrow().render(frame.buffer_mut());
        })?;
        Ok(())
    }

    /// Moves queued alerts into the dialog, they would be lost behind the screen otherwise.
    fn show_alerts(&self, ctx: &Context) {
        let alerts = ctx.prompt.take();
        if !alerts.is_empty() {
            let content = DialogContent::new("Notice", alerts);
            self.dialog
                .borrow_mut()
                .show(content, StyleOverrides::default());
        }
    }

    fn refresh_status(&self, ctx: &Context) {
        let mut store = self.store.borrow_mut();
        store.state = ctx.coordinator.state();
        store.conflicts = ctx.conflicts.borrow().len();
    }
}
