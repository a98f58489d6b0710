// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, rc::Rc};

use ratatui::{crossterm::event::KeyCode, prelude::*};

use crate::tui::dispatcher::Dispatcher;

#[derive(Debug, PartialEq, Eq)]
pub enum Message {
    Handled,
    Sync,
    ShowDay,
    ShowConflicts,
    Exit,
}

pub trait Component<S> {
    /// Renders the component into the given area.
    fn render(&self, store: &Rc<RefCell<S>>, area: Rect, buf: &mut Buffer);

    /// Handles key events for the component.
    fn on_key(
        &mut self,
        _dispatcher: &Dispatcher,
        _store: &Rc<RefCell<S>>,
        _key: KeyCode,
    ) -> Option<Message> {
        None // Default implementation does nothing
    }
}
