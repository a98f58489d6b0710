// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::{cell::RefCell, rc::Rc};

use ratatui::crossterm::event::KeyCode;
use synccal_core::Viewport;

type Handler = Rc<RefCell<dyn FnMut(&Action)>>;

/// Who an action is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Calendar,
    Dialog,
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Key,
    Navigate,
    Resize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Key(KeyCode),
    MoveDays(i32),
    MoveMonths(i32),
    Today,
    Resize(Viewport),
}

/// Routes actions to the handlers subscribed to a (target, event kind) pair.
pub struct Dispatcher {
    handlers: HashMap<(Target, EventKind), Vec<Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn on(&mut self, target: Target, kind: EventKind, handler: Handler) {
        self.handlers.entry((target, kind)).or_default().push(handler);
    }

    /// Invokes every handler of the pair and returns how many ran. Pairs nobody
    /// subscribed to are ignored.
    pub fn dispatch(&self, target: Target, kind: EventKind, action: &Action) -> usize {
        let Some(handlers) = self.handlers.get(&(target, kind)) else {
            tracing::trace!(?target, ?kind, "no handler for action");
            return 0;
        };

        for handler in handlers {
            (handler.borrow_mut())(action);
        }
        handlers.len()
    }
}
