// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;

use colored::Colorize;
use synccal_core::{APP_NAME, EntityKind, UserPrompt};

/// Collects alerts raised while a command runs.
///
/// Commands print them once they finish, the calendar shows them in its dialog.
#[derive(Debug, Default)]
pub struct TerminalPrompt {
    messages: RefCell<Vec<String>>,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the pending messages, oldest first.
    pub fn take(&self) -> Vec<String> {
        self.messages.take()
    }

    /// Prints and clears the pending messages.
    pub fn flush(&self) {
        for message in self.take() {
            println!("{} {}", "Alert:".yellow(), message);
        }
    }
}

impl UserPrompt for TerminalPrompt {
    fn alert(&self, message: &str) {
        tracing::debug!(message, "alert queued");
        self.messages.borrow_mut().push(message.to_owned());
    }

    fn remediate_duplicate(&self, kind: EntityKind, old_id: &str, suggested_id: &str) {
        tracing::debug!(%kind, old_id, suggested_id, "remediation queued");
        self.messages
            .borrow_mut()
            .push(remediation_hint(kind, old_id, suggested_id));
    }
}

fn remediation_hint(kind: EntityKind, old_id: &str, suggested_id: &str) -> String {
    let command = match kind {
        EntityKind::Person => {
            format!("{APP_NAME} person new --id {suggested_id} --previous-id {old_id}")
        }
        EntityKind::Schedule => format!("{APP_NAME} schedule remediate {old_id} {suggested_id}"),
    };
    format!("Choose a new {kind} id for \"{old_id}\", e.g. `{command}`")
}
