// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;

use synccal_core::{EntityKind, UserPrompt};

/// Prompt that records every alert and remediation request.
#[derive(Debug, Default)]
pub struct RecordingPrompt {
    pub alerts: RefCell<Vec<String>>,
    pub remediations: RefCell<Vec<(EntityKind, String, String)>>,
}

impl RecordingPrompt {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn remediations(&self) -> Vec<(EntityKind, String, String)> {
        self.remediations.borrow().clone()
    }
}

impl UserPrompt for RecordingPrompt {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_owned());
    }

    fn remediate_duplicate(&self, kind: EntityKind, old_id: &str, suggested_id: &str) {
        self.remediations
            .borrow_mut()
            .push((kind, old_id.to_owned(), suggested_id.to_owned()));
    }
}
