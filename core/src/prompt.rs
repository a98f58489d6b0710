// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::EntityKind;

/// Surfaces messages and decisions to the user.
pub trait UserPrompt {
    /// Shows a blocking message.
    fn alert(&self, message: &str);

    /// Asks the user to pick a new identifier for an item whose locally minted
    /// identifier collides with the server, offering `suggested_id`.
    fn remediate_duplicate(&self, kind: EntityKind, old_id: &str, suggested_id: &str);
}

/// Prompt that only logs, for non-interactive use.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPrompt;

impl UserPrompt for LogPrompt {
    fn alert(&self, message: &str) {
        tracing::warn!(message, "alert");
    }

    fn remediate_duplicate(&self, kind: EntityKind, old_id: &str, suggested_id: &str) {
        tracing::warn!(%kind, old_id, suggested_id, "duplicate identifier needs remediation");
    }
}
