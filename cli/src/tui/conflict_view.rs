// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use ratatui::style::{Style, Stylize};
use synccal_core::{APP_NAME, ConflictCollector, Schedule};

use crate::formatter::describe_conflicts;
use crate::tui::dialog::{DialogContent, StyleOverrides};

/// Dialog listing pending schedule conflicts with the commands resolving them.
pub fn conflict_dialog(collector: &ConflictCollector<Schedule>) -> (DialogContent, StyleOverrides) {
    let mut lines = describe_conflicts(collector);
    if lines.is_empty() {
        let content = DialogContent::new("Conflicts", vec!["No conflicts".to_string()]);
        return (content, StyleOverrides::default());
    }

    lines.push(String::new());
    lines.push(format!("Take the server's fields: {APP_NAME} conflicts --take-server <ID>"));
    lines.push(format!("Submit the local version: {APP_NAME} conflicts --keep-local <ID>"));
    let overrides = StyleOverrides {
        border_style: Some(Style::new().yellow()),
        ..Default::default()
    };
    (DialogContent::new("Conflicts", lines), overrides)
}
