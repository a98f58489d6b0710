// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface and terminal calendar of synccal.

mod cli;
mod cmd_calendar;
mod cmd_conflicts;
mod cmd_person;
mod cmd_schedule;
mod cmd_session;
mod cmd_sync;
mod config;
mod context;
mod formatter;
mod prompt;
mod table;
mod tui;
mod util;

pub use crate::cli::{Cli, Commands, run};
