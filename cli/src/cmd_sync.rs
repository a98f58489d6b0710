// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use synccal_core::SyncState;

use crate::context::Context;

#[derive(Debug, Clone, Copy)]
pub struct CmdSync;

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME).about("Synchronize with the server")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        Self
    }

    pub async fn run(self, ctx: &mut Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!("synchronizing...");
        let state = ctx.coordinator.sync_now().await;
        ctx.prompt.flush();

        let persons = ctx.person_store.list().len();
        let schedules = ctx.schedule_store.list().len();
        match state {
            SyncState::Success => {
                println!("{persons} person(s), {schedules} schedule(s)");
                Ok(())
            }
            SyncState::Conflict => {
                let conflicts = ctx.conflicts.borrow().len();
                println!(
                    "{} {conflicts} schedule conflict(s) pending, review them with `{} conflicts`",
                    "Conflict:".yellow(),
                    synccal_core::APP_NAME,
                );
                Ok(())
            }
            SyncState::NetworkFailure => Err("synchronization failed".into()),
            SyncState::Idle | SyncState::Syncing => Ok(()),
        }
    }
}
