// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgAction, ArgMatches, Command, arg};
use colored::Colorize;
use synccal_core::{EntityKind, Schedule, ScheduleDraft};

use crate::context::Context;
use crate::formatter::describe_conflicts;
use crate::util::print_outcome;

#[derive(Debug, Clone, Default)]
pub struct CmdConflicts {
    pub take_server: Vec<String>,
    pub keep_local: Vec<String>,
    pub acknowledge: bool,
}

impl CmdConflicts {
    pub const NAME: &str = "conflicts";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Review schedule conflicts reported by the server")
            .arg(
                arg!(--"take-server" <ID> "Resolve the conflict by taking the server's fields")
                    .action(ArgAction::Append),
            )
            .arg(
                arg!(--"keep-local" <ID> "Resolve the conflict by submitting the local version again")
                    .action(ArgAction::Append),
            )
            .arg(arg!(--acknowledge "Mark every remaining conflict as resolved and sync"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        let ids = |id: &str| {
            matches
                .get_many::<String>(id)
                .map(|a| a.cloned().collect())
                .unwrap_or_default()
        };
        Self {
            take_server: ids("take-server"),
            keep_local: ids("keep-local"),
            acknowledge: matches.get_flag("acknowledge"),
        }
    }

    pub async fn run(self, ctx: &mut Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "reviewing conflicts...");
        let lines = describe_conflicts(&ctx.conflicts.borrow());
        if lines.is_empty() {
            println!("{}", "No conflicts".italic());
            return Ok(());
        }
        for line in lines {
            println!("{line}");
        }

        for id in &self.take_server {
            let merged = Self::merge_server(ctx, id)?;
            Self::resubmit(ctx, id, merged).await?;
        }
        for id in &self.keep_local {
            let local = {
                let conflicts = ctx.conflicts.borrow();
                let index = conflicts
                    .find(id)
                    .ok_or_else(|| format!("No conflict on schedule #{id}"))?;
                conflicts.conflicts()[index].local().clone()
            };
            Self::resubmit(ctx, id, local).await?;
        }

        if self.acknowledge {
            let acknowledged = ctx.conflicts.borrow_mut().acknowledge_all();
            for conflict in &acknowledged {
                ctx.sync.mark_resolved(EntityKind::Schedule, conflict.id());
            }
            println!("{} {} conflict(s)", "Acknowledged".green(), acknowledged.len());
            ctx.coordinator.sync_now().await;
        }
        Ok(())
    }

    fn merge_server(ctx: &Context, id: &str) -> Result<Schedule, Box<dyn Error>> {
        let conflicts = ctx.conflicts.borrow();
        let index = conflicts
            .find(id)
            .ok_or_else(|| format!("No conflict on schedule #{id}"))?;
        let fields = conflicts.diff(index);
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        let merged = conflicts
            .merge(index, &fields)
            .ok_or_else(|| format!("Failed to merge schedule #{id}"))?;
        Ok(merged)
    }

    async fn resubmit(ctx: &Context, id: &str, schedule: Schedule) -> Result<(), Box<dyn Error>> {
        ctx.resolve_conflict(id);
        let draft = ScheduleDraft::from_schedule(&schedule);
        let written = ctx.schedule_store.update(draft, id, true).await?;
        print_outcome(&written, &format!("resolved schedule #{id}"));
        Ok(())
    }
}
