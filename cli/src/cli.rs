// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use futures::{FutureExt, future::LocalBoxFuture};
use synccal_core::APP_NAME;
use tracing_subscriber::EnvFilter;

use crate::cmd_calendar::CmdCalendar;
use crate::cmd_conflicts::CmdConflicts;
use crate::cmd_person::{CmdPersonDelete, CmdPersonEdit, CmdPersonList, CmdPersonNew};
use crate::cmd_schedule::{
    CmdScheduleDelete, CmdScheduleEdit, CmdScheduleList, CmdScheduleNew, CmdScheduleRemediate,
};
use crate::cmd_session::{CmdLogin, CmdLogout};
use crate::cmd_sync::CmdSync;
use crate::config::parse_config;
use crate::context::Context;

/// Run the synccal command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse() {
        Ok(cli) => {
            if let Err(e) = cli.run().await {
                println!("{} {}", "Error:".red(), e);
            }
        }
        Err(e) => println!("{} {}", "Error:".red(), e),
    };
    Ok(())
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Schedule calendar with offline edits, server synchronization and conflict review.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(false) // allow default to calendar
            .arg_required_else_help(false)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $XDG_CONFIG_HOME/synccal/config.toml on Linux and MacOS, \
%LOCALAPPDATA%/synccal/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdCalendar::command())
            .subcommand(CmdSync::command())
            .subcommand(
                Command::new("person")
                    .alias("p")
                    .about("Manage persons")
                    .arg_required_else_help(true)
                    .subcommand_required(true)
                    .subcommand(CmdPersonNew::command())
                    .subcommand(CmdPersonEdit::command())
                    .subcommand(CmdPersonDelete::command())
                    .subcommand(CmdPersonList::command()),
            )
            .subcommand(
                Command::new("schedule")
                    .alias("s")
                    .about("Manage schedules")
                    .arg_required_else_help(true)
                    .subcommand_required(true)
                    .subcommand(CmdScheduleNew::command())
                    .subcommand(CmdScheduleEdit::command())
                    .subcommand(CmdScheduleDelete::command())
                    .subcommand(CmdScheduleRemediate::command())
                    .subcommand(CmdScheduleList::command()),
            )
            .subcommand(CmdLogin::command())
            .subcommand(CmdLogout::command())
            .subcommand(CmdConflicts::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdCalendar::NAME, matches)) => Calendar(CmdCalendar::from(matches)?),
            Some((CmdSync::NAME, matches)) => Sync(CmdSync::from(matches)),
            Some(("person", matches)) => match matches.subcommand() {
                Some((CmdPersonNew::NAME, matches)) => PersonNew(CmdPersonNew::from(matches)?),
                Some((CmdPersonEdit::NAME, matches)) => PersonEdit(CmdPersonEdit::from(matches)),
                Some((CmdPersonDelete::NAME, matches)) => {
                    PersonDelete(CmdPersonDelete::from(matches))
                }
                Some((CmdPersonList::NAME, matches)) => PersonList(CmdPersonList::from(matches)),
                _ => unreachable!(),
            },
            Some(("schedule", matches)) => match matches.subcommand() {
                Some((CmdScheduleNew::NAME, matches)) => {
                    ScheduleNew(CmdScheduleNew::from(matches)?)
                }
                Some((CmdScheduleEdit::NAME, matches)) => {
                    ScheduleEdit(CmdScheduleEdit::from(matches)?)
                }
                Some((CmdScheduleDelete::NAME, matches)) => {
                    ScheduleDelete(CmdScheduleDelete::from(matches))
                }
                Some((CmdScheduleRemediate::NAME, matches)) => {
                    ScheduleRemediate(CmdScheduleRemediate::from(matches))
                }
                Some((CmdScheduleList::NAME, matches)) => {
                    ScheduleList(CmdScheduleList::from(matches)?)
                }
                _ => unreachable!(),
            },
            Some((CmdLogin::NAME, matches)) => Login(CmdLogin::from(matches)),
            Some((CmdLogout::NAME, matches)) => Logout(CmdLogout::from(matches)),
            Some((CmdConflicts::NAME, matches)) => Conflicts(CmdConflicts::from(matches)),
            None => Calendar(CmdCalendar::default()),
            _ => unreachable!(),
        };

        let config = matches.get_one("config").cloned();
        Ok(Cli { config, command })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Show the calendar
    Calendar(CmdCalendar),

    /// Synchronize with the server
    Sync(CmdSync),

    /// Register a person
    PersonNew(CmdPersonNew),

    /// Edit a person
    PersonEdit(CmdPersonEdit),

    /// Delete a person
    PersonDelete(CmdPersonDelete),

    /// List persons
    PersonList(CmdPersonList),

    /// Register a schedule
    ScheduleNew(CmdScheduleNew),

    /// Edit a schedule
    ScheduleEdit(CmdScheduleEdit),

    /// Delete a schedule
    ScheduleDelete(CmdScheduleDelete),

    /// Move a schedule to a new identifier
    ScheduleRemediate(CmdScheduleRemediate),

    /// List schedules
    ScheduleList(CmdScheduleList),

    /// Remember the logged-in person
    Login(CmdLogin),

    /// Forget the logged-in person
    Logout(CmdLogout),

    /// Review pending conflicts
    Conflicts(CmdConflicts),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Calendar(a)          => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Sync(a)              => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            PersonNew(a)         => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            PersonEdit(a)        => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            PersonDelete(a)      => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            PersonList(a)        => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            ScheduleNew(a)       => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            ScheduleEdit(a)      => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            ScheduleDelete(a)    => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            ScheduleRemediate(a) => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            ScheduleList(a)      => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Login(a)             => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Logout(a)            => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Conflicts(a)         => Self::run_with(config, |x| a.run(x).boxed_local()).await,
        }
    }

    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a mut Context) -> LocalBoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let (core_config, sync_config) = parse_config(config).await?;
        let mut ctx = Context::new(core_config, sync_config).await?;
        ctx.startup().await;

        let result = f(&mut ctx).await;
        ctx.prompt.flush();
        let saved = ctx.close().await;
        result?;
        Ok(saved?)
    }
}
