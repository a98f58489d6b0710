// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use colored::Colorize;

use crate::context::Context;

#[derive(Debug, Clone)]
pub struct CmdLogin {
    pub person_id: String,
}

impl CmdLogin {
    pub const NAME: &str = "login";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Remember who is using the calendar, new schedules are created by them")
            .arg(arg!(<PERSON_ID> "Identifier of the person"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            person_id: matches
                .get_one::<String>("PERSON_ID")
                .cloned()
                .expect("person id is required"),
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "logging in...");
        let person = ctx
            .person_store
            .get(&self.person_id)
            .ok_or_else(|| format!("Person not found: {}", self.person_id))?;

        ctx.session.login(&person.id).await?;
        ctx.schedule_store.set_default_creator(Some(person.id.clone()));
        println!("{} {} (#{})", "Logged in as".green(), person.name, person.id);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CmdLogout;

impl CmdLogout {
    pub const NAME: &str = "logout";

    pub fn command() -> Command {
        Command::new(Self::NAME).about("Forget the logged-in person")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        Self
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!("logging out...");
        match ctx.session.logged_in_person().await? {
            Some(id) => {
                ctx.session.logout().await?;
                ctx.schedule_store.set_default_creator(None);
                println!("{} #{id}", "Logged out".green());
            }
            None => println!("{}", "Nobody is logged in".italic()),
        }
        Ok(())
    }
}
