// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, slice};

use clap::{Arg, ArgMatches, Command, arg, value_parser};
use colored::Colorize;
use synccal_core::PersonDraft;

use crate::context::Context;
use crate::formatter::format_persons;
use crate::util::{arg_verbose, get_verbose, print_outcome};

#[derive(Debug, Clone)]
pub struct CmdPersonNew {
    pub id: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub organization: Option<String>,
    pub previous_id: Option<String>,
}

impl CmdPersonNew {
    pub const NAME: &str = "new";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("add")
            .about("Register a new person")
            .arg(arg!([NAME] "Name of the person"))
            .arg(arg!(--id <ID> "Identifier of the person, generated when omitted"))
            .arg(arg_age())
            .arg(arg_org())
            .arg(
                arg!(--"previous-id" <ID> "Identifier that collided on the server")
                    .long_help(
                        "\
Identifier that collided on the server. The person registered under it is moved to --id, \
fields not given are taken from it.",
                    )
                    .requires("id"),
            )
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let name = matches.get_one::<String>("NAME").cloned();
        let previous_id = matches.get_one::<String>("previous-id").cloned();
        if name.is_none() && previous_id.is_none() {
            return Err("Name is required for a new person".into());
        }

        Ok(Self {
            id: matches.get_one::<String>("id").cloned(),
            name,
            age: get_age(matches),
            organization: get_org(matches),
            previous_id,
        })
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "registering person...");
        let store = &ctx.person_store;
        let previous = self.previous_id.as_deref().and_then(|id| store.get(id));
        let draft = PersonDraft {
            id: self.id,
            name: self
                .name
                .or_else(|| previous.as_ref().map(|a| a.name.clone()))
                .unwrap_or_default(),
            age: self.age.or_else(|| previous.as_ref().and_then(|a| a.age)),
            organization: self
                .organization
                .or_else(|| previous.as_ref().map(|a| a.organization.clone()))
                .unwrap_or_default(),
        };

        let written = store.register(draft, self.previous_id.as_deref()).await?;
        print_outcome(&written, &format!("person #{}", written.item.id));
        println!("{}", format_persons(slice::from_ref(&written.item), true));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdPersonEdit {
    pub id: String,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub organization: Option<String>,
}

impl CmdPersonEdit {
    pub const NAME: &str = "edit";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Edit a person")
            .arg(arg!(<ID> "Identifier of the person"))
            .arg(arg!(-n --name <NAME> "New name"))
            .arg(arg_age())
            .arg(arg_org())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: get_id(matches),
            name: matches.get_one::<String>("name").cloned(),
            age: get_age(matches),
            organization: get_org(matches),
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "editing person...");
        let mut person = ctx
            .person_store
            .get(&self.id)
            .ok_or_else(|| format!("Person not found: {}", self.id))?;

        if let Some(name) = self.name {
            person.name = name;
        }
        if let Some(age) = self.age {
            person.age = Some(age);
        }
        if let Some(organization) = self.organization {
            person.organization = organization;
        }

        let written = ctx.person_store.update(person).await?;
        print_outcome(&written, &format!("person #{}", written.item.id));
        println!("{}", format_persons(slice::from_ref(&written.item), true));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdPersonDelete {
    pub id: String,
}

impl CmdPersonDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete a person")
            .arg(arg!(<ID> "Identifier of the person"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: get_id(matches),
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting person...");
        let written = ctx.person_store.delete(&self.id).await?;
        print_outcome(&written, &format!("deleted person #{}", written.item.id));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CmdPersonList {
    pub verbose: bool,
}

impl CmdPersonList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List persons")
            .arg(arg_verbose())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            verbose: get_verbose(matches),
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing persons...");
        let persons = ctx.person_store.list();
        if persons.is_empty() {
            println!("{}", "No persons found".italic());
        } else {
            println!("{}", format_persons(&persons, self.verbose));
        }
        Ok(())
    }
}

fn arg_age() -> Arg {
    arg!(-a --age <AGE> "Age of the person").value_parser(value_parser!(u32))
}

fn get_age(matches: &ArgMatches) -> Option<u32> {
    matches.get_one::<u32>("age").copied()
}

fn arg_org() -> Arg {
    arg!(-o --org <ORGANIZATION> "Organization the person belongs to")
}

fn get_org(matches: &ArgMatches) -> Option<String> {
    matches.get_one::<String>("org").cloned()
}

fn get_id(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("ID")
        .cloned()
        .expect("ID is required")
}
