// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, slice};

use clap::{Arg, ArgAction, ArgMatches, Command, arg};
use colored::Colorize;
use synccal_core::{Category, Schedule, ScheduleDraft, parse_date};

use crate::context::Context;
use crate::formatter::format_schedules;
use crate::util::{
    arg_acknowledge, arg_verbose, get_acknowledge, get_verbose, parse_month, print_outcome,
};

#[derive(Debug, Clone)]
pub struct CmdScheduleNew {
    pub title: String,
    pub category: Category,
    pub dates: Vec<String>,
    pub place: String,
    pub start_time: String,
    pub finish_time: String,
    pub detail: String,
    pub users: Vec<String>,
    pub creator: Option<String>,
    pub verbose: bool,
}

impl CmdScheduleNew {
    pub const NAME: &str = "new";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("add")
            .about("Register a new schedule")
            .arg(arg!(<TITLE> "Title of the schedule"))
            .args(ScheduleArgs::args(true))
            .arg(arg!(--creator <PERSON_ID> "Creator, defaults to the logged-in person"))
            .arg(arg_verbose())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let args = ScheduleArgs::from(matches)?;
        Ok(Self {
            title: matches
                .get_one::<String>("TITLE")
                .cloned()
                .expect("title is required"),
            category: args.category.unwrap_or_default(),
            dates: args.dates.unwrap_or_default(),
            place: args.place.unwrap_or_default(),
            start_time: args.start_time.unwrap_or_default(),
            finish_time: args.finish_time.unwrap_or_default(),
            detail: args.detail.unwrap_or_default(),
            users: args.users.unwrap_or_default(),
            creator: matches.get_one::<String>("creator").cloned(),
            verbose: get_verbose(matches),
        })
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "registering schedule...");
        let draft = ScheduleDraft {
            title: self.title,
            category: self.category,
            dates: self.dates,
            place: self.place,
            start_time: self.start_time,
            finish_time: self.finish_time,
            detail: self.detail,
            user_ids: self.users,
            creator_id: self.creator,
        };

        let written = ctx.schedule_store.register(draft).await?;
        print_outcome(&written, &format!("schedule #{}", written.item.id));
        print_schedule(ctx, &written.item, self.verbose);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdScheduleEdit {
    pub id: String,
    pub title: Option<String>,
    pub args: ScheduleArgs,
    pub acknowledge: bool,
    pub verbose: bool,
}

impl CmdScheduleEdit {
    pub const NAME: &str = "edit";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Edit a schedule")
            .arg(arg!(<ID> "Identifier of the schedule"))
            .arg(arg!(-t --title <TITLE> "New title"))
            .args(ScheduleArgs::args(false))
            .arg(arg_acknowledge())
            .arg(arg_verbose())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            id: get_id(matches),
            title: matches.get_one::<String>("title").cloned(),
            args: ScheduleArgs::from(matches)?,
            acknowledge: get_acknowledge(matches),
            verbose: get_verbose(matches),
        })
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "editing schedule...");
        let schedule = ctx
            .schedule_store
            .get(&self.id)
            .ok_or_else(|| format!("Schedule not found: {}", self.id))?;

        let mut draft = ScheduleDraft::from_schedule(&schedule);
        if let Some(title) = self.title {
            draft.title = title;
        }
        self.args.apply(&mut draft);

        if self.acknowledge {
            ctx.resolve_conflict(&self.id);
        }
        let written = ctx
            .schedule_store
            .update(draft, &self.id, self.acknowledge)
            .await?;
        print_outcome(&written, &format!("schedule #{}", written.item.id));
        print_schedule(ctx, &written.item, self.verbose);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdScheduleDelete {
    pub id: String,
    pub acknowledge: bool,
}

impl CmdScheduleDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete a schedule")
            .arg(arg!(<ID> "Identifier of the schedule"))
            .arg(arg_acknowledge())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: get_id(matches),
            acknowledge: get_acknowledge(matches),
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting schedule...");
        if self.acknowledge {
            ctx.resolve_conflict(&self.id);
        }
        let written = ctx
            .schedule_store
            .delete(&self.id, self.acknowledge)
            .await?;
        print_outcome(&written, &format!("deleted schedule #{}", written.item.id));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdScheduleRemediate {
    pub old_id: String,
    pub new_id: String,
}

impl CmdScheduleRemediate {
    pub const NAME: &str = "remediate";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Move a schedule whose identifier is taken on the server to a new one")
            .arg(arg!(<OLD_ID> "Identifier taken on the server"))
            .arg(arg!(<NEW_ID> "New identifier"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        let get = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .expect("id is required")
        };
        Self {
            old_id: get("OLD_ID"),
            new_id: get("NEW_ID"),
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "remediating schedule identifier...");
        let written = ctx
            .schedule_store
            .remediate(&self.old_id, &self.new_id)
            .await?;
        print_outcome(
            &written,
            &format!("schedule #{} is now #{}", self.old_id, written.item.id),
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CmdScheduleList {
    pub month: Option<(i16, i8)>,
    pub verbose: bool,
}

impl CmdScheduleList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List schedules")
            .arg(arg!(-m --month <MONTH> "Only schedules in the month, as YYYY/MM"))
            .arg(arg_verbose())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let month = match matches.get_one::<String>("month") {
            Some(s) => Some(parse_month(s)?),
            None => None,
        };
        Ok(Self {
            month,
            verbose: get_verbose(matches),
        })
    }

    pub async fn run(self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing schedules...");
        let schedules: Vec<Schedule> = ctx
            .schedule_store
            .list()
            .into_iter()
            .filter(|s| match self.month {
                Some((year, month)) => s.days().any(|d| d.year() == year && d.month() == month),
                None => true,
            })
            .collect();

        if schedules.is_empty() {
            println!("{}", "No schedules found".italic());
        } else {
            println!("{}", format_schedules(&schedules, self.verbose));
        }
        Ok(())
    }
}

/// Fields shared by new and edit, `None` when not given.
#[derive(Debug, Clone, Default)]
pub struct ScheduleArgs {
    pub category: Option<Category>,
    pub dates: Option<Vec<String>>,
    pub place: Option<String>,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub detail: Option<String>,
    pub users: Option<Vec<String>>,
}

impl ScheduleArgs {
    fn args(require_date: bool) -> Vec<Arg> {
        vec![
            arg!(-k --category <CATEGORY> "Category of the schedule")
                .value_parser(parse_category),
            arg!(-d --date <DATE> "Date as YYYY/MM/DD, repeat or separate by commas")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .required(require_date),
            arg!(-p --place <PLACE> "Place"),
            arg!(--start <TIME> "Start time"),
            arg!(--finish <TIME> "Finish time"),
            arg!(--detail <DETAIL> "Detail text"),
            arg!(-u --user <PERSON_ID> "Attending person, repeat or separate by commas")
                .action(ArgAction::Append)
                .value_delimiter(','),
        ]
    }

    fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let strings = |id: &str| {
            matches
                .get_many::<String>(id)
                .map(|values| values.cloned().collect::<Vec<_>>())
        };
        let string = |id: &str| matches.get_one::<String>(id).cloned();

        let dates = strings("date");
        for date in dates.iter().flatten() {
            parse_date(date)?;
        }

        Ok(Self {
            category: matches.get_one::<Category>("category").copied(),
            dates,
            place: string("place"),
            start_time: string("start"),
            finish_time: string("finish"),
            detail: string("detail"),
            users: strings("user"),
        })
    }

    fn apply(self, draft: &mut ScheduleDraft) {
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(dates) = self.dates {
            draft.dates = dates;
        }
        if let Some(place) = self.place {
            draft.place = place;
        }
        if let Some(start_time) = self.start_time {
            draft.start_time = start_time;
        }
        if let Some(finish_time) = self.finish_time {
            draft.finish_time = finish_time;
        }
        if let Some(detail) = self.detail {
            draft.detail = detail;
        }
        if let Some(users) = self.users {
            draft.user_ids = users;
        }
    }
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

fn get_id(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("ID")
        .cloned()
        .expect("id is required")
}

fn print_schedule(ctx: &Context, schedule: &Schedule, verbose: bool) {
    println!("{}", format_schedules(slice::from_ref(schedule), verbose));
    if verbose {
        let users: Vec<String> = ctx
            .schedule_store
            .users_of(schedule)
            .into_iter()
            .map(|a| a.name)
            .collect();
        if !users.is_empty() {
            println!("{} {}", "Users:".bold(), users.join(", "));
        }
        if let Some(creator) = ctx.schedule_store.creator_name(schedule) {
            println!("{} {}", "Creator:".bold(), creator);
        }
    }
}
