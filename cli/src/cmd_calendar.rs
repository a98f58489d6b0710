// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use jiff::Zoned;

use crate::context::Context;
use crate::tui;
use crate::util::parse_month;

#[derive(Debug, Clone, Default)]
pub struct CmdCalendar {
    /// Month to open, the current month if `None`.
    pub month: Option<(i16, i8)>,
}

impl CmdCalendar {
    pub const NAME: &str = "calendar";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("cal")
            .about("Open the calendar in the terminal")
            .arg(arg!(-m --month <MONTH> "Month to open, in the format YYYY/MM"))
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let month = match matches.get_one::<String>("month") {
            Some(s) => Some(parse_month(s)?),
            None => None,
        };
        Ok(Self { month })
    }

    pub async fn run(self, ctx: &mut Context) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "opening calendar...");
        let (year, month) = self.month.unwrap_or_else(|| {
            let today = Zoned::now().date();
            (today.year(), today.month())
        });
        tui::run_calendar(ctx, year, month).await
    }
}
