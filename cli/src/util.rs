// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use clap::{Arg, ArgMatches, arg};
use colored::Colorize;
use jiff::civil::Date;
use synccal_core::{SyncOutcome, Written};

pub fn arg_verbose() -> Arg {
    arg!(-v --verbose "Show more detailed information")
}

pub fn get_verbose(matches: &ArgMatches) -> bool {
    matches.get_flag("verbose")
}

pub fn arg_acknowledge() -> Arg {
    arg!(--acknowledge "Mark a conflict already reviewed on this item as resolved")
}

pub fn get_acknowledge(matches: &ArgMatches) -> bool {
    matches.get_flag("acknowledge")
}

/// Parses a `YYYY/MM` month.
pub fn parse_month(s: &str) -> Result<(i16, i8), String> {
    let err = || format!("Invalid month: {s}. Expected format: YYYY/MM");
    let (year, month) = s.trim().split_once('/').ok_or_else(err)?;
    let year: i16 = year.parse().map_err(|_| err())?;
    let month: i8 = month.parse().map_err(|_| err())?;
    Date::new(year, month, 1).map_err(|_| err())?;
    Ok((year, month))
}

/// Prints how the synchronization after a write went.
pub fn print_outcome<T>(written: &Written<T>, what: &str) {
    match &written.outcome {
        SyncOutcome::Success => println!("{} {what}", "Synced:".green()),
        SyncOutcome::Conflict => println!(
            "{} {what}, the server reported a conflict",
            "Saved locally:".yellow()
        ),
        SyncOutcome::NetworkFailure(err) => println!(
            "{} {what}, synchronization failed: {err}",
            "Saved locally:".yellow()
        ),
    }
}
