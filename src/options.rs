use std::{num::NonZeroU32, path::PathBuf};

use clap::{builder::PossibleValuesParser, builder::TypedValueParser, ArgMatches};
use log::debug;
use time::{
    format_description::FormatItem,
    macros::{date, format_description},
    Date, OffsetDateTime,
};

use crate::{
    domain::{self, Domains},
    integrations::jira::Order,
    output::{Dialect, Output},
    row::Role,
};

pub(crate) const DEFAULT_START_DATE: &str = "1990-01-01";
pub(crate) const DEFAULT_JIRA_LIMIT: &str = "50";
const DEFAULT_START: Date = date!(1990 - 01 - 01);
const DEFAULT_LIMIT: NonZeroU32 = match NonZeroU32::new(50) {
    Some(limit) => limit,
    None => NonZeroU32::MIN,
};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Everything a run needs, read once from the command line.
#[derive(Clone, Debug)]
pub(crate) struct RunOptions {
    pub(crate) usernames: Vec<String>,
    pub(crate) domains: Domains,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) order: Order,
    pub(crate) jira_limit: NonZeroU32,
    pub(crate) output: Output,
    /// Roles every matched issue is labelled with before the reporter check.
    pub(crate) base_roles: Vec<Role>,
    pub(crate) dry_run: bool,
    /// Where CSV files are created. Empty for the working directory.
    pub(crate) output_dir: PathBuf,
}

impl RunOptions {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Self {
        let usernames = matches
            .get_many::<String>("usernames")
            .map(|usernames| usernames.cloned().collect())
            .unwrap_or_default();
        let selected: Option<Vec<String>> = matches
            .get_many::<String>("domains")
            .map(|domains| domains.cloned().collect());
        let domains = domain::select_domains(selected.as_deref());
        debug!("Searching domains: {:?}", domains.keys().collect::<Vec<_>>());

        let start_date = matches
            .get_one::<Date>("start_date")
            .copied()
            .unwrap_or(DEFAULT_START);
        let end_date = matches
            .get_one::<Date>("end_date")
            .copied()
            .unwrap_or_else(today);
        let order = if matches.get_flag("lifo") {
            Order::Descending
        } else {
            Order::Ascending
        };
        let jira_limit = matches
            .get_one::<NonZeroU32>("jira_limit")
            .copied()
            .unwrap_or(DEFAULT_LIMIT);
        let output = Output::new(
            !matches.get_flag("no_ascii"),
            matches.get_one::<Dialect>("csv").copied(),
        );

        Self {
            usernames,
            domains,
            start_date,
            end_date,
            order,
            jira_limit,
            output,
            base_roles: vec![Role::Assignee],
            dry_run: matches.get_flag("dry_run"),
            output_dir: PathBuf::new(),
        }
    }
}

/// Today, in UTC.
fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub(crate) fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, DATE_FORMAT).map_err(|_| format!("Not a valid date: '{value}'."))
}

pub(crate) fn parse_jira_limit(value: &str) -> Result<NonZeroU32, String> {
    let limit: i64 = value.trim().parse().map_err(|_| {
        format!("Invalid input '{value}', --jira-limit parameter must be a valid integer")
    })?;
    if limit < 1 {
        return Err(format!(
            "Invalid input '{value}', --jira-limit parameter must be > 0"
        ));
    }
    u32::try_from(limit)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| format!("Invalid input '{value}', --jira-limit parameter is too large"))
}

/// Usernames end up in file names, so anything that could leave the working directory is
/// rejected along with blanks and control characters.
pub(crate) fn parse_username(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("A username must not be blank".to_string());
    }
    if value
        .chars()
        .any(|c| c.is_control() || c == '/' || c == '\\')
    {
        return Err(format!(
            "Invalid username '{}', it must not contain path separators or control characters",
            value.escape_debug()
        ));
    }
    Ok(value.to_string())
}

pub(crate) fn dialect_parser() -> impl TypedValueParser<Value = Dialect> {
    PossibleValuesParser::new(Dialect::NAMES)
        .map(|name| Dialect::from_name(&name).unwrap_or_default())
}
