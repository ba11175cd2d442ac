use std::{
    ffi::OsString,
    io::{stdout, BufWriter, Stdout, Write},
    path::PathBuf,
};

use clap::{command, Arg, ArgAction, ArgMatches, Command};
use log::info;
use miette::{Diagnostic, Result};
use reqwest::Client;

use crate::{
    dry_run::DryRun,
    integrations::jira::{build_query, search_issues, SearchError},
    options::RunOptions,
    output::{CsvFile, CsvSink, Report},
};

mod domain;
mod dry_run;
mod fs;
mod integrations;
mod options;
mod output;
mod row;

/// The command line interface.
#[must_use]
pub fn command() -> Command {
    command!()
        .about("Returns JIRA issues associated with the given users")
        .arg(
            Arg::new("usernames")
                .value_name("USERNAME")
                .help("One or more JIRA usernames to report on")
                .required(true)
                .num_args(1..)
                .value_parser(options::parse_username),
        )
        .arg(
            Arg::new("start_date")
                .short('s')
                .long("startDate")
                .value_name("YYYY-MM-DD")
                .help("The date from which JIRAs are returned.")
                .default_value(options::DEFAULT_START_DATE)
                .value_parser(options::parse_date),
        )
        .arg(
            Arg::new("end_date")
                .short('e')
                .long("endDate")
                .value_name("YYYY-MM-DD")
                .help("The date of the most recent JIRA to be returned. [default: today, in UTC]")
                .value_parser(options::parse_date),
        )
        .arg(
            Arg::new("domains")
                .short('d')
                .long("domains")
                .value_name("KEY")
                .help("The JIRA domains that should be searched. [default: all]")
                .num_args(1..)
                .value_parser(domain::keys().collect::<Vec<_>>()),
        )
        .arg(
            Arg::new("jira_limit")
                .short('l')
                .long("jira-limit")
                .visible_alias("jl")
                .value_name("N")
                .help("The maximum number of JIRA issues that will be returned for each domain.")
                .default_value(options::DEFAULT_JIRA_LIMIT)
                .allow_negative_numbers(true)
                .value_parser(options::parse_jira_limit),
        )
        .arg(
            Arg::new("lifo")
                .long("lifo")
                .help("Show the most recently updated issues first")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_ascii")
                .long("no-ascii")
                .help("Don't print the results as tables")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .short('c')
                .long("csv")
                .value_name("DIALECT")
                .help("Also write the results to <USERNAME>-jira.csv using this dialect")
                .num_args(0..=1)
                .default_missing_value("excel")
                .value_parser(options::dialect_parser()),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .help("Pretend to run, printing what would happen instead of searching or writing files")
                .action(ArgAction::SetTrue),
        )
}

/// Rewrite the two-letter `-jl` flag, which clap can't declare as a short, to its `--jl` alias.
///
/// `-jl 5`, `-jl5` and `-jl=5` are all accepted. Nothing after a `--` separator is touched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut positional_only = false;
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            if positional_only {
                arg
            } else if arg.to_str() == Some("--") {
                positional_only = true;
                arg
            } else {
                rewrite_jira_limit(arg)
            }
        })
        .collect()
}

fn rewrite_jira_limit(arg: OsString) -> OsString {
    let Some(rest) = arg.to_str().and_then(|arg| arg.strip_prefix("-jl")) else {
        return arg;
    };
    if rest.is_empty() {
        OsString::from("--jl")
    } else {
        OsString::from(format!("--jl={}", rest.strip_prefix('=').unwrap_or(rest)))
    }
}

/// Search every selected domain for every username and write the results.
///
/// Users are handled one at a time: a user's table and CSV file are complete before the next
/// user's search begins. The first error stops the whole run.
///
/// # Errors
///
/// Any failure talking to a tracker, decoding its response, or writing output.
pub async fn run(matches: &ArgMatches) -> Result<()> {
    let options = RunOptions::from_matches(matches);
    let mut dry_run = dry_run::narrator(options.dry_run);
    report_all(&Client::new(), &options, &mut dry_run).await?;
    Ok(())
}

async fn report_all(
    client: &Client,
    options: &RunOptions,
    dry_run: DryRun<'_>,
) -> Result<(), Error> {
    for username in &options.usernames {
        report_user(client, options, username, dry_run).await?;
    }
    Ok(())
}

async fn report_user(
    client: &Client,
    options: &RunOptions,
    username: &str,
    dry_run: DryRun<'_>,
) -> Result<(), Error> {
    let csv = match options.output.csv() {
        Some(dialect) => {
            let path = options.output_dir.join(csv_path(username));
            fs::create(dry_run, &path, "CSV")?.map(|file| CsvFile {
                path,
                sink: CsvSink::new(BufWriter::new(file), dialect),
            })
        }
        None => None,
    };
    let console: Option<Stdout> = (options.output.ascii() && dry_run.is_none()).then(stdout);
    let mut report = Report::new(username, console, csv);

    for domain in options.domains.values() {
        let jql = build_query(username, options.start_date, options.end_date, options.order);
        if let Some(stdout) = dry_run {
            writeln!(
                stdout,
                "Would search {} ({}) with JQL: {jql}",
                domain.key, domain.base_url
            )
            .map_err(Error::Stdout)?;
            continue;
        }
        let issues = search_issues(client, domain, &jql, options.jira_limit).await?;
        report.add_domain(domain, &issues, &options.base_roles)?;
    }

    report.finish()?;
    info!("Finished report for {username}");
    Ok(())
}

fn csv_path(username: &str) -> PathBuf {
    PathBuf::from(format!("{username}-jira.csv"))
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Output(#[from] output::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
    #[error("Unable to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}
