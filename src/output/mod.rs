use std::{
    io::{self, Write},
    path::PathBuf,
};

use log::{debug, info};
use miette::Diagnostic;

pub(crate) use self::csv::{CsvSink, Dialect};
use self::table::Table;
use crate::{
    domain::TrackerDomain,
    integrations::jira::IssueRecord,
    row::{map_issue, OutputRow, Role},
};

mod csv;
mod table;

pub(crate) const HEADERS: [&str; 8] = [
    "ID",
    "Project",
    "Title",
    "Role",
    "Status",
    "#Comments",
    "Link",
    "Updated On",
];

const MAX_WIDTH: usize = 12;
const WIDE_COLUMNS: [&str; 2] = ["Title", "Link"];
const WIDE_MAX_WIDTH: usize = 60;

/// Which sinks a run writes to. Chosen once from the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Output {
    None,
    Ascii,
    Csv(Dialect),
    Both(Dialect),
}

impl Output {
    pub(crate) const fn new(ascii: bool, csv: Option<Dialect>) -> Self {
        match (ascii, csv) {
            (false, None) => Self::None,
            (true, None) => Self::Ascii,
            (false, Some(dialect)) => Self::Csv(dialect),
            (true, Some(dialect)) => Self::Both(dialect),
        }
    }

    pub(crate) const fn ascii(self) -> bool {
        matches!(self, Self::Ascii | Self::Both(_))
    }

    pub(crate) const fn csv(self) -> Option<Dialect> {
        match self {
            Self::Csv(dialect) | Self::Both(dialect) => Some(dialect),
            Self::None | Self::Ascii => None,
        }
    }
}

/// The CSV file for one user, remembered alongside its path for error messages.
pub(crate) struct CsvFile<W: Write> {
    pub(crate) path: PathBuf,
    pub(crate) sink: CsvSink<W>,
}

/// Fans the rows for one user out to whichever sinks are enabled.
pub(crate) struct Report<'a, C: Write, F: Write> {
    username: &'a str,
    console: Option<C>,
    csv: Option<CsvFile<F>>,
}

impl<'a, C: Write, F: Write> Report<'a, C, F> {
    pub(crate) fn new(username: &'a str, console: Option<C>, csv: Option<CsvFile<F>>) -> Self {
        Self {
            username,
            console,
            csv,
        }
    }

    /// Write every issue found on `domain`. Nothing at all is written when `issues` is empty.
    pub(crate) fn add_domain(
        &mut self,
        domain: &TrackerDomain,
        issues: &[IssueRecord],
        base_roles: &[Role],
    ) -> Result<(), Error> {
        if issues.is_empty() {
            debug!("No issues on {} for {}", domain.key, self.username);
            return Ok(());
        }
        let rows: Vec<OutputRow> = issues
            .iter()
            .map(|issue| map_issue(domain, self.username, issue, base_roles))
            .collect();

        if let Some(console) = &mut self.console {
            write_table(console, domain, self.username, &rows).map_err(Error::Stdout)?;
        }
        if let Some(CsvFile { path, sink }) = &mut self.csv {
            write_csv(sink, domain, &rows).map_err(|source| Error::Csv {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        if let Some(mut console) = self.console {
            console.flush().map_err(Error::Stdout)?;
        }
        if let Some(CsvFile { path, sink }) = self.csv {
            sink.finish().map_err(|source| Error::Csv {
                path: path.clone(),
                source,
            })?;
            info!("Wrote {}", path.display());
        }
        Ok(())
    }
}

fn write_table<W: Write>(
    console: &mut W,
    domain: &TrackerDomain,
    username: &str,
    rows: &[OutputRow],
) -> io::Result<()> {
    let mut table = Table::new(&HEADERS, MAX_WIDTH);
    for header in WIDE_COLUMNS {
        table.set_max_width(header, WIDE_MAX_WIDTH);
    }
    for row in rows {
        table.add_row(row.cells());
        table.add_blank_row();
    }
    writeln!(
        console,
        "{}: {} issues involving '{username}'",
        domain.key,
        rows.len()
    )?;
    write!(console, "{table}")
}

fn write_csv<W: Write>(
    sink: &mut CsvSink<W>,
    domain: &TrackerDomain,
    rows: &[OutputRow],
) -> io::Result<()> {
    sink.begin_block(domain.key)?;
    for row in rows {
        sink.write_row(&row.cells())?;
    }
    Ok(())
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Unable to write to stdout: {0}")]
    Stdout(#[source] io::Error),
    #[error("Error writing to {path}: {source}")]
    #[diagnostic(
        code(output::csv),
        help("Make sure you have permission to write to this file.")
    )]
    Csv {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
