//! Proxies to FS utils that _either_ actually create files or print to stdout (for dry runs).

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use log::trace;
use miette::Diagnostic;
use thiserror::Error;

use crate::dry_run::DryRun;

/// Creates (or truncates) a file if this is not a dry run, or prints the path it would have
/// created if it is.
pub(crate) fn create(dry_run: DryRun, path: &Path, what: &str) -> Result<Option<File>, Error> {
    if let Some(stdout) = dry_run {
        writeln!(stdout, "Would write {what} to {}", path.display()).map_err(Error::Stdout)?;
        Ok(None)
    } else {
        trace!("Creating {}", path.display());
        File::create(path)
            .map(Some)
            .map_err(|source| Error::Create {
                path: path.into(),
                source,
            })
    }
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("Error creating {path}: {source}")]
    #[diagnostic(
        code(fs::create),
        help("Make sure you have permission to write to this file.")
    )]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error writing to stdout: {0}")]
    Stdout(#[source] io::Error),
}
