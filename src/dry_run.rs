use std::io::{stdout, Write};

/// Where `--dry-run` describes the searches and files it skips. `None` means a real run, where
/// trackers are searched and CSV files are written.
pub(crate) type DryRun<'a> = &'a mut Option<Box<dyn Write>>;

pub(crate) fn narrator(enabled: bool) -> Option<Box<dyn Write>> {
    if enabled {
        Some(Box::new(stdout()))
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) fn fake_dry_run() -> Option<Box<dyn Write>> {
    Some(Box::new(Vec::new()))
}
