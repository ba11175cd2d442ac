//! CSV output in the dialects of the standard dialect registry.

use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
    io::{self, Write},
};

use super::HEADERS;

/// A named CSV formatting convention.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Dialect {
    /// Comma separated, minimal quoting, `\r\n` line endings.
    #[default]
    Excel,
    /// Tab separated, minimal quoting, `\r\n` line endings.
    ExcelTab,
    /// Comma separated, every field quoted, `\n` line endings.
    Unix,
}

impl Dialect {
    pub(crate) const NAMES: [&'static str; 3] = ["excel", "excel-tab", "unix"];

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "excel" => Some(Self::Excel),
            "excel-tab" => Some(Self::ExcelTab),
            "unix" => Some(Self::Unix),
            _ => None,
        }
    }

    const fn delimiter(self) -> char {
        match self {
            Self::Excel | Self::Unix => ',',
            Self::ExcelTab => '\t',
        }
    }

    const fn line_terminator(self) -> &'static str {
        match self {
            Self::Excel | Self::ExcelTab => "\r\n",
            Self::Unix => "\n",
        }
    }

    const fn quote_all(self) -> bool {
        matches!(self, Self::Unix)
    }

    /// Quote `value` if the dialect requires it, doubling any embedded quotes.
    fn escape_field(self, value: &str) -> Cow<'_, str> {
        let needs_quoting = self.quote_all()
            || value.contains(self.delimiter())
            || value.contains('"')
            || value.contains('\n')
            || value.contains('\r');
        if needs_quoting {
            Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(value)
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excel => "excel",
            Self::ExcelTab => "excel-tab",
            Self::Unix => "unix",
        })
    }
}

/// Writes one user's report. Each tracker gets its own block, and every block after the first
/// is separated from the one before it by a blank row.
pub(crate) struct CsvSink<W: Write> {
    writer: W,
    dialect: Dialect,
    first_block: bool,
}

impl<W: Write> CsvSink<W> {
    pub(crate) fn new(writer: W, dialect: Dialect) -> Self {
        Self {
            writer,
            dialect,
            first_block: true,
        }
    }

    pub(crate) fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> io::Result<()> {
        let delimiter = self.dialect.delimiter();
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                write!(self.writer, "{delimiter}")?;
            }
            let field = field.as_ref();
            // A lone empty field would otherwise be indistinguishable from a blank row.
            if fields.len() == 1 && field.is_empty() {
                self.writer.write_all(b"\"\"")?;
            } else {
                self.writer
                    .write_all(self.dialect.escape_field(field).as_bytes())?;
            }
        }
        self.writer
            .write_all(self.dialect.line_terminator().as_bytes())
    }

    /// Separator (if needed), `"<key> issues"` banner and the header row.
    pub(crate) fn begin_block(&mut self, key: &str) -> io::Result<()> {
        if self.first_block {
            self.first_block = false;
        } else {
            self.write_row::<&str>(&[])?;
        }
        self.write_row(&[format!("{key} issues")])?;
        self.write_row(&HEADERS)
    }

    pub(crate) fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
