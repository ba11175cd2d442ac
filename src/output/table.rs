use std::fmt::{self, Display, Formatter};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

struct Column {
    header: &'static str,
    max_width: usize,
}

/// A bordered, left-aligned console table. Cells wider than their column's cap wrap onto
/// extra lines instead of being truncated.
pub(crate) struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new(headers: &[&'static str], max_width: usize) -> Self {
        Self {
            columns: headers
                .iter()
                .map(|&header| Column { header, max_width })
                .collect(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn set_max_width(&mut self, header: &str, max_width: usize) {
        for column in self.columns.iter_mut().filter(|column| column.header == header) {
            column.max_width = max_width;
        }
    }

    /// Missing trailing cells render as blanks; extra cells are ignored.
    pub(crate) fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub(crate) fn add_blank_row(&mut self) {
        self.rows.push(Vec::new());
    }

    fn wrapped(&self, row: &[String]) -> Vec<Vec<String>> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                wrap(
                    row.get(index).map_or("", String::as_str),
                    column.max_width,
                )
            })
            .collect()
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let headers: Vec<String> = self
            .columns
            .iter()
            .map(|column| column.header.to_string())
            .collect();
        let header = self.wrapped(&headers);
        let body: Vec<_> = self.rows.iter().map(|row| self.wrapped(row)).collect();

        let widths: Vec<usize> = (0..self.columns.len())
            .map(|index| {
                std::iter::once(&header)
                    .chain(&body)
                    .filter_map(|row| row.get(index))
                    .flatten()
                    .map(|line| line.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rule = widths
            .iter()
            .fold(String::from("+"), |mut rule, width| {
                rule.push_str(&"-".repeat(width + 2));
                rule.push('+');
                rule
            });

        writeln!(f, "{rule}")?;
        write_row(f, &header, &widths)?;
        writeln!(f, "{rule}")?;
        for row in &body {
            write_row(f, row, &widths)?;
        }
        writeln!(f, "{rule}")
    }
}

fn write_row(f: &mut Formatter<'_>, cells: &[Vec<String>], widths: &[usize]) -> fmt::Result {
    let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    for line in 0..height {
        f.write_str("|")?;
        for (cell, width) in cells.iter().zip(widths) {
            let text = cell.get(line).map_or("", String::as_str);
            let padding = width.saturating_sub(text.width());
            write!(f, " {text}{} |", " ".repeat(padding))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

/// Greedy word wrap by display width. Words longer than `max_width` are split.
fn wrap(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.width() + 1 + word.width() <= max_width {
                current.push(' ');
                current.push_str(word);
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                let char_width = c.width().unwrap_or(0);
                if current.width() + char_width > max_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.push(c);
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
