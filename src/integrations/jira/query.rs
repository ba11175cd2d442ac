//! A small JQL expression tree. Values are always rendered as quoted string literals, so a
//! username can never change the shape of the query it is placed in.

use std::fmt::{self, Display, Formatter, Write};

use time::Date;

/// The direction issues are sorted by their last update.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Order {
    /// Least recently updated first.
    #[default]
    Ascending,
    /// Most recently updated first (`--lifo`).
    Descending,
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("ASC"),
            Self::Descending => f.write_str("DESC"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Field {
    Assignee,
    Reporter,
    Updated,
    Created,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Assignee => "assignee",
            Self::Reporter => "reporter",
            Self::Updated => "updated",
            Self::Created => "created",
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Value {
    Text(String),
    Date(Date),
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write_literal(f, text),
            Self::Date(date) => write_literal(f, &date.to_string()),
        }
    }
}

fn write_literal(f: &mut Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Clause {
    Eq(Field, Value),
    Ge(Field, Value),
    Lt(Field, Value),
    Or(Vec<Clause>),
    And(Vec<Clause>),
}

impl Clause {
    fn write_nested(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or(clauses) | Self::And(clauses) if clauses.len() > 1 => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }

    fn write_joined(f: &mut Formatter<'_>, clauses: &[Self], operator: &str) -> fmt::Result {
        for (index, clause) in clauses.iter().enumerate() {
            if index > 0 {
                write!(f, " {operator} ")?;
            }
            clause.write_nested(f)?;
        }
        Ok(())
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(field, value) => write!(f, "{field} = {value}"),
            Self::Ge(field, value) => write!(f, "{field} >= {value}"),
            Self::Lt(field, value) => write!(f, "{field} < {value}"),
            Self::Or(clauses) => Self::write_joined(f, clauses, "OR"),
            Self::And(clauses) => Self::write_joined(f, clauses, "AND"),
        }
    }
}

/// A complete search: a filter plus the ordering of results.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Jql {
    filter: Clause,
    order_by: Field,
    order: Order,
}

impl Display for Jql {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ORDER BY {} {}", self.filter, self.order_by, self.order)
    }
}

/// Issues where `username` is the assignee or the reporter and which were updated or created
/// inside `[start_date, end_date)`.
///
/// Each bound accepts either timestamp on its own, so an issue created before the window but
/// updated inside it (or the reverse) still matches.
pub(crate) fn build_query(username: &str, start_date: Date, end_date: Date, order: Order) -> Jql {
    let user = || Value::Text(username.to_string());
    let filter = Clause::And(vec![
        Clause::Or(vec![
            Clause::Eq(Field::Assignee, user()),
            Clause::Eq(Field::Reporter, user()),
        ]),
        Clause::Or(vec![
            Clause::Ge(Field::Updated, Value::Date(start_date)),
            Clause::Ge(Field::Created, Value::Date(start_date)),
        ]),
        Clause::Or(vec![
            Clause::Lt(Field::Updated, Value::Date(end_date)),
            Clause::Lt(Field::Created, Value::Date(end_date)),
        ]),
    ]);
    Jql {
        filter,
        order_by: Field::Updated,
        order,
    }
}
