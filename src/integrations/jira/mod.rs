use serde::Deserialize;

#[cfg(test)]
pub(crate) mod fake_tracker;
mod query;
mod search;

pub(crate) use query::{build_query, Jql, Order};
pub(crate) use search::{search_issues, Error as SearchError};

/// An issue as returned by the tracker's search endpoint, restricted to [`search::FIELDS`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct IssueRecord {
    pub(crate) key: String,
    pub(crate) fields: IssueFields,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct IssueFields {
    pub(crate) project: Named,
    pub(crate) summary: String,
    pub(crate) status: Named,
    /// `null` when the reporter was removed from the tracker.
    pub(crate) reporter: Option<User>,
    /// `null` for unassigned issues.
    pub(crate) assignee: Option<User>,
    pub(crate) updated: String,
    pub(crate) comment: Comments,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct Named {
    pub(crate) name: String,
}

/// Cloud trackers may omit `name` and only send an account ID.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct User {
    pub(crate) name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct Comments {
    #[serde(default)]
    pub(crate) comments: Vec<Comment>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct Comment {
    pub(crate) author: Option<User>,
}

impl User {
    fn is(&self, username: &str) -> bool {
        self.name.as_deref() == Some(username)
    }
}

impl IssueRecord {
    pub(crate) fn reported_by(&self, username: &str) -> bool {
        self.fields
            .reporter
            .as_ref()
            .is_some_and(|reporter| reporter.is(username))
    }

    pub(crate) fn assigned_to(&self, username: &str) -> bool {
        self.fields
            .assignee
            .as_ref()
            .is_some_and(|assignee| assignee.is(username))
    }

    /// Only comments written by `username`, not the issue's total.
    pub(crate) fn comments_by(&self, username: &str) -> usize {
        self.fields
            .comment
            .comments
            .iter()
            .filter(|comment| {
                comment
                    .author
                    .as_ref()
                    .is_some_and(|author| author.is(username))
            })
            .count()
    }
}
