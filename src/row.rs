use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use log::trace;

use crate::{domain::TrackerDomain, integrations::jira::IssueRecord};

/// How the searched user relates to an issue.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Role {
    Assignee,
    Reporter,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignee => f.write_str("Assignee"),
            Self::Reporter => f.write_str("Reporter"),
        }
    }
}

/// One line of a report, shared by every output sink.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct OutputRow {
    pub(crate) issue_key: String,
    pub(crate) project_name: String,
    pub(crate) title: String,
    /// Comma-joined, in the order the roles were applied.
    pub(crate) roles: String,
    pub(crate) status_name: String,
    pub(crate) comment_count: usize,
    pub(crate) browse_link: String,
    pub(crate) updated_date: String,
}

impl OutputRow {
    /// The row's cells in [`crate::output::HEADERS`] order.
    pub(crate) fn cells(&self) -> Vec<String> {
        vec![
            self.issue_key.clone(),
            self.project_name.clone(),
            self.title.clone(),
            self.roles.clone(),
            self.status_name.clone(),
            self.comment_count.to_string(),
            self.browse_link.clone(),
            self.updated_date.clone(),
        ]
    }
}

pub(crate) fn map_issue(
    domain: &TrackerDomain,
    username: &str,
    issue: &IssueRecord,
    base_roles: &[Role],
) -> OutputRow {
    if !issue.assigned_to(username) {
        trace!("{} matched {username} without being assigned to them", issue.key);
    }
    let mut roles = base_roles.to_vec();
    if issue.reported_by(username) {
        roles.push(Role::Reporter);
    }
    OutputRow {
        issue_key: issue.key.clone(),
        project_name: issue.fields.project.name.clone(),
        title: issue.fields.summary.clone(),
        roles: roles.iter().join(","),
        status_name: issue.fields.status.name.clone(),
        comment_count: issue.comments_by(username),
        browse_link: domain.browse_url(&issue.key),
        updated_date: updated_date(&issue.fields.updated),
    }
}

/// `2021-07-04T10:00:00.000+0000` becomes `2021/07/04`. This only trims an ISO-8601 prefix,
/// it does not parse the timestamp.
fn updated_date(timestamp: &str) -> String {
    timestamp
        .chars()
        .take(10)
        .map(|c| if c == '-' { '/' } else { c })
        .collect()
}
