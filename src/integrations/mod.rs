pub(crate) mod jira;
