use std::num::NonZeroU32;

use itertools::Itertools;
use log::{debug, info};
use miette::Diagnostic;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::{IssueRecord, Jql};
use crate::domain::TrackerDomain;

/// The only issue fields requested from the tracker.
pub(crate) const FIELDS: [&str; 8] = [
    "project", "summary", "key", "status", "reporter", "assignee", "updated", "comment",
];

#[derive(Deserialize, Debug)]
struct SearchResponse {
    issues: Vec<IssueRecord>,
}

/// Run a single search against `domain`, returning at most `limit` issues in the order the
/// tracker sorted them. There is no pagination past the first page.
pub(crate) async fn search_issues(
    client: &Client,
    domain: &TrackerDomain,
    jql: &Jql,
    limit: NonZeroU32,
) -> Result<Vec<IssueRecord>, Error> {
    info!("Searching {} for issues", domain.key);
    debug!("JQL for {}: {jql}", domain.key);
    let issues = search_request(client, domain, jql, limit)
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(|source| Error::ApiRequest {
            err: source.to_string(),
            activity: "searching for issues",
            host: domain.base_url.to_string(),
        })?
        .json::<SearchResponse>()
        .await
        .map_err(|source| Error::ApiResponse {
            source,
            activity: "searching for issues",
            host: domain.base_url.to_string(),
        })?
        .issues;
    debug!("{} returned {} issues", domain.key, issues.len());
    Ok(issues)
}

fn search_request(
    client: &Client,
    domain: &TrackerDomain,
    jql: &Jql,
    limit: NonZeroU32,
) -> RequestBuilder {
    let jql = jql.to_string();
    let fields = FIELDS.iter().join(",");
    let limit = limit.to_string();
    client
        .get(domain.search_url())
        .header("Accept", "application/json")
        .query(&[
            ("jql", jql.as_str()),
            ("startAt", "0"),
            ("validateQuery", "true"),
            ("fields", fields.as_str()),
            ("maxResults", limit.as_str()),
        ])
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Trouble communicating with the tracker while {activity}: {err}")]
    #[diagnostic(
        code(jira::api_request_error),
        help(
            "There was a problem communicating with the tracker at {host}, this may be a network issue or a permissions issue."
        )
    )]
    ApiRequest {
        err: String,
        activity: &'static str,
        host: String,
    },
    #[error("Trouble decoding the response from the tracker while {activity}: {source}")]
    #[diagnostic(
        code(jira::api_response_error),
        help(
            "The tracker at {host} returned issues in a shape that could not be read. Every issue must have a key, project, summary, status, update time and comment list."
        )
    )]
    ApiResponse {
        source: reqwest::Error,
        activity: &'static str,
        host: String,
    },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::macros::date;

    use super::*;
    use crate::{
        domain::REGISTRY,
        integrations::jira::{
            build_query,
            fake_tracker::{issue_json, FakeTracker, Route},
            Order,
        },
    };

    fn alice_query() -> Jql {
        build_query(
            "alice",
            date!(2021 - 01 - 01),
            date!(2021 - 02 - 01),
            Order::Ascending,
        )
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn request_carries_query_projection_and_limit() {
        let jql = alice_query();
        let limit = NonZeroU32::new(25).unwrap();
        let request = search_request(&Client::new(), &REGISTRY[0], &jql, limit)
            .build()
            .unwrap();

        let url = request.url();
        assert_eq!(url.host_str(), Some("issues.jboss.org"));
        assert_eq!(url.path(), "/rest/api/2/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("jql".to_string(), jql.to_string()),
                ("startAt".to_string(), "0".to_string()),
                ("validateQuery".to_string(), "true".to_string()),
                (
                    "fields".to_string(),
                    "project,summary,key,status,reporter,assignee,updated,comment".to_string()
                ),
                ("maxResults".to_string(), "25".to_string()),
            ]
        );
    }

    #[test]
    fn decode_search_response() {
        let body = r#"{
            "startAt": 0,
            "maxResults": 50,
            "total": 1,
            "issues": [{
                "id": "12345",
                "key": "WFLY-1",
                "fields": {
                    "project": {"key": "WFLY", "name": "WildFly"},
                    "summary": "Server fails to start",
                    "status": {"name": "Resolved"},
                    "reporter": {"name": "alice", "displayName": "Alice"},
                    "assignee": null,
                    "updated": "2021-07-04T10:00:00.000+0000",
                    "comment": {
                        "comments": [
                            {"author": {"name": "alice"}},
                            {"author": {"name": "bob"}}
                        ],
                        "maxResults": 2,
                        "total": 2
                    }
                }
            }]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.issues.len(), 1);
        let issue = &response.issues[0];
        assert_eq!(issue.key, "WFLY-1");
        assert_eq!(issue.fields.project.name, "WildFly");
        assert!(issue.reported_by("alice"));
        assert_eq!(issue.comments_by("bob"), 1);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let body = r#"{"issues": [{"key": "WFLY-1", "fields": {"summary": "No project"}}]}"#;
        assert!(serde_json::from_str::<SearchResponse>(body).is_err());
    }

    #[tokio::test]
    async fn issues_come_back_in_tracker_order() {
        let tracker = FakeTracker::start(vec![Route::issues(
            "/jboss",
            &[issue_json("WFLY-2", "alice"), issue_json("WFLY-1", "bob")],
        )])
        .await;
        let domain = tracker.domain("JBOSS", "/jboss");

        let issues = search_issues(&client(), &domain, &alice_query(), NonZeroU32::MIN)
            .await
            .unwrap();

        let keys: Vec<&str> = issues.iter().map(|issue| issue.key.as_str()).collect();
        assert_eq!(keys, vec!["WFLY-2", "WFLY-1"]);
        assert_eq!(tracker.requested_paths(), vec!["/jboss/rest/api/2/search"]);
    }

    #[tokio::test]
    async fn error_status_is_a_request_error() {
        let tracker = FakeTracker::start(vec![Route::failing("/jboss", 500)]).await;
        let domain = tracker.domain("JBOSS", "/jboss");

        let result = search_issues(&client(), &domain, &alice_query(), NonZeroU32::MIN).await;

        match result {
            Err(Error::ApiRequest { err, host, .. }) => {
                assert!(err.contains("500"), "{err}");
                assert_eq!(host, domain.base_url);
            }
            other => panic!("expected a request error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_issues_are_a_response_error() {
        let tracker = FakeTracker::start(vec![Route {
            prefix: "/jboss",
            status: 200,
            body: r#"{"issues": [{"key": "WFLY-1", "fields": {"summary": "No project"}}]}"#
                .to_string(),
        }])
        .await;
        let domain = tracker.domain("JBOSS", "/jboss");

        let result = search_issues(&client(), &domain, &alice_query(), NonZeroU32::MIN).await;

        assert!(matches!(result, Err(Error::ApiResponse { .. })), "{result:?}");
    }
}
