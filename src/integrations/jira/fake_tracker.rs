//! A local HTTP server that answers search requests with canned responses.

use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::domain::TrackerDomain;

/// What the tracker mounted at `prefix` answers with.
#[derive(Clone, Debug)]
pub(crate) struct Route {
    pub(crate) prefix: &'static str,
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl Route {
    pub(crate) fn issues(prefix: &'static str, issues: &[String]) -> Self {
        Self {
            prefix,
            status: 200,
            body: format!(r#"{{"startAt": 0, "issues": [{}]}}"#, issues.join(",")),
        }
    }

    pub(crate) fn failing(prefix: &'static str, status: u16) -> Self {
        Self {
            prefix,
            status,
            body: r#"{"errorMessages": ["Internal server error"]}"#.to_string(),
        }
    }
}

pub(crate) struct FakeTracker {
    address: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeTracker {
    pub(crate) async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                answer(stream, &routes, &seen).await;
            }
        });
        Self { address, requests }
    }

    /// A domain whose base URL points at `prefix` on this server.
    pub(crate) fn domain(&self, key: &'static str, prefix: &str) -> TrackerDomain {
        TrackerDomain {
            key,
            base_url: Cow::Owned(format!("{}{prefix}", self.address)),
        }
    }

    /// The path of every request received so far, without the query string.
    pub(crate) fn requested_paths(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn answer(mut stream: TcpStream, routes: &[Route], seen: &Mutex<Vec<String>>) {
    let mut head = Vec::new();
    let mut buffer = [0; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buffer).await {
            Ok(0) | Err(_) => return,
            Ok(read) => head.extend_from_slice(&buffer[..read]),
        }
    }
    let head = String::from_utf8_lossy(&head);
    let path = head
        .split_whitespace()
        .nth(1)
        .and_then(|target| target.split('?').next())
        .unwrap_or_default()
        .to_string();
    seen.lock().unwrap().push(path.clone());

    let (status, body) = routes
        .iter()
        .find(|route| path.starts_with(route.prefix))
        .map_or((404, String::new()), |route| {
            (route.status, route.body.clone())
        });
    let response = format!(
        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if stream.write_all(response.as_bytes()).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}

/// The JSON for one issue, with every field the search asks for.
pub(crate) fn issue_json(key: &str, reporter: &str) -> String {
    format!(
        r#"{{
            "key": "{key}",
            "fields": {{
                "project": {{"name": "WildFly"}},
                "summary": "Summary of {key}",
                "status": {{"name": "Open"}},
                "reporter": {{"name": "{reporter}"}},
                "assignee": {{"name": "{reporter}"}},
                "updated": "2021-07-04T10:00:00.000+0000",
                "comment": {{"comments": [{{"author": {{"name": "{reporter}"}}}}]}}
            }}
        }}"#
    )
}
