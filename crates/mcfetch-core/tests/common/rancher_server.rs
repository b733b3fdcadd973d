//! Minimal HTTP/1.1 mock of the v1 API for integration tests.
//!
//! Serves token creation/listing, host listing and machine config download
//! under `/api/v1`, requires basic auth, and records every request line.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// `base64("access:secret")`.
pub const BASIC_AUTH: &str = "Basic YWNjZXNzOnNlY3JldA==";

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// List calls that still report a new token as `registering`.
    pub registering_polls: u32,
    /// `Content-Disposition` values keyed by host id.
    pub dispositions: HashMap<String, String>,
    /// Overrides the `name` echoed by token creation.
    pub create_name_override: Option<String>,
    /// JSON array served by `/v1/hosts`.
    pub hosts_json: Option<String>,
}

#[derive(Debug)]
struct TokenRecord {
    name: String,
    project: String,
    polls_left: u32,
}

#[derive(Debug, Default)]
struct State {
    tokens: Vec<TokenRecord>,
    requests: Vec<String>,
}

/// Handle to a running mock server.
#[derive(Clone)]
pub struct MockServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl MockServer {
    /// Request lines seen so far, e.g. `"GET /api/v1/hosts"`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(opts: ServerOptions) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State::default()));
    let opts = Arc::new(opts);
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            let opts = Arc::clone(&opts);
            thread::spawn(move || handle(stream, &state, &opts));
        }
    });
    MockServer {
        base_url: format!("http://127.0.0.1:{}/api", port),
        state,
    }
}

struct Request {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&data[..head_end]).ok()?.to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let len = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = data[head_end..].to_vec();
    while body.len() < len {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    Some(Request {
        method,
        target,
        headers,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &[String], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for h in extra_headers {
        head.push_str(h);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn json(stream: &mut TcpStream, value: serde_json::Value) {
    let body = serde_json::to_vec(&value).unwrap();
    respond(
        stream,
        "200 OK",
        &["Content-Type: application/json".to_string()],
        &body,
    );
}

fn token_value(t: &TokenRecord) -> String {
    format!("tok-{}-{}", t.project, t.name)
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn handle(mut stream: TcpStream, state: &Mutex<State>, opts: &ServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let req = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    state
        .lock()
        .unwrap()
        .requests
        .push(format!("{} {}", req.method, req.target));

    if req.header("authorization") != Some(BASIC_AUTH) {
        respond(&mut stream, "401 Unauthorized", &[], b"");
        return;
    }

    let (path, query) = req.target.split_once('?').unwrap_or((req.target.as_str(), ""));
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (req.method.as_str(), segments.as_slice()) {
        ("POST", ["api", "v1", "projects", project, "registrationTokens"]) => {
            let body: serde_json::Value = match serde_json::from_slice(&req.body) {
                Ok(v) => v,
                Err(_) => return respond(&mut stream, "400 Bad Request", &[], b""),
            };
            let name = body["name"].as_str().unwrap_or_default().to_string();
            state.lock().unwrap().tokens.push(TokenRecord {
                name: name.clone(),
                project: project.to_string(),
                polls_left: opts.registering_polls,
            });
            let echoed = opts.create_name_override.clone().unwrap_or(name);
            json(
                &mut stream,
                serde_json::json!({
                    "id": "1c1",
                    "type": "registrationToken",
                    "name": echoed,
                    "state": "registering",
                    "token": null,
                    "accountId": project,
                }),
            );
        }
        ("GET", ["api", "v1", "registrationTokens"]) => {
            let mut st = state.lock().unwrap();
            let data: Vec<serde_json::Value> = st
                .tokens
                .iter_mut()
                .map(|t| {
                    if t.polls_left > 0 {
                        t.polls_left -= 1;
                        serde_json::json!({"name": t.name, "state": "registering", "token": null})
                    } else {
                        serde_json::json!({"name": t.name, "state": "active", "token": token_value(t)})
                    }
                })
                .collect();
            drop(st);
            json(&mut stream, serde_json::json!({ "data": data }));
        }
        ("GET", ["api", "v1", "hosts"]) => {
            let data = opts.hosts_json.as_deref().unwrap_or("[]");
            let body = format!("{{\"type\":\"collection\",\"data\":{}}}", data);
            respond(
                &mut stream,
                "200 OK",
                &["Content-Type: application/json".to_string()],
                body.as_bytes(),
            );
        }
        ("GET", ["api", "v1", "projects", project, "machines", host, "config"]) => {
            let known = state.lock().unwrap().tokens.iter().any(|t| {
                t.project == *project
                    && t.polls_left == 0
                    && query_param(query, "token") == Some(token_value(t).as_str())
            });
            if !known || query_param(query, "projectId") != Some(*project) {
                return respond(&mut stream, "403 Forbidden", &[], b"");
            }
            let mut headers = vec!["Content-Type: application/octet-stream".to_string()];
            if let Some(cd) = opts.dispositions.get(*host) {
                headers.push(format!("Content-Disposition: {}", cd));
            }
            let body = format!("archive:{}", host);
            respond(&mut stream, "200 OK", &headers, body.as_bytes());
        }
        _ => respond(&mut stream, "404 Not Found", &[], b""),
    }
}
