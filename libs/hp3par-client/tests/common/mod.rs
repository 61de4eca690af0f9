//! Common test utilities for hp3par-client integration tests
//!
//! Provides a minimal mock of the array's management API: it issues a key
//! on valid credentials, checks the key on every other call, and drops it on
//! logout. Tests can expire or rotate the key between calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub const VALID_USER: &str = "user";
pub const VALID_PASSWORD: &str = "hp";
const API_PREFIX: &str = "/api/v1";
const KEY_HEADER: &str = "x-informapi-sessionkey";

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub session_key: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Default)]
struct ArrayState {
    active_key: Option<String>,
    issued: usize,
    rotate_next: bool,
    seen: Vec<SeenRequest>,
}

impl ArrayState {
    fn issue_key(&mut self) -> String {
        self.issued += 1;
        let key = format!("KEY{:04}", self.issued);
        self.active_key = Some(key.clone());
        key
    }
}

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// Mock storage array speaking just enough HTTP/1.1 for the client
pub struct MockArray {
    pub addr: SocketAddr,
    state: Arc<Mutex<ArrayState>>,
    shutdown: Arc<Notify>,
    accept_task: JoinHandle<()>,
}

impl MockArray {
    /// Create and start a new mock array
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(ArrayState::default()));
        let shutdown = Arc::new(Notify::new());

        let state_clone = state.clone();
        let shutdown_clone = shutdown.clone();
        let accept_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let state = state_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, state).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            state,
            shutdown,
            accept_task,
        }
    }

    /// API root URL for this server
    pub fn api_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    /// Invalidate the active key, as if the session timed out
    pub fn expire_session(&self) {
        self.state.lock().unwrap().active_key = None;
    }

    /// Rotate the key on the next authenticated response
    pub fn rotate_next(&self) {
        self.state.lock().unwrap().rotate_next = true;
    }

    pub fn active_key(&self) -> Option<String> {
        self.state.lock().unwrap().active_key.clone()
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.lock().unwrap().seen.clone()
    }

    /// Shutdown the server
    ///
    /// Aborting the accept task drops the listener and releases the port,
    /// even if the loop never reached its first `notified()`.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
        self.accept_task.abort();
    }

    async fn handle_connection(mut stream: TcpStream, state: Arc<Mutex<ArrayState>>) {
        let request = match read_request(&mut stream).await {
            Some(request) => request,
            None => return,
        };

        let reply = {
            let mut state = state.lock().unwrap();
            state.seen.push(request.clone());
            route(&mut state, &request)
        };

        let _ = stream.write_all(&encode_reply(&reply)).await;
        let _ = stream.shutdown().await;
    }
}

impl Drop for MockArray {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn route(state: &mut ArrayState, request: &SeenRequest) -> Reply {
    let Some(path) = request.path.strip_prefix(API_PREFIX) else {
        return Reply::new(404, "");
    };

    match (request.method.as_str(), path) {
        ("POST", "/credentials") => login(state, &request.body),
        ("GET", "/credentials") => Reply::new(200, "GET credentials called"),
        ("DELETE", p) if p.starts_with("/credentials/") => {
            let key = &p["/credentials/".len()..];
            if state.active_key.as_deref() == Some(key) {
                state.active_key = None;
            }
            Reply::new(200, "DELETE credentials called")
        }
        _ => authenticated(state, request, path),
    }
}

fn login(state: &mut ArrayState, body: &str) -> Reply {
    let creds: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Reply::new(400, r#"{"code":1,"desc":"malformed request"}"#),
    };

    if creds["user"] == VALID_USER && creds["password"] == VALID_PASSWORD {
        let key = state.issue_key();
        Reply::new(201, format!(r#"{{"key":"{}"}}"#, key))
            .header("Location", format!("{}/credentials/{}", API_PREFIX, key))
    } else {
        Reply::new(401, r#"{"code":5,"desc":"invalid username or password"}"#)
    }
}

fn authenticated(state: &mut ArrayState, request: &SeenRequest, path: &str) -> Reply {
    if request.session_key.is_none() || request.session_key != state.active_key {
        return Reply::new(401, r#"{"code":6,"desc":"invalid session key"}"#);
    }

    let reply = match (request.method.as_str(), path) {
        ("GET", "/volumes") => Reply::new(200, r#"{"total":1,"members":[{"name":"vol1"}]}"#),
        ("GET", "/volumes/vol1") => Reply::new(200, r#"{"name":"vol1","sizeMiB":1024}"#),
        ("POST", "/volumes") => Reply::new(201, "").header("Location", "/api/v1/volumes/vol2"),
        ("PUT", "/volumes/vol1") => Reply::new(200, ""),
        ("DELETE", "/volumes/vol1") => Reply::new(200, ""),
        ("GET", "/hello") => Reply::new(200, "Hello World"),
        ("POST", "/volumes/vol1") => {
            Reply::new(409, r#"{"code":73,"desc":"volume exists"}"#)
        }
        _ => Reply::new(404, r#"{"code":23,"desc":"resource does not exist"}"#),
    };

    if state.rotate_next && reply.status < 400 {
        state.rotate_next = false;
        let key = state.issue_key();
        return reply.header("X-InFormAPI-SessionKey", key);
    }
    reply
}

async fn read_request(stream: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(SeenRequest {
        method,
        path,
        session_key: headers.get(KEY_HEADER).cloned(),
        headers,
        body,
    })
}

fn encode_reply(reply: &Reply) -> Vec<u8> {
    let reason = match reply.status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Unknown",
    };

    let mut out = format!("HTTP/1.1 {} {}\r\n", reply.status, reason);
    out.push_str(&format!("Content-Length: {}\r\n", reply.body.len()));
    if !reply.body.is_empty() {
        out.push_str("Content-Type: application/json\r\n");
    }
    out.push_str("Connection: close\r\n");
    for (name, value) in &reply.headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str("\r\n");
    out.push_str(&reply.body);
    out.into_bytes()
}
