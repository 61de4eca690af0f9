//! Session-authenticated REST client
//!
//! Split into focused modules:
//! - `auth`: login/logout against the credentials resource
//! - `http_log`: verbose request/response logging
//! - `timing`: per-attempt timing records
//!
//! Every call funnels through [`RestSession::authenticated_request`], which
//! injects the session key, records timing, adopts rotated keys, classifies
//! the status code and performs at most one silent re-authentication when
//! the array answers 401.

mod auth;
mod http_log;
mod timing;


pub use auth::Credentials;
pub use timing::{TimingLog, TimingRecord};

use crate::body::ResponseBody;
use crate::config::SessionConfig;
use crate::error::{check_status, RestError, Result};
use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use auth::AuthGuard;
use chrono::Utc;
use http_log::HttpLogger;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION, USER_AGENT};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the session key, in both directions
pub const SESSION_KEY_HEADER: &str = "x-informapi-sessionkey";

/// `User-Agent` sent with every request
pub const CLIENT_USER_AGENT: &str = concat!("hp3parclient-rs/", env!("CARGO_PKG_VERSION"));

/// A session shared between tasks
///
/// The lock is held for a whole logical call, re-authentication and retry
/// included.
pub type SharedSession = Arc<tokio::sync::Mutex<RestSession>>;

/// Per-call extras
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Additional request headers; the session's own headers take precedence
    pub headers: HeaderMap,
    /// Overrides the session-wide timeout for this call
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Successful response of an authenticated call
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl RestResponse {
    /// `Location` header, returned by the array for created resources
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }
}

/// REST client bound to one array and one login session
///
/// Not internally synchronized: mutating calls take `&mut self`. Use
/// [`RestSession::into_shared`] to share a session between tasks.
pub struct RestSession {
    base_url: String,
    transport: Arc<dyn Transport>,
    session_key: Option<String>,
    credentials: Option<Credentials>,
    /// Set while a login is in flight; a 401 seen under it is final
    auth_in_progress: Arc<AtomicBool>,
    insecure: bool,
    timeout: Option<Duration>,
    logger: HttpLogger,
    timings: TimingLog,
}

impl RestSession {
    /// Create a session using the `reqwest` transport
    pub fn new(config: SessionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.insecure)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a session on top of a custom transport
    pub fn with_transport(config: SessionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let base_url = config.normalized_base_url().to_string();
        debug!("Creating REST session for {}", base_url);

        Ok(Self {
            logger: HttpLogger::new(&base_url, config.debug_logging),
            base_url,
            transport,
            session_key: None,
            credentials: None,
            auth_in_progress: Arc::new(AtomicBool::new(false)),
            insecure: config.insecure,
            timeout: config.request_timeout(),
            timings: TimingLog::new(),
        })
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session key, if logged in
    pub fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_key.is_some()
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    pub fn set_debug_logging(&mut self, enabled: bool) {
        self.logger.set_enabled(enabled);
    }

    pub fn debug_logging(&self) -> bool {
        self.logger.is_enabled()
    }

    /// Timing records of every transport attempt since the last reset
    pub fn get_timings(&self) -> &[TimingRecord] {
        self.timings.records()
    }

    pub fn reset_timings(&mut self) {
        self.timings.reset();
    }

    pub async fn get(&mut self, path: &str) -> Result<RestResponse> {
        self.authenticated_request(Method::GET, path, None, RequestOptions::default())
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(&mut self, path: &str, body: &B) -> Result<RestResponse> {
        let body = serde_json::to_value(body)?;
        self.authenticated_request(Method::POST, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&mut self, path: &str, body: &B) -> Result<RestResponse> {
        let body = serde_json::to_value(body)?;
        self.authenticated_request(Method::PUT, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn delete(&mut self, path: &str) -> Result<RestResponse> {
        self.authenticated_request(Method::DELETE, path, None, RequestOptions::default())
            .await
    }

    /// Issue a request, re-authenticating once if the session key was rejected
    ///
    /// A 401 triggers a login with the stored credentials followed by exactly
    /// one retry of the original request. No retry happens when a login is
    /// already in flight or no credentials are stored. If the login itself
    /// is rejected, the original `Unauthorized` is returned.
    pub async fn authenticated_request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<RestResponse> {
        let payload = body.as_ref().map(serde_json::to_string).transpose()?;

        let rejected = match self
            .send_once(&method, path, body.as_ref(), payload.as_deref(), &options)
            .await
        {
            Err(RestError::Unauthorized(failure)) => failure,
            other => return other,
        };

        if self.auth_in_progress.load(Ordering::Acquire) {
            debug!("{} {} rejected during login, not retrying", method, path);
            return Err(RestError::Unauthorized(rejected));
        }

        let Some(credentials) = self.credentials.clone() else {
            debug!("{} {} rejected and no credentials are stored", method, path);
            return Err(RestError::Unauthorized(rejected));
        };

        warn!(
            "Session key rejected on {} {}, re-authenticating as {}",
            method,
            path,
            credentials.user()
        );

        match self.reauthenticate(credentials).await {
            Ok(()) => {}
            Err(RestError::Unauthorized(_)) => return Err(RestError::Unauthorized(rejected)),
            Err(e) => return Err(e),
        }

        self.send_once(&method, path, body.as_ref(), payload.as_deref(), &options)
            .await
    }

    /// Perform one transport attempt and classify the result
    async fn send_once(
        &mut self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        payload: Option<&str>,
        options: &RequestOptions,
    ) -> Result<RestResponse> {
        let request = TransportRequest {
            method: method.clone(),
            url: format!("{}{}", self.base_url, path),
            headers: self.build_headers(payload.is_some(), &options.headers)?,
            body: payload.map(str::to_owned),
            timeout: options.timeout.or(self.timeout),
        };

        self.logger.log_request(&request, body);

        let start = Utc::now();
        let outcome = self.transport.send(request).await;
        self.timings
            .record(format!("{} {}", method, path), start, Utc::now());

        let response = outcome?;
        self.logger.log_response(&response);

        if let Some(key) = response
            .headers
            .get(SESSION_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            if self.session_key.as_deref() != Some(key) {
                debug!("Adopting rotated session key from {} {}", method, path);
            }
            self.session_key = Some(key.to_string());
        }

        let body = check_status(response.status, path, ResponseBody::from_bytes(&response.body))?;

        Ok(RestResponse {
            status: response.status,
            headers: response.headers,
            body,
        })
    }

    fn build_headers(&self, has_body: bool, extra: &HeaderMap) -> Result<HeaderMap> {
        let mut headers = extra.clone();

        if let Some(key) = &self.session_key {
            let mut value = HeaderValue::from_str(key).map_err(|_| {
                RestError::InvalidHeader("session key is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(SESSION_KEY_HEADER, value);
        }

        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(headers)
    }

    fn auth_guard(&self) -> AuthGuard {
        AuthGuard::engage(Arc::clone(&self.auth_in_progress))
    }
}

impl std::fmt::Debug for RestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestSession")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.is_authenticated())
            .field("credentials", &self.credentials)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .field("debug_logging", &self.logger.is_enabled())
            .field("timings", &self.timings.len())
            .finish()
    }
}
