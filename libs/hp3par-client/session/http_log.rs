//! Verbose request/response logging
//!
//! Each session owns its logger. Output goes through `tracing` at DEBUG level
//! on the `hp3par_client::http` target, inside a span tagged with the
//! session's base URL. Requests are rendered as curl command lines so they
//! can be replayed by hand.

use super::SESSION_KEY_HEADER;
use crate::logging::HTTP_LOG_TARGET;
use crate::transport::{TransportRequest, TransportResponse};
use serde_json::Value;
use tracing::{debug, Span};

const REDACTED: &str = "<redacted>";

pub(crate) struct HttpLogger {
    enabled: bool,
    span: Span,
}

impl HttpLogger {
    pub(crate) fn new(base_url: &str, enabled: bool) -> Self {
        Self {
            enabled,
            span: tracing::debug_span!(target: HTTP_LOG_TARGET, "hp3par_session", base_url = %base_url),
        }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn log_request(&self, request: &TransportRequest, body: Option<&Value>) {
        if !self.enabled {
            return;
        }
        let _entered = self.span.enter();

        debug!(target: HTTP_LOG_TARGET, "REQ: {}", curl_line(request));
        if let Some(body) = body {
            debug!(target: HTTP_LOG_TARGET, "REQ BODY: {}", redact_body(body));
        }
    }

    pub(crate) fn log_response(&self, response: &TransportResponse) {
        if !self.enabled {
            return;
        }
        let _entered = self.span.enter();

        let headers: Vec<String> = response
            .headers
            .iter()
            .map(|(name, value)| {
                if name.as_str().eq_ignore_ascii_case(SESSION_KEY_HEADER) {
                    format!("{}: {}", name, REDACTED)
                } else {
                    format!("{}: {}", name, value.to_str().unwrap_or("<binary>"))
                }
            })
            .collect();

        debug!(
            target: HTTP_LOG_TARGET,
            "RESP: {} [{}]",
            response.status,
            headers.join(", ")
        );
        debug!(
            target: HTTP_LOG_TARGET,
            "RESP BODY: {}",
            String::from_utf8_lossy(&response.body)
        );
    }
}

/// Render a request as a curl command line
fn curl_line(request: &TransportRequest) -> String {
    let mut parts = vec![
        "curl -i".to_string(),
        format!("-X {}", request.method),
        request.url.clone(),
    ];

    for (name, value) in &request.headers {
        let value = if name.as_str().eq_ignore_ascii_case(SESSION_KEY_HEADER) {
            REDACTED
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        parts.push(format!("-H \"{}: {}\"", name, value));
    }

    parts.join(" ")
}

/// Copy of a request body with credential fields masked
fn redact_body(body: &Value) -> Value {
    match body {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if k.eq_ignore_ascii_case("password") {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), redact_body(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_body).collect()),
        other => other.clone(),
    }
}
