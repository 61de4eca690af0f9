//! Login and logout against the array's credentials resource

use super::{RequestOptions, RestSession};
use crate::error::{RestError, Result};
use reqwest::Method;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CREDENTIALS_PATH: &str = "/credentials";

/// Username/password pair kept for silent re-authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Holds the session's auth-in-progress flag for its lifetime
///
/// Dropping the guard clears the flag, including when the owning future is
/// cancelled mid-login.
pub(super) struct AuthGuard {
    flag: Arc<AtomicBool>,
}

impl AuthGuard {
    pub(super) fn engage(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }
}

impl Drop for AuthGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

impl RestSession {
    /// Log in and store the returned session key
    ///
    /// The credentials are kept so an expired key can be renewed silently.
    /// Any previous key is discarded first; on failure the session is left
    /// without a key and the error is returned.
    pub async fn authenticate(&mut self, user: &str, password: &str) -> Result<()> {
        let _guard = self.auth_guard();

        debug!("Authenticating as {}", user);
        self.session_key = None;

        let info = json!({ "user": user, "password": password });
        let response = self
            .authenticated_request(
                Method::POST,
                CREDENTIALS_PATH,
                Some(info),
                RequestOptions::default(),
            )
            .await?;

        let key = response
            .body
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| RestError::MissingSessionKey(CREDENTIALS_PATH.to_string()))?;

        self.session_key = Some(key.to_string());
        self.credentials = Some(Credentials::new(user, password));

        if let Some(location) = response.location() {
            debug!("Session resource created at {}", location);
        }
        info!("Authenticated as {}", user);
        Ok(())
    }

    /// Re-run the login with stored credentials
    ///
    /// Boxed because it re-enters `authenticated_request`.
    pub(super) fn reauthenticate(&mut self, credentials: Credentials) -> AuthFuture<'_> {
        Box::pin(async move {
            self.authenticate(credentials.user(), credentials.password())
                .await
        })
    }

    /// Terminate the session on the array and forget the key and credentials
    ///
    /// Local state is cleared even when the delete fails; the delete's
    /// outcome is returned. A 401 here is not retried. Without an active
    /// session this is a no-op.
    pub async fn unauthenticate(&mut self) -> Result<()> {
        let Some(key) = self.session_key.clone() else {
            debug!("No active session to terminate");
            return Ok(());
        };

        let result = {
            let _guard = self.auth_guard();
            let path = format!("{}/{}", CREDENTIALS_PATH, key);
            self.authenticated_request(Method::DELETE, &path, None, RequestOptions::default())
                .await
        };

        self.session_key = None;
        self.credentials = None;

        match result {
            Ok(_) => {
                info!("Session terminated");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to terminate session on the array: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("user", "hp");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("\"hp\""));
    }

    #[test]
    fn test_auth_guard_clears_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        {
            let _guard = AuthGuard::engage(Arc::clone(&flag));
            assert!(flag.load(Ordering::Acquire));
        }
        assert!(!flag.load(Ordering::Acquire));
    }
}
