//! # hp3par-client
//!
//! Session-authenticated REST client for the 3PAR InForm management API.
//!
//! A [`RestSession`] logs in once, attaches the returned session key to every
//! request, adopts keys rotated by the array, and silently logs in again (at
//! most once per call) when the key expires.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hp3par_client::{RestSession, SessionConfig};
//!
//! # async fn run() -> hp3par_client::Result<()> {
//! let config = SessionConfig::new("https://array:8080/api/v1").insecure(true);
//! let mut session = RestSession::new(config)?;
//!
//! session.authenticate("user", "hp").await?;
//! let volumes = session.get("/volumes").await?;
//! println!("{} {}", volumes.status, volumes.body);
//! session.unauthenticate().await?;
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use body::ResponseBody;
pub use config::{ConfigError, SessionConfig};
pub use error::{ApiFailure, RestError, Result};
pub use logging::{env_filter, init_tracing, HTTP_LOG_TARGET};
pub use session::{
    Credentials, RequestOptions, RestResponse, RestSession, SharedSession, TimingRecord,
    CLIENT_USER_AGENT, SESSION_KEY_HEADER,
};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse};

// Types appearing in the public API
pub use reqwest::header;
pub use reqwest::Method;
