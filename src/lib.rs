//! 3PAR management tools - main library
//!
//! Thin layer over the `hp3par-client` workspace member.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (config and
//!   credential resolution)
//! - **hp3par_client**: Session-authenticated REST client (re-exported from
//!   workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use hp3par_tools::bin_common::{load_config_from_env, ConfigType};
//! use hp3par_tools::hp3par_client::RestSession;
//! ```

// Re-export workspace libraries for convenience
pub use hp3par_client;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{credentials_from_env, load_config_from_env, parse_args, ConfigType};
}
