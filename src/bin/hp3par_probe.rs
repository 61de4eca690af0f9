//! Probe binary for a 3PAR management API
//!
//! Logs in, fetches each given path, prints the results and the timing log,
//! then logs out.
//!
//! Requires environment variables in `.env`:
//!   - HP3PAR_USER, HP3PAR_PASSWORD
//!   - HP3PAR_CONFIG_PATH (optional, defaults to config/hp3par.yaml)
//!   - HP3PAR_API_URL, HP3PAR_INSECURE, HP3PAR_DEBUG (optional overrides)
//!
//! Usage:
//!   cargo run --bin hp3par_probe -- /volumes /hosts

use anyhow::{Context, Result};
use hp3par_tools::bin_common::{credentials_from_env, load_config_from_env, parse_args, ConfigType};
use hp3par_tools::hp3par_client::{init_tracing, RestSession, SessionConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = load_config_from_env(ConfigType::Session);
    let config = SessionConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    init_tracing(&config.log_level, config.debug_logging);
    config.log();

    let credentials = credentials_from_env()
        .context("HP3PAR_USER and HP3PAR_PASSWORD must be set")?;

    let mut paths = parse_args();
    if paths.is_empty() {
        paths.push("/volumes".to_string());
    }

    let mut session = RestSession::new(config)?;
    session
        .authenticate(credentials.user(), credentials.password())
        .await
        .context("Login failed")?;

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("3PAR API PROBE  {}", session.base_url());
    if session.is_insecure() {
        println!("TLS certificate validation: DISABLED");
    }
    println!("════════════════════════════════════════════════════════════════");

    for path in &paths {
        println!();
        match session.get(path).await {
            Ok(response) => {
                println!("GET {} -> {}", path, response.status);
                match response.body.as_json() {
                    Some(json) => println!("{}", serde_json::to_string_pretty(json)?),
                    None => println!("{}", response.body),
                }
            }
            Err(e) => {
                error!("GET {} failed: {}", path, e);
                println!("GET {} -> ERROR: {}", path, e);
            }
        }
    }

    println!();
    println!("TIMINGS:");
    println!("────────────────────────────────────────────────────────────────");
    for record in session.get_timings() {
        println!(
            "  {:<40} {:>6} ms",
            record.label,
            record.elapsed().num_milliseconds()
        );
    }
    println!();

    if let Err(e) = session.unauthenticate().await {
        error!("Logout failed: {}", e);
    } else {
        info!("Logged out");
    }

    Ok(())
}
