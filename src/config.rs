//! Configuration management for the Tidal Migration CLI.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Tidal API credentials, server
//! settings, and the migration tuning values.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf, time::Duration};

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `timicli/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/timicli/.env`
/// - macOS: `~/Library/Application Support/timicli/.env`
/// - Windows: `%LOCALAPPDATA%/timicli/.env`
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - The `.env` file cannot be read or parsed
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("timicli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns the server address for the local OAuth callback server.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Tidal API client ID for authentication.
///
/// # Panics
///
/// Panics if the `TIDAL_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn tidal_client_id() -> String {
    env::var("TIDAL_API_AUTH_CLIENT_ID").expect("TIDAL_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Tidal OAuth redirect URI.
///
/// This must match the redirect URI registered for the Tidal application.
///
/// # Panics
///
/// Panics if the `TIDAL_API_REDIRECT_URI` environment variable is not set.
pub fn tidal_redirect_uri() -> String {
    env::var("TIDAL_API_REDIRECT_URI").expect("TIDAL_API_REDIRECT_URI must be set")
}

/// Returns the Tidal API scope permissions.
///
/// # Panics
///
/// Panics if the `TIDAL_API_AUTH_SCOPE` environment variable is not set.
pub fn tidal_scope() -> String {
    env::var("TIDAL_API_AUTH_SCOPE").expect("TIDAL_API_AUTH_SCOPE must be set")
}

/// Returns the Tidal OAuth authorization URL.
///
/// # Panics
///
/// Panics if the `TIDAL_API_AUTH_URL` environment variable is not set.
pub fn tidal_apiauth_url() -> String {
    env::var("TIDAL_API_AUTH_URL").expect("TIDAL_API_AUTH_URL must be set")
}

/// Returns the Tidal Web API base URL.
///
/// # Panics
///
/// Panics if the `TIDAL_API_URL` environment variable is not set.
pub fn tidal_apiurl() -> String {
    env::var("TIDAL_API_URL").expect("TIDAL_API_URL must be set")
}

/// Returns the Tidal OAuth token exchange URL.
///
/// # Panics
///
/// Panics if the `TIDAL_API_TOKEN_URL` environment variable is not set.
pub fn tidal_apitoken_url() -> String {
    env::var("TIDAL_API_TOKEN_URL").expect("TIDAL_API_TOKEN_URL must be set")
}

/// Tuning values for a migration run.
///
/// Passed into the rate limiter and the orchestrator at construction, never
/// read from process-wide mutable state. Tests substitute near-zero delays
/// to run deterministically.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Minimum spacing before each per-item remote call.
    pub item_delay: Duration,
    /// Minimum spacing before playlist-creation-class calls. The remote
    /// service enforces stricter limits on playlist operations.
    pub playlist_delay: Duration,
    /// Items requested per listing page.
    pub page_size: u64,
    /// Retry budget for throttled and transient failures per call.
    pub max_retries: u32,
    /// Upper bound for a single backoff delay.
    pub backoff_ceiling: Duration,
    /// Number of newest items shown by preview calls.
    pub preview_window: u64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        MigrationConfig {
            item_delay: Duration::from_millis(20),
            playlist_delay: Duration::from_millis(500),
            page_size: 50,
            max_retries: 5,
            backoff_ceiling: Duration::from_secs(64),
            preview_window: 10,
        }
    }
}

impl MigrationConfig {
    /// Builds a config from the environment, falling back to the defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = MigrationConfig::default();
        MigrationConfig {
            item_delay: env_millis("TIMICLI_ITEM_DELAY_MS").unwrap_or(defaults.item_delay),
            playlist_delay: env_millis("TIMICLI_PLAYLIST_DELAY_MS")
                .unwrap_or(defaults.playlist_delay),
            page_size: env_u64("TIMICLI_PAGE_SIZE").unwrap_or(defaults.page_size),
            max_retries: env_u64("TIMICLI_MAX_RETRIES")
                .map(|v| v as u32)
                .unwrap_or(defaults.max_retries),
            backoff_ceiling: env_u64("TIMICLI_BACKOFF_CEILING_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.backoff_ceiling),
            preview_window: env_u64("TIMICLI_PREVIEW_WINDOW").unwrap_or(defaults.preview_window),
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse::<u64>().ok())
}

fn env_millis(name: &str) -> Option<Duration> {
    env_u64(name).map(Duration::from_millis)
}
