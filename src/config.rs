//! Process configuration.
//!
//! Values come from command-line flags or their environment variables. Only
//! presence and shape are checked here; whether the token actually works is
//! discovered by the startup protocol.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::codecks::{CodecksError, CodecksResult};

pub const DEFAULT_API_URL: &str = "https://api.codecks.io";
pub const DEFAULT_LOG_FILTER: &str = "codecks_mcp=info";

/// Legacy variable names accepted when the primary ones are unset.
const LEGACY_SUBDOMAIN_VAR: &str = "CODECKS_TEAM_ID";
const LEGACY_TOKEN_VAR: &str = "CODECKS_API_TOKEN";

#[derive(Parser, Debug, Clone)]
#[command(name = "codecks-mcp")]
#[command(author, version, about = "Codecks MCP server (stdio)", long_about = None)]
pub struct Cli {
    /// Codecks account subdomain (the `acme` in acme.codecks.io)
    #[arg(long, env = "CODECKS_SUBDOMAIN")]
    pub subdomain: Option<String>,

    /// Codecks auth token
    #[arg(long, env = "CODECKS_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Base URL of the Codecks API
    #[arg(long, env = "CODECKS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "CODECKS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Validated configuration handed to the remote client.
#[derive(Clone)]
pub struct Config {
    pub subdomain: String,
    pub auth_token: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("subdomain", &self.subdomain)
            .field("auth_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Parse `args` (program name first) and build a validated config.
    ///
    /// Usage errors from clap, such as a timeout that is not a positive
    /// integer, are reported as [`CodecksError::Config`] rather than clap's
    /// own exit path, so every configuration failure exits the same way.
    /// `--help` and `--version` still print and exit as usual.
    ///
    /// # Arguments
    /// * `args` - Command-line arguments, e.g. `std::env::args_os()`
    ///
    /// # Returns
    /// The validated `Config`, or a `Config` error describing the first problem
    pub fn load_from<I, T>(args: I) -> CodecksResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => return Err(CodecksError::config(e.to_string().trim_end())),
        };
        Self::from_cli(cli)
    }

    /// Build a config from parsed arguments, falling back to the legacy
    /// environment variable names for the two required values.
    pub fn from_cli(cli: Cli) -> CodecksResult<Self> {
        let subdomain =
            non_blank(cli.subdomain).or_else(|| non_blank(env::var(LEGACY_SUBDOMAIN_VAR).ok()));
        let auth_token =
            non_blank(cli.auth_token).or_else(|| non_blank(env::var(LEGACY_TOKEN_VAR).ok()));

        let (subdomain, auth_token) = match (subdomain, auth_token) {
            (Some(s), Some(t)) => (s, t),
            (None, Some(_)) => return Err(CodecksError::config("subdomain is required")),
            (Some(_), None) => return Err(CodecksError::config("auth token is required")),
            (None, None) => {
                return Err(CodecksError::config("subdomain and auth token are required"));
            }
        };

        Self::new(subdomain, auth_token, cli.api_url, cli.timeout_secs)
    }

    /// Build and validate a config from explicit values.
    ///
    /// # Arguments
    ///
    /// * `subdomain` - Account subdomain, trimmed; must not be empty
    /// * `auth_token` - API token, trimmed; must not be empty
    /// * `api_url` - Base URL, trailing slashes removed
    /// * `timeout_secs` - Per-request timeout; must be at least one second
    ///
    /// # Returns
    ///
    /// The config, or [`CodecksError::Config`] describing the first bad value.
    pub fn new(
        subdomain: impl Into<String>,
        auth_token: impl Into<String>,
        api_url: impl Into<String>,
        timeout_secs: u64,
    ) -> CodecksResult<Self> {
        let subdomain = subdomain.into().trim().to_string();
        let auth_token = auth_token.into().trim().to_string();
        let api_url = api_url.into().trim().trim_end_matches('/').to_string();

        if subdomain.is_empty() {
            return Err(CodecksError::config("subdomain is required"));
        }
        if auth_token.is_empty() {
            return Err(CodecksError::config("auth token is required"));
        }
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(CodecksError::config(format!(
                "API URL must start with http:// or https:// (got '{api_url}')"
            )));
        }
        if timeout_secs == 0 {
            return Err(CodecksError::config("timeout must be greater than 0"));
        }

        Ok(Self {
            subdomain,
            auth_token,
            api_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Log filter for the stderr subscriber: `RUST_LOG` when it is set and valid,
/// otherwise [`DEFAULT_LOG_FILTER`]. The default is never merged into a
/// user-supplied filter.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
