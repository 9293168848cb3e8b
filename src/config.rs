//! Runner configuration.
//!
//! Layers, lowest precedence first: built-in defaults, a JSON default-values
//! file, `API_RUNNER_*` environment variables, then whatever the caller sets
//! afterwards (the CLI applies its flags last).
//!
//! The default-values file is a flat object keyed by human labels:
//! ```json
//! {
//!   "Auth URL": "https://auth.example.com/token",
//!   "Username": "svc-tests",
//!   "Password": "hunter2",
//!   "Protocol": "http_bearer"
//! }
//! ```
//! Labels other than these four are ignored.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::auth::Credentials;
use crate::factory::Protocol;

pub const ENV_PROTOCOL: &str = "API_RUNNER_PROTOCOL";
pub const ENV_AUTH_URL: &str = "API_RUNNER_AUTH_URL";
pub const ENV_USERNAME: &str = "API_RUNNER_USERNAME";
pub const ENV_PASSWORD: &str = "API_RUNNER_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "API_RUNNER_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "API_RUNNER_CONNECT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub protocol: String,
    pub credentials: Credentials,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Http.as_str().to_string(),
            credentials: Credentials::default(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl RunnerConfig {
    /// Defaults, then `defaults_file` if given, then the process environment.
    pub fn load(defaults_file: Option<&str>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = defaults_file {
            config.apply_defaults_file(path)?;
        }
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads a default-values JSON file from `path`.
    pub fn apply_defaults_file(&mut self, path: &str) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read default values from '{path}'"))?;
        let values: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("'{path}' is not a flat JSON object of strings"))?;
        self.apply_default_values(&values);
        Ok(())
    }

    pub fn apply_default_values(&mut self, values: &HashMap<String, String>) {
        if let Some(v) = values.get("Auth URL") {
            self.credentials.auth_url = v.clone();
        }
        if let Some(v) = values.get("Username") {
            self.credentials.username = v.clone();
        }
        if let Some(v) = values.get("Password") {
            self.credentials.password = v.clone();
        }
        if let Some(v) = values.get("Protocol") {
            self.protocol = v.clone();
        }
    }

    /// Overrides fields from `API_RUNNER_*` variables resolved by `lookup`.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup(ENV_PROTOCOL) {
            self.protocol = v;
        }
        if let Some(v) = lookup(ENV_AUTH_URL) {
            self.credentials.auth_url = v;
        }
        if let Some(v) = lookup(ENV_USERNAME) {
            self.credentials.username = v;
        }
        if let Some(v) = lookup(ENV_PASSWORD) {
            self.credentials.password = v;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = v
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number, got '{v}'"))?;
        }
        if let Some(v) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            self.connect_timeout_secs = v.parse().with_context(|| {
                format!("{ENV_CONNECT_TIMEOUT_SECS} must be a whole number, got '{v}'")
            })?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
