//! Server configuration, loaded from environment variables. Signing secrets
//! are required and redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP/WebSocket bind address.
    pub bind_address: String,

    /// Secret keying the identity cookie signature.
    pub identity_secret: String,

    /// Shared secret for the external media relay's credential scheme.
    pub relay_secret: String,

    /// Whether identity cookies carry the Secure attribute. Disable for
    /// plain-HTTP local development only.
    pub secure_cookies: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("identity_secret", &"[REDACTED]")
            .field("relay_secret", &"[REDACTED]")
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load from a plain map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let identity_secret = require(vars, "SWITCHBOARD_IDENTITY_SECRET")?;
        let relay_secret = require(vars, "SWITCHBOARD_RELAY_SECRET")?;

        let bind_address = vars
            .get("SWITCHBOARD_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let secure_cookies = match vars.get("SWITCHBOARD_SECURE_COOKIES") {
            None => true,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "SWITCHBOARD_SECURE_COOKIES",
                value: value.clone(),
            })?,
        };

        Ok(Self {
            bind_address,
            identity_secret,
            relay_secret,
            secure_cookies,
        })
    }
}

fn require(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
