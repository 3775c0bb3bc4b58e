//! Settings shared by every provider, and environment loading.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::http::TlsMode;
use crate::{MailError, Result};

/// Default timeout for a provider round trip, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Credentials and transport settings common to all providers.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API key.
    pub api_key: String,
    /// Round-trip timeout. Zero disables the timeout.
    pub timeout: Duration,
    /// TLS verification mode.
    pub tls: TlsMode,
}

impl ProviderConfig {
    /// Create a configuration with the default timeout and TLS verification on.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tls: TlsMode::Verify,
        }
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout in whole seconds.
    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    /// Accept invalid TLS certificates. For local test servers only.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.tls = TlsMode::DangerAcceptInvalidCerts;
        self
    }

    pub(crate) fn validate(&self, provider: &str) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(MailError::Config(format!("{} API key is empty", provider)));
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("tls", &self.tls)
            .finish()
    }
}

/// Reads provider settings from the process environment, after loading a
/// `.env` file from the working directory if one exists.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EnvSource;

impl EnvSource {
    pub(crate) fn load() -> Self {
        // A missing .env file is fine; real variables take precedence anyway.
        let _ = dotenvy::dotenv();
        Self
    }

    pub(crate) fn required(&self, key: &str) -> Result<String> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(MailError::Config(format!(
                "environment variable {} is not set",
                key
            ))),
        }
    }

    pub(crate) fn optional(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|value| !value.trim().is_empty())
    }

    pub(crate) fn timeout_secs(&self, key: &str) -> Result<u64> {
        match self.optional(key) {
            Some(value) => parse_timeout(key, &value),
            None => Ok(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn parse_timeout(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        MailError::Config(format!(
            "{} must be a non-negative number of seconds, got {:?}",
            key, value
        ))
    })
}
