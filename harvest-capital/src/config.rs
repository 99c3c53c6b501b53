use core::fmt;
use std::time::Duration;

use chrono::TimeDelta;
use harvest_core::{HarvestError, RetryConfig, Tz};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "CAPITAL_X_CAP_API_KEY";
/// Environment variable holding the account identifier (login).
pub const ENV_IDENTIFIER: &str = "CAPITAL_IDENTIFIER";
/// Environment variable holding the account password.
pub const ENV_PASSWORD: &str = "CAPITAL_PASSWORD";

/// Endpoint, horizon and HTTP settings for the broker client.
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalConfig {
    /// API root including the version segment, without a trailing slash.
    pub base_url: String,
    /// How far back the price endpoint serves minute bars.
    pub lookback: TimeDelta,
    /// Added to the horizon when a start is clamped, so the request does not
    /// race the horizon moving forward.
    pub clamp_margin: TimeDelta,
    /// `max` points requested per call.
    pub max_points: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for price requests.
    pub retry: RetryConfig,
    /// Zone of naive `snapshotTime` values.
    pub native_tz: Tz,
}

impl Default for CapitalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-capital.backend-capital.com/api/v1".to_string(),
            lookback: TimeDelta::hours(16),
            clamp_margin: TimeDelta::minutes(1),
            max_points: 1000,
            timeout: Duration::from_secs(15),
            retry: RetryConfig::default(),
            native_tz: chrono_tz::Asia::Bahrain,
        }
    }
}

impl CapitalConfig {
    /// Point the client at another host (demo account, test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// API key and login used to open a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub(crate) api_key: String,
    pub(crate) identifier: String,
    pub(crate) password: String,
}

impl Credentials {
    /// Wrap explicit credentials.
    pub fn new(
        api_key: impl Into<String>,
        identifier: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    /// Read credentials from `CAPITAL_X_CAP_API_KEY`, `CAPITAL_IDENTIFIER` and
    /// `CAPITAL_PASSWORD`.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` naming every variable that is unset or blank.
    pub fn from_env() -> Result<Self, HarvestError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`Credentials::from_env`] over an arbitrary lookup.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` naming every missing key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarvestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let (key, id, pw) = (get(ENV_API_KEY), get(ENV_IDENTIFIER), get(ENV_PASSWORD));
        match (key, id, pw) {
            (Some(api_key), Some(identifier), Some(password)) => Ok(Self {
                api_key,
                identifier,
                password,
            }),
            (key, id, pw) => {
                let missing: Vec<&str> = [
                    (key.is_none(), ENV_API_KEY),
                    (id.is_none(), ENV_IDENTIFIER),
                    (pw.is_none(), ENV_PASSWORD),
                ]
                .into_iter()
                .filter_map(|(gone, name)| gone.then_some(name))
                .collect();
                Err(HarvestError::Config(format!(
                    "missing broker credentials: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}
