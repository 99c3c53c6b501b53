use core::fmt;

use async_trait::async_trait;
use chrono_tz::Tz;

use crate::calendar::TimeWindow;
use harvest_types::{BrokerRow, Candle, HarvestError, PrimaryRow};

/// Free, best-effort provider of regular-session minute bars.
///
/// Implementations never fail: transport errors, unknown instruments, empty
/// responses and windows outside the regular session all yield an empty `Vec`.
#[async_trait]
pub trait PrimaryProvider: Send + Sync {
    /// Stable provider name used in logs.
    fn name(&self) -> &'static str;

    /// Zone naive timestamps from this provider are expressed in.
    fn native_timezone(&self) -> Tz {
        chrono_tz::America::New_York
    }

    /// Fetch raw minute rows for `instrument_id` within `window`.
    async fn fetch(&self, instrument_id: &str, window: TimeWindow) -> Vec<PrimaryRow>;
}

/// Credential pair issued by the broker for one run.
///
/// Acquired once and passed explicitly to every broker call; never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerSession {
    cst: String,
    security_token: String,
}

impl BrokerSession {
    /// Wrap the two tokens returned by the broker's session endpoint.
    pub fn new(cst: impl Into<String>, security_token: impl Into<String>) -> Self {
        Self {
            cst: cst.into(),
            security_token: security_token.into(),
        }
    }

    /// Client session token.
    #[must_use]
    pub fn cst(&self) -> &str {
        &self.cst
    }

    /// Account security token.
    #[must_use]
    pub fn security_token(&self) -> &str {
        &self.security_token
    }
}

impl fmt::Debug for BrokerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerSession")
            .field("cst", &"<redacted>")
            .field("security_token", &"<redacted>")
            .finish()
    }
}

/// Authenticated broker covering pre-market, regular and post-market sessions.
#[async_trait]
pub trait BrokerProvider: Send + Sync {
    /// Stable provider name used in logs.
    fn name(&self) -> &'static str;

    /// Zone the broker's naive snapshot times are expressed in.
    fn native_timezone(&self) -> Tz;

    /// Obtain a session credential pair.
    ///
    /// # Errors
    /// Returns [`HarvestError::Authentication`] when the broker rejects the
    /// credentials or cannot be reached.
    async fn authenticate(&self) -> Result<BrokerSession, HarvestError>;

    /// Fetch raw minute rows for `instrument_id` within `window`.
    ///
    /// Never fails; the lookback horizon and "now" clamp the window before any
    /// request is issued, and an empty clamped window issues no request.
    async fn fetch(
        &self,
        session: &BrokerSession,
        instrument_id: &str,
        window: TimeWindow,
    ) -> Vec<BrokerRow>;
}

/// Idempotent candle store keyed by `(symbol, ts)`.
#[async_trait]
pub trait CandleSink: Send + Sync {
    /// Insert or replace every candle of `batch` in one unit of work.
    ///
    /// # Errors
    /// Returns an error if the batch could not be written. The error message
    /// is surfaced by the persistence gateway together with the batch index.
    async fn upsert_batch(&self, batch: &[Candle]) -> Result<(), HarvestError>;
}
