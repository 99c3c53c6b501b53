//! Configuration types shared across the orchestrator and connectors.

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::candle::Session;
use crate::error::HarvestError;

/// Which sessions of the target date a run harvests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarvestMode {
    /// Pre-market, regular, and post-market.
    #[default]
    FullDay,
    /// Pre-market only.
    PreOnly,
    /// Regular session only.
    RegOnly,
    /// Post-market only.
    PostOnly,
}

impl HarvestMode {
    /// Sessions covered by this mode, in chronological order.
    #[must_use]
    pub const fn sessions(self) -> &'static [Session] {
        match self {
            Self::FullDay => &Session::ALL,
            Self::PreOnly => &[Session::Pre],
            Self::RegOnly => &[Session::Reg],
            Self::PostOnly => &[Session::Post],
        }
    }

    /// Whether `session` is harvested under this mode.
    #[must_use]
    pub fn includes(self, session: Session) -> bool {
        self.sessions().contains(&session)
    }
}

impl fmt::Display for HarvestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FullDay => "FULL_DAY",
            Self::PreOnly => "PRE_ONLY",
            Self::RegOnly => "REG_ONLY",
            Self::PostOnly => "POST_ONLY",
        })
    }
}

impl FromStr for HarvestMode {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "full_day" | "full-day" => Ok(Self::FullDay),
            "pre" | "pre_only" => Ok(Self::PreOnly),
            "reg" | "reg_only" | "regular" => Ok(Self::RegOnly),
            "post" | "post_only" => Ok(Self::PostOnly),
            other => Err(HarvestError::InvalidArg(format!("unknown harvest mode: {other}"))),
        }
    }
}

/// Expected candle count per session on a full trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCounts {
    /// Pre-market minutes (04:00–09:30).
    pub pre: u32,
    /// Regular-session minutes (09:30–16:00).
    pub reg: u32,
    /// Post-market minutes (16:00–20:00).
    pub post: u32,
}

impl ExpectedCounts {
    /// Expected count for one session.
    #[must_use]
    pub const fn for_session(&self, session: Session) -> u32 {
        match session {
            Session::Pre => self.pre,
            Session::Reg => self.reg,
            Session::Post => self.post,
        }
    }
}

impl Default for ExpectedCounts {
    fn default() -> Self {
        Self {
            pre: 330,
            reg: 390,
            post: 240,
        }
    }
}

/// Batching parameters for the persistence gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Candles per batch. Must be non-zero.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub batch_pause: Duration,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_pause: Duration::from_millis(50),
        }
    }
}

/// Exponential backoff used by HTTP connectors when retrying transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds; doubled per attempt.
    pub base_backoff_ms: u64,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl RetryConfig {
    /// Never retry.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_backoff_ms: 0,
            jitter_percent: 0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 500,
            jitter_percent: 20,
        }
    }
}

/// Global configuration for the harvest orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Pause inserted between consecutive broker calls within a run.
    pub broker_pacing: Duration,
    /// Expected per-session candle counts used by the completeness reporter.
    ///
    /// Override on abbreviated trading days.
    pub expected: ExpectedCounts,
    /// Fraction of the expected count below which a session is reported as gappy.
    pub gap_threshold: f64,
    /// Persistence batching.
    pub persist: PersistConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            broker_pacing: Duration::from_millis(200),
            expected: ExpectedCounts::default(),
            gap_threshold: 0.9,
            persist: PersistConfig::default(),
        }
    }
}
