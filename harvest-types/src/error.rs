use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the harvest workspace.
///
/// Only two variants are fatal at run level: [`HarvestError::Authentication`]
/// aborts a harvest before any fetch, and [`HarvestError::Persistence`] aborts a
/// save. Everything a provider raises is degraded to an empty result by the
/// adapter and never reaches the orchestrator's caller.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HarvestError {
    /// The broker session could not be established but was required.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A provider request failed (HTTP status, transport, payload).
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Provider that failed, e.g. `harvest-capital`.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A persistence batch failed; the remaining batches were not attempted.
    #[error("batch {batch} commit failed: {msg}")]
    Persistence {
        /// Zero-based index of the failing batch.
        batch: usize,
        /// Human-readable error message.
        msg: String,
    },

    /// Local storage (schema, inventory, queries) failed outside a batch commit.
    #[error("storage error: {0}")]
    Storage(String),

    /// Issues with the returned or expected data (missing fields, bad timestamps).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "prices for AAPL".
        what: String,
    },

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl HarvestError {
    /// Build a `Connector` error for `connector`.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Build a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Build a `Persistence` error for the batch at `batch`.
    pub fn persistence(batch: usize, msg: impl Into<String>) -> Self {
        Self::Persistence {
            batch,
            msg: msg.into(),
        }
    }

    /// Returns true if this error ends a harvest run or a save operation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::Persistence { .. })
    }
}
