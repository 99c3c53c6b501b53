//! Instrument rules and the read-only inventory mapping handed to a run.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

/// How the regular session of an instrument is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Free primary provider first, broker as fallback.
    #[default]
    #[serde(rename = "HYBRID")]
    Hybrid,
    /// Broker only; the primary provider is never consulted.
    #[serde(rename = "BROKER_ONLY", alias = "CAPITAL_ONLY")]
    BrokerOnly,
}

impl Strategy {
    /// Storage label.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Hybrid => "HYBRID",
            Self::BrokerOnly => "BROKER_ONLY",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Strategy {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HYBRID" => Ok(Self::Hybrid),
            // legacy label from the first broker integration
            "BROKER_ONLY" | "CAPITAL_ONLY" => Ok(Self::BrokerOnly),
            other => Err(HarvestError::InvalidArg(format!("unknown strategy: {other}"))),
        }
    }
}

/// Mapping from a canonical symbol to its broker identifier and sourcing strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRule {
    /// Canonical symbol used everywhere downstream.
    pub symbol: String,
    /// Broker-specific identifier (e.g. a Capital.com epic).
    pub broker_id: String,
    /// Regular-session sourcing strategy.
    pub strategy: Strategy,
}

impl InstrumentRule {
    /// Build a rule.
    pub fn new(symbol: impl Into<String>, broker_id: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            symbol: symbol.into(),
            broker_id: broker_id.into(),
            strategy,
        }
    }

    /// Rule whose broker identifier equals the symbol.
    pub fn hybrid(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            broker_id: symbol.clone(),
            symbol,
            strategy: Strategy::Hybrid,
        }
    }
}

/// Read-only `symbol -> rule` mapping for one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    rules: BTreeMap<String, InstrumentRule>,
}

impl Inventory {
    /// Empty inventory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Insert or replace the rule for `rule.symbol`.
    pub fn insert(&mut self, rule: InstrumentRule) {
        self.rules.insert(rule.symbol.clone(), rule);
    }

    /// Look up the rule for a symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&InstrumentRule> {
        self.rules.get(symbol)
    }

    /// Whether the inventory has a rule for `symbol`.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    /// Symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Rules in ascending symbol order.
    pub fn rules(&self) -> impl Iterator<Item = &InstrumentRule> {
        self.rules.values()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<InstrumentRule> for Inventory {
    fn from_iter<I: IntoIterator<Item = InstrumentRule>>(iter: I) -> Self {
        let mut inv = Self::new();
        for rule in iter {
            inv.insert(rule);
        }
        inv
    }
}
