//! Time-series utilities shared by the orchestrator and tests.
/// Merge utilities for joining candle frames from several fetches.
pub mod merge;
