//! Test doubles for the harvest pipeline.
//!
//! - [`MockPrimary`] and [`MockBroker`] serve deterministic minute bars driven
//!   by a [`MockController`] and record every fetch with a Tokio timestamp.
//! - [`MockSink`] stores candles in memory and can reject a chosen batch.
//!
//! Also used by the worker binary when `HARVEST_USE_MOCK` is set.

mod dynamic;
pub mod fixtures;
mod sink;

pub use dynamic::{FetchCall, MockBehavior, MockBroker, MockController, MockPrimary};
pub use sink::MockSink;
