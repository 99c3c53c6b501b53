use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use tokio::sync::Mutex;
use tokio::time::Instant;

use harvest_core::connector::{BrokerProvider, BrokerSession, PrimaryProvider};
use harvest_core::{BrokerRow, ExchangeCalendar, HarvestError, PrimaryRow, Session, TimeWindow};

use crate::fixtures;

/// Instruction for how a fetch should behave for a given instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// One bar for every minute of the requested window.
    Full,
    /// The first `n` minutes of the requested window (capped at its length).
    Bars(usize),
    /// No rows.
    Empty,
}

impl MockBehavior {
    fn bars(self, window: TimeWindow) -> usize {
        let len = usize::try_from(window.minutes()).unwrap_or(0);
        match self {
            Self::Full => len,
            Self::Bars(n) => n.min(len),
            Self::Empty => 0,
        }
    }
}

/// One recorded fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    /// Instrument identifier passed to the provider.
    pub instrument_id: String,
    /// Window passed to the provider.
    pub window: TimeWindow,
    /// Session the window was classified as.
    pub session: Option<Session>,
    /// Tokio clock reading when the call arrived.
    pub at: Instant,
}

struct InternalState {
    default: MockBehavior,
    rules: HashMap<(String, Option<Session>), MockBehavior>,
    auth: Result<(), HarvestError>,
    auth_calls: usize,
    calls: Vec<FetchCall>,
}

impl InternalState {
    fn new(default: MockBehavior) -> Self {
        Self {
            default,
            rules: HashMap::new(),
            auth: Ok(()),
            auth_calls: 0,
            calls: Vec::new(),
        }
    }

    fn behavior(&self, id: &str, session: Option<Session>) -> MockBehavior {
        self.rules
            .get(&(id.to_string(), session))
            .or_else(|| self.rules.get(&(id.to_string(), None)))
            .copied()
            .unwrap_or(self.default)
    }

    fn record(&mut self, id: &str, window: TimeWindow, session: Option<Session>) -> MockBehavior {
        self.calls.push(FetchCall {
            instrument_id: id.to_string(),
            window,
            session,
            at: Instant::now(),
        });
        self.behavior(id, session)
    }
}

/// Controller handle used by tests to drive a mock provider from the outside.
pub struct MockController {
    state: Arc<Mutex<InternalState>>,
}

impl MockController {
    /// Set the behavior for every session of `instrument_id`.
    pub async fn set_behavior(&self, instrument_id: &str, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.rules.insert((instrument_id.to_string(), None), behavior);
    }

    /// Set the behavior for one session of `instrument_id`.
    ///
    /// Session rules take precedence over instrument-wide ones.
    pub async fn set_session_behavior(
        &self,
        instrument_id: &str,
        session: Session,
        behavior: MockBehavior,
    ) {
        let mut guard = self.state.lock().await;
        guard
            .rules
            .insert((instrument_id.to_string(), Some(session)), behavior);
    }

    /// Behavior for instruments without a rule.
    pub async fn set_default(&self, behavior: MockBehavior) {
        self.state.lock().await.default = behavior;
    }

    /// Make every subsequent `authenticate` call fail with `err`.
    pub async fn fail_auth(&self, err: HarvestError) {
        self.state.lock().await.auth = Err(err);
    }

    /// Fetches received so far, in arrival order.
    pub async fn calls(&self) -> Vec<FetchCall> {
        self.state.lock().await.calls.clone()
    }

    /// Fetches received for `instrument_id`.
    pub async fn calls_for(&self, instrument_id: &str) -> Vec<FetchCall> {
        let guard = self.state.lock().await;
        guard
            .calls
            .iter()
            .filter(|c| c.instrument_id == instrument_id)
            .cloned()
            .collect()
    }

    /// Number of `authenticate` calls received.
    pub async fn auth_calls(&self) -> usize {
        self.state.lock().await.auth_calls
    }
}

/// Primary provider that serves deterministic minute bars from a script.
pub struct MockPrimary {
    name: &'static str,
    calendar: ExchangeCalendar,
    state: Arc<Mutex<InternalState>>,
}

impl MockPrimary {
    /// Create a mock primary provider whose unscripted instruments get `default`.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
        default: MockBehavior,
    ) -> (Arc<dyn PrimaryProvider>, MockController) {
        let state = Arc::new(Mutex::new(InternalState::new(default)));
        let controller = MockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            name,
            calendar: ExchangeCalendar::default(),
            state,
        });
        (me as Arc<dyn PrimaryProvider>, controller)
    }
}

#[async_trait]
impl PrimaryProvider for MockPrimary {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, instrument_id: &str, window: TimeWindow) -> Vec<PrimaryRow> {
        let session = self.calendar.session_at(window.start);
        let behavior = self.state.lock().await.record(instrument_id, window, session);
        fixtures::primary_rows(instrument_id, window, behavior.bars(window))
    }
}

/// Broker that authenticates on demand and serves deterministic minute bars.
///
/// Snapshot times are emitted as naive wall-clock strings in the configured
/// native zone so consumers exercise the localization path.
pub struct MockBroker {
    name: &'static str,
    native_tz: Tz,
    calendar: ExchangeCalendar,
    state: Arc<Mutex<InternalState>>,
}

impl MockBroker {
    /// Create a mock broker whose unscripted instruments get `default`.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
        default: MockBehavior,
    ) -> (Arc<dyn BrokerProvider>, MockController) {
        let state = Arc::new(Mutex::new(InternalState::new(default)));
        let controller = MockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            name,
            native_tz: chrono_tz::Asia::Bahrain,
            calendar: ExchangeCalendar::default(),
            state,
        });
        (me as Arc<dyn BrokerProvider>, controller)
    }
}

#[async_trait]
impl BrokerProvider for MockBroker {
    fn name(&self) -> &'static str {
        self.name
    }

    fn native_timezone(&self) -> Tz {
        self.native_tz
    }

    async fn authenticate(&self) -> Result<BrokerSession, HarvestError> {
        let mut guard = self.state.lock().await;
        guard.auth_calls += 1;
        guard.auth.clone()?;
        Ok(BrokerSession::new("mock-cst", "mock-security-token"))
    }

    async fn fetch(
        &self,
        _session: &BrokerSession,
        instrument_id: &str,
        window: TimeWindow,
    ) -> Vec<BrokerRow> {
        let session = self.calendar.session_at(window.start);
        let behavior = self.state.lock().await.record(instrument_id, window, session);
        fixtures::broker_rows(instrument_id, window, behavior.bars(window), self.native_tz)
    }
}
