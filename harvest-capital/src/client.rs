use harvest_core::{BrokerRow, BrokerSession, HarvestError, RetryConfig, TimeWindow};
use reqwest::{RequestBuilder, Response, StatusCode};
use url::Url;

use crate::CONNECTOR_NAME;
use crate::backoff::retry_delay;
use crate::config::{CapitalConfig, Credentials};
use crate::models::{PricesResponse, SessionRequest};

const HEADER_API_KEY: &str = "X-CAP-API-KEY";
const HEADER_CST: &str = "CST";
const HEADER_SECURITY_TOKEN: &str = "X-SECURITY-TOKEN";

/// Statuses the broker returns for transient upstream trouble.
const RETRY_STATUSES: [StatusCode; 3] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::GATEWAY_TIMEOUT,
];

const WIRE_TIME: &str = "%Y-%m-%dT%H:%M:%S";

/// Thin HTTP client over the REST API.
#[derive(Clone)]
pub(crate) struct CapitalClient {
    http: reqwest::Client,
    base: Url,
    retry: RetryConfig,
    max_points: u32,
}

impl CapitalClient {
    pub(crate) fn new(cfg: &CapitalConfig) -> Result<Self, HarvestError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| HarvestError::Config(format!("capital base url: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(HarvestError::Config(format!(
                "capital base url cannot carry a path: {base}"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| HarvestError::Config(format!("capital http client: {e}")))?;
        Ok(Self {
            http,
            base,
            retry: cfg.retry,
            max_points: cfg.max_points,
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST /session`; tokens come back in response headers.
    pub(crate) async fn open_session(
        &self,
        creds: &Credentials,
    ) -> Result<BrokerSession, HarvestError> {
        let resp = self
            .http
            .post(self.endpoint(["session"]))
            .header(HEADER_API_KEY, &creds.api_key)
            .json(&SessionRequest {
                identifier: &creds.identifier,
                password: &creds.password,
            })
            .send()
            .await
            .map_err(|e| HarvestError::Authentication(format!("session request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HarvestError::Authentication(format!(
                "session rejected with status {status}"
            )));
        }
        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        match (header(HEADER_CST), header(HEADER_SECURITY_TOKEN)) {
            (Some(cst), Some(token)) => Ok(BrokerSession::new(cst, token)),
            _ => Err(HarvestError::Authentication(
                "session response is missing CST or X-SECURITY-TOKEN".into(),
            )),
        }
    }

    /// `GET /prices/{epic}` at minute resolution, bid side.
    pub(crate) async fn prices(
        &self,
        session: &BrokerSession,
        epic: &str,
        window: TimeWindow,
    ) -> Result<Vec<BrokerRow>, HarvestError> {
        let mut url = self.endpoint(["prices", epic]);
        url.query_pairs_mut()
            .append_pair("resolution", "MINUTE")
            .append_pair("max", &self.max_points.to_string())
            .append_pair("from", &window.start.format(WIRE_TIME).to_string())
            .append_pair("to", &window.end.format(WIRE_TIME).to_string());

        let resp = self
            .send_with_retry(|| {
                self.http
                    .get(url.clone())
                    .header(HEADER_SECURITY_TOKEN, session.security_token())
                    .header(HEADER_CST, session.cst())
            })
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(HarvestError::not_found(format!("prices for {epic}")));
        }
        if !status.is_success() {
            return Err(HarvestError::connector(
                CONNECTOR_NAME,
                format!("status {status}: prices for {epic}"),
            ));
        }
        let body: PricesResponse = resp
            .json()
            .await
            .map_err(|e| HarvestError::Data(format!("prices for {epic}: {e}")))?;
        Ok(body.prices.into_iter().map(BrokerRow::from).collect())
    }

    /// Send, retrying transient statuses and connect/timeout failures.
    ///
    /// The last response is returned as-is once retries run out, so the caller
    /// maps its status.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, HarvestError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = build().send().await;
            let transient = match &outcome {
                Ok(resp) => RETRY_STATUSES.contains(&resp.status()),
                Err(e) => e.is_timeout() || e.is_connect(),
            };
            if !transient || attempt >= self.retry.max_retries {
                return outcome.map_err(|e| HarvestError::connector(CONNECTOR_NAME, e.to_string()));
            }
            attempt += 1;
            let delay = retry_delay(&self.retry, attempt);
            match &outcome {
                Ok(resp) => tracing::debug!(status = %resp.status(), attempt, ?delay, "transient status; retrying"),
                Err(e) => tracing::debug!(error = %e, attempt, ?delay, "transport failure; retrying"),
            }
            tokio::time::sleep(delay).await;
        }
    }
}
