//! Risk Oracle
//!
//! Raw, unprotected access to the external scoring service. The resilient
//! client wraps one of these with its policy stack.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

use tripnow_core::{RiskConfig, RiskEvaluationOutcome, RiskEvaluationRequest};

use crate::error::{RiskError, RiskResult};

/// Single request/response call to the risk oracle
///
/// Implementations:
/// - HTTP client (production)
/// - Scripted mock (testing)
#[async_trait]
pub trait RiskOracle: Send + Sync {
    /// Score one reservation; any failure is returned, never retried here
    async fn evaluate(&self, request: &RiskEvaluationRequest) -> RiskResult<RiskEvaluationOutcome>;
}

// ============================================================================
// HTTP Oracle
// ============================================================================

/// HTTP risk oracle
///
/// POSTs the camelCase request body to a configured URL and decodes
/// `{ riskScore, status }`.
pub struct HttpRiskOracle {
    url: String,
    client: reqwest::Client,
    attempt_timeout: Duration,
}

/// Wire form of the oracle response; missing fields default
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OracleResponse {
    #[serde(default)]
    risk_score: f64,
    #[serde(default)]
    status: Option<String>,
}

impl HttpRiskOracle {
    /// Create an oracle with the given endpoint and per request timeout
    pub fn new(url: impl Into<String>, attempt_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            attempt_timeout,
        }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.url.clone(), config.attempt_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    fn classify(e: reqwest::Error) -> RiskError {
        if e.is_builder() {
            RiskError::Local(format!("Failed to build risk request: {}", e))
        } else if e.is_timeout() {
            RiskError::Transport(format!("Risk request timed out: {}", e))
        } else {
            RiskError::Transport(format!("HTTP request failed: {}", e))
        }
    }

    /// Decode a success body; a JSON `null` reads as an `UNKNOWN` outcome
    fn decode(body: &[u8]) -> RiskResult<RiskEvaluationOutcome> {
        let parsed: Option<OracleResponse> = serde_json::from_slice(body)
            .map_err(|e| RiskError::MalformedResponse(e.to_string()))?;

        Ok(match parsed {
            Some(r) => RiskEvaluationOutcome::new(
                r.risk_score,
                r.status
                    .unwrap_or_else(|| RiskEvaluationOutcome::UNKNOWN.to_string()),
            ),
            None => RiskEvaluationOutcome::new(0.0, RiskEvaluationOutcome::UNKNOWN),
        })
    }
}

#[async_trait]
impl RiskOracle for HttpRiskOracle {
    async fn evaluate(&self, request: &RiskEvaluationRequest) -> RiskResult<RiskEvaluationOutcome> {
        let url = reqwest::Url::parse(&self.url)
            .map_err(|e| RiskError::Local(format!("Invalid risk oracle URL {}: {}", self.url, e)))?;

        let response = self
            .client
            .post(url)
            .json(request)
            .timeout(self.attempt_timeout)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Risk oracle returned non-success status");
            return Err(RiskError::UnsuccessfulStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(Self::classify)?;
        Self::decode(&body)
    }
}

// ============================================================================
// Mock Oracle for Testing
// ============================================================================

/// Scripted reply of the mock oracle
#[derive(Debug, Clone)]
pub enum MockReply {
    Outcome(RiskEvaluationOutcome),
    Fail(RiskError),
    /// Never answers
    Hang,
}

/// Mock risk oracle
///
/// Replies with queued entries first, then repeats the default reply.
/// Counts every call so tests can assert the network was not touched.
pub struct MockRiskOracle {
    script: Mutex<VecDeque<MockReply>>,
    default_reply: Mutex<MockReply>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RiskEvaluationRequest>>,
}

impl MockRiskOracle {
    /// Oracle that always replies with `reply`
    pub fn always(reply: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Oracle that always approves with `risk_score`
    pub fn approving(risk_score: f64) -> Self {
        Self::always(MockReply::Outcome(RiskEvaluationOutcome::new(
            risk_score,
            RiskEvaluationOutcome::APPROVED,
        )))
    }

    /// Oracle that always fails with a transport error
    pub fn unreachable() -> Self {
        Self::always(MockReply::Fail(RiskError::Transport(
            "connection refused".to_string(),
        )))
    }

    /// Oracle that never answers
    pub fn hanging() -> Self {
        Self::always(MockReply::Hang)
    }

    /// Queue a one-shot reply
    pub fn push(&self, reply: MockReply) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    pub fn set_default(&self, reply: MockReply) {
        *self.default_reply.lock().unwrap_or_else(|e| e.into_inner()) = reply;
    }

    /// Number of calls that reached the oracle
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RiskEvaluationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_reply(&self) -> MockReply {
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        scripted.unwrap_or_else(|| {
            self.default_reply
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        })
    }
}

impl Default for MockRiskOracle {
    fn default() -> Self {
        Self::approving(0.0)
    }
}

#[async_trait]
impl RiskOracle for MockRiskOracle {
    async fn evaluate(&self, request: &RiskEvaluationRequest) -> RiskResult<RiskEvaluationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match self.next_reply() {
            MockReply::Outcome(outcome) => Ok(outcome),
            MockReply::Fail(e) => Err(e),
            MockReply::Hang => std::future::pending::<RiskResult<RiskEvaluationOutcome>>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RiskEvaluationRequest {
        RiskEvaluationRequest::new("a@x.com", "US", 500)
    }

    #[test]
    fn test_decode_outcome() {
        let outcome = HttpRiskOracle::decode(br#"{"riskScore":12.5,"status":"APPROVED"}"#).unwrap();
        assert_eq!(outcome, RiskEvaluationOutcome::new(12.5, "APPROVED"));
    }

    #[test]
    fn test_decode_missing_status_is_unknown() {
        let outcome = HttpRiskOracle::decode(br#"{"riskScore":3.0}"#).unwrap();
        assert_eq!(outcome.status, RiskEvaluationOutcome::UNKNOWN);

        let outcome = HttpRiskOracle::decode(b"null").unwrap();
        assert_eq!(outcome, RiskEvaluationOutcome::new(0.0, RiskEvaluationOutcome::UNKNOWN));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            HttpRiskOracle::decode(b"<html>"),
            Err(RiskError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_local_error() {
        let oracle = HttpRiskOracle::new("not a url", Duration::from_secs(1));
        let result = oracle.evaluate(&request()).await;
        assert!(matches!(result, Err(RiskError::Local(_))));
    }

    #[test]
    fn test_from_config_keeps_attempt_timeout() {
        let config = RiskConfig {
            attempt_timeout_secs: 3,
            ..RiskConfig::default()
        };
        let oracle = HttpRiskOracle::from_config(&config);
        assert_eq!(oracle.attempt_timeout(), Duration::from_secs(3));
        assert_eq!(oracle.url(), config.url);
    }

    #[tokio::test]
    async fn test_mock_script_then_default() {
        let oracle = MockRiskOracle::approving(1.0);
        oracle.push(MockReply::Fail(RiskError::UnsuccessfulStatus { status: 500 }));

        assert!(oracle.evaluate(&request()).await.is_err());
        assert_eq!(
            oracle.evaluate(&request()).await.unwrap().status,
            RiskEvaluationOutcome::APPROVED
        );
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(oracle.requests()[0].trip_country, "US");
    }
}
