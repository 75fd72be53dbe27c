//! Session-bound API client.
//!
//! [`RetryingRequestClient`] performs one logical request under the retry
//! policy; [`SessionClient`] binds it to a credential and exposes the six
//! game-service operations.

use crate::credential::Credential;
use crate::error::{ClientError, TransportError};
use crate::operation::{LevelId, Operation};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use core_logic::{
    AttemptVerdict, ClientConfig, MAX_RETRIES_MESSAGE, Outcome, RetryPolicy, run_with_policy,
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, warn};

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Malformed response";

/// Classifies one HTTP exchange.
///
/// 200 and 401 are terminal. Any other status, a timeout or a transport
/// failure is retryable; the `on_exhausted` message is what the caller sees
/// if this was the last attempt.
pub fn classify_attempt(
    result: Result<ApiResponse, TransportError>,
    kind: &str,
    subject: &str,
    attempt: u32,
) -> AttemptVerdict {
    match result {
        Ok(response) if response.status == 200 => {
            AttemptVerdict::Terminal(success_outcome(&response.body))
        }
        Ok(response) if response.status == 401 => {
            AttemptVerdict::Terminal(Outcome::fail(UNAUTHORIZED_MESSAGE))
        }
        Ok(response) => {
            warn!(
                "HTTP {} {} {} attempt {}",
                response.status, kind, subject, attempt
            );
            AttemptVerdict::retry_as(format!("HTTP {}", response.status))
        }
        Err(TransportError::Timeout) => {
            warn!("Timeout {} {} attempt {}", kind, subject, attempt);
            AttemptVerdict::retry_as(MAX_RETRIES_MESSAGE)
        }
        Err(e) => {
            error!("Error {} {}: {}", kind, subject, e);
            AttemptVerdict::retry_as(MAX_RETRIES_MESSAGE)
        }
    }
}

fn success_outcome(body: &str) -> Outcome {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("result") {
            Some(Value::String(s)) => Outcome::success(s.clone()),
            Some(Value::Null) | None => Outcome::success("Success"),
            Some(other) => Outcome::success(other.to_string()),
        },
        Err(e) => {
            debug!("Unparsable 200 body: {}", e);
            Outcome::fail(MALFORMED_RESPONSE_MESSAGE)
        }
    }
}

/// POSTs JSON payloads with a fixed header set under a [`RetryPolicy`].
pub struct RetryingRequestClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    headers: Vec<(&'static str, String)>,
    timeout: Duration,
    policy: RetryPolicy,
}

impl RetryingRequestClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: &ClientConfig,
        headers: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            transport,
            base_url: config.base_url().to_string(),
            headers,
            timeout: config.request_timeout(),
            policy: RetryPolicy::new(config.max_retries),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.set_policy(policy);
        self
    }

    pub fn set_policy(&mut self, policy: RetryPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn execute(&self, path: &str, payload: &Value) -> Outcome {
        self.execute_as(path, payload, "Request", path).await
    }

    /// Like [`execute`](Self::execute), with `kind`/`subject` naming the request in diagnostics.
    pub async fn execute_as(&self, path: &str, payload: &Value, kind: &str, subject: &str) -> Outcome {
        let url = format!("{}{}", self.base_url, path);
        let transport = &self.transport;
        let operation_name = format!("{} {}", kind, subject);

        run_with_policy(self.policy, &operation_name, |attempt| {
            let request = ApiRequest {
                url: url.clone(),
                headers: self.headers.clone(),
                body: payload.clone(),
                timeout: self.timeout,
            };
            async move { classify_attempt(transport.post(request).await, kind, subject, attempt) }
        })
        .await
    }
}

/// One credential, one connection pool, six operations.
///
/// The pool is released by [`close`](Self::close) or on drop, whichever
/// comes first.
pub struct SessionClient {
    credential: Credential,
    requests: RetryingRequestClient,
    transport: Arc<dyn Transport>,
    closed: AtomicBool,
}

impl SessionClient {
    /// Opens a keep-alive HTTPS client for `credential`.
    pub fn connect(credential: Credential, config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        Self::with_transport(credential, config, transport)
    }

    pub fn with_transport(
        credential: Credential,
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let headers = vec![
            ("Host", config.host()?),
            ("Accept", "*/*".to_string()),
            ("Content-Type", "application/json".to_string()),
            ("session", credential.session_token().to_string()),
            ("user", credential.user_id().to_string()),
            ("User-Agent", config.user_agent.clone()),
            ("user-id", credential.user_id().to_string()),
        ];
        let requests = RetryingRequestClient::new(transport.clone(), config, headers);

        Ok(Self {
            credential,
            requests,
            transport,
            closed: AtomicBool::new(false),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.requests.set_policy(policy);
        self
    }

    pub fn user_id(&self) -> &str {
        self.credential.user_id()
    }

    pub async fn execute(&self, operation: &Operation) -> Outcome {
        let payload = operation.payload(&self.credential);
        self.requests
            .execute_as(
                operation.path(),
                &payload,
                operation.kind(),
                &operation.subject(),
            )
            .await
    }

    pub async fn collect_pickup_batch(&self, level_id: LevelId, pickup_ids: Vec<Value>) -> Outcome {
        self.execute(&Operation::CollectPickupBatch {
            level_id,
            pickup_ids,
        })
        .await
    }

    pub async fn get_account_world_quests(&self) -> Outcome {
        self.execute(&Operation::GetAccountWorldQuests).await
    }

    pub async fn claim_quest_reward(&self, name: &str) -> Outcome {
        self.execute(&Operation::ClaimQuestReward {
            name: name.to_string(),
        })
        .await
    }

    pub async fn collect_collectible(&self, name: &str) -> Outcome {
        self.execute(&Operation::CollectCollectible {
            name: name.to_string(),
        })
        .await
    }

    pub async fn send_light(&self, target_id: &str, target_name: &str) -> Outcome {
        self.execute(&Operation::SendLight {
            target_id: target_id.to_string(),
            target_name: target_name.to_string(),
        })
        .await
    }

    pub async fn send_heart(&self, target_id: &str, target_name: &str) -> Outcome {
        self.execute(&Operation::SendHeart {
            target_id: target_id.to_string(),
            target_name: target_name.to_string(),
        })
        .await
    }

    /// Releases the connection pool. Idempotent.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.transport.close();
            debug!("Session client for user {} closed", self.credential.user_id());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(status: u16, body: &str) -> AttemptVerdict {
        classify_attempt(Ok(ApiResponse::new(status, body)), "Level", "L1", 1)
    }

    #[test]
    fn test_success_uses_result_field() {
        assert_eq!(
            verdict(200, r#"{"result": "collected 3"}"#),
            AttemptVerdict::Terminal(Outcome::success("collected 3"))
        );
        assert_eq!(
            verdict(200, r#"{"other": 1}"#),
            AttemptVerdict::Terminal(Outcome::success("Success"))
        );
        assert_eq!(
            verdict(200, r#"{"result": {"ok": true}}"#),
            AttemptVerdict::Terminal(Outcome::success(r#"{"ok":true}"#))
        );
    }

    #[test]
    fn test_unexpected_shape_is_success_but_garbage_is_malformed() {
        assert_eq!(
            verdict(200, "[1, 2]"),
            AttemptVerdict::Terminal(Outcome::success("Success"))
        );
        assert_eq!(
            verdict(200, "<html>"),
            AttemptVerdict::Terminal(Outcome::fail(MALFORMED_RESPONSE_MESSAGE))
        );
    }

    #[test]
    fn test_unauthorized_is_terminal() {
        assert_eq!(
            verdict(401, ""),
            AttemptVerdict::Terminal(Outcome::fail("Unauthorized"))
        );
    }

    #[test]
    fn test_other_statuses_retry() {
        assert_eq!(verdict(500, ""), AttemptVerdict::retry_as("HTTP 500"));
        assert_eq!(verdict(201, "{}"), AttemptVerdict::retry_as("HTTP 201"));
        assert_eq!(verdict(403, ""), AttemptVerdict::retry_as("HTTP 403"));
    }

    #[test]
    fn test_transport_failures_retry() {
        assert_eq!(
            classify_attempt(Err(TransportError::Timeout), "Quest", "q", 2),
            AttemptVerdict::retry_as("Max retries")
        );
        assert_eq!(
            classify_attempt(
                Err(TransportError::Other("connection reset".into())),
                "Quest",
                "q",
                2
            ),
            AttemptVerdict::retry_as("Max retries")
        );
    }
}
