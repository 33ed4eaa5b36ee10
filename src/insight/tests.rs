use super::types::ChatResponse;
use super::*;
use crate::config::InsightSettings;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Sleeper that records requested delays instead of waiting
#[derive(Default, Clone)]
struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(150),
    }
}

fn rate_limited() -> MockResponse {
    MockResponse::Error(InsightError::RateLimited {
        body: "slow down".into(),
    })
}

fn server_error() -> MockResponse {
    MockResponse::Error(InsightError::Server {
        status: 503,
        body: "unavailable".into(),
    })
}

fn retrying(responses: Vec<MockResponse>) -> (RetryingService<MockInsightService, RecordingSleeper>, RecordingSleeper) {
    let sleeper = RecordingSleeper::default();
    let service = RetryingService::with_sleeper(
        MockInsightService::new(responses),
        policy(),
        sleeper.clone(),
    );
    (service, sleeper)
}

// ========================================================================
// Error classification
// ========================================================================

#[test]
fn test_status_mapping() {
    assert!(matches!(
        InsightError::from_status(429, String::new()),
        InsightError::RateLimited { .. }
    ));
    assert!(matches!(
        InsightError::from_status(500, String::new()),
        InsightError::Server { status: 500, .. }
    ));
    assert!(matches!(
        InsightError::from_status(502, String::new()),
        InsightError::Server { status: 502, .. }
    ));
    assert!(matches!(
        InsightError::from_status(401, String::new()),
        InsightError::Api { status: 401, .. }
    ));
}

#[test]
fn test_retryable_classification() {
    assert!(InsightError::from_status(429, String::new()).is_retryable());
    assert!(InsightError::from_status(500, String::new()).is_retryable());
    assert!(!InsightError::from_status(400, String::new()).is_retryable());
    assert!(!InsightError::InvalidResponse("empty".into()).is_retryable());
    assert!(!InsightError::NotConfigured("key".into()).is_retryable());
}

// ========================================================================
// Backoff
// ========================================================================

#[test]
fn test_backoff_doubles_and_caps() {
    let policy = RetryPolicy {
        max_attempts: 6,
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(5),
    };
    assert_eq!(policy.backoff_for(1), Duration::from_secs(1));
    assert_eq!(policy.backoff_for(2), Duration::from_secs(2));
    assert_eq!(policy.backoff_for(3), Duration::from_secs(4));
    assert_eq!(policy.backoff_for(4), Duration::from_secs(5));
    assert_eq!(policy.backoff_for(60), Duration::from_secs(5));
}

#[test]
fn test_default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, MAX_RETRIES);
    assert_eq!(policy.initial_backoff, Duration::from_secs(1));
}

// ========================================================================
// Retry state machine
// ========================================================================

#[tokio::test]
async fn test_success_needs_no_retry() {
    let (service, sleeper) = retrying(vec![MockResponse::text("insight")]);

    let result = service.generate("prompt", "system").await.unwrap();

    assert_eq!(result, "insight");
    assert_eq!(service.inner().call_count(), 1);
    assert!(sleeper.delays.lock().is_empty());
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let (service, sleeper) = retrying(vec![
        rate_limited(),
        server_error(),
        MockResponse::text("finally"),
    ]);

    let result = service.generate("prompt", "system").await.unwrap();

    assert_eq!(result, "finally");
    assert_eq!(service.inner().call_count(), 3);
    assert_eq!(
        *sleeper.delays.lock(),
        vec![Duration::from_millis(100), Duration::from_millis(150)]
    );
}

#[tokio::test]
async fn test_attempts_are_bounded() {
    let (service, sleeper) = retrying(vec![
        server_error(),
        server_error(),
        server_error(),
        MockResponse::text("never reached"),
    ]);

    let err = service.generate("prompt", "system").await.unwrap_err();

    match err {
        InsightError::Exhausted { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, InsightError::Server { status: 503, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.inner().call_count(), 3);
    assert_eq!(sleeper.delays.lock().len(), 2);
}

#[tokio::test]
async fn test_non_retryable_error_fails_immediately() {
    let (service, sleeper) = retrying(vec![
        MockResponse::Error(InsightError::Api {
            status: 400,
            body: "bad request".into(),
        }),
        MockResponse::text("never reached"),
    ]);

    let err = service.generate("prompt", "system").await.unwrap_err();

    assert!(matches!(err, InsightError::Api { status: 400, .. }));
    assert_eq!(service.inner().call_count(), 1);
    assert!(sleeper.delays.lock().is_empty());
}

#[tokio::test]
async fn test_single_attempt_policy() {
    let sleeper = RecordingSleeper::default();
    let service = RetryingService::with_sleeper(
        MockInsightService::new(vec![rate_limited()]),
        RetryPolicy {
            max_attempts: 1,
            ..policy()
        },
        sleeper.clone(),
    );

    let err = service.generate("prompt", "system").await.unwrap_err();
    assert!(matches!(err, InsightError::Exhausted { attempts: 1, .. }));
    assert!(sleeper.delays.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tokio_sleeper_uses_virtual_time() {
    let service = RetryingService::new(
        MockInsightService::new(vec![rate_limited(), MockResponse::text("ok")]),
        RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(10),
        },
    );

    let started = tokio::time::Instant::now();
    assert_eq!(service.generate("p", "s").await.unwrap(), "ok");
    assert!(started.elapsed() >= Duration::from_secs(10));
}

// ========================================================================
// Mock and wire types
// ========================================================================

#[tokio::test]
async fn test_mock_records_prompts_and_echoes() {
    let mock = MockInsightService::echo();
    let answer = mock.generate("abc", "system").await.unwrap();

    assert_eq!(answer, "insight (3 chars of input)");
    assert_eq!(mock.prompts(), vec!["abc".to_string()]);
}

#[tokio::test]
async fn test_arc_service_delegates() {
    let mock = Arc::new(MockInsightService::new(vec![MockResponse::text("shared")]));
    let service: Arc<dyn InsightService> = mock.clone();

    assert_eq!(service.generate("p", "s").await.unwrap(), "shared");
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn test_chat_response_first_text_is_trimmed() {
    let res: ChatResponse = serde_json::from_str(
        r#"{"choices": [{"message": {"role": "assistant", "content": "  An insight.\n"}}]}"#,
    )
    .unwrap();
    assert_eq!(res.first_text().as_deref(), Some("An insight."));
}

#[test]
fn test_chat_response_without_choices() {
    let res: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
    assert_eq!(res.first_text(), None);
}

#[test]
fn test_client_requires_api_key() {
    let settings = InsightSettings::default();
    let err = OpenAiClient::new(&settings).err().unwrap();
    assert!(matches!(err, InsightError::NotConfigured(_)));
}

#[test]
fn test_client_uses_configured_model() {
    let settings = InsightSettings {
        api_key: Some("sk-test".to_string().into()),
        model: "gpt-4o-mini".into(),
        ..InsightSettings::default()
    };
    let client = OpenAiClient::new(&settings).unwrap();
    assert_eq!(client.model(), "gpt-4o-mini");
}
