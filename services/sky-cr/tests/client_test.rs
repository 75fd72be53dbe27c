mod common;

use common::{BASE_URL, ScriptedTransport, credential, ok, session, status};
use core_logic::{ClientConfig, OutcomeStatus};
use serde_json::json;
use sky_cr::operation::{PATH_COLLECT_PICKUP_BATCH, PATH_SEND_LIGHT};
use sky_cr::{LevelId, SessionClient, TransportError};
use std::time::Duration;

#[tokio::test]
async fn test_server_error_exhausts_every_attempt() {
    for max_retries in 1..=10 {
        let transport = ScriptedTransport::always(500, "boom");
        let client = session(transport.clone(), max_retries);

        let outcome = client.get_account_world_quests().await;

        assert_eq!(outcome.status, OutcomeStatus::Fail);
        assert_eq!(outcome.message, "HTTP 500");
        assert_eq!(transport.call_count(), max_retries as usize);
    }
}

#[tokio::test]
async fn test_unauthorized_is_never_retried() {
    let transport = ScriptedTransport::always(401, "");
    let client = session(transport.clone(), 10);

    let outcome = client.claim_quest_reward("daily").await;

    assert_eq!(outcome.message, "Unauthorized");
    assert!(!outcome.is_success());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_timeouts_report_max_retries() {
    let transport = ScriptedTransport::responding(|_| Err(TransportError::Timeout));
    let client = session(transport.clone(), 4);

    let outcome = client.collect_collectible("shell").await;

    assert_eq!(outcome.message, "Max retries");
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test]
async fn test_connection_errors_report_max_retries() {
    let transport =
        ScriptedTransport::responding(|_| Err(TransportError::Other("connection reset".into())));
    let client = session(transport.clone(), 2);

    let outcome = client.send_heart("friend-1", "Ana").await;

    assert_eq!(outcome.message, "Max retries");
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let transport = ScriptedTransport::scripted(
        vec![status(503), Err(TransportError::Timeout)],
        |_| ok(r#"{"result":"claimed"}"#),
    );
    let client = session(transport.clone(), 3);

    let outcome = client.claim_quest_reward("daily").await;

    assert!(outcome.is_success());
    assert_eq!(outcome.message, "claimed");
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_success_without_result_field() {
    let transport = ScriptedTransport::always(200, r#"{"ok":true}"#);
    let client = session(transport, 3);

    let outcome = client.get_account_world_quests().await;

    assert!(outcome.is_success());
    assert_eq!(outcome.message, "Success");
}

#[tokio::test]
async fn test_unparsable_success_body_is_malformed_response() {
    let transport = ScriptedTransport::always(200, "<html>maintenance</html>");
    let client = session(transport.clone(), 3);

    let outcome = client.get_account_world_quests().await;

    assert_eq!(outcome.message, "Malformed response");
    assert!(!outcome.is_success());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_request_carries_session_headers_and_payload() {
    let transport = ScriptedTransport::always(200, "{}");
    let client = session(transport.clone(), 3);

    client
        .collect_pickup_batch(LevelId::Number(7), vec![json!(1), json!("a")])
        .await;

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let request = &calls[0];
    assert_eq!(request.url, format!("{}{}", BASE_URL, PATH_COLLECT_PICKUP_BATCH));
    assert_eq!(request.header("host"), Some("live.radiance.thatgamecompany.com"));
    assert_eq!(request.header("Accept"), Some("*/*"));
    assert_eq!(request.header("Content-Type"), Some("application/json"));
    assert_eq!(request.header("session"), Some("sess-token"));
    assert_eq!(request.header("user"), Some("user-42"));
    assert_eq!(request.header("user-id"), Some("user-42"));
    assert_eq!(
        request.header("User-Agent"),
        Some(ClientConfig::default().user_agent.as_str())
    );
    assert_eq!(request.timeout, Duration::from_secs(10));

    assert_eq!(request.body["level_id"], json!(7));
    assert_eq!(request.body["pickup_ids"], json!([1, "a"]));
    assert_eq!(request.body["emitters"], json!([]));
    assert_eq!(request.body["global_pickup_ids"], json!([]));
    assert_eq!(request.body["session"], json!("sess-token"));
    assert_eq!(request.body["user"], json!("user-42"));
    assert_eq!(request.body["user_id"], json!("user-42"));
}

#[tokio::test]
async fn test_textual_level_id_is_echoed_as_string() {
    let transport = ScriptedTransport::always(200, "{}");
    let client = session(transport.clone(), 1);

    client
        .collect_pickup_batch(LevelId::Text("Prairie".into()), vec![json!(3)])
        .await;

    assert_eq!(transport.calls()[0].body["level_id"], json!("Prairie"));
}

#[tokio::test]
async fn test_custom_base_url_is_used_for_url_and_host() {
    let transport = ScriptedTransport::always(200, "{}");
    let config = ClientConfig {
        base_url: "https://staging.example.test:8443/".into(),
        ..Default::default()
    };
    let client = SessionClient::with_transport(credential(), &config, transport.clone()).unwrap();

    client.send_light("friend-1", "Ana").await;

    let request = &transport.calls()[0];
    assert_eq!(
        request.url,
        format!("https://staging.example.test:8443{}", PATH_SEND_LIGHT)
    );
    assert_eq!(request.header("Host"), Some("staging.example.test:8443"));
    assert_eq!(request.body["target"], json!("friend-1"));
    assert_eq!(request.body["gift_type"], json!("gift_heart_wax"));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_between_attempts() {
    let transport = ScriptedTransport::always(500, "");
    let config = ClientConfig {
        max_retries: 3,
        ..Default::default()
    };
    let client = SessionClient::with_transport(credential(), &config, transport.clone()).unwrap();

    let started = tokio::time::Instant::now();
    let outcome = client.get_account_world_quests().await;
    let elapsed = started.elapsed();

    assert_eq!(outcome.message, "HTTP 500");
    assert_eq!(transport.call_count(), 3);
    // 2s after the first attempt, 4s after the second, none after the last
    assert!(elapsed >= Duration::from_secs(6), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(7), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_close_is_idempotent_and_releases_transport() {
    let transport = ScriptedTransport::always(200, "{}");
    let client = session(transport.clone(), 2);

    client.close();
    client.close();

    assert!(client.is_closed());
    assert!(transport.is_closed());

    let outcome = client.send_heart("friend-1", "Ana").await;
    assert!(!outcome.is_success());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_drop_closes_transport() {
    let transport = ScriptedTransport::always(200, "{}");
    {
        let _client = session(transport.clone(), 1);
    }
    assert!(transport.is_closed());
}
