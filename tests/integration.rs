#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mention_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{PipelineError, Void},
    },
    runtime::Runtime,
    server,
    service::{
        agent::{AgentClient, GenericAgentClient},
        chat::{ChatClient, GenericChatClient},
        db::{DbClient, GenericDbClient},
    },
};
use mockall::mock;
use serde_json::{Value, json};
use tower::ServiceExt;

// Mocks.

mock! {
    pub Agent {}

    #[async_trait]
    impl GenericAgentClient for Agent {
        async fn respond(&self, input: &str) -> Result<String, PipelineError>;
    }
}

mock! {
    pub Db {}

    #[async_trait]
    impl GenericDbClient for Db {
        async fn save_conversation(&self, user_id: &str, input: &str, response: &str) -> Result<(), PipelineError>;
    }
}

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn send_message(&self, channel_id: &str, text: &str) -> Void;
    }
}

// Helpers.

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            openai_api_key: "test_key".to_string(),
            google_api_key: "g_key".to_string(),
            google_cse_id: "g_cse".to_string(),
            slack_bot_token: "xoxb-test".to_string(),
            db_endpoint: "mem://".to_string(),
            ..Default::default()
        }),
    }
}

/// Build the router over mocked services. Mocks without expectations panic on
/// any call, so the no-side-effect tests hold by construction.
fn test_router(agent: MockAgent, db: MockDb, chat: MockChat) -> axum::Router {
    let runtime = Runtime {
        config: test_config(),
        db: DbClient::new(Arc::new(db)),
        agent: AgentClient::new(Arc::new(agent)),
        chat: ChatClient::new(Arc::new(chat)),
    };

    server::router(runtime)
}

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn message_body() -> Value {
    json!({
        "type": "event_callback",
        "event": {
            "type": "message",
            "user": "U123",
            "channel": "C999",
            "text": "<@U0ABCDEF123> hello"
        }
    })
}

// Tests.

#[tokio::test]
async fn url_verification_echoes_challenge() {
    let app = test_router(MockAgent::new(), MockDb::new(), MockChat::new());

    let body = json!({ "type": "url_verification", "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P" });
    let response = app.oneshot(post_json(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap().to_str().unwrap(),
        "application/json"
    );

    let reply = response_json(response).await;
    assert_eq!(reply["challenge"], body["challenge"]);
}

#[tokio::test]
async fn url_verification_without_challenge_echoes_null() {
    let app = test_router(MockAgent::new(), MockDb::new(), MockChat::new());

    let response = app.oneshot(post_json(&json!({ "type": "url_verification" }))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response_json(response).await["challenge"].is_null());
}

#[tokio::test]
async fn retry_header_suppresses_processing() {
    // No expectations on any mock: a single agent/db/chat call would panic.
    let app = test_router(MockAgent::new(), MockDb::new(), MockChat::new());

    let mut request = post_json(&message_body());
    request.headers_mut().insert("x-slack-retry-num", "1".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "message": "No need to resend" }));
}

#[tokio::test]
async fn retry_header_is_case_insensitive() {
    let app = test_router(MockAgent::new(), MockDb::new(), MockChat::new());

    let mut request = post_json(&message_body());
    request.headers_mut().insert("X-Slack-Retry-Num", "3".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "message": "No need to resend" }));
}

#[tokio::test]
async fn message_event_runs_the_full_pipeline() {
    let mut agent = MockAgent::new();
    agent
        .expect_respond()
        .withf(|input| input == " hello")
        .times(1)
        .returning(|_| Ok("こんにちは".to_string()));

    let mut db = MockDb::new();
    db.expect_save_conversation()
        .withf(|user, input, response| user == "U123" && input == " hello" && response == "こんにちは")
        .times(1)
        .returning(|_, _, _| Ok(()));

    let mut chat = MockChat::new();
    chat.expect_send_message()
        .withf(|channel, text| channel == "C999" && text == "こんにちは")
        .times(1)
        .returning(|_, _| Ok(()));

    let app = test_router(agent, db, chat);

    let response = app.oneshot(post_json(&message_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn malformed_event_fails_before_any_side_effect() {
    // `event.user` is missing: the agent, store, and chat must not be touched.
    let app = test_router(MockAgent::new(), MockDb::new(), MockChat::new());

    let body = json!({
        "type": "event_callback",
        "event": { "type": "message", "channel": "C999", "text": "hello" }
    });

    let response = app.oneshot(post_json(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn agent_failure_aborts_save_and_reply() {
    let mut agent = MockAgent::new();
    agent
        .expect_respond()
        .times(1)
        .returning(|_| Err(PipelineError::AgentInvocation(anyhow::anyhow!("rate limited"))));

    // No expectations on db or chat: the pipeline must stop at the agent.
    let app = test_router(agent, MockDb::new(), MockChat::new());

    let response = app.oneshot(post_json(&message_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn store_failure_aborts_the_reply() {
    let mut agent = MockAgent::new();
    agent.expect_respond().times(1).returning(|_| Ok("answer".to_string()));

    let mut db = MockDb::new();
    db.expect_save_conversation()
        .times(1)
        .returning(|_, _, _| Err(PipelineError::StoreWrite(anyhow::anyhow!("db down"))));

    let app = test_router(agent, db, MockChat::new());

    let response = app.oneshot(post_json(&message_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn non_message_events_are_acknowledged_without_processing() {
    let app = test_router(MockAgent::new(), MockDb::new(), MockChat::new());

    let body = json!({
        "type": "event_callback",
        "event": { "type": "reaction_added", "user": "U123" }
    });

    let response = app.oneshot(post_json(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn replayed_event_without_retry_header_is_processed_again() {
    // Documented idempotence gap: no deduplication by event id.
    let mut agent = MockAgent::new();
    agent.expect_respond().times(2).returning(|_| Ok("答え".to_string()));

    let mut db = MockDb::new();
    db.expect_save_conversation().times(2).returning(|_, _, _| Ok(()));

    let mut chat = MockChat::new();
    chat.expect_send_message().times(2).returning(|_, _| Ok(()));

    let app = test_router(agent, db, chat);

    for _ in 0..2 {
        let response = app.clone().oneshot(post_json(&message_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn pipeline_works_against_the_in_memory_store() {
    let mut agent = MockAgent::new();
    agent.expect_respond().times(1).returning(|_| Ok("こんにちは".to_string()));

    let mut chat = MockChat::new();
    chat.expect_send_message().times(1).returning(|_, _| Ok(()));

    let db = DbClient::surreal_memory().await.expect("Failed to create DB client");

    let runtime = Runtime {
        config: test_config(),
        db,
        agent: AgentClient::new(Arc::new(agent)),
        chat: ChatClient::new(Arc::new(chat)),
    };

    let response = server::router(runtime).oneshot(post_json(&message_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
