//! Device capability endpoint tests

use std::sync::Arc;

use axum::http::StatusCode;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use telekit_client::device::DEVICE_INFO_PATH;
use telekit_client::oauth::CodeExchanger;
use tests::fixtures::capability_doc;
use tests::{test_token, ScriptedExchanger};

use crate::{gateway, get};

fn unused_exchanger() -> Arc<dyn CodeExchanger> {
    Arc::new(ScriptedExchanger::failing())
}

#[tokio::test]
async fn test_unauthorized_without_a_session() {
    let (router, _) = gateway("https://api.invalid", unused_exchanger());

    let response = get(&router, "/api/device/capabilities", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthorized_without_a_capability_token() {
    let (router, sessions) = gateway("https://api.invalid", unused_exchanger());

    let session_id = sessions.create().await;
    let mut tokens = sessions.tokens(session_id).await.unwrap();
    tokens.set_token_for_scope("MIM", test_token("mim-token"));
    sessions.commit(session_id, tokens).await;

    let response = get(&router, "/api/device/capabilities", Some(session_id)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_returns_typed_record_for_authorized_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEVICE_INFO_PATH))
        .and(header("authorization", "bearer device-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(capability_doc()))
        .expect(1)
        .mount(&server)
        .await;

    let (router, sessions) = gateway(&server.uri(), unused_exchanger());

    let session_id = sessions.create().await;
    let mut tokens = sessions.tokens(session_id).await.unwrap();
    tokens.set_token_for_scope("DC", test_token("device-token"));
    sessions.commit(session_id, tokens).await;

    let response = get(&router, "/api/device/capabilities", Some(session_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["typeAllocationCode"], "01215200");
    assert_eq!(body["vendor"], "SAM");
    assert_eq!(body["mmsCapable"], true);
    assert_eq!(body["assistedGps"], false);
}

#[tokio::test]
async fn test_malformed_upstream_document_is_a_bad_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEVICE_INFO_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "DeviceInfo": {} })),
        )
        .mount(&server)
        .await;

    let (router, sessions) = gateway(&server.uri(), unused_exchanger());

    let session_id = sessions.create().await;
    let mut tokens = sessions.tokens(session_id).await.unwrap();
    tokens.set_token_for_scope("DC", test_token("device-token"));
    sessions.commit(session_id, tokens).await;

    let response = get(&router, "/api/device/capabilities", Some(session_id)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("malformed capability document"));
}
