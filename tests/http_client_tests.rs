//! Home Assistant and Ollama HTTP client tests using WireMock

mod common;

use common::{state, test_config, MockHomeAssistantServer, MockOllamaServer, TEST_TOKEN};
use ha_voice_bridge::client::{HomeAssistantClient, HomeAssistantHttpClient};
use ha_voice_bridge::error::BridgeError;
use ha_voice_bridge::sampling::{OllamaHttpClient, TextGenerator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, ResponseTemplate,
};

fn ha_client(server: &MockHomeAssistantServer) -> HomeAssistantHttpClient {
    let config = test_config(&server.uri(), "http://127.0.0.1:9");
    HomeAssistantHttpClient::new(config.home_assistant).unwrap()
}

#[tokio::test]
async fn test_get_states_sends_bearer_token() {
    let server = MockHomeAssistantServer::start().await;
    server
        .mock_states(vec![
            state("light.kitchen", "on", "Kitchen"),
            json!({ "entity_id": "sensor.bare" }),
        ])
        .await;

    let states = ha_client(&server).get_states().await.unwrap();

    assert_eq!(states.len(), 2);
    assert_eq!(states[0].friendly_name(), "Kitchen");
    assert_eq!(states[1].state, "");
}

#[tokio::test]
async fn test_call_service_posts_body_and_returns_status() {
    let server = MockHomeAssistantServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/services/climate/set_temperature"))
        .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .and(body_json(json!({"entity_id": "climate.hall", "temperature": 21})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server.server)
        .await;

    let mut body = Map::new();
    body.insert("entity_id".to_string(), json!("climate.hall"));
    body.insert("temperature".to_string(), json!(21));

    let response = ha_client(&server)
        .call_service("climate", "set_temperature", &body)
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_call_service_error_status_is_not_an_error() {
    let server = MockHomeAssistantServer::start().await;
    server.mock_service("light", "turn_on", 400).await;

    let response = ha_client(&server)
        .call_service("light", "turn_on", &Map::new())
        .await
        .unwrap();

    assert!(!response.is_success());
    assert_eq!(response.status_code, 400);
}

#[tokio::test]
async fn test_snapshot_probe() {
    let server = MockHomeAssistantServer::start().await;
    server.mock_camera_proxy("camera.garage", 200).await;
    server.mock_camera_proxy("camera.shed", 500).await;
    let client = ha_client(&server);

    assert!(client.camera_snapshot_available("camera.garage").await.unwrap());
    assert!(!client.camera_snapshot_available("camera.shed").await.unwrap());
}

#[tokio::test]
async fn test_unreachable_platform_is_upstream_unavailable() {
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9");
    let client = HomeAssistantHttpClient::new(config.home_assistant).unwrap();

    let err = client.get_states().await.unwrap_err();

    assert!(matches!(
        err,
        BridgeError::UpstreamUnavailable(_) | BridgeError::Timeout(_)
    ));
}

#[tokio::test]
async fn test_ollama_generate_request_shape() {
    let ollama = MockOllamaServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "dolphin-llama3:latest",
            "prompt": "Say hi",
            "stream": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": "hi", "done": true})),
        )
        .expect(1)
        .mount(&ollama.server)
        .await;

    let config = test_config("http://127.0.0.1:9", &ollama.uri());
    let client = OllamaHttpClient::new(&config.ollama).unwrap();

    let reply = client.generate("Say hi", Duration::from_secs(5)).await.unwrap();
    assert_eq!(reply, "hi");
}

#[tokio::test]
async fn test_ollama_reply_without_response_field() {
    let ollama = MockOllamaServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "oops"})))
        .mount(&ollama.server)
        .await;

    let config = test_config("http://127.0.0.1:9", &ollama.uri());
    let client = OllamaHttpClient::new(&config.ollama).unwrap();

    let err = client.generate("Say hi", Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, BridgeError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_ollama_model_listing() {
    let ollama = MockOllamaServer::start().await;
    ollama.mock_tags(&["dolphin-llama3:latest"]).await;

    let config = test_config("http://127.0.0.1:9", &ollama.uri());
    let client = OllamaHttpClient::new(&config.ollama).unwrap();

    assert_eq!(client.list_models().await.unwrap(), vec!["dolphin-llama3:latest"]);
    assert_eq!(client.model(), "dolphin-llama3:latest");
}

#[tokio::test]
async fn test_get_single_state() {
    let server = MockHomeAssistantServer::start().await;
    server.mock_state("camera.garage", "idle").await;

    let state: Value = serde_json::to_value(
        ha_client(&server).get_state("camera.garage").await.unwrap(),
    )
    .unwrap();

    assert_eq!(state["state"], json!("idle"));
}
