use anyhow::Result;

use super::RagService;
use crate::domain::models::Backend;
use crate::domain::models::GenerationConfig;
use crate::domain::models::GenerationMode;
use crate::domain::models::GenerationRequest;
use crate::domain::services::Endpoint;

fn to_service(server: &mockito::Server) -> RagService {
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port.rsplit_once(':').unwrap();
    return RagService::new(Endpoint::new(host, port.parse::<u16>().unwrap()), 200);
}

fn encounter_request() -> GenerationRequest {
    let mut config = GenerationConfig::default();
    config.mode = GenerationMode::Encounter;
    config.api_key = "sk-test-key".to_string();
    return GenerationRequest::new("A theft in the tavern", "thief, guard", &config);
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/health")
        .with_status(200)
        .create_async()
        .await;

    let res = to_service(&server).health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/health")
        .with_status(503)
        .create_async()
        .await;

    let res = to_service(&server).health_check().await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_posts_the_request_snapshot() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "input": "A theft in the tavern",
            "mode": "encounter",
            "npcTags": ["thief", "guard"],
            "config": {
                "model": "gpt-4.1",
                "maxTokens": 4000,
                "agentMode": "standard",
                "maxIterations": 3,
                "apiKey": "sk-test-key"
            }
        })))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "success": true,
                "luaScript": "function CreateEncounter() end",
                "model": "gpt-4.1",
                "agentMode": "standard",
                "mode": "encounter",
                "knowledgeBase": "encounters"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let res = to_service(&server).generate(&encounter_request()).await?;

    mock.assert_async().await;
    assert_eq!(res.success, Some(true));
    assert_eq!(
        res.lua_script.as_deref(),
        Some("function CreateEncounter() end")
    );
    assert_eq!(res.knowledge_base.as_deref(), Some("encounters"));

    return Ok(());
}

#[tokio::test]
async fn it_reads_unexpected_bodies_leniently() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body("[1, 2, 3]")
        .create_async()
        .await;

    let res = to_service(&server).generate(&encounter_request()).await?;

    mock.assert_async().await;
    assert_eq!(res.lua_script, None);
    assert_eq!(res.error, None);

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_error_statuses() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(500)
        .with_body(r#"{"error":"boom"}"#)
        .create_async()
        .await;

    let res = to_service(&server).generate(&encounter_request()).await;

    mock.assert_async().await;
    insta::assert_snapshot!(res.unwrap_err().to_string(), @"Request failed with status 500");
}

#[tokio::test]
async fn it_fails_on_invalid_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let res = to_service(&server).generate(&encounter_request()).await;

    mock.assert_async().await;
    assert!(res.is_err());
}
