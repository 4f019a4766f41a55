use anyhow::Result;

use super::parse_npc_tags;
use super::GenerationRequest;
use crate::domain::models::AgentMode;
use crate::domain::models::GenerationConfig;
use crate::domain::models::GenerationMode;

#[test]
fn it_parses_npc_tags() {
    assert_eq!(
        parse_npc_tags("a, b ,,c"),
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert_eq!(parse_npc_tags("   "), None);
    assert_eq!(parse_npc_tags(" , ,"), Some(vec![]));
}

#[test]
fn it_sends_npc_tags_for_encounters() {
    let config = GenerationConfig {
        mode: GenerationMode::Encounter,
        ..GenerationConfig::default()
    };

    let req = GenerationRequest::new("A theft in the tavern", "a, b ,,c", &config);
    assert_eq!(
        req.npc_tags,
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert_eq!(req.mode, GenerationMode::Encounter);
}

#[test]
fn it_never_sends_npc_tags_for_maps() {
    let config = GenerationConfig::default();

    let req = GenerationRequest::new("A starter village", "guard, merchant", &config);
    assert_eq!(req.npc_tags, None);
}

#[test]
fn it_serializes_the_wire_format() -> Result<()> {
    let config = GenerationConfig {
        agent_mode: AgentMode::MultiAgent,
        api_key: "sk-1234567890abcdef".to_string(),
        ..GenerationConfig::default()
    };

    let req = GenerationRequest::new("A starter village", "", &config);
    let res = serde_json::to_value(&req)?;

    assert_eq!(
        res,
        serde_json::json!({
            "input": "A starter village",
            "mode": "map",
            "npcTags": null,
            "config": {
                "model": "gpt-4.1",
                "temperature": 0.7,
                "maxTokens": 4000,
                "topP": 0.9,
                "frequencyPenalty": 0.0,
                "presencePenalty": 0.0,
                "agentMode": "multi-agent",
                "maxIterations": 3,
                "apiKey": "sk-1234567890abcdef"
            }
        })
    );

    return Ok(());
}

#[test]
fn it_sends_null_api_key_when_unset() -> Result<()> {
    let req = GenerationRequest::new("A starter village", "", &GenerationConfig::default());
    let res = serde_json::to_value(&req)?;

    assert_eq!(res["config"]["apiKey"], serde_json::Value::Null);
    return Ok(());
}
