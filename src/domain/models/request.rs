#[cfg(test)]
#[path = "request_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::AgentMode;
use super::GenerationConfig;
use super::GenerationMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub agent_mode: AgentMode,
    pub max_iterations: u32,
    pub api_key: Option<String>,
}

impl From<&GenerationConfig> for RequestConfig {
    fn from(config: &GenerationConfig) -> RequestConfig {
        return RequestConfig {
            model: config.model.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            frequency_penalty: config.frequency_penalty,
            presence_penalty: config.presence_penalty,
            agent_mode: config.agent_mode,
            max_iterations: config.max_iterations,
            api_key: config.api_key(),
        };
    }
}

/// Body of `POST /api/generate`. Built fresh for every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub input: String,
    pub mode: GenerationMode,
    pub npc_tags: Option<Vec<String>>,
    pub config: RequestConfig,
}

/// Splits a comma separated tag field. An empty field yields `None`.
pub fn parse_npc_tags(field: &str) -> Option<Vec<String>> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }

    let tags = trimmed
        .split(',')
        .map(|e| return e.trim().to_string())
        .filter(|e| return !e.is_empty())
        .collect::<Vec<String>>();

    return Some(tags);
}

impl GenerationRequest {
    pub fn new(input: &str, npc_tags_field: &str, config: &GenerationConfig) -> GenerationRequest {
        let mut npc_tags = None;
        if config.mode.uses_npc_tags() {
            npc_tags = parse_npc_tags(npc_tags_field);
        }

        return GenerationRequest {
            input: input.to_string(),
            mode: config.mode,
            npc_tags,
            config: RequestConfig::from(config),
        };
    }
}
