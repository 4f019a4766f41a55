#[cfg(test)]
#[path = "response_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

pub const GENERIC_FAILURE_MESSAGE: &str = "Generation failed, please try again.";

/// Body returned by the generation service. Every field is optional, unknown
/// shapes are kept as all `None`.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lua_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<String>,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    return value
        .get(key)
        .and_then(Value::as_str)
        .map(|e| return e.to_string());
}

impl GenerationResponse {
    /// Reads a response leniently. Fields with an unexpected type are ignored
    /// rather than failing the whole body.
    pub fn from_value(value: &Value) -> GenerationResponse {
        if !value.is_object() {
            return GenerationResponse::default();
        }

        return GenerationResponse {
            success: value.get("success").and_then(Value::as_bool),
            lua_script: string_field(value, "luaScript"),
            error: string_field(value, "error"),
            model: string_field(value, "model"),
            agent_mode: string_field(value, "agentMode"),
            mode: string_field(value, "mode"),
            knowledge_base: string_field(value, "knowledgeBase"),
        };
    }

    /// Text to render: the script, else the error, else a generic failure.
    /// Empty strings count as absent.
    pub fn display_text(&self) -> String {
        let script = self.lua_script.as_ref().filter(|e| return !e.is_empty());
        if let Some(script) = script {
            return script.to_string();
        }

        let error = self.error.as_ref().filter(|e| return !e.is_empty());
        if let Some(error) = error {
            return error.to_string();
        }

        return GENERIC_FAILURE_MESSAGE.to_string();
    }
}

/// How a single backend call settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Response(GenerationResponse),
    Failed(String),
}
