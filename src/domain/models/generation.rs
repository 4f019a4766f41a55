#[cfg(test)]
#[path = "generation_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::EnumString;
use strum::EnumVariantNames;

use super::ClientError;

pub const MODELS: [&str; 6] = [
    "gpt-4.1",
    "gpt-4.1-mini",
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
];

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    EnumVariantNames,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Map,
    Encounter,
}

impl GenerationMode {
    pub fn parse(text: &str) -> GenerationMode {
        return text.parse::<GenerationMode>().unwrap_or_default();
    }

    pub fn toggle(&self) -> GenerationMode {
        match self {
            GenerationMode::Map => return GenerationMode::Encounter,
            GenerationMode::Encounter => return GenerationMode::Map,
        }
    }

    /// Only encounters are populated with NPC tags.
    pub fn uses_npc_tags(&self) -> bool {
        return *self == GenerationMode::Encounter;
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    EnumVariantNames,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AgentMode {
    #[default]
    Standard,
    Iterative,
    MultiAgent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum NumericField {
    Temperature,
    MaxTokens,
    TopP,
    FrequencyPenalty,
    PresencePenalty,
    MaxIterations,
}

pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub decimals: usize,
}

impl NumericField {
    pub fn bounds(&self) -> NumericBounds {
        match self {
            NumericField::Temperature => {
                return NumericBounds {
                    min: 0.0,
                    max: 2.0,
                    step: 0.1,
                    decimals: 1,
                };
            }
            NumericField::MaxTokens => {
                return NumericBounds {
                    min: 100.0,
                    max: 16000.0,
                    step: 100.0,
                    decimals: 0,
                };
            }
            NumericField::TopP => {
                return NumericBounds {
                    min: 0.0,
                    max: 1.0,
                    step: 0.05,
                    decimals: 2,
                };
            }
            NumericField::FrequencyPenalty | NumericField::PresencePenalty => {
                return NumericBounds {
                    min: -2.0,
                    max: 2.0,
                    step: 0.1,
                    decimals: 1,
                };
            }
            NumericField::MaxIterations => {
                return NumericBounds {
                    min: 1.0,
                    max: 10.0,
                    step: 1.0,
                    decimals: 0,
                };
            }
        }
    }

    pub fn is_integer(&self) -> bool {
        return self.bounds().decimals == 0;
    }

    pub fn label(&self) -> &'static str {
        match self {
            NumericField::Temperature => return "Temperature",
            NumericField::MaxTokens => return "Max tokens",
            NumericField::TopP => return "Top P",
            NumericField::FrequencyPenalty => return "Frequency penalty",
            NumericField::PresencePenalty => return "Presence penalty",
            NumericField::MaxIterations => return "Max iterations",
        }
    }
}

/// Parameters supplied with every generation request. Owned by the
/// controller and only mutated by input handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub agent_mode: AgentMode,
    pub max_iterations: u32,
    pub mode: GenerationMode,
    /// Raw credential, never the masked display form. Empty when unset.
    pub api_key: String,
}

impl Default for GenerationConfig {
    fn default() -> GenerationConfig {
        return GenerationConfig {
            model: MODELS[0].to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            top_p: 0.9,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            agent_mode: AgentMode::Standard,
            max_iterations: 3,
            mode: GenerationMode::Map,
            api_key: "".to_string(),
        };
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    return (value * factor).round() / factor;
}

impl GenerationConfig {
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Temperature => return self.temperature,
            NumericField::MaxTokens => return f64::from(self.max_tokens),
            NumericField::TopP => return self.top_p,
            NumericField::FrequencyPenalty => return self.frequency_penalty,
            NumericField::PresencePenalty => return self.presence_penalty,
            NumericField::MaxIterations => return f64::from(self.max_iterations),
        }
    }

    /// Stores a value for the field, clamped to its range and rounded to its
    /// precision.
    pub fn set_numeric(&mut self, field: NumericField, value: f64) {
        let bounds = field.bounds();
        let value = round_to(value.clamp(bounds.min, bounds.max), bounds.decimals);

        match field {
            NumericField::Temperature => self.temperature = value,
            NumericField::MaxTokens => self.max_tokens = value as u32,
            NumericField::TopP => self.top_p = value,
            NumericField::FrequencyPenalty => self.frequency_penalty = value,
            NumericField::PresencePenalty => self.presence_penalty = value,
            NumericField::MaxIterations => self.max_iterations = value as u32,
        }
    }

    pub fn parse_numeric(&mut self, field: NumericField, raw: &str) -> Result<(), ClientError> {
        let trimmed = raw.trim();
        let parsed = if field.is_integer() {
            trimmed.parse::<i64>().map(|e| return e as f64).ok()
        } else {
            trimmed.parse::<f64>().ok().filter(|e| return e.is_finite())
        };

        match parsed {
            Some(value) => {
                self.set_numeric(field, value);
                return Ok(());
            }
            None => {
                return Err(ClientError::InvalidValue {
                    field: field.to_string(),
                    value: raw.to_string(),
                });
            }
        }
    }

    pub fn step_numeric(&mut self, field: NumericField, forward: bool) {
        let step = field.bounds().step;
        let current = self.numeric(field);
        if forward {
            self.set_numeric(field, current + step);
        } else {
            self.set_numeric(field, current - step);
        }
    }

    /// Formatted text for the readout label next to a numeric control.
    pub fn readout(&self, field: NumericField) -> String {
        let decimals = field.bounds().decimals;
        return format!("{:.*}", decimals, self.numeric(field));
    }

    pub fn cycle_model(&mut self, forward: bool) {
        let idx = MODELS.iter().position(|e| return *e == self.model);
        let next = match idx {
            Some(idx) if forward => (idx + 1) % MODELS.len(),
            Some(idx) => (idx + MODELS.len() - 1) % MODELS.len(),
            None => 0,
        };

        self.model = MODELS[next].to_string();
    }

    pub fn cycle_agent_mode(&mut self, forward: bool) {
        let modes = [
            AgentMode::Standard,
            AgentMode::Iterative,
            AgentMode::MultiAgent,
        ];
        let idx = modes
            .iter()
            .position(|e| return *e == self.agent_mode)
            .unwrap_or(0);

        let next = if forward {
            (idx + 1) % modes.len()
        } else {
            (idx + modes.len() - 1) % modes.len()
        };

        self.agent_mode = modes[next];
    }

    pub fn api_key(&self) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        return Some(self.api_key.to_string());
    }
}
