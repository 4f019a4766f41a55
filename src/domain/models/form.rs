#[cfg(test)]
#[path = "form_test.rs"]
mod tests;

use super::NumericField;

/// Focusable controls of the generation form, in tab order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormField {
    ApiKey,
    Mode,
    NpcTags,
    Model,
    Numeric(NumericField),
    AgentMode,
    #[default]
    Description,
}

const TAB_ORDER: [FormField; 12] = [
    FormField::ApiKey,
    FormField::Mode,
    FormField::NpcTags,
    FormField::Model,
    FormField::Numeric(NumericField::Temperature),
    FormField::Numeric(NumericField::MaxTokens),
    FormField::Numeric(NumericField::TopP),
    FormField::Numeric(NumericField::FrequencyPenalty),
    FormField::Numeric(NumericField::PresencePenalty),
    FormField::AgentMode,
    FormField::Numeric(NumericField::MaxIterations),
    FormField::Description,
];

impl FormField {
    /// Moves focus through the tab order. NPC tags are skipped while hidden.
    pub fn cycle(&self, forward: bool, npc_tags_visible: bool) -> FormField {
        let len = TAB_ORDER.len();
        let mut idx = TAB_ORDER.iter().position(|e| return e == self).unwrap_or(0);

        loop {
            if forward {
                idx = (idx + 1) % len;
            } else {
                idx = (idx + len - 1) % len;
            }

            let field = TAB_ORDER[idx];
            if field == FormField::NpcTags && !npc_tags_visible {
                continue;
            }

            return field;
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormField::ApiKey => return "API key",
            FormField::Mode => return "Generation mode",
            FormField::NpcTags => return "NPC tags",
            FormField::Model => return "Model",
            FormField::Numeric(field) => return field.label(),
            FormField::AgentMode => return "Agent mode",
            FormField::Description => return "Description",
        }
    }

    /// Fields that accept free typing.
    pub fn is_text(&self) -> bool {
        return matches!(
            self,
            FormField::ApiKey | FormField::NpcTags | FormField::Description
        );
    }
}
