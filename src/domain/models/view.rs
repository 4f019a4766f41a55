use std::time::Instant;

use super::GenerationConfig;
use super::Notification;
use super::NotificationKind;
use super::NumericField;

pub const EMPTY_OUTPUT_TITLE: &str = "The generated Lua script will be shown here";
pub const EMPTY_OUTPUT_HINT: &str = "Describe what you need, then press Ctrl+G to generate.";

/// What the output area currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Output {
    #[default]
    Empty,
    Script(String),
}

impl Output {
    pub fn script(&self) -> Option<&str> {
        match self {
            Output::Empty => return None,
            Output::Script(text) => return Some(text),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyDisplay {
    #[default]
    Concealed,
    Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyStatusKind {
    Saved,
    Warning,
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStatus {
    pub kind: KeyStatusKind,
    pub text: String,
    /// Persistent statuses have no expiry.
    pub expires_at: Option<Instant>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Readouts {
    values: [String; 6],
}

fn readout_index(field: NumericField) -> usize {
    match field {
        NumericField::Temperature => return 0,
        NumericField::MaxTokens => return 1,
        NumericField::TopP => return 2,
        NumericField::FrequencyPenalty => return 3,
        NumericField::PresencePenalty => return 4,
        NumericField::MaxIterations => return 5,
    }
}

impl Readouts {
    pub fn get(&self, field: NumericField) -> &str {
        return &self.values[readout_index(field)];
    }

    pub fn refresh(&mut self, field: NumericField, config: &GenerationConfig) {
        self.values[readout_index(field)] = config.readout(field);
    }
}

/// Everything the presentation layer draws. The controller is the only writer,
/// apart from the UI mirroring text typed into the editable fields.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    pub description: String,
    /// Bumped whenever the controller replaces `description` so the UI can
    /// reload its editor.
    pub description_revision: u64,
    pub description_placeholder: String,
    pub npc_tags: String,
    pub npc_tags_visible: bool,
    pub key_field: String,
    pub key_display: KeyDisplay,
    pub key_status: Option<KeyStatus>,
    pub output: Output,
    pub output_revision: u64,
    pub notifications: Vec<Notification>,
    pub busy: bool,
    /// `None` hides the status bar.
    pub progress: Option<f64>,
    pub readouts: Readouts,
}

impl ViewState {
    pub fn set_description(&mut self, text: &str) {
        self.description = text.to_string();
        self.description_revision += 1;
    }

    pub fn display_result(&mut self, script: &str) {
        self.output = Output::Script(script.to_string());
        self.output_revision += 1;
    }

    pub fn clear_output(&mut self) {
        self.output = Output::Empty;
        self.output_revision += 1;
    }

    pub fn notify(&mut self, kind: NotificationKind, message: &str) {
        self.notifications.push(Notification::new(kind, message));
    }

    pub fn set_key_status(&mut self, kind: KeyStatusKind, text: &str, expires_at: Option<Instant>) {
        self.key_status = Some(KeyStatus {
            kind,
            text: text.to_string(),
            expires_at,
        });
    }

    /// Drops expired notifications and transient key statuses.
    pub fn expire(&mut self, now: Instant) {
        self.notifications.retain(|e| return !e.is_expired(now));

        let status_expired = self
            .key_status
            .as_ref()
            .and_then(|e| return e.expires_at)
            .map(|e| return now >= e)
            .unwrap_or(false);

        if status_expired {
            self.key_status = None;
        }
    }
}
