#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

use std::time::Instant;

use crate::domain::models::ClientError;
use crate::domain::models::GenerationConfig;
use crate::domain::models::KeyDisplay;
use crate::domain::models::KeyStatusKind;
use crate::domain::models::KeyValueStore;
use crate::domain::models::ViewState;
use crate::domain::models::NOTIFICATION_LIFETIME;

pub const API_KEY_STORE_KEY: &str = "openai_api_key";
pub const MASK_SEPARATOR: &str = "...";
/// Inputs containing the separator and shorter than this are taken to be a
/// re-submitted mask.
pub const MIN_FULL_KEY_LENGTH: usize = 20;

pub struct Credentials {}

impl Credentials {
    /// First 8 and last 4 characters with the middle elided.
    pub fn mask(raw: &str) -> String {
        let chars = raw.chars().collect::<Vec<char>>();
        let head = chars.iter().take(8).collect::<String>();
        let tail = chars[chars.len().saturating_sub(4)..]
            .iter()
            .collect::<String>();

        return format!("{head}{MASK_SEPARATOR}{tail}");
    }

    pub fn looks_masked(input: &str) -> bool {
        return input.contains(MASK_SEPARATOR) && input.chars().count() < MIN_FULL_KEY_LENGTH;
    }

    /// Populates the config and the key field from the store. Returns the
    /// masked form when a key was found.
    pub fn load(
        store: &dyn KeyValueStore,
        config: &mut GenerationConfig,
        view: &mut ViewState,
    ) -> Option<String> {
        let raw = store.get(API_KEY_STORE_KEY).filter(|e| return !e.is_empty())?;
        let masked = Credentials::mask(&raw);

        config.api_key = raw;
        view.key_field = masked.to_string();
        view.key_display = KeyDisplay::Concealed;
        view.set_key_status(
            KeyStatusKind::Saved,
            &format!("Saved API key: {masked}"),
            None,
        );

        return Some(masked);
    }

    pub fn save(
        store: &mut dyn KeyValueStore,
        config: &mut GenerationConfig,
        view: &mut ViewState,
        input: &str,
    ) -> Result<(), ClientError> {
        let raw = input.trim();
        let expires_at = Some(Instant::now() + NOTIFICATION_LIFETIME);

        if raw.is_empty() {
            let err = ClientError::EmptyInput;
            view.set_key_status(KeyStatusKind::Warning, &err.to_string(), expires_at);
            return Err(err);
        }

        if Credentials::looks_masked(raw) {
            let err = ClientError::MaskedInputRejected;
            view.set_key_status(KeyStatusKind::Warning, &err.to_string(), expires_at);
            return Err(err);
        }

        if let Err(err) = store.set(API_KEY_STORE_KEY, raw) {
            tracing::error!(error = ?err, "Failed to persist API key");
            let err = ClientError::FileSystem(err.to_string());
            view.set_key_status(KeyStatusKind::Warning, &err.to_string(), expires_at);
            return Err(err);
        }

        let masked = Credentials::mask(raw);
        tracing::debug!(key = masked.as_str(), "Saved API key");

        config.api_key = raw.to_string();
        view.key_field = masked;
        view.key_display = KeyDisplay::Concealed;
        view.set_key_status(KeyStatusKind::Saved, "API key saved", expires_at);

        return Ok(());
    }

    pub fn clear(
        store: &mut dyn KeyValueStore,
        config: &mut GenerationConfig,
        view: &mut ViewState,
    ) -> Result<(), ClientError> {
        let expires_at = Some(Instant::now() + NOTIFICATION_LIFETIME);
        if let Err(err) = store.remove(API_KEY_STORE_KEY) {
            tracing::error!(error = ?err, "Failed to remove API key");
            let err = ClientError::FileSystem(err.to_string());
            view.set_key_status(KeyStatusKind::Warning, &err.to_string(), expires_at);
            return Err(err);
        }

        config.api_key = "".to_string();
        view.key_field = "".to_string();
        view.set_key_status(KeyStatusKind::Cleared, "API key cleared", expires_at);

        return Ok(());
    }

    /// Flips between the masked and plaintext key. Revealing reads the stored
    /// raw value since the field may only hold the mask.
    pub fn toggle_visibility(store: &dyn KeyValueStore, view: &mut ViewState) {
        let saved = store.get(API_KEY_STORE_KEY).filter(|e| return !e.is_empty());

        match view.key_display {
            KeyDisplay::Concealed => {
                if view.key_field.contains(MASK_SEPARATOR) {
                    if let Some(raw) = saved {
                        view.key_field = raw;
                    }
                }
                view.key_display = KeyDisplay::Revealed;
            }
            KeyDisplay::Revealed => {
                if let Some(raw) = saved {
                    if view.key_field == raw {
                        view.key_field = Credentials::mask(&raw);
                    }
                }
                view.key_display = KeyDisplay::Concealed;
            }
        }
    }
}
