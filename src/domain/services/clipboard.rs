use anyhow::anyhow;
use anyhow::Result;

use crate::domain::models::Clipboard;

/// System clipboard through arboard. The handle is opened lazily so a missing
/// display server only fails the copy, not startup.
#[derive(Default)]
pub struct ClipboardService {
    clipboard: Option<arboard::Clipboard>,
}

impl ClipboardService {
    pub fn healthcheck() -> Result<()> {
        arboard::Clipboard::new()?;
        return Ok(());
    }
}

impl Clipboard for ClipboardService {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|err| return anyhow!("Clipboard is unavailable: {err}"))?;
            self.clipboard = Some(clipboard);
        }

        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text.to_string())?;
        }

        return Ok(());
    }
}
