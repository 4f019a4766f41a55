use anyhow::Result;

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

pub type ClipboardBox = Box<dyn Clipboard>;
