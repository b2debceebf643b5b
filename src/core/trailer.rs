//! Prompt trailer
//!
//! The trailer is the byte sequence written right after a line terminator:
//! the status icon followed by the prompt. Both parts are encoded as UTF-8
//! once, when they are set, so the write path only copies bytes.

use std::io::{self, Write};

/// Moves the cursor to column zero without advancing a line
pub const CURSOR_RESET: u8 = b'\r';

/// Line terminator that triggers the trailer
pub const LINE_TERMINATOR: u8 = b'\n';

/// Prompt used by the convenience constructor when none is given
pub const DEFAULT_PROMPT: &str = ">>> ";

/// Status icon + prompt bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trailer {
    /// Status icon, empty or ending in exactly one space
    icon: Vec<u8>,
    /// Prompt text, empty means no prompt
    prompt: Vec<u8>,
}

impl Trailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a prompt. `None` disables the prompt.
    pub fn encode_prompt(prompt: Option<&str>) -> Vec<u8> {
        prompt.map(|p| p.as_bytes().to_vec()).unwrap_or_default()
    }

    /// Encode a status icon, appending a space unless it already ends in one.
    /// `None` disables the icon.
    pub fn encode_icon(icon: Option<&str>) -> Vec<u8> {
        match icon {
            None => Vec::new(),
            Some(icon) => {
                let mut bytes = Vec::with_capacity(icon.len() + 1);
                bytes.extend_from_slice(icon.as_bytes());
                if !icon.ends_with(' ') {
                    bytes.push(b' ');
                }
                bytes
            }
        }
    }

    pub fn set_prompt(&mut self, prompt: Vec<u8>) {
        self.prompt = prompt;
    }

    pub fn set_icon(&mut self, icon: Vec<u8>) {
        self.icon = icon;
    }

    pub fn prompt(&self) -> &[u8] {
        &self.prompt
    }

    pub fn icon(&self) -> &[u8] {
        &self.icon
    }

    /// True when neither an icon nor a prompt is set
    pub fn is_empty(&self) -> bool {
        self.icon.is_empty() && self.prompt.is_empty()
    }

    /// Total number of bytes written by `write_to`
    pub fn len(&self) -> usize {
        self.icon.len() + self.prompt.len()
    }

    /// Write icon then prompt
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.icon)?;
        out.write_all(&self.prompt)
    }
}
