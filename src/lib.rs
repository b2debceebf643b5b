//! prompt-stream - keep an interactive prompt below the last printed line
//!
//! Wrap an output sink in a [`PromptWriter`] and every write ending in `\n`
//! is followed by a status icon and a prompt. The next write moves the cursor
//! back to column zero first, overwriting the prompt.
//!
//! ```no_run
//! use std::io::{self, Write};
//! use prompt_stream::PromptWriter;
//!
//! let writer = PromptWriter::new(io::stdout());
//! writer.set_prompt(Some("$ ")).set_status_icon(Some("🧪"));
//!
//! let mut out = &writer;
//! writeln!(out, "The prompt should appear below this line")?;
//! # Ok::<(), io::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod rotation;

pub use crate::core::error::PromptError;
pub use crate::core::trailer::{CURSOR_RESET, DEFAULT_PROMPT, LINE_TERMINATOR};
pub use crate::core::writer::PromptWriter;
pub use crate::rotation::Rotation;
