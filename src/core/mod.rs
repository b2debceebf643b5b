//! Core prompt decoration components.
//!
//! - **writer**: `PromptWriter`, the output decorator
//! - **trailer**: status icon + prompt bytes and the control bytes used around them
//! - **error**: error types for sink failures
//!
//! # Architecture
//!
//! ```text
//! PromptWriter
//! ├── Mutex
//! │   ├── sink (any io::Write)
//! │   └── Trailer (icon bytes + prompt bytes)
//! └── pending reset flag (AtomicBool)
//! ```

pub mod error;
pub mod trailer;
pub mod writer;
