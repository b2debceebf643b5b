//! Error types for the prompt writer

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to write to sink: {0}")]
    Sink(#[source] io::Error),

    #[error("Failed to write prompt trailer: {0}")]
    Trailer(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, PromptError>;

impl From<PromptError> for io::Error {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Sink(e) => e,
            // The payload already reached the sink, so an Interrupted here
            // must not make `write_all` send it a second time.
            PromptError::Trailer(e) => {
                let kind = match e.kind() {
                    io::ErrorKind::Interrupted => io::ErrorKind::Other,
                    kind => kind,
                };
                io::Error::new(kind, PromptError::Trailer(e))
            }
        }
    }
}
