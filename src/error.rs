//! Error taxonomy for history parsing and frame rendering.

use thiserror::Error;

/// Errors raised by the graph core and the render pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A single malformed line or record; the row is dropped and parsing continues.
    #[error("skipped malformed record: {0}")]
    ParseSkip(String),

    /// The history source cannot be used at all; callers degrade to a simpler source.
    #[error("history source unavailable: {0}")]
    SourceUnavailable(String),

    /// A commit or row lookup outside the table. Indicates a broken invariant.
    #[error("index {index} out of range for table of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Unexpected failure while composing a frame.
    #[error("render fault: {0}")]
    RenderFault(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = Error::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of range for table of 3");

        let err = Error::SourceUnavailable("git log --graph exited with 128".into());
        assert!(err.to_string().contains("exited with 128"));
    }
}
