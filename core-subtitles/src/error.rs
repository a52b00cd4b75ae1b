//! Parse errors for subtitle documents.

use std::time::Duration;
use thiserror::Error;

/// A subtitle document could not be turned into cues.
///
/// Line numbers are 1-based and count every physical line of the input,
/// including headers and blank lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A line containing `-->` did not match the timing pattern.
    #[error("line {line}: malformed timestamp line `{text}`")]
    MalformedTimestamp { line: usize, text: String },

    /// A cue ends before it starts.
    #[error("line {line}: cue ends at {end:?}, before its start at {start:?}")]
    EndBeforeStart {
        line: usize,
        start: Duration,
        end: Duration,
    },

    /// A cue handed to the engine directly violates `start <= end`.
    #[error("cue #{index} ends at {end:?}, before its start at {start:?}")]
    InvalidCue {
        index: usize,
        start: Duration,
        end: Duration,
    },
}

impl FormatError {
    /// Input line the error refers to, when it came from parsing.
    pub fn line(&self) -> Option<usize> {
        match self {
            FormatError::MalformedTimestamp { line, .. }
            | FormatError::EndBeforeStart { line, .. } => Some(*line),
            FormatError::InvalidCue { .. } => None,
        }
    }
}

/// Result type for subtitle parsing.
pub type Result<T> = std::result::Result<T, FormatError>;
