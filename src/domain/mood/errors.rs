//! Mood Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoodError {
    #[error("unrecognized mood: {0:?}")]
    UnknownMood(String),

    #[error("image payload must not be empty")]
    EmptyPayload,
}
