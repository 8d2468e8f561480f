use std::path::PathBuf;

use thiserror::Error;

use crate::riddle::bank::Difficulty;

/// Errors that can arise while loading riddles, playing a session, or touching
/// the session/leaderboard tables.
#[derive(Debug, Error)]
pub enum RiddleError {
    /// Wrapper around IO errors (reading banks, writing tables).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A riddle bank file could not be parsed.
    #[error("riddle bank parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A persisted table row is missing its comma or carries a non-integer value.
    #[error("malformed row {line} in {}: {content:?}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// A riddle entry in a bank file has no usable answers.
    #[error("riddle {question:?} has no accepted answers")]
    NoAnswers { question: String },

    /// The selected room has no riddles; the session cannot start.
    #[error("the {0} room has no riddles")]
    EmptyBank(Difficulty),

    /// A turn was submitted after the session reached a terminal state.
    #[error("session is over; no further turns are accepted")]
    SessionOver,

    /// A room name that is not one of easy/intermediate/hard.
    #[error("unknown room {0:?} (expected easy, intermediate or hard)")]
    UnknownDifficulty(String),
}
