//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The environment declared a natural terminal and a step-limit truncation
    /// on the same transition.
    #[error("Contradictory termination in training episode {episode} at step {step}: environment reported both terminal and step limit")]
    ContradictoryTermination {
        /// Index of the training episode, starting from 0.
        episode: usize,

        /// Step within the episode, starting from 1.
        step: usize,
    },

    /// A checkpoint was written with a schema this version cannot read.
    #[error("Unsupported checkpoint schema version: {0}")]
    UnsupportedSchemaVersion(u32),
}
