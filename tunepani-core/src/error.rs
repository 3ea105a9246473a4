//! Error types for the tuning core.

use thiserror::Error;

use crate::pads::PadId;

/// Result type for tuning core operations.
pub type Result<T> = std::result::Result<T, TuneError>;

/// Errors that can occur in the tuning core.
///
/// None of the audio-related variants are fatal to a session: callers log them
/// and leave the affected subsystem inert.
#[derive(Debug, Error)]
pub enum TuneError {
    /// The microphone or the audio output could not be acquired.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A pad references a note without a playable frequency.
    #[error("note '{note}' has no playable frequency")]
    InvalidTuning {
        /// The offending note name.
        note: String,
    },

    /// Releasing a tone failed, e.g. because the device is already gone.
    #[error("failed to stop tone: {0}")]
    StopFailure(String),

    /// The pad collection is full.
    #[error("pad limit of {0} reached")]
    PadLimit(usize),

    /// No pad with this id exists.
    #[error("unknown pad {0}")]
    UnknownPad(PadId),

    /// No saved configuration with this id exists.
    #[error("unknown configuration {0}")]
    UnknownConfiguration(u64),

    /// A frequency table entry is not finite and positive.
    #[error("invalid frequency {freq} Hz for note '{note}'")]
    InvalidFrequency {
        /// Note name of the entry.
        note: String,
        /// The rejected frequency.
        freq: f32,
    },

    /// A frequency table contains the same note name twice.
    #[error("duplicate note '{0}' in frequency table")]
    DuplicateNote(String),

    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<anyhow::Error> for TuneError {
    fn from(err: anyhow::Error) -> Self {
        TuneError::DeviceUnavailable(format!("{err:#}"))
    }
}
