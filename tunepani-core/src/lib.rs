// tunepani-core/src/lib.rs

//! The core logic for the Tunepani drum tuner.
//! This crate is responsible for microphone analysis, pitch estimation,
//! reference tone generation, pad management and saved configurations.
//! It is completely headless and contains no GUI code.

pub mod analysis;
pub mod audio;
pub mod error;
pub mod fft;
pub mod gauge;
pub mod notes;
pub mod pads;
pub mod pitch;
pub mod session;
pub mod settings;
pub mod store;
pub mod synth;
pub mod tone;
pub mod tutorial;

pub use error::{Result, TuneError};

use notes::NoteFrequencyTable;

/// Represents the result of a single analysis frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchSample {
    /// Estimated fundamental in Hz; `<= 0` means nothing was detected.
    pub frequency: f32,
    /// The nearest note in the frequency table, if any.
    pub note: Option<String>,
}

impl PitchSample {
    /// Matches a frequency against the table.
    pub fn matched(frequency: f32, table: &NoteFrequencyTable) -> Self {
        Self {
            frequency,
            note: table.closest_note(frequency).map(|n| n.name.clone()),
        }
    }

    /// The sample shown before any frame has been analysed.
    pub fn silent() -> Self {
        Self { frequency: 0.0, note: None }
    }

    pub fn is_detection(&self) -> bool {
        self.note.is_some()
    }
}
