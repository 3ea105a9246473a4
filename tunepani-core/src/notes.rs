//! # Note Table Module
//!
//! This module holds the frequency table used for both the reference tones and
//! the pitch matcher, together with the note list offered by the pad note
//! picker.
//!
//! ## Features
//! - Equal-tempered table from C1 to C5 (A4 = 440 Hz), rounded to 0.01 Hz
//! - Nearest-note matching with a stable tie-break
//! - Cent deviation calculation

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::error::{Result, TuneError};

/// Represents a single musical note with its name and frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Note name (e.g., "A4", "C#3/Db3")
    pub name: String,
    /// Frequency in Hz
    pub frequency: f32,
}

/// Standard table entries in ascending pitch.
///
/// Iteration order matters: when two entries are equally far from a detected
/// frequency, the one listed first (the lower note) wins.
#[rustfmt::skip]
const STANDARD_ENTRIES: [(&str, f32); 49] = [
    ("C1", 32.70), ("C#1/Db1", 34.65), ("D1", 36.71), ("D#1/Eb1", 38.89),
    ("E1", 41.20), ("F1", 43.65), ("F#1/Gb1", 46.25), ("G1", 49.00),
    ("G#1/Ab1", 51.91), ("A1", 55.00), ("A#1/Bb1", 58.27), ("B1", 61.74),
    ("C2", 65.41), ("C#2/Db2", 69.30), ("D2", 73.42), ("D#2/Eb2", 77.78),
    ("E2", 82.41), ("F2", 87.31), ("F#2/Gb2", 92.50), ("G2", 98.00),
    ("G#2/Ab2", 103.83), ("A2", 110.00), ("A#2/Bb2", 116.54), ("B2", 123.47),
    ("C3", 130.81), ("C#3/Db3", 138.59), ("D3", 146.83), ("D#3/Eb3", 155.56),
    ("E3", 164.81), ("F3", 174.61), ("F#3/Gb3", 185.00), ("G3", 196.00),
    ("G#3/Ab3", 207.65), ("A3", 220.00), ("A#3/Bb3", 233.08), ("B3", 246.94),
    ("C4", 261.63), ("C#4/Db4", 277.18), ("D4", 293.66), ("D#4/Eb4", 311.13),
    ("E4", 329.63), ("F4", 349.23), ("F#4/Gb4", 369.99), ("G4", 392.00),
    ("G#4/Ab4", 415.30), ("A4", 440.00), ("A#4/Bb4", 466.16), ("B4", 493.88),
    ("C5", 523.25),
];

/// Notes offered by the pad note picker, highest first.
#[rustfmt::skip]
pub static NOTE_PICKER: [&str; 49] = [
    "C5", "B4", "A#4/Bb4", "A4", "G#4/Ab4", "G4",
    "F#4/Gb4", "F4", "E4", "D#4/Eb4", "D4", "C#4/Db4",
    "C4", "B3", "A#3/Bb3", "A3", "G#3/Ab3", "G3",
    "F#3/Gb3", "F3", "E3", "D#3/Eb3", "D3", "C#3/Db3",
    "C3", "B2", "A#2/Bb2", "A2", "G#2/Ab2", "G2",
    "F#2/Gb2", "F2", "E2", "D#2/Eb2", "D2", "C#2/Db2",
    "C2", "B1", "A#1/Bb1", "A1", "G#1/Ab1", "G1",
    "F#1/Gb1", "F1", "E1", "D#1/Eb1", "D1", "C#1/Db1", "C1",
];

/// The table shipped with the application, built once on first use.
static STANDARD: Lazy<NoteFrequencyTable> = Lazy::new(|| {
    let notes = STANDARD_ENTRIES
        .iter()
        .map(|&(name, frequency)| Note { name: name.to_string(), frequency })
        .collect::<Vec<_>>();
    let index = notes
        .iter()
        .enumerate()
        .map(|(i, note)| (note.name.clone(), i))
        .collect();
    NoteFrequencyTable { notes, index }
});

/// Immutable mapping from note name to fundamental frequency.
///
/// Names are unique and every frequency is finite and positive. Lookup by
/// name goes through a sorted index; matching walks the notes in table order.
#[derive(Debug, Clone)]
pub struct NoteFrequencyTable {
    notes: Vec<Note>,
    index: BTreeMap<String, usize>,
}

impl NoteFrequencyTable {
    /// Builds a table from `(name, frequency)` entries, keeping their order.
    ///
    /// # Errors
    /// * `DuplicateNote` if a name repeats
    /// * `InvalidFrequency` if a frequency is not finite and positive
    pub fn new<N: Into<String>>(entries: impl IntoIterator<Item = (N, f32)>) -> Result<Self> {
        let mut notes = Vec::new();
        let mut index = BTreeMap::new();

        for (name, frequency) in entries {
            let name = name.into();
            if !frequency.is_finite() || frequency <= 0.0 {
                return Err(TuneError::InvalidFrequency { note: name, freq: frequency });
            }
            if index.insert(name.clone(), notes.len()).is_some() {
                return Err(TuneError::DuplicateNote(name));
            }
            notes.push(Note { name, frequency });
        }

        Ok(Self { notes, index })
    }

    /// The C1–C5 equal-tempered table.
    pub fn standard() -> &'static NoteFrequencyTable {
        &STANDARD
    }

    /// Looks up the tabulated frequency of a note name.
    pub fn frequency_of(&self, name: &str) -> Option<f32> {
        self.index.get(name).map(|&i| self.notes[i].frequency)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Finds the note closest to a given frequency.
    ///
    /// Returns `None` for frequencies that are not finite and positive (the
    /// "no detection" case) and for an empty table. When two entries are
    /// equally close the one met first in table order is kept.
    ///
    /// # Arguments
    /// * `freq` - Input frequency in Hz
    pub fn closest_note(&self, freq: f32) -> Option<&Note> {
        if !freq.is_finite() || freq <= 0.0 {
            return None;
        }

        self.notes.iter().fold(None, |closest: Option<&Note>, note| match closest {
            Some(best) if (best.frequency - freq).abs() <= (note.frequency - freq).abs() => {
                Some(best)
            }
            _ => Some(note),
        })
    }
}

/// Calculates the deviation from a target frequency in cents.
///
/// Positive values are sharp, negative values flat; 100 cents make a semitone.
///
/// # Arguments
/// * `freq` - Measured frequency in Hz
/// * `target_freq` - Target frequency in Hz
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_covers_picker() {
        let table = NoteFrequencyTable::standard();
        assert_eq!(table.len(), NOTE_PICKER.len());
        for name in NOTE_PICKER {
            assert!(table.contains(name), "picker note {} missing from table", name);
        }
    }

    #[test]
    fn test_picker_has_no_duplicates() {
        let mut names = NOTE_PICKER.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NOTE_PICKER.len());
    }

    #[test]
    fn test_standard_table_is_ascending() {
        let table = NoteFrequencyTable::standard();
        let freqs: Vec<f32> = table.iter().map(|n| n.frequency).collect();
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(table.frequency_of("A4"), Some(440.0));
        assert_eq!(table.frequency_of("G#2/Ab2"), Some(103.83));
        assert_eq!(table.frequency_of("H2"), None);
    }

    #[test]
    fn test_closest_note_scenario() {
        let table = NoteFrequencyTable::standard();
        let note = table.closest_note(445.0).unwrap();
        assert_eq!(note.name, "A4");
    }

    #[test]
    fn test_closest_note_is_nearest_neighbour() {
        let table = NoteFrequencyTable::standard();
        let mut freq = 1.0_f32;
        while freq < 2000.0 {
            let best = table.closest_note(freq).unwrap();
            let best_diff = (best.frequency - freq).abs();
            for other in table.iter() {
                assert!(best_diff <= (other.frequency - freq).abs());
            }
            freq *= 1.037;
        }
    }

    #[test]
    fn test_closest_note_rejects_no_detection() {
        let table = NoteFrequencyTable::standard();
        assert!(table.closest_note(0.0).is_none());
        assert!(table.closest_note(-12.0).is_none());
        assert!(table.closest_note(f32::NAN).is_none());
        assert!(table.closest_note(f32::INFINITY).is_none());
    }

    #[test]
    fn test_tie_goes_to_first_entry() {
        let table = NoteFrequencyTable::new([("low", 100.0), ("high", 200.0)]).unwrap();
        assert_eq!(table.closest_note(150.0).unwrap().name, "low");

        let reversed = NoteFrequencyTable::new([("high", 200.0), ("low", 100.0)]).unwrap();
        assert_eq!(reversed.closest_note(150.0).unwrap().name, "high");
    }

    #[test]
    fn test_table_rejects_bad_entries() {
        assert!(matches!(
            NoteFrequencyTable::new([("A", 1.0), ("A", 2.0)]),
            Err(TuneError::DuplicateNote(_))
        ));
        assert!(matches!(
            NoteFrequencyTable::new([("A", f32::NAN)]),
            Err(TuneError::InvalidFrequency { .. })
        ));
        assert!(matches!(
            NoteFrequencyTable::new([("A", 0.0)]),
            Err(TuneError::InvalidFrequency { .. })
        ));
    }

    #[test]
    fn test_cents_deviation() {
        assert!(cents_deviation(440.0, 440.0).abs() < 1e-6);
        assert!((cents_deviation(880.0, 440.0) - 1200.0).abs() < 1e-3);
        assert!((cents_deviation(445.0, 440.0) - 19.56).abs() < 0.01);
    }
}
