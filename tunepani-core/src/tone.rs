//! # Tone Generator Module
//!
//! Per-pad reference tones. Each pad is either `Silent` or `Sounding`; a
//! sounding pad owns exactly one voice on the backend, tuned to the pad's note
//! and played at the global volume.
//!
//! The generator is the only owner of the pad → voice map. Device failures
//! never leave it in a half state: a failed start keeps the pad silent, and a
//! failed stop still forgets the voice.

use std::collections::HashMap;

use crate::error::{Result, TuneError};
use crate::notes::NoteFrequencyTable;
use crate::pads::PadId;

/// Default global volume for reference tones.
pub const DEFAULT_VOLUME: f32 = 0.3;

/// The device side of the tone generator: something that can start, retune,
/// re-gain and stop oscillator voices.
pub trait ToneBackend {
    /// Handle for one running voice.
    type Voice;

    /// Creates a sine voice at `frequency` Hz and `gain`, connects it to the
    /// output and starts it immediately.
    fn start_voice(&mut self, frequency: f32, gain: f32) -> Result<Self::Voice>;

    fn set_frequency(&mut self, voice: &Self::Voice, frequency: f32) -> Result<()>;

    fn set_gain(&mut self, voice: &Self::Voice, gain: f32) -> Result<()>;

    /// Stops and releases the voice.
    fn stop_voice(&mut self, voice: Self::Voice) -> Result<()>;
}

/// State of a pad's reference tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneState {
    Silent,
    Sounding,
}

/// A running reference tone.
#[derive(Debug)]
pub struct ActiveTone<V> {
    pub pad: PadId,
    pub voice: V,
    /// Frequency the voice is currently tuned to, in Hz.
    pub frequency: f32,
}

/// Owns the live pad → voice map and applies tone transitions to the backend.
pub struct ToneGenerator<B: ToneBackend> {
    backend: B,
    table: NoteFrequencyTable,
    volume: f32,
    active: HashMap<PadId, ActiveTone<B::Voice>>,
}

impl<B: ToneBackend> ToneGenerator<B> {
    pub fn new(backend: B, table: NoteFrequencyTable, volume: f32) -> Self {
        Self {
            backend,
            table,
            volume: clamp_volume(volume),
            active: HashMap::new(),
        }
    }

    /// Toggles a pad's reference tone and returns the resulting state.
    ///
    /// A sounding pad is stopped, whatever its note is now. A silent pad is
    /// started at its note's frequency; when the note has no playable
    /// frequency or the device refuses, the failure is logged and the pad
    /// stays silent.
    pub fn toggle(&mut self, pad: PadId, note: &str) -> ToneState {
        if self.active.contains_key(&pad) {
            self.release(pad);
            return ToneState::Silent;
        }

        match self.start(pad, note) {
            Ok(()) => ToneState::Sounding,
            Err(e) => {
                log::warn!("[TONE] Pad {} not started: {}", pad, e);
                ToneState::Silent
            }
        }
    }

    fn start(&mut self, pad: PadId, note: &str) -> Result<()> {
        let frequency = self.playable_frequency(note)?;
        let voice = self.backend.start_voice(frequency, self.volume)?;
        log::info!("[TONE] Pad {} sounding {} at {:.2} Hz", pad, note, frequency);
        self.active.insert(pad, ActiveTone { pad, voice, frequency });
        Ok(())
    }

    fn playable_frequency(&self, note: &str) -> Result<f32> {
        self.table
            .frequency_of(note)
            .filter(|f| f.is_finite())
            .ok_or_else(|| TuneError::InvalidTuning { note: note.to_string() })
    }

    /// Stops a pad's tone if it is sounding. Returns whether it was.
    ///
    /// Stop errors are logged and swallowed; the pad is silent afterwards
    /// either way.
    pub fn release(&mut self, pad: PadId) -> bool {
        let Some(tone) = self.active.remove(&pad) else {
            return false;
        };
        if let Err(e) = self.backend.stop_voice(tone.voice) {
            log::error!("[TONE] Error stopping tone for pad {}: {}", pad, e);
        } else {
            log::info!("[TONE] Pad {} silent", pad);
        }
        true
    }

    /// Stops every sounding tone.
    pub fn release_all(&mut self) {
        let pads: Vec<PadId> = self.active.keys().copied().collect();
        for pad in pads {
            self.release(pad);
        }
    }

    /// Retunes a sounding pad in place after its note changed.
    ///
    /// Silent pads are left alone; they pick the note up on the next
    /// toggle. If the new note has no playable frequency, or the device
    /// rejects the change, the tone keeps its previous frequency.
    ///
    /// Returns whether the voice was retuned.
    pub fn retune(&mut self, pad: PadId, note: &str) -> bool {
        if !self.active.contains_key(&pad) {
            return false;
        }
        let frequency = match self.playable_frequency(note) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("[TONE] Retune skipped for pad {}: {}", pad, e);
                return false;
            }
        };

        let Some(tone) = self.active.get_mut(&pad) else {
            return false;
        };
        match self.backend.set_frequency(&tone.voice, frequency) {
            Ok(()) => {
                tone.frequency = frequency;
                log::debug!("[TONE] Pad {} retuned to {} ({:.2} Hz)", pad, note, frequency);
                true
            }
            Err(e) => {
                log::error!("[TONE] Error retuning pad {}: {}", pad, e);
                false
            }
        }
    }

    /// Sets the global volume and applies it to every sounding pad.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        for tone in self.active.values() {
            if let Err(e) = self.backend.set_gain(&tone.voice, self.volume) {
                log::error!("[TONE] Error setting gain for pad {}: {}", tone.pad, e);
            }
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn state(&self, pad: PadId) -> ToneState {
        if self.active.contains_key(&pad) {
            ToneState::Sounding
        } else {
            ToneState::Silent
        }
    }

    pub fn active_tone(&self, pad: PadId) -> Option<&ActiveTone<B::Voice>> {
        self.active.get(&pad)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn table(&self) -> &NoteFrequencyTable {
        &self.table
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ToneBackend> Drop for ToneGenerator<B> {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) }
}

/// In-memory backend that records every voice it was asked to play.
#[cfg(test)]
pub(crate) mod test_backend {
    use std::collections::BTreeMap;

    use super::ToneBackend;
    use crate::error::{Result, TuneError};

    #[derive(Debug, Clone, PartialEq)]
    pub struct VoiceRecord {
        pub frequency: f32,
        pub gain: f32,
        pub stopped: bool,
    }

    #[derive(Debug, Default)]
    pub struct RecordingBackend {
        pub voices: BTreeMap<u32, VoiceRecord>,
        pub fail_start: bool,
        pub fail_stop: bool,
        next: u32,
    }

    impl RecordingBackend {
        /// A backend whose device refuses every new voice.
        pub fn failing_start() -> Self {
            Self { fail_start: true, ..Self::default() }
        }

        /// A backend whose device errors on every stop.
        pub fn failing_stop() -> Self {
            Self { fail_stop: true, ..Self::default() }
        }

        pub fn running(&self) -> usize {
            self.voices.values().filter(|v| !v.stopped).count()
        }
    }

    impl ToneBackend for RecordingBackend {
        type Voice = u32;

        fn start_voice(&mut self, frequency: f32, gain: f32) -> Result<u32> {
            if self.fail_start {
                return Err(TuneError::DeviceUnavailable("no output".into()));
            }
            self.next += 1;
            self.voices.insert(self.next, VoiceRecord { frequency, gain, stopped: false });
            Ok(self.next)
        }

        fn set_frequency(&mut self, voice: &u32, frequency: f32) -> Result<()> {
            self.voices.get_mut(voice).unwrap().frequency = frequency;
            Ok(())
        }

        fn set_gain(&mut self, voice: &u32, gain: f32) -> Result<()> {
            self.voices.get_mut(voice).unwrap().gain = gain;
            Ok(())
        }

        fn stop_voice(&mut self, voice: u32) -> Result<()> {
            if self.fail_stop {
                return Err(TuneError::StopFailure("device already torn down".into()));
            }
            self.voices.get_mut(&voice).unwrap().stopped = true;
            Ok(())
        }
    }
}
