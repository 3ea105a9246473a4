//! # Tuning Session
//!
//! Where user intents land: adding, moving, retuning and removing pads,
//! toggling their reference tones, changing the volume and loading saved
//! configurations. The session keeps the pad collection and the tone
//! generator consistent with each other.

use crate::error::Result;
use crate::notes::NoteFrequencyTable;
use crate::pads::{Pad, PadCollection, PadId, PadLayout, Rect};
use crate::tone::{ToneBackend, ToneGenerator, ToneState};

pub struct TuningSession<B: ToneBackend> {
    pads: PadCollection,
    layout: PadLayout,
    tones: ToneGenerator<B>,
}

impl<B: ToneBackend> TuningSession<B> {
    pub fn new(backend: B, table: NoteFrequencyTable, layout: PadLayout, volume: f32) -> Self {
        Self {
            pads: PadCollection::new(),
            layout,
            tones: ToneGenerator::new(backend, table, volume),
        }
    }

    /// Adds a pad at its default position. Fails once 24 pads exist.
    pub fn add_pad(&mut self) -> Result<PadId> {
        let id = self.pads.add(&self.layout)?;
        log::debug!("[SESSION] Added pad {}", id);
        Ok(id)
    }

    /// Removes a pad, stopping its tone first if it is sounding.
    pub fn remove_pad(&mut self, id: PadId) -> Option<Pad> {
        self.tones.release(id);
        let removed = self.pads.remove(id);
        if removed.is_some() {
            log::debug!("[SESSION] Removed pad {}", id);
        }
        removed
    }

    /// Toggles a pad's reference tone.
    pub fn toggle_pad(&mut self, id: PadId) -> ToneState {
        let Some(pad) = self.pads.get(id) else {
            log::warn!("[SESSION] Toggle for unknown pad {}", id);
            return ToneState::Silent;
        };
        let note = pad.note.clone();
        self.tones.toggle(id, &note)
    }

    /// Assigns a new note. A sounding pad is retuned in place.
    pub fn reassign_note(&mut self, id: PadId, note: &str) -> Result<()> {
        self.pads.set_note(id, note)?;
        self.tones.retune(id, note);
        Ok(())
    }

    pub fn move_pad(&mut self, id: PadId, x: f32, y: f32) -> Result<()> {
        self.pads.move_to(id, x, y)
    }

    /// Finishes a drag: a pad dropped onto `trash` is removed, otherwise it
    /// moves to `(x, y)`. Returns whether the pad was removed.
    pub fn drop_pad(&mut self, id: PadId, x: f32, y: f32, trash: Option<Rect>) -> Result<bool> {
        self.pads.move_to(id, x, y)?;
        let in_trash = match (trash, self.pads.get(id)) {
            (Some(rect), Some(pad)) => pad.overlaps(&rect),
            _ => false,
        };
        if in_trash {
            self.remove_pad(id);
        }
        Ok(in_trash)
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.tones.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.tones.volume()
    }

    /// Replaces the pads with a saved snapshot. Every sounding tone is
    /// stopped first.
    pub fn load_pads(&mut self, pads: Vec<Pad>) {
        self.tones.release_all();
        self.pads.replace_all(pads);
        log::info!("[SESSION] Loaded {} pad(s)", self.pads.len());
    }

    pub fn snapshot(&self) -> Vec<Pad> {
        self.pads.snapshot()
    }

    pub fn pad_state(&self, id: PadId) -> ToneState {
        self.tones.state(id)
    }

    pub fn pads(&self) -> &PadCollection {
        &self.pads
    }

    pub fn tones(&self) -> &ToneGenerator<B> {
        &self.tones
    }

    pub fn table(&self) -> &NoteFrequencyTable {
        self.tones.table()
    }

    /// Changes where newly added pads are placed. Existing pads stay put.
    pub fn set_layout(&mut self, layout: PadLayout) {
        self.layout = layout;
    }

    pub fn layout(&self) -> PadLayout {
        self.layout
    }
}
