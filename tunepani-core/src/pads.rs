//! # Drum Pads Module
//!
//! The session's pad collection and the geometry used to place new pads.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, TuneError};

/// Maximum number of live pads.
pub const MAX_PADS: usize = 24;
/// Note assigned to a freshly added pad.
pub const DEFAULT_NOTE: &str = "E3";
/// Side length of a pad in pixels.
pub const PAD_SIZE: f32 = 60.0;

/// Pads per arc; a new arc starts after 8, 16 and 20 pads.
const GROUP_SIZES: [usize; 4] = [8, 8, 4, 4];
const ARC_BASE_Y: f32 = 120.0;
const ARC_SPACING_Y: f32 = 80.0;
const ARC_CURVATURE: f32 = 0.006;
const BASE_OFFSET_X: f32 = 30.0;
const PAIR_SPACING_X: f32 = 50.0;

/// Opaque, unique pad identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PadId(pub u64);

impl fmt::Display for PadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A virtual drum with a target note, positioned by its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub id: PadId,
    pub note: String,
    pub x: f32,
    pub y: f32,
}

impl Pad {
    /// Whether this pad's square overlaps an axis-aligned rectangle.
    pub fn overlaps(&self, rect: &Rect) -> bool {
        self.x + PAD_SIZE > rect.x
            && self.x < rect.x + rect.width
            && self.y + PAD_SIZE > rect.y
            && self.y < rect.y + rect.height
    }
}

/// Axis-aligned rectangle in pad-area coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Default placement of newly added pads.
///
/// Pads fill arcs of [8, 8, 4, 4]. Inside an arc they alternate right and
/// left of the centre line, one more pair-spacing outward every two pads; the
/// arc bends downward quadratically with the distance from the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadLayout {
    area_width: f32,
}

impl PadLayout {
    /// Area width is capped at 600 px.
    pub fn new(area_width: f32) -> Self {
        Self { area_width: area_width.min(600.0).max(0.0) }
    }

    /// Layout for a window of the given width, leaving a 20 px margin on
    /// either side.
    pub fn for_window(window_width: f32) -> Self {
        Self::new(window_width - 40.0)
    }

    pub fn area_width(&self) -> f32 {
        self.area_width
    }

    /// Top-left corner of the pad added at position `index`.
    pub fn default_position(&self, index: usize) -> (f32, f32) {
        let index = index.min(MAX_PADS - 1);

        let mut group = 0;
        let mut group_start = 0;
        for (i, size) in GROUP_SIZES.iter().enumerate() {
            if index < group_start + size {
                group = i;
                break;
            }
            group_start += size;
        }
        let sub_index = index - group_start;

        let center_x = self.area_width / 2.0;
        let offset = BASE_OFFSET_X + (sub_index / 2) as f32 * PAIR_SPACING_X;
        let x = if sub_index % 2 == 0 { center_x + offset } else { center_x - offset };

        let base_y = ARC_BASE_Y + group as f32 * ARC_SPACING_Y;
        let dx = (x - center_x).abs();
        let y = base_y + ARC_CURVATURE * dx * dx;

        (x - PAD_SIZE / 2.0, y - PAD_SIZE / 2.0)
    }
}

impl Default for PadLayout {
    fn default() -> Self {
        Self::new(600.0)
    }
}

/// The live pads of a session, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PadCollection {
    pads: Vec<Pad>,
    next_id: u64,
}

impl PadCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pad with the default note at the layout's next position.
    pub fn add(&mut self, layout: &PadLayout) -> Result<PadId> {
        if self.pads.len() >= MAX_PADS {
            return Err(TuneError::PadLimit(MAX_PADS));
        }
        let (x, y) = layout.default_position(self.pads.len());
        let id = self.allocate_id();
        self.pads.push(Pad { id, note: DEFAULT_NOTE.to_string(), x, y });
        Ok(id)
    }

    fn allocate_id(&mut self) -> PadId {
        self.next_id += 1;
        PadId(self.next_id)
    }

    pub fn remove(&mut self, id: PadId) -> Option<Pad> {
        let pos = self.pads.iter().position(|p| p.id == id)?;
        Some(self.pads.remove(pos))
    }

    pub fn get(&self, id: PadId) -> Option<&Pad> {
        self.pads.iter().find(|p| p.id == id)
    }

    /// Moves a pad. Non-finite coordinates are ignored.
    pub fn move_to(&mut self, id: PadId, x: f32, y: f32) -> Result<()> {
        if !x.is_finite() || !y.is_finite() {
            return Ok(());
        }
        let pad = self.get_mut(id)?;
        pad.x = x;
        pad.y = y;
        Ok(())
    }

    pub fn set_note(&mut self, id: PadId, note: &str) -> Result<()> {
        self.get_mut(id)?.note = note.to_string();
        Ok(())
    }

    fn get_mut(&mut self, id: PadId) -> Result<&mut Pad> {
        self.pads
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(TuneError::UnknownPad(id))
    }

    /// Replaces every pad, e.g. when a saved configuration is loaded.
    ///
    /// Pads beyond the cap are dropped; later ids keep counting above the
    /// highest loaded id. A pad repeating an earlier pad's id gets a fresh one.
    pub fn replace_all(&mut self, mut pads: Vec<Pad>) {
        if pads.len() > MAX_PADS {
            log::warn!("[PADS] Dropping {} pads beyond the limit", pads.len() - MAX_PADS);
            pads.truncate(MAX_PADS);
        }
        let max_id = pads.iter().map(|p| p.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id);

        let mut seen = HashSet::new();
        for pad in &mut pads {
            if !seen.insert(pad.id) {
                let fresh = self.allocate_id();
                log::warn!("[PADS] Duplicate pad id {} reassigned to {}", pad.id, fresh);
                pad.id = fresh;
                seen.insert(fresh);
            }
        }
        self.pads = pads;
    }

    pub fn snapshot(&self) -> Vec<Pad> {
        self.pads.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pad> {
        self.pads.iter()
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pads.len() >= MAX_PADS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_positions() {
        let layout = PadLayout::default();
        let close = |a: (f32, f32), b: (f32, f32)| (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3;
        // centre 300: first pad 30 px right, second 30 px left
        assert!(close(layout.default_position(0), (300.0, 95.4)));
        assert!(close(layout.default_position(1), (240.0, 95.4)));
        // third pad: one pair further out
        assert!(close(layout.default_position(2), (350.0, 128.4)));
    }

    #[test]
    fn test_new_arc_starts_lower() {
        let layout = PadLayout::default();
        let (_, y8) = layout.default_position(8);
        let (_, y16) = layout.default_position(16);
        let (_, y20) = layout.default_position(20);
        let (_, y0) = layout.default_position(0);
        assert!((y8 - y0 - 80.0).abs() < 1e-3);
        assert!((y16 - y0 - 160.0).abs() < 1e-3);
        assert!((y20 - y0 - 240.0).abs() < 1e-3);
    }

    #[test]
    fn test_layout_width_is_capped() {
        assert_eq!(PadLayout::for_window(1920.0).area_width(), 600.0);
        assert_eq!(PadLayout::for_window(440.0).area_width(), 400.0);
    }

    #[test]
    fn test_add_caps_at_limit() {
        let mut pads = PadCollection::new();
        let layout = PadLayout::default();
        for _ in 0..MAX_PADS {
            pads.add(&layout).unwrap();
        }
        assert!(pads.is_full());
        assert!(matches!(pads.add(&layout), Err(TuneError::PadLimit(24))));
        assert_eq!(pads.len(), MAX_PADS);
    }

    #[test]
    fn test_new_pad_defaults() {
        let mut pads = PadCollection::new();
        let id = pads.add(&PadLayout::default()).unwrap();
        let pad = pads.get(id).unwrap();
        assert_eq!(pad.note, DEFAULT_NOTE);
        assert_eq!((pad.x, pad.y), PadLayout::default().default_position(0));
    }

    #[test]
    fn test_ids_stay_unique_after_removal_and_load() {
        let mut pads = PadCollection::new();
        let layout = PadLayout::default();
        let a = pads.add(&layout).unwrap();
        let b = pads.add(&layout).unwrap();
        pads.remove(a);
        let c = pads.add(&layout).unwrap();
        assert_ne!(b, c);
        assert_ne!(a, c);

        pads.replace_all(vec![Pad { id: PadId(500), note: "A2".into(), x: 0.0, y: 0.0 }]);
        let d = pads.add(&layout).unwrap();
        assert!(d.0 > 500);
    }

    #[test]
    fn test_duplicate_ids_are_reassigned_on_load() {
        let mut pads = PadCollection::new();
        pads.replace_all(vec![
            Pad { id: PadId(4), note: "D2".into(), x: 0.0, y: 0.0 },
            Pad { id: PadId(4), note: "A2".into(), x: 70.0, y: 0.0 },
            Pad { id: PadId(2), note: "E3".into(), x: 140.0, y: 0.0 },
        ]);

        let snapshot = pads.snapshot();
        assert_eq!(snapshot[0].id, PadId(4));
        assert_eq!(snapshot[2].id, PadId(2));
        let fresh = snapshot[1].id;
        assert!(fresh.0 > 4);
        assert_eq!(pads.get(fresh).unwrap().note, "A2");

        assert_eq!(pads.remove(PadId(4)).unwrap().note, "D2");
        assert_eq!(pads.get(fresh).unwrap().note, "A2");
        let next = pads.add(&PadLayout::default()).unwrap();
        assert!(next.0 > fresh.0);
    }

    #[test]
    fn test_move_ignores_nan() {
        let mut pads = PadCollection::new();
        let id = pads.add(&PadLayout::default()).unwrap();
        pads.move_to(id, 10.0, 20.0).unwrap();
        pads.move_to(id, f32::NAN, 5.0).unwrap();
        let pad = pads.get(id).unwrap();
        assert_eq!((pad.x, pad.y), (10.0, 20.0));
        assert!(pads.move_to(PadId(999), 1.0, 1.0).is_err());
    }

    #[test]
    fn test_overlap() {
        let pad = Pad { id: PadId(1), note: "C3".into(), x: 100.0, y: 100.0 };
        assert!(pad.overlaps(&Rect { x: 150.0, y: 150.0, width: 50.0, height: 50.0 }));
        assert!(!pad.overlaps(&Rect { x: 160.0, y: 100.0, width: 50.0, height: 50.0 }));
    }

    #[test]
    fn test_pad_json_shape() {
        let pad = Pad { id: PadId(3), note: "E3".into(), x: 1.5, y: 2.0 };
        let json = serde_json::to_value(&pad).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 3, "note": "E3", "x": 1.5, "y": 2.0 }));
    }
}
