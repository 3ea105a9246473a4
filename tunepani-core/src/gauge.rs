//! # Flat/Sharp Gauge
//!
//! Maps a detected frequency against its matched note onto a marker position.
//! The gauge spans ±50 cents around a centre that means "in tune"; anything
//! further out sits on the gauge's edge.

use crate::notes::{cents_deviation, NoteFrequencyTable};
use crate::PitchSample;

/// Cents at the gauge's edges.
pub const GAUGE_RANGE_CENTS: f32 = 50.0;

/// Signed cents deviation clamped to the gauge range.
///
/// Returns `None` when either frequency is not finite and positive.
pub fn clamped_cents(estimated: f32, ideal: f32) -> Option<f32> {
    let valid = |f: f32| f.is_finite() && f > 0.0;
    if !valid(estimated) || !valid(ideal) {
        return None;
    }
    Some(cents_deviation(estimated, ideal).clamp(-GAUGE_RANGE_CENTS, GAUGE_RANGE_CENTS))
}

/// Geometry of the gauge: where "in tune" sits and how far the edges are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeScale {
    pub center: f32,
    pub half_width: f32,
}

impl Default for GaugeScale {
    fn default() -> Self {
        Self { center: 100.0, half_width: 100.0 }
    }
}

/// What the gauge shows for one pitch sample.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    /// Marker position in gauge coordinates.
    pub marker: f32,
    /// Clamped cents deviation, when a note was matched.
    pub cents: Option<f32>,
    /// Matched note label, when a note was matched.
    pub note: Option<String>,
}

impl GaugeScale {
    pub fn new(center: f32, half_width: f32) -> Self {
        Self { center, half_width }
    }

    /// Marker position for a cents value; the value is clamped first.
    pub fn marker_for_cents(&self, cents: f32) -> f32 {
        let cents = cents.clamp(-GAUGE_RANGE_CENTS, GAUGE_RANGE_CENTS);
        self.center + (cents / GAUGE_RANGE_CENTS) * self.half_width
    }

    /// The centred, unlabelled reading shown when nothing is detected.
    pub fn idle(&self) -> GaugeReading {
        GaugeReading { marker: self.center, cents: None, note: None }
    }

    /// Maps an estimated frequency and its ideal onto the gauge.
    pub fn map(&self, estimated: f32, ideal: f32) -> Option<f32> {
        clamped_cents(estimated, ideal).map(|c| self.marker_for_cents(c))
    }

    /// Builds the reading for a pitch sample, looking the matched note's
    /// ideal frequency up in `table`.
    pub fn reading(&self, sample: &PitchSample, table: &NoteFrequencyTable) -> GaugeReading {
        let Some(note) = sample.note.as_deref() else {
            return self.idle();
        };
        let Some(ideal) = table.frequency_of(note) else {
            return self.idle();
        };
        match clamped_cents(sample.frequency, ideal) {
            Some(cents) => GaugeReading {
                marker: self.marker_for_cents(cents),
                cents: Some(cents),
                note: Some(note.to_string()),
            },
            None => self.idle(),
        }
    }
}
