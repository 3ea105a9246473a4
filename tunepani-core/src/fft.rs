//! # Spectrum Analyser Module
//!
//! Turns a frame of time-domain samples into per-bin magnitudes the way an
//! analyser node does: Blackman window, forward FFT, magnitude normalised by
//! the transform size, conversion to decibels, and optional scaling to bytes.
//! There is no smoothing between frames.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{Result, TuneError};

/// Default transform size, matching the analyser used for pitch tracking.
pub const DEFAULT_FFT_SIZE: usize = 2048;
/// Smallest supported transform size.
pub const MIN_FFT_SIZE: usize = 32;
/// Largest supported transform size.
pub const MAX_FFT_SIZE: usize = 32768;

pub const DEFAULT_MIN_DECIBELS: f32 = -100.0;
pub const DEFAULT_MAX_DECIBELS: f32 = -30.0;

/// Applies a Blackman window to the input buffer to reduce spectral leakage.
fn apply_blackman_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n == 0 { return; }
    let n = n as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let x = 2.0 * std::f32::consts::PI * i as f32 / n;
        *sample *= 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos();
    }
}

/// Validates a transform size: a power of two between 32 and 32768.
pub fn validate_fft_size(size: usize) -> Result<()> {
    if size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(TuneError::InvalidSettings(format!(
            "fft size {} must be a power of two between {} and {}",
            size, MIN_FFT_SIZE, MAX_FFT_SIZE
        )))
    }
}

/// Frequency analyser with a fixed transform size.
///
/// The FFT plan is built once; every call to one of the `*_frequency_data`
/// methods analyses exactly one frame of `fft_size` samples.
pub struct SpectrumAnalyser {
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    min_decibels: f32,
    max_decibels: f32,
    scratch: Vec<Complex<f32>>,
}

impl std::fmt::Debug for SpectrumAnalyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyser")
            .field("fft_size", &self.fft_size)
            .field("min_decibels", &self.min_decibels)
            .field("max_decibels", &self.max_decibels)
            .finish()
    }
}

impl SpectrumAnalyser {
    /// Creates an analyser with the default decibel range.
    pub fn new(fft_size: usize) -> Result<Self> {
        Self::with_range(fft_size, DEFAULT_MIN_DECIBELS, DEFAULT_MAX_DECIBELS)
    }

    /// Creates an analyser mapping `[min_decibels, max_decibels]` onto the
    /// byte range 0..=255.
    pub fn with_range(fft_size: usize, min_decibels: f32, max_decibels: f32) -> Result<Self> {
        validate_fft_size(fft_size)?;
        if !(min_decibels < max_decibels) {
            return Err(TuneError::InvalidSettings(format!(
                "min decibels ({}) must be below max decibels ({})",
                min_decibels, max_decibels
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            fft_size,
            fft,
            min_decibels,
            max_decibels,
            scratch: vec![Complex { re: 0.0, im: 0.0 }; fft_size],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins in each output frame (half the transform size).
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Computes the magnitude of each bin in decibels.
    ///
    /// `signal` must hold at least `fft_size` samples; only the first
    /// `fft_size` are used. Silent bins come out as negative infinity.
    pub fn float_frequency_data(&mut self, signal: &[f32]) -> Vec<f32> {
        assert!(
            signal.len() >= self.fft_size,
            "Input frame must hold at least fft_size samples"
        );

        let mut windowed = signal[..self.fft_size].to_vec();
        apply_blackman_window(&mut windowed);

        for (slot, sample) in self.scratch.iter_mut().zip(windowed) {
            *slot = Complex { re: sample, im: 0.0 };
        }
        self.fft.process(&mut self.scratch);

        let scale = 1.0 / self.fft_size as f32;
        self.scratch
            .iter()
            .take(self.frequency_bin_count())
            .map(|c| 20.0 * (c.norm() * scale).log10())
            .collect()
    }

    /// Computes the magnitude of each bin scaled to 0..=255.
    ///
    /// Values at or below `min_decibels` map to 0, values at or above
    /// `max_decibels` to 255.
    pub fn byte_frequency_data(&mut self, signal: &[f32]) -> Vec<u8> {
        let range = self.max_decibels - self.min_decibels;
        let min = self.min_decibels;
        self.float_frequency_data(signal)
            .into_iter()
            .map(|db| {
                let scaled = (255.0 / range) * (db - min);
                if scaled.is_nan() { 0 } else { scaled.clamp(0.0, 255.0) as u8 }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch;

    fn sine(freq: f32, amplitude: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(SpectrumAnalyser::new(2048).is_ok());
        assert!(SpectrumAnalyser::new(1000).is_err());
        assert!(SpectrumAnalyser::new(16).is_err());
        assert!(SpectrumAnalyser::new(65536).is_err());
        assert!(SpectrumAnalyser::with_range(2048, -30.0, -100.0).is_err());
    }

    #[test]
    fn test_silence_is_all_zero_bytes() {
        let mut analyser = SpectrumAnalyser::new(2048).unwrap();
        let bytes = analyser.byte_frequency_data(&vec![0.0; 2048]);
        assert_eq!(bytes.len(), 1024);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bin_centred_sine_peaks_on_its_bin() {
        let mut analyser = SpectrumAnalyser::new(2048).unwrap();
        let freq = 20.0 * 44100.0 / 2048.0;
        let bytes = analyser.byte_frequency_data(&sine(freq, 0.01, 44100, 2048));
        assert_eq!(pitch::peak_bin(&bytes), 20);

        let floats = analyser.float_frequency_data(&sine(freq, 0.01, 44100, 2048));
        assert_eq!(pitch::peak_bin(&floats), 20);
    }
}
