//! # Pitch Estimation Module
//!
//! Peak-picking fundamental estimation over a frame of per-bin magnitudes.
//!
//! The estimator takes the bin holding the largest magnitude and converts its
//! index to Hz. It is only correct when the dominant spectral peak is the
//! fundamental and the bin width (`sample_rate / transform_size`) is fine
//! enough for the note range being tuned. There is no interpolation, no
//! noise gate and no smoothing between frames.

/// Width of one frequency bin in Hz.
pub fn bin_resolution(sample_rate: u32, transform_size: usize) -> f32 {
    sample_rate as f32 / transform_size as f32
}

/// Index of the first bin holding the maximum magnitude.
///
/// Frames where every magnitude is equal (including all-silent frames) and
/// empty frames yield bin 0.
pub fn peak_bin<T: PartialOrd + Copy>(magnitudes: &[T]) -> usize {
    let mut peak = 0;
    for (i, value) in magnitudes.iter().enumerate().skip(1) {
        if *value > magnitudes[peak] {
            peak = i;
        }
    }
    peak
}

/// Estimates the fundamental frequency of a magnitude frame.
///
/// # Arguments
/// * `magnitudes` - One magnitude per frequency bin, non-negative
/// * `sample_rate` - Sample rate the frame was captured at, in Hz
/// * `transform_size` - FFT size that produced the frame
///
/// # Returns
/// * `bin * sample_rate / transform_size`. A silent frame returns 0 Hz;
///   callers treat anything `<= 0` as "no detection".
pub fn estimate_frequency<T: PartialOrd + Copy>(
    magnitudes: &[T],
    sample_rate: u32,
    transform_size: usize,
) -> f32 {
    peak_bin(magnitudes) as f32 * bin_resolution(sample_rate, transform_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_peak_maps_to_bin_frequency() {
        for k in [1usize, 5, 20, 300, 1023] {
            let mut frame = vec![10u8; 1024];
            frame[k] = 200;
            let freq = estimate_frequency(&frame, 44100, 2048);
            assert_eq!(freq, k as f32 * (44100.0 / 2048.0));
        }
    }

    #[test]
    fn test_silent_frame_is_no_detection() {
        let frame = vec![0u8; 1024];
        assert_eq!(estimate_frequency(&frame, 44100, 2048), 0.0);

        let flat = vec![0.5f32; 1024];
        assert_eq!(estimate_frequency(&flat, 44100, 2048), 0.0);

        let empty: [u8; 0] = [];
        assert_eq!(estimate_frequency(&empty, 44100, 2048), 0.0);
    }

    #[test]
    fn test_first_maximum_wins() {
        let frame = [0u8, 3, 9, 1, 9, 2];
        assert_eq!(peak_bin(&frame), 2);
    }

    #[test]
    fn test_float_frames() {
        let frame = [-80.0f32, -60.0, -20.5, -40.0];
        assert_eq!(peak_bin(&frame), 2);
        assert_eq!(bin_resolution(48000, 4096), 48000.0 / 4096.0);
    }
}
