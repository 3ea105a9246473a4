use tunepani_core::analysis::PitchTracker;
use tunepani_core::fft::SpectrumAnalyser;
use tunepani_core::gauge::GaugeScale;
use tunepani_core::notes::NoteFrequencyTable;
use tunepani_core::pitch;
use tunepani_core::PitchSample;

const SAMPLE_RATE: u32 = 44100;
const FFT_SIZE: usize = 2048;

fn sine_wave(freq_hz: f32, amplitude: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * freq_hz * t).sin()
        })
        .collect()
}

fn bin_frequency(bin: usize) -> f32 {
    bin as f32 * SAMPLE_RATE as f32 / FFT_SIZE as f32
}

fn tracker() -> PitchTracker {
    PitchTracker::new(
        SpectrumAnalyser::new(FFT_SIZE).unwrap(),
        SAMPLE_RATE,
        NoteFrequencyTable::standard().clone(),
    )
}

#[test]
fn silent_frame_shows_no_note() {
    let mut analyser = SpectrumAnalyser::new(FFT_SIZE).unwrap();
    let magnitudes = analyser.byte_frequency_data(&vec![0.0; FFT_SIZE]);
    let freq = pitch::estimate_frequency(&magnitudes, SAMPLE_RATE, FFT_SIZE);
    assert_eq!(freq, 0.0);

    let table = NoteFrequencyTable::standard();
    let sample = PitchSample::matched(freq, table);
    assert!(!sample.is_detection());

    let scale = GaugeScale::default();
    let reading = scale.reading(&sample, table);
    assert_eq!(reading.marker, scale.center);
    assert!(reading.note.is_none());
}

#[test]
fn bin_centred_tones_resolve_to_their_bins() {
    let mut tracker = tracker();
    for bin in [4usize, 6, 9, 14, 20] {
        let sample = tracker.analyse(&sine_wave(bin_frequency(bin), 0.02, FFT_SIZE));
        assert_eq!(sample.frequency, bin_frequency(bin), "bin {}", bin);
        assert!(sample.is_detection());
    }
}

#[test]
fn detected_note_drives_the_gauge() {
    let table = NoteFrequencyTable::standard();
    let scale = GaugeScale::default();
    let mut tracker = tracker();

    // bin 20 is 430.66 Hz: nearest A4, about 37 cents flat
    let sample = tracker.analyse(&sine_wave(bin_frequency(20), 0.01, FFT_SIZE));
    let reading = scale.reading(&sample, table);
    assert_eq!(reading.note.as_deref(), Some("A4"));
    let cents = reading.cents.unwrap();
    assert!(cents < -30.0 && cents > -45.0, "cents {}", cents);
    assert!(reading.marker < scale.center);
}

#[test]
fn coarse_bins_limit_low_notes() {
    // At 21.5 Hz per bin, E2 (82.41 Hz) falls between bins 3 and 4; the
    // estimate lands on a bin, never on the note itself.
    let mut tracker = tracker();
    let sample = tracker.analyse(&sine_wave(82.41, 0.02, FFT_SIZE));
    let resolution = pitch::bin_resolution(SAMPLE_RATE, FFT_SIZE);
    let bins = sample.frequency / resolution;
    assert!((bins - bins.round()).abs() < 1e-4);
    assert!(sample.frequency > 60.0 && sample.frequency < 110.0);
}
