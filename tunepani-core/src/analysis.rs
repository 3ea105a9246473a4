//! # Microphone Analysis Module
//!
//! Runs the pitch tracker on live microphone input.
//!
//! ## Architecture
//! - **Capture**: `cpal` input callback accumulating mono frames (see `audio`)
//! - **Worker thread**: owns the input stream, turns each frame into a `PitchSample`
//! - **Communication**: crossbeam channels for frames, samples and shutdown
//!
//! The session has a single owner. Dropping it, or calling `stop`, ends the
//! worker and releases the microphone.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::thread::{self, JoinHandle};

use crate::audio;
use crate::error::Result;
use crate::fft::SpectrumAnalyser;
use crate::notes::NoteFrequencyTable;
use crate::pitch;
use crate::settings::Settings;
use crate::PitchSample;

/// Queued pitch samples before new ones are dropped.
const SAMPLE_QUEUE: usize = 64;
/// Queued raw frames before the capture callback drops new ones.
const FRAME_QUEUE: usize = 16;

/// One frame in, one pitch sample out.
#[derive(Debug)]
pub struct PitchTracker {
    analyser: SpectrumAnalyser,
    sample_rate: u32,
    table: NoteFrequencyTable,
}

impl PitchTracker {
    pub fn new(analyser: SpectrumAnalyser, sample_rate: u32, table: NoteFrequencyTable) -> Self {
        Self { analyser, sample_rate, table }
    }

    /// Builds a tracker from the analyser settings.
    pub fn from_settings(settings: &Settings, sample_rate: u32, table: NoteFrequencyTable) -> Result<Self> {
        let analyser = SpectrumAnalyser::with_range(
            settings.fft_size,
            settings.min_decibels,
            settings.max_decibels,
        )?;
        Ok(Self::new(analyser, sample_rate, table))
    }

    pub fn fft_size(&self) -> usize {
        self.analyser.fft_size()
    }

    /// Performs the full analysis of one frame:
    /// 1. Byte magnitudes per bin from the spectrum analyser
    /// 2. Peak-bin frequency estimate
    /// 3. Nearest note in the table
    pub fn analyse(&mut self, frame: &[f32]) -> PitchSample {
        let magnitudes = self.analyser.byte_frequency_data(frame);
        let frequency = pitch::estimate_frequency(&magnitudes, self.sample_rate, self.analyser.fft_size());
        PitchSample::matched(frequency, &self.table)
    }
}

/// Feeds frames through the tracker until shutdown or until either channel
/// closes.
///
/// When several frames are queued only the newest is analysed; older ones are
/// dropped rather than processed late. Samples are dropped when `out` is full.
pub fn run_analysis_loop(
    frames: &Receiver<Vec<f32>>,
    shutdown: &Receiver<()>,
    tracker: &mut PitchTracker,
    out: &Sender<PitchSample>,
) {
    loop {
        crossbeam_channel::select! {
            recv(frames) -> msg => match msg {
                Ok(mut frame) => {
                    let mut skipped = 0usize;
                    while let Ok(newer) = frames.try_recv() {
                        frame = newer;
                        skipped += 1;
                    }
                    if skipped > 0 {
                        log::trace!("[ANALYSIS] Skipped {} stale frames", skipped);
                    }

                    let sample = tracker.analyse(&frame);
                    match out.try_send(sample) {
                        Ok(()) | Err(TrySendError::Full(_)) => {}
                        Err(TrySendError::Disconnected(_)) => {
                            log::debug!("[ANALYSIS] Sample receiver dropped");
                            break;
                        }
                    }
                }
                Err(_) => {
                    log::debug!("[ANALYSIS] Audio channel closed");
                    break;
                }
            },
            recv(shutdown) -> _ => {
                log::debug!("[ANALYSIS] Received shutdown signal");
                break;
            },
        }
    }
}

/// Owner of the microphone analysis worker.
#[derive(Debug)]
pub struct AnalysisSession {
    shutdown_tx: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AnalysisSession {
    /// Starts the worker thread and returns the session together with the
    /// receiving end of its pitch samples.
    ///
    /// Microphone acquisition happens on the worker. If it fails the error is
    /// logged, the worker exits, and the receiver never yields a sample.
    pub fn start(settings: &Settings, table: NoteFrequencyTable) -> (Self, Receiver<PitchSample>) {
        let (sample_tx, sample_rx) = crossbeam_channel::bounded(SAMPLE_QUEUE);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let settings = settings.clone();

        let thread_handle = thread::spawn(move || {
            log::info!("[ANALYSIS] Starting microphone analysis...");
            let (raw_tx, raw_rx) = crossbeam_channel::bounded::<Vec<f32>>(FRAME_QUEUE);

            let (stream, sample_rate) = match audio::start_audio_capture(raw_tx, settings.fft_size) {
                Ok(pair) => pair,
                Err(e) => {
                    log::error!("[ANALYSIS] Microphone unavailable: {:#}", e);
                    return;
                }
            };

            let mut tracker = match PitchTracker::from_settings(&settings, sample_rate, table) {
                Ok(tracker) => tracker,
                Err(e) => {
                    log::error!("[ANALYSIS] Could not build pitch tracker: {}", e);
                    return;
                }
            };

            log::info!("[ANALYSIS] Entering analysis loop ({} point FFT)", tracker.fft_size());
            run_analysis_loop(&raw_rx, &shutdown_rx, &mut tracker, &sample_tx);

            use cpal::traits::StreamTrait;
            if let Err(e) = stream.pause() {
                log::warn!("[ANALYSIS] Error pausing input stream: {}", e);
            }
            drop(stream);
            log::info!("[ANALYSIS] Microphone released");
        });

        (
            Self {
                shutdown_tx: Some(shutdown_tx),
                thread_handle: Some(thread_handle),
            },
            sample_rx,
        )
    }

    /// Stops the worker and waits for it to release the microphone.
    /// Stopping twice is a no-op.
    pub fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("[ANALYSIS] Analysis thread panicked");
            }
        }
    }

}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.stop();
    }
}
