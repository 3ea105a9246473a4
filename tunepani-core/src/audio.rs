//! # Audio Capture Module
//!
//! This module handles microphone capture using CPAL (Cross-Platform Audio Library).
//! It selects the default input device, mixes the signal down to mono and
//! streams fixed-size frames to the analysis pipeline.
//!
//! ## Features
//! - Automatic input device selection, preferring a 44.1 kHz f32 config
//! - Mono mixdown of multi-channel input
//! - Frame accumulation so every frame handed on is exactly one transform long

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::Sender;

/// Preferred capture sample rate in Hz.
pub const PREFERRED_SAMPLE_RATE: u32 = 44100;

/// Accumulates interleaved input into mono frames of a fixed length.
#[derive(Debug)]
pub struct FrameAccumulator {
    frame_size: usize,
    channels: usize,
    buffer: Vec<f32>,
}

impl FrameAccumulator {
    pub fn new(frame_size: usize, channels: usize) -> Self {
        Self {
            frame_size,
            channels: channels.max(1),
            buffer: Vec::with_capacity(frame_size * 2),
        }
    }

    /// Appends interleaved samples and hands every completed frame to `emit`.
    pub fn push(&mut self, data: &[f32], mut emit: impl FnMut(Vec<f32>)) {
        if self.channels == 1 {
            self.buffer.extend_from_slice(data);
        } else {
            self.buffer.extend(
                data.chunks_exact(self.channels)
                    .map(|c| c.iter().sum::<f32>() / self.channels as f32),
            );
        }

        // While we have enough data for a full frame, process it.
        while self.buffer.len() >= self.frame_size {
            let frame: Vec<f32> = self.buffer.drain(..self.frame_size).collect();
            emit(frame);
        }
    }
}

/// Starts audio capture from the default input device.
///
/// Frames of `frame_size` mono samples are pushed to `sender`; frames are
/// dropped when the channel is full.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Audio stream handle and sample rate
/// * `Err(e)` - No device, no usable config, or the stream would not start
pub fn start_audio_capture(sender: Sender<Vec<f32>>, frame_size: usize) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host.default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    log::info!("[AUDIO] Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()
        .context("failed to query input configs")?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, PREFERRED_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let sample_rate = clamp_rate(&supported_config, PREFERRED_SAMPLE_RATE);
    let config = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    log::info!("[AUDIO] Selected sample rate: {} Hz, {} channel(s)", sample_rate, channels);

    let err_fn = |err| log::error!("[AUDIO] An error occurred on the input stream: {}", err);

    let mut accumulator = FrameAccumulator::new(frame_size, channels);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            accumulator.push(data, |frame| {
                // Send the frame, ignoring errors if the channel is full.
                let _ = sender.try_send(frame);
            });
        },
        err_fn,
        None,
    ).context("failed to build input stream")?;

    stream.play().context("failed to start input stream")?;

    Ok((stream, sample_rate))
}

/// Picks the rate inside the config's range closest to `target`.
fn clamp_rate(config: &SupportedStreamConfigRange, target: u32) -> u32 {
    target.clamp(config.min_sample_rate().0, config.max_sample_rate().0)
}

/// Finds the best supported f32 input configuration for the target sample rate.
///
/// Mono configs are preferred over multi-channel ones; among equals the range
/// closest to `target_rate` wins.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
            let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
            let in_range = c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0;
            let rate_penalty = if in_range { 0 } else { min_diff.min(max_diff) };
            (c.channels() != 1, rate_penalty)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_emits_whole_frames() {
        let mut acc = FrameAccumulator::new(4, 1);
        let mut frames = Vec::new();
        acc.push(&[1.0, 2.0, 3.0], |f| frames.push(f));
        assert!(frames.is_empty());
        acc.push(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0], |f| frames.push(f));
        assert_eq!(frames, vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]);
    }

    #[test]
    fn test_accumulator_mixes_down_to_mono() {
        let mut acc = FrameAccumulator::new(2, 2);
        let mut frames = Vec::new();
        acc.push(&[1.0, 3.0, -1.0, 1.0], |f| frames.push(f));
        assert_eq!(frames, vec![vec![2.0, 0.0]]);
    }
}
