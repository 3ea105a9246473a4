//! # Reference Tone Synth
//!
//! A `cpal` output stream playing a small pool of sine voices. The stream
//! lives on its own thread; the rest of the program talks to it through a
//! bounded command channel, so nothing in the audio callback blocks or
//! allocates.

use std::thread::{self, JoinHandle};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::error::{Result, TuneError};
use crate::tone::ToneBackend;

const MAX_VOICES: usize = 32; // hard cap so we never allocate in the audio callback
const COMMAND_QUEUE: usize = 256;

/// Handle for one voice in the synth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthCommand {
    Start { voice: VoiceId, frequency: f32, gain: f32 },
    SetFrequency { voice: VoiceId, frequency: f32 },
    SetGain { voice: VoiceId, gain: f32 },
    Stop { voice: VoiceId },
}

#[derive(Clone, Copy, Debug)]
struct SineVoice {
    id: VoiceId,
    phase: f32,
    phase_inc: f32, // radians per sample
    gain: f32,
}

/// Sums the running sine voices into output frames.
#[derive(Debug)]
pub struct SineEngine {
    sample_rate: f32,
    voices: Vec<SineVoice>,
}

impl SineEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            voices: Vec::with_capacity(MAX_VOICES),
        }
    }

    pub fn handle_cmd(&mut self, cmd: SynthCommand) {
        match cmd {
            SynthCommand::Start { voice, frequency, gain } => {
                if self.voices.len() < MAX_VOICES {
                    self.voices.push(SineVoice {
                        id: voice,
                        phase: 0.0,
                        phase_inc: self.phase_inc(frequency),
                        gain,
                    });
                }
            }
            SynthCommand::SetFrequency { voice, frequency } => {
                let phase_inc = self.phase_inc(frequency);
                if let Some(v) = self.voice_mut(voice) {
                    v.phase_inc = phase_inc;
                }
            }
            SynthCommand::SetGain { voice, gain } => {
                if let Some(v) = self.voice_mut(voice) {
                    v.gain = gain;
                }
            }
            SynthCommand::Stop { voice } => {
                self.voices.retain(|v| v.id != voice);
            }
        }
    }

    fn phase_inc(&self, frequency: f32) -> f32 {
        (std::f32::consts::TAU * frequency) / self.sample_rate
    }

    fn voice_mut(&mut self, id: VoiceId) -> Option<&mut SineVoice> {
        self.voices.iter_mut().find(|v| v.id == id)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn next_sample(&mut self) -> f32 {
        let mut out = 0.0f32;
        for v in &mut self.voices {
            out += v.gain * v.phase.sin();
            v.phase += v.phase_inc;
            if v.phase > std::f32::consts::TAU {
                v.phase -= std::f32::consts::TAU;
            }
        }
        out.clamp(-1.0, 1.0)
    }

    /// Fills an interleaved buffer, writing the same sample to every channel
    /// in the device's sample format.
    pub fn render<T: Sample + FromSample<f32>>(&mut self, data: &mut [T], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = T::from_sample(self.next_sample());
            for out in frame.iter_mut() {
                *out = sample;
            }
        }
    }
}

/// Tone backend driving a `cpal` output stream.
pub struct SynthBackend {
    tx: Option<Sender<SynthCommand>>,
    shutdown_tx: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
    next_voice: u64,
}

impl std::fmt::Debug for SynthBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthBackend")
            .field("connected", &self.tx.is_some())
            .field("next_voice", &self.next_voice)
            .finish()
    }
}

impl SynthBackend {
    /// Opens the default output device on a dedicated audio thread.
    ///
    /// Blocks until the stream is playing or has failed to start.
    pub fn start() -> Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<SynthCommand>(COMMAND_QUEUE);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<std::result::Result<u32, String>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let thread_handle = thread::spawn(move || {
            let (stream, sample_rate) = match build_output_stream(rx) {
                Ok(pair) => pair,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("{e:#}")));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(sample_rate));

            // Park until the backend is dropped.
            let _ = shutdown_rx.recv();

            if let Err(e) = stream.pause() {
                log::warn!("[SYNTH] Error pausing output stream: {}", e);
            }
            drop(stream);
            log::debug!("[SYNTH] Output thread finished");
        });

        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => {
                log::info!("[SYNTH] Output stream running at {} Hz", sample_rate);
                Ok(Self {
                    tx: Some(tx),
                    shutdown_tx: Some(shutdown_tx),
                    thread_handle: Some(thread_handle),
                    next_voice: 0,
                })
            }
            Ok(Err(message)) => {
                let _ = thread_handle.join();
                Err(TuneError::DeviceUnavailable(message))
            }
            Err(_) => {
                let _ = thread_handle.join();
                Err(TuneError::DeviceUnavailable("audio output thread exited".into()))
            }
        }
    }

    /// A backend with no device behind it. Every start fails, which leaves all
    /// pads silent.
    pub fn disconnected() -> Self {
        Self {
            tx: None,
            shutdown_tx: None,
            thread_handle: None,
            next_voice: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.tx.is_some()
    }

    fn send(&self, cmd: SynthCommand) -> std::result::Result<(), String> {
        let tx = self.tx.as_ref().ok_or_else(|| "no output stream".to_string())?;
        tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => "synth command queue full".to_string(),
            TrySendError::Disconnected(_) => "output stream closed".to_string(),
        })
    }
}

impl ToneBackend for SynthBackend {
    type Voice = VoiceId;

    fn start_voice(&mut self, frequency: f32, gain: f32) -> Result<VoiceId> {
        let voice = VoiceId(self.next_voice);
        self.send(SynthCommand::Start { voice, frequency, gain })
            .map_err(TuneError::DeviceUnavailable)?;
        self.next_voice += 1;
        Ok(voice)
    }

    fn set_frequency(&mut self, voice: &VoiceId, frequency: f32) -> Result<()> {
        self.send(SynthCommand::SetFrequency { voice: *voice, frequency })
            .map_err(TuneError::DeviceUnavailable)
    }

    fn set_gain(&mut self, voice: &VoiceId, gain: f32) -> Result<()> {
        self.send(SynthCommand::SetGain { voice: *voice, gain })
            .map_err(TuneError::DeviceUnavailable)
    }

    fn stop_voice(&mut self, voice: VoiceId) -> Result<()> {
        self.send(SynthCommand::Stop { voice })
            .map_err(TuneError::StopFailure)
    }
}

impl Drop for SynthBackend {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn build_output_stream(rx: Receiver<SynthCommand>) -> anyhow::Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_format = config.sample_format();
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    log::info!(
        "[SYNTH] Using audio output device: {} ({:?}, {} channel(s))",
        device.name()?,
        sample_format,
        channels
    );

    let engine = SineEngine::new(sample_rate);
    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, engine, rx, channels)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, engine, rx, channels)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, engine, rx, channels)?,
        other => anyhow::bail!("unsupported output sample format: {other:?}"),
    };

    stream.play().context("failed to play output stream")?;

    Ok((stream, sample_rate))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut engine: SineEngine,
    rx: Receiver<SynthCommand>,
    channels: usize,
) -> anyhow::Result<cpal::Stream>
where
    T: cpal::SizedSample + FromSample<f32> + Send + 'static,
{
    let err_fn = |err| log::error!("[SYNTH] An error occurred on the output stream: {}", err);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                while let Ok(cmd) = rx.try_recv() {
                    engine.handle_cmd(cmd);
                }
                engine.render(data, channels);
            },
            err_fn,
            None,
        )
        .context("failed to build output stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(engine: &mut SineEngine, frames: usize) -> f32 {
        let mut buf = vec![0.0f32; frames * 2];
        engine.render(&mut buf, 2);
        buf.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn test_engine_start_and_stop() {
        let mut engine = SineEngine::new(44100);
        assert_eq!(peak(&mut engine, 512), 0.0);

        engine.handle_cmd(SynthCommand::Start { voice: VoiceId(1), frequency: 440.0, gain: 0.3 });
        let p = peak(&mut engine, 512);
        assert!(p > 0.25 && p <= 0.3, "peak {}", p);

        engine.handle_cmd(SynthCommand::Stop { voice: VoiceId(1) });
        assert_eq!(engine.voice_count(), 0);
        assert_eq!(peak(&mut engine, 512), 0.0);
    }

    #[test]
    fn test_engine_gain_and_frequency_changes() {
        let mut engine = SineEngine::new(44100);
        engine.handle_cmd(SynthCommand::Start { voice: VoiceId(3), frequency: 103.83, gain: 0.5 });
        engine.handle_cmd(SynthCommand::SetGain { voice: VoiceId(3), gain: 0.0 });
        assert_eq!(peak(&mut engine, 256), 0.0);

        engine.handle_cmd(SynthCommand::SetFrequency { voice: VoiceId(3), frequency: 130.81 });
        let expected = std::f32::consts::TAU * 130.81 / 44100.0;
        assert!((engine.voices[0].phase_inc - expected).abs() < 1e-9);

        // Unknown voices are ignored.
        engine.handle_cmd(SynthCommand::SetGain { voice: VoiceId(99), gain: 1.0 });
        engine.handle_cmd(SynthCommand::Stop { voice: VoiceId(99) });
        assert_eq!(engine.voice_count(), 1);
    }

    #[test]
    fn test_engine_output_is_clamped() {
        let mut engine = SineEngine::new(44100);
        for i in 0..10 {
            engine.handle_cmd(SynthCommand::Start { voice: VoiceId(i), frequency: 220.0, gain: 0.5 });
        }
        assert!(peak(&mut engine, 1024) <= 1.0);
    }

    #[test]
    fn test_engine_renders_integer_formats() {
        let mut engine = SineEngine::new(44100);
        engine.handle_cmd(SynthCommand::Start { voice: VoiceId(1), frequency: 440.0, gain: 0.5 });

        let mut pcm = vec![0i16; 512 * 2];
        engine.render(&mut pcm, 2);
        let loudest = pcm.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(loudest > 15000 && loudest <= 16384, "loudest {}", loudest);
        assert!(pcm.chunks(2).all(|f| f[0] == f[1]));

        engine.handle_cmd(SynthCommand::Stop { voice: VoiceId(1) });
        let mut unsigned = vec![0u16; 64];
        engine.render(&mut unsigned, 1);
        assert!(unsigned.iter().all(|&s| s == 32768));
    }

    #[test]
    fn test_disconnected_backend_refuses_voices() {
        let mut backend = SynthBackend::disconnected();
        assert!(!backend.is_connected());
        assert!(matches!(
            backend.start_voice(440.0, 0.3),
            Err(TuneError::DeviceUnavailable(_))
        ));
        assert!(matches!(
            backend.stop_voice(VoiceId(0)),
            Err(TuneError::StopFailure(_))
        ));
    }
}
