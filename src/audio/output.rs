//! Audio sinks: the default cpal output device, a null sink, and WAV files.

use std::io::{Seek, Write};
use std::path::Path;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, SupportedStreamConfig};

use super::dsp::mixer::to_i16;
use super::synth::AmbientEngine;
use super::transport::Transport;
use crate::error::{CinematicError, Result};

/// Frames rendered per block when no device drives the engine
const OFFLINE_BLOCK_FRAMES: usize = 512;

/// Somewhere the ambient engine's samples end up
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u16;

    /// Hand the engine to the sink and begin pulling samples from it.
    fn start(&mut self, engine: AmbientEngine) -> Result<()>;

    /// Stop pulling samples. Errors are not reported.
    fn stop(&mut self);
}

/// The host's default output device
///
/// The stream is not `Send` on every platform, so this must be created and
/// dropped on the thread that owns it.
pub struct CpalOutput {
    device: cpal::Device,
    config: SupportedStreamConfig,
    stream: Option<Stream>,
}

impl CpalOutput {
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| CinematicError::Audio("no output device available".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| CinematicError::Audio(format!("failed to get output config: {e}")))?;

        log::info!(
            "audio output: {} @ {} Hz, {} ch, {:?}",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    fn build_stream(&self, mut engine: AmbientEngine) -> Result<Stream> {
        let stream_config: cpal::StreamConfig = self.config.config();
        let channels = stream_config.channels as usize;
        let on_error = |e: cpal::StreamError| log::debug!("output stream error: {e}");

        let stream = match self.config.sample_format() {
            SampleFormat::F32 => self.device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _| engine.render(data, channels),
                on_error,
                None,
            ),
            SampleFormat::I16 => {
                let mut scratch = Vec::new();
                self.device.build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _| {
                        scratch.resize(data.len(), 0.0);
                        engine.render(&mut scratch, channels);
                        for (out, s) in data.iter_mut().zip(&scratch) {
                            *out = to_i16(*s);
                        }
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::U16 => {
                let mut scratch = Vec::new();
                self.device.build_output_stream(
                    &stream_config,
                    move |data: &mut [u16], _| {
                        scratch.resize(data.len(), 0.0);
                        engine.render(&mut scratch, channels);
                        for (out, s) in data.iter_mut().zip(&scratch) {
                            *out = ((s.clamp(-1.0, 1.0) * 0.5 + 0.5) * u16::MAX as f32) as u16;
                        }
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(CinematicError::Audio(format!(
                    "unsupported output sample format: {other:?}"
                )))
            }
        };

        stream.map_err(|e| CinematicError::Audio(format!("failed to build output stream: {e}")))
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    fn channels(&self) -> u16 {
        self.config.channels()
    }

    fn start(&mut self, engine: AmbientEngine) -> Result<()> {
        let stream = self.build_stream(engine)?;
        stream
            .play()
            .map_err(|e| CinematicError::Audio(format!("failed to start playback: {e}")))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
        }
    }
}

/// Sink that holds the engine and renders only when asked
pub struct NullOutput {
    sample_rate: u32,
    channels: u16,
    engine: Option<AmbientEngine>,
}

impl NullOutput {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            engine: None,
        }
    }

    /// Render `frames` interleaved frames, or silence before `start`.
    pub fn pull(&mut self, frames: usize) -> Vec<f32> {
        let mut buf = vec![0.0; frames * self.channels as usize];
        if let Some(engine) = &mut self.engine {
            engine.render(&mut buf, self.channels as usize);
        }
        buf
    }

    pub fn is_started(&self) -> bool {
        self.engine.is_some()
    }
}

impl AudioOutput for NullOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn start(&mut self, engine: AmbientEngine) -> Result<()> {
        self.engine = Some(engine);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.dispose();
        }
    }
}

/// Render `duration_secs` of the pad without a device
pub fn render_offline(sample_rate: u32, channels: u16, master_gain: f32, duration_secs: f64) -> Vec<f32> {
    let transport = Transport::default();
    transport.start();
    let mut engine = AmbientEngine::new(sample_rate as f64, transport, master_gain);

    let channels = channels.max(1) as usize;
    let total_frames = (duration_secs.max(0.0) * sample_rate as f64).round() as usize;
    let mut samples = vec![0.0; total_frames * channels];
    for block in samples.chunks_mut(OFFLINE_BLOCK_FRAMES * channels) {
        engine.render(block, channels);
    }
    samples
}

fn wav_spec(sample_rate: u32, channels: u16) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode interleaved samples as 16-bit PCM WAV into any seekable writer.
pub fn encode_wav<W: Write + Seek>(writer: W, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let to_err = |e: hound::Error| CinematicError::Export(format!("wav: {e}"));
    let mut wav = hound::WavWriter::new(writer, wav_spec(sample_rate, channels)).map_err(to_err)?;
    for &s in samples {
        wav.write_sample(to_i16(s)).map_err(to_err)?;
    }
    wav.finalize().map_err(to_err)
}

pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    encode_wav(file, samples, sample_rate, channels)?;
    log::info!("wrote {} ({} samples)", path.display(), samples.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn wav_header_valid() {
        let mut cursor = Cursor::new(Vec::new());
        encode_wav(&mut cursor, &[0.0, 0.5, -0.5, 1.0], 44100, 2).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 4 * 2);
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 2);
        assert_eq!(u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]), 44100);
    }

    #[test]
    fn offline_render_has_requested_length() {
        let samples = render_offline(8000, 2, 0.8, 1.5);
        assert_eq!(samples.len(), 8000 * 3);
        assert!(samples.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn null_output_is_silent_until_started() {
        let mut out = NullOutput::new(8000, 2);
        assert!(out.pull(64).iter().all(|&s| s == 0.0));

        let transport = Transport::default();
        transport.start();
        let transport_handle = transport.clone();
        out.start(AmbientEngine::new(8000.0, transport, 1.0)).unwrap();
        assert!(out.is_started());
        assert!(out.pull(4000).iter().any(|&s| s != 0.0));

        out.stop();
        assert!(!out.is_started());
        // Stopping disposes the loop along with the engine
        assert!(!transport_handle.is_playing());
    }
}
