//! The ambient pad: polyphonic sine synth, effects chain and chord loop
//! rendered into interleaved output buffers.

use super::chords::ChordLoop;
use super::dsp::{soft_clip, BiquadFilter, Chorus, Envelope, FilterType, Reverb, Voice, Waveform};
use super::transport::Transport;

/// Voices beyond this steal the oldest one
pub const MAX_POLYPHONY: usize = 32;

pub const CHORUS_RATE_HZ: f64 = 1.6;
pub const CHORUS_DELAY_MS: f64 = 2.5;
pub const CHORUS_DEPTH: f64 = 0.3;
pub const LOWPASS_HZ: f64 = 1200.0;
pub const REVERB_DECAY_SECS: f64 = 2.6;
pub const REVERB_MIX: f64 = 0.5;

/// Envelope shape for every synth voice, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub waveform: Waveform,
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            attack: 1.2,
            decay: 1.2,
            sustain: 0.6,
            release: 2.4,
        }
    }
}

/// Polyphonic synth allocating one `Voice` per note
#[derive(Debug, Clone)]
pub struct PolySynth {
    params: SynthParams,
    sample_rate: f64,
    voices: Vec<Voice>,
}

impl PolySynth {
    pub fn new(params: SynthParams, sample_rate: f64) -> Self {
        Self {
            params,
            sample_rate,
            voices: Vec::with_capacity(MAX_POLYPHONY),
        }
    }

    /// Start a note that releases by itself after `duration_samples`.
    pub fn trigger_attack_release(&mut self, frequency: f64, duration_samples: usize, velocity: f64) {
        self.voices.retain(|v| !v.is_finished());
        if self.voices.len() >= MAX_POLYPHONY {
            self.voices.remove(0);
        }

        let p = self.params;
        let envelope = Envelope::with_adsr(self.sample_rate, p.attack, p.decay, p.sustain, p.release);
        let mut voice = Voice::new(p.waveform, envelope, self.sample_rate);
        voice.note_on(frequency, velocity, duration_samples);
        self.voices.push(voice);
    }

    /// Release every sounding note.
    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            voice.note_off();
        }
    }

    pub fn next_sample(&mut self) -> f64 {
        self.voices.iter_mut().map(Voice::next_sample).sum()
    }

    /// Voices still producing sound.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_finished()).count()
    }
}

/// synth -> chorus -> lowpass -> reverb
#[derive(Debug, Clone)]
pub struct EffectChain {
    chorus: Chorus,
    lowpass_l: BiquadFilter,
    lowpass_r: BiquadFilter,
    reverb: Reverb,
}

impl EffectChain {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            chorus: Chorus::new(sample_rate, CHORUS_RATE_HZ, CHORUS_DELAY_MS, CHORUS_DEPTH),
            lowpass_l: BiquadFilter::new(FilterType::Lowpass, LOWPASS_HZ, sample_rate),
            lowpass_r: BiquadFilter::new(FilterType::Lowpass, LOWPASS_HZ, sample_rate),
            reverb: Reverb::with_decay(sample_rate, REVERB_DECAY_SECS, REVERB_MIX),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> (f32, f32) {
        let (l, r) = self.chorus.process(input, input);
        let l = self.lowpass_l.process(l as f64) as f32;
        let r = self.lowpass_r.process(r as f64) as f32;
        self.reverb.process(l, r)
    }

    pub fn clear(&mut self) {
        self.chorus.clear();
        self.lowpass_l.reset();
        self.lowpass_r.reset();
        self.reverb.clear();
    }
}

/// Everything the audio callback needs, owned by the audio thread
pub struct AmbientEngine {
    sample_rate: f64,
    synth: PolySynth,
    effects: EffectChain,
    chord_loop: ChordLoop,
    transport: Transport,
    master_gain: f32,
}

impl AmbientEngine {
    pub fn new(sample_rate: f64, transport: Transport, master_gain: f32) -> Self {
        Self {
            sample_rate,
            synth: PolySynth::new(SynthParams::default(), sample_rate),
            effects: EffectChain::new(sample_rate),
            chord_loop: ChordLoop::new(sample_rate),
            transport,
            master_gain,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fill an interleaved buffer with `channels` channels per frame.
    /// Silent while the transport is stopped.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        if self.transport.is_disposed() && !self.is_disposed() {
            self.dispose();
        }
        if !self.transport.is_playing() {
            out.fill(0.0);
            return;
        }

        let frames = out.len() / channels;
        let position = self.transport.advance(frames as u64);
        let mut events = self.chord_loop.events(position, frames).into_iter().peekable();

        for (i, frame) in out.chunks_mut(channels).enumerate() {
            while let Some(event) = events.next_if(|e| e.offset <= i) {
                log::trace!("chord at frame {}", position + event.offset as u64);
                for &frequency in &event.frequencies {
                    self.synth
                        .trigger_attack_release(frequency, event.duration_samples, event.velocity);
                }
            }

            let dry = self.synth.next_sample() as f32;
            let (l, r) = self.effects.process(dry);
            let l = soft_clip(l * self.master_gain);
            let r = soft_clip(r * self.master_gain);

            match frame {
                [mono] => *mono = 0.5 * (l + r),
                [left, right, rest @ ..] => {
                    *left = l;
                    *right = r;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }

    /// Stop the loop, release the synth and flush the effect tails.
    /// Runs on its own once the transport is disposed.
    pub fn dispose(&mut self) {
        self.transport.stop();
        self.chord_loop.dispose();
        self.synth.release_all();
        self.effects.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.chord_loop.is_disposed()
    }

    pub fn active_voices(&self) -> usize {
        self.synth.active_voices()
    }

    pub fn chords_triggered(&self) -> usize {
        self.chord_loop.triggered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 8000.0;

    #[test]
    fn stopped_transport_renders_silence() {
        let mut engine = AmbientEngine::new(SR, Transport::default(), 1.0);
        let mut buf = vec![1.0f32; 256];
        engine.render(&mut buf, 2);
        assert!(buf.iter().all(|&s| s == 0.0));
        assert_eq!(engine.transport().position(), 0);
    }

    #[test]
    fn playing_engine_triggers_first_chord() {
        let transport = Transport::default();
        transport.start();
        let mut engine = AmbientEngine::new(SR, transport.clone(), 1.0);
        let mut buf = vec![0.0f32; 2 * 4000];
        engine.render(&mut buf, 2);
        assert_eq!(engine.chords_triggered(), 1);
        assert_eq!(engine.active_voices(), 4);
        assert_eq!(transport.position(), 4000);
        assert!(buf.iter().any(|&s| s.abs() > 1e-4));
        assert!(buf.iter().all(|&s| s.abs() < 1.0));
    }

    #[test]
    fn mono_output_is_supported() {
        let transport = Transport::default();
        transport.start();
        let mut engine = AmbientEngine::new(SR, transport, 1.0);
        let mut buf = vec![0.0f32; 4000];
        engine.render(&mut buf, 1);
        assert!(buf.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn poly_synth_caps_voices() {
        let mut synth = PolySynth::new(SynthParams::default(), SR);
        for i in 0..(MAX_POLYPHONY + 5) {
            synth.trigger_attack_release(220.0 + i as f64, 8000, 0.2);
        }
        assert_eq!(synth.active_voices(), MAX_POLYPHONY);
    }

    #[test]
    fn disposed_transport_disposes_engine() {
        let transport = Transport::default();
        transport.start();
        let mut engine = AmbientEngine::new(SR, transport.clone(), 1.0);
        let mut buf = vec![0.0f32; 2 * 4000];
        engine.render(&mut buf, 2);
        assert!(!engine.is_disposed());

        transport.dispose();
        engine.render(&mut buf, 2);
        assert!(engine.is_disposed());
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn dispose_stops_new_chords() {
        let transport = Transport::default();
        transport.start();
        let mut engine = AmbientEngine::new(SR, transport.clone(), 1.0);
        engine.dispose();
        transport.start();
        let mut buf = vec![0.0f32; 2 * 16_000];
        engine.render(&mut buf, 2);
        assert_eq!(engine.chords_triggered(), 0);
    }
}
