//! Ambient soundtrack and voice-over.

pub mod chords;
pub mod controller;
pub mod dsp;
pub mod output;
pub mod speech;
pub mod synth;
pub mod transport;

pub use chords::{ChordLoop, CHORDS};
pub use controller::{AudioController, AudioSettings, AudioState, OutputFactory, VoiceSettings};
pub use output::{render_offline, write_wav, AudioOutput, CpalOutput, NullOutput};
pub use speech::{CommandSpeech, NoSpeech, SpeechSynthesizer, Utterance, VOICE_SCRIPT};
pub use synth::{AmbientEngine, PolySynth, SynthParams};
pub use transport::Transport;
