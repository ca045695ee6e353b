//! DSP building blocks for the ambient pad.
//!
//! Everything runs per sample on the audio thread; the same code renders
//! offline for WAV export.

pub mod chorus;
pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod oscillator;
pub mod reverb;
pub mod voice;

pub use chorus::Chorus;
pub use envelope::Envelope;
pub use filter::{BiquadFilter, FilterType};
pub use mixer::soft_clip;
pub use oscillator::{Oscillator, Waveform};
pub use reverb::Reverb;
pub use voice::Voice;
