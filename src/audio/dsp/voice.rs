//! Voice: one note, an oscillator shaped by an envelope.

use super::envelope::Envelope;
use super::oscillator::{Oscillator, Waveform};

/// A single voice with a fixed gate length.
#[derive(Debug, Clone)]
pub struct Voice {
    pub oscillator: Oscillator,
    pub envelope: Envelope,
    /// Velocity gain [0, 1].
    pub velocity: f64,
    /// Samples left before the gate closes.
    gate_remaining: usize,
    finished: bool,
}

impl Voice {
    pub fn new(waveform: Waveform, envelope: Envelope, sample_rate: f64) -> Self {
        Voice {
            oscillator: Oscillator::new(waveform, sample_rate),
            envelope,
            velocity: 1.0,
            gate_remaining: 0,
            finished: true,
        }
    }

    /// Start a note that releases after `gate_samples`.
    pub fn note_on(&mut self, frequency: f64, velocity: f64, gate_samples: usize) {
        self.oscillator.frequency = frequency;
        self.oscillator.reset();
        self.velocity = velocity;
        self.gate_remaining = gate_samples;
        self.finished = false;
        self.envelope.gate_on();
    }

    /// Release the note now.
    pub fn note_off(&mut self) {
        self.gate_remaining = 0;
        self.envelope.gate_off();
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        if self.finished {
            return 0.0;
        }

        if self.gate_remaining > 0 {
            self.gate_remaining -= 1;
            if self.gate_remaining == 0 {
                self.envelope.gate_off();
            }
        }

        let osc = self.oscillator.next_sample();
        let env = self.envelope.next_sample();
        if self.envelope.is_finished() {
            self.finished = true;
        }

        osc * env * self.velocity
    }

    /// Is this voice done (envelope finished)?
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
