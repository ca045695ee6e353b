//! Band-limited oscillators.

use std::f64::consts::PI;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

/// Phase-accumulating oscillator. Sawtooth uses PolyBLEP at the wrap.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    pub frequency: f64,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency: 440.0,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Generate the next sample in [-1, 1].
    pub fn next_sample(&mut self) -> f64 {
        let inc = self.frequency / self.sample_rate;
        let sample = match self.waveform {
            Waveform::Sine => (2.0 * PI * self.phase).sin(),
            Waveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
            Waveform::Sawtooth => 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc),
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }

    /// Reset oscillator phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// PolyBLEP correction around the discontinuity at phase 0.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_starts_at_zero_and_peaks_at_quarter() {
        let mut osc = Oscillator::new(Waveform::Sine, 400.0);
        osc.frequency = 100.0; // four samples per cycle
        let samples: Vec<f64> = (0..4).map(|_| osc.next_sample()).collect();
        assert!(samples[0].abs() < 1e-9);
        assert!((samples[1] - 1.0).abs() < 1e-9);
        assert!((samples[3] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn output_stays_in_range() {
        for waveform in [Waveform::Sine, Waveform::Triangle, Waveform::Sawtooth] {
            let mut osc = Oscillator::new(waveform, 44100.0);
            osc.frequency = 261.63;
            for _ in 0..44100 {
                let s = osc.next_sample();
                assert!(s.abs() <= 1.0 + 1e-9, "{:?} out of range: {}", waveform, s);
            }
        }
    }
}
