//! Chorus: stereo LFO-modulated delay line.

use std::f64::consts::PI;

/// Longest delay the buffer can hold, in seconds
const MAX_DELAY_SECS: f64 = 0.05;

/// A stereo chorus. Left and right LFOs run a quarter cycle apart.
#[derive(Debug, Clone)]
pub struct Chorus {
    buffer_l: Vec<f32>,
    buffer_r: Vec<f32>,
    write_pos: usize,
    sample_rate: f64,
    phase_l: f64,
    phase_r: f64,

    /// LFO rate in Hz.
    pub rate: f64,
    /// Base delay time in seconds.
    pub delay: f64,
    /// Modulation depth as a fraction of the base delay [0, 1].
    pub depth: f64,
    /// Dry/wet mix (0.0 = fully dry, 1.0 = fully wet).
    pub mix: f64,
}

impl Chorus {
    /// `delay_ms` is the base delay; the LFO swings it by `depth` of itself.
    pub fn new(sample_rate: f64, rate: f64, delay_ms: f64, depth: f64) -> Self {
        let buffer_size = (sample_rate * MAX_DELAY_SECS) as usize + 2;
        Self {
            buffer_l: vec![0.0; buffer_size],
            buffer_r: vec![0.0; buffer_size],
            write_pos: 0,
            sample_rate,
            phase_l: 0.0,
            phase_r: 0.25,
            rate: rate.clamp(0.01, 20.0),
            delay: (delay_ms / 1000.0).clamp(0.0, MAX_DELAY_SECS * 0.5),
            depth: depth.clamp(0.0, 1.0),
            mix: 0.5,
        }
    }

    /// Read with fractional delay (linear interpolation).
    #[inline]
    fn read_interpolated(buffer: &[f32], write_pos: usize, delay_samples: f64) -> f32 {
        let len = buffer.len();
        let delay_int = delay_samples as usize;
        let frac = (delay_samples - delay_int as f64) as f32;

        let read_0 = (write_pos + len - delay_int) % len;
        let read_1 = (read_0 + len - 1) % len;

        let s0 = buffer[read_0];
        let s1 = buffer[read_1];
        s0 + frac * (s1 - s0)
    }

    /// Process a stereo sample pair.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let len = self.buffer_l.len();
        self.buffer_l[self.write_pos] = left;
        self.buffer_r[self.write_pos] = right;

        let swing = self.delay * self.depth;
        let max_delay = (len - 2) as f64;
        let delay_l = ((self.delay + swing * (2.0 * PI * self.phase_l).sin()) * self.sample_rate)
            .clamp(1.0, max_delay);
        let delay_r = ((self.delay + swing * (2.0 * PI * self.phase_r).sin()) * self.sample_rate)
            .clamp(1.0, max_delay);

        let wet_l = Self::read_interpolated(&self.buffer_l, self.write_pos, delay_l);
        let wet_r = Self::read_interpolated(&self.buffer_r, self.write_pos, delay_r);

        self.write_pos = (self.write_pos + 1) % len;

        let phase_inc = self.rate / self.sample_rate;
        self.phase_l = (self.phase_l + phase_inc) % 1.0;
        self.phase_r = (self.phase_r + phase_inc) % 1.0;

        let mix = self.mix as f32;
        (
            left * (1.0 - mix) + wet_l * mix,
            right * (1.0 - mix) + wet_r * mix,
        )
    }

    /// Clear internal buffers.
    pub fn clear(&mut self) {
        self.buffer_l.fill(0.0);
        self.buffer_r.fill(0.0);
        self.write_pos = 0;
        self.phase_l = 0.0;
        self.phase_r = 0.25;
    }
}
