//! ADSR Envelope generator.

/// Envelope stages.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR Envelope with linear attack/decay/release curves.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level [0, 1].
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,

    stage: Stage,
    level: f64,
    sample_rate: f64,
    stage_samples: usize,
    stage_counter: usize,
    start_level: f64,
}

impl Envelope {
    pub fn new(sample_rate: f64) -> Self {
        Envelope {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
            stage: Stage::Idle,
            level: 0.0,
            sample_rate,
            stage_samples: 0,
            stage_counter: 0,
            start_level: 0.0,
        }
    }

    pub fn with_adsr(sample_rate: f64, attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Envelope {
            attack,
            decay,
            sustain: sustain.clamp(0.0, 1.0),
            release,
            ..Self::new(sample_rate)
        }
    }

    /// Note on; retriggers from the current level.
    pub fn gate_on(&mut self) {
        self.stage = Stage::Attack;
        self.stage_samples = self.samples(self.attack);
        self.stage_counter = 0;
        self.start_level = self.level;
    }

    /// Note off.
    pub fn gate_off(&mut self) {
        if self.stage == Stage::Idle {
            return;
        }
        self.stage = Stage::Release;
        self.stage_samples = self.samples(self.release);
        self.stage_counter = 0;
        self.start_level = self.level;
    }

    fn samples(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.sample_rate).round() as usize
    }

    /// Generate the next envelope sample [0, 1].
    pub fn next_sample(&mut self) -> f64 {
        match self.stage {
            Stage::Idle => self.level = 0.0,
            Stage::Attack => {
                let t = self.progress();
                self.level = self.start_level + (1.0 - self.start_level) * t;
                if t >= 1.0 {
                    self.enter(Stage::Decay, self.decay);
                }
            }
            Stage::Decay => {
                let t = self.progress();
                self.level = 1.0 - (1.0 - self.sustain) * t;
                if t >= 1.0 {
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => self.level = self.sustain,
            Stage::Release => {
                let t = self.progress();
                self.level = self.start_level * (1.0 - t);
                if t >= 1.0 {
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }

    /// Fraction of the current stage completed, advancing one sample.
    fn progress(&mut self) -> f64 {
        if self.stage_samples == 0 {
            return 1.0;
        }
        self.stage_counter += 1;
        (self.stage_counter as f64 / self.stage_samples as f64).min(1.0)
    }

    fn enter(&mut self, stage: Stage, seconds: f64) {
        self.stage = stage;
        self.stage_samples = self.samples(seconds);
        self.stage_counter = 0;
    }

    /// Returns true if the envelope has finished (idle after release).
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Idle
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let env = Envelope::new(44100.0);
        assert!(env.is_finished());
    }

    #[test]
    fn full_adsr_cycle() {
        // 100 Hz sample rate keeps stage lengths readable
        let mut env = Envelope::with_adsr(100.0, 1.2, 1.2, 0.6, 2.4);
        env.gate_on();

        for _ in 0..120 {
            env.next_sample();
        }
        assert!((env.level() - 1.0).abs() < 1e-9);

        for _ in 0..120 {
            env.next_sample();
        }
        assert!((env.level() - 0.6).abs() < 1e-9);

        for _ in 0..50 {
            assert!((env.next_sample() - 0.6).abs() < 1e-9);
        }

        env.gate_off();
        for _ in 0..240 {
            env.next_sample();
        }
        assert!(env.level().abs() < 1e-9);
        assert!(env.is_finished());
    }

    #[test]
    fn attack_is_monotonic() {
        let mut env = Envelope::with_adsr(1000.0, 1.2, 1.2, 0.6, 2.4);
        env.gate_on();
        let mut last = 0.0;
        for _ in 0..1200 {
            let level = env.next_sample();
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn gate_off_when_idle_is_noop() {
        let mut env = Envelope::new(44100.0);
        env.gate_off();
        assert!(env.is_finished());
        assert_eq!(env.next_sample(), 0.0);
    }
}
