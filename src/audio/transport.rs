//! Shared transport clock.
//!
//! The audio thread advances the position; the UI thread only flips flags.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

pub const DEFAULT_BPM: f32 = 84.0;

#[derive(Debug)]
struct TransportState {
    playing: AtomicBool,
    disposed: AtomicBool,
    bpm_bits: AtomicU32,
    position: AtomicU64,
}

/// Cloneable handle to the playback transport
#[derive(Debug, Clone)]
pub struct Transport {
    state: Arc<TransportState>,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl Transport {
    pub fn new(bpm: f32) -> Self {
        Self {
            state: Arc::new(TransportState {
                playing: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
                bpm_bits: AtomicU32::new(bpm.to_bits()),
                position: AtomicU64::new(0),
            }),
        }
    }

    pub fn start(&self) {
        if !self.is_disposed() {
            self.state.playing.store(true, Ordering::Release);
        }
    }

    pub fn stop(&self) {
        self.state.playing.store(false, Ordering::Release);
    }

    /// Stop for good; `start` becomes a no-op.
    pub fn dispose(&self) {
        self.stop();
        self.state.disposed.store(true, Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.state.disposed.load(Ordering::Acquire)
    }

    pub fn bpm(&self) -> f32 {
        f32::from_bits(self.state.bpm_bits.load(Ordering::Relaxed))
    }

    /// Position in sample frames.
    pub fn position(&self) -> u64 {
        self.state.position.load(Ordering::Acquire)
    }

    /// Advance by `frames` and return the position before the advance.
    pub fn advance(&self, frames: u64) -> u64 {
        self.state.position.fetch_add(frames, Ordering::AcqRel)
    }

    pub fn seconds(&self, sample_rate: f64) -> f64 {
        self.position() as f64 / sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped_at_default_tempo() {
        let transport = Transport::default();
        assert!(!transport.is_playing());
        assert_eq!(transport.bpm(), 84.0);
        assert_eq!(transport.position(), 0);
    }

    #[test]
    fn clones_share_state() {
        let transport = Transport::new(120.0);
        let handle = transport.clone();
        handle.start();
        assert!(transport.is_playing());
        assert_eq!(handle.advance(480), 0);
        assert_eq!(transport.position(), 480);
        assert!((transport.seconds(48_000.0) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn disposed_transport_cannot_restart() {
        let transport = Transport::default();
        transport.start();
        transport.dispose();
        assert!(!transport.is_playing());
        transport.start();
        assert!(!transport.is_playing());
    }
}
