//! Note parsing and the repeating chord progression.

/// Seconds between chord triggers.
pub const CHORD_INTERVAL_SECS: f64 = 4.0;
/// How long each chord note is held before release.
pub const NOTE_DURATION_SECS: f64 = 3.6;
pub const CHORD_VELOCITY: f64 = 0.2;

/// Cmaj7, Am7, Fmaj7, G7
pub const CHORDS: [[&str; 4]; 4] = [
    ["C4", "E4", "G4", "B4"],
    ["A3", "C4", "E4", "G4"],
    ["F3", "A3", "C4", "E4"],
    ["G3", "B3", "D4", "F4"],
];

/// Parse a note name (e.g. "C4", "F#3", "Bb5") into a MIDI note number.
pub fn note_to_midi(note: &str) -> Option<i32> {
    let mut chars = note.chars();
    let mut semitone = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let octave_str = if let Some(r) = rest.strip_prefix('#') {
        semitone += 1;
        r
    } else if let Some(r) = rest.strip_prefix('b') {
        semitone -= 1;
        r
    } else {
        rest
    };

    let octave: i32 = octave_str.parse().ok()?;
    // C4 = 60
    Some((octave + 1) * 12 + semitone)
}

/// Equal temperament, A4 = 440 Hz.
pub fn midi_to_frequency(midi: i32) -> f64 {
    440.0 * 2.0_f64.powf((midi as f64 - 69.0) / 12.0)
}

pub fn note_to_frequency(note: &str) -> Option<f64> {
    note_to_midi(note).map(midi_to_frequency)
}

/// One chord trigger inside a rendered block.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEvent {
    /// Frame offset inside the block.
    pub offset: usize,
    pub frequencies: Vec<f64>,
    pub duration_samples: usize,
    pub velocity: f64,
}

/// Fires the next chord of the progression every interval of transport time,
/// starting at transport position zero.
#[derive(Debug, Clone)]
pub struct ChordLoop {
    chords: Vec<Vec<f64>>,
    interval_samples: u64,
    duration_samples: usize,
    velocity: f64,
    next_trigger: u64,
    index: usize,
    disposed: bool,
}

impl ChordLoop {
    pub fn new(sample_rate: f64) -> Self {
        let chords = CHORDS
            .iter()
            .map(|chord| chord.iter().filter_map(|n| note_to_frequency(n)).collect())
            .collect();
        Self {
            chords,
            interval_samples: (CHORD_INTERVAL_SECS * sample_rate).round() as u64,
            duration_samples: (NOTE_DURATION_SECS * sample_rate).round() as usize,
            velocity: CHORD_VELOCITY,
            next_trigger: 0,
            index: 0,
            disposed: false,
        }
    }

    /// Chord triggers falling in `[position, position + frames)`.
    pub fn events(&mut self, position: u64, frames: usize) -> Vec<ChordEvent> {
        let mut events = Vec::new();
        if self.disposed || self.chords.is_empty() || self.interval_samples == 0 {
            return events;
        }
        // A transport that jumped ahead resumes on the next boundary
        if self.next_trigger < position {
            let missed = (position - self.next_trigger).div_ceil(self.interval_samples);
            self.next_trigger += missed * self.interval_samples;
        }

        let end = position + frames as u64;
        while self.next_trigger < end {
            events.push(ChordEvent {
                offset: (self.next_trigger - position) as usize,
                frequencies: self.chords[self.index % self.chords.len()].clone(),
                duration_samples: self.duration_samples,
                velocity: self.velocity,
            });
            self.index += 1;
            self.next_trigger += self.interval_samples;
        }
        events
    }

    /// Number of chords triggered so far.
    pub fn triggered(&self) -> usize {
        self.index
    }

    /// Stop producing events for good.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
