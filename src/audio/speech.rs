//! One-shot voice-over through a platform speech program.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{CinematicError, Result};

pub const VOICE_LANGUAGE: &str = "hi-IN";

/// Programs tried in order when none is configured
pub const SPEECH_PROGRAMS: [&str; 3] = ["espeak-ng", "espeak", "say"];

pub const VOICE_SCRIPT: &str = "Here, we make data work smarter for you! \
Our team specializes in Data Entry, Data Validation, and Bulk Data Import into Google Sheets - \
fast, secure, and accurate. From small businesses to large enterprises - Excel Service Hub \
ensures your data stays clean, organized, and ready to use. Because here, Your Data is Our \
Responsibility! If you're looking for reliable data management - choose Excel Service Hub and \
experience professional excellence today.";

/// Text plus voice parameters; 1.0 is the neutral value for rate, pitch and volume
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: VOICE_LANGUAGE.to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }

    pub fn voice_over() -> Self {
        Self::new(VOICE_SCRIPT)
    }
}

pub trait SpeechSynthesizer: Send {
    /// Capability check; callers skip `speak` when this is false
    fn is_available(&self) -> bool;

    /// Queue the utterance and return without waiting for it to finish
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;
}

/// Speech that does nothing, for muted runs and platforms without a program
#[derive(Debug, Default)]
pub struct NoSpeech;

impl SpeechSynthesizer for NoSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _utterance: &Utterance) -> Result<()> {
        Err(CinematicError::Speech("speech is disabled".into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Espeak,
    Say,
}

/// Spawns `espeak-ng`, `espeak` or macOS `say` as a detached child process
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: Option<PathBuf>,
}

impl CommandSpeech {
    /// Look up `preferred`, or the first known program, on `PATH`.
    pub fn detect(preferred: Option<&str>) -> Self {
        let dirs: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        let program = match preferred {
            Some(name) => find_program(name, &dirs),
            None => SPEECH_PROGRAMS.iter().find_map(|name| find_program(name, &dirs)),
        };
        match &program {
            Some(p) => log::info!("speech program: {}", p.display()),
            None => log::debug!("no speech program found"),
        }
        Self { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }

    fn flavor(program: &Path) -> Flavor {
        match program.file_stem().and_then(|s| s.to_str()) {
            Some("say") => Flavor::Say,
            _ => Flavor::Espeak,
        }
    }

    /// Command line arguments for `utterance` (without the program itself)
    pub fn arguments(program: &Path, utterance: &Utterance) -> Vec<String> {
        match Self::flavor(program) {
            Flavor::Espeak => {
                // espeak voices are language codes, e.g. "hi"
                let voice = utterance.lang.split('-').next().unwrap_or("en").to_lowercase();
                vec![
                    "-v".into(),
                    voice,
                    "-s".into(),
                    format!("{}", (175.0 * utterance.rate).round() as i32),
                    "-p".into(),
                    format!("{}", (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as i32),
                    "-a".into(),
                    format!("{}", (100.0 * utterance.volume).round().clamp(0.0, 200.0) as i32),
                    utterance.text.clone(),
                ]
            }
            Flavor::Say => vec![
                "-r".into(),
                format!("{}", (175.0 * utterance.rate).round() as i32),
                utterance.text.clone(),
            ],
        }
    }
}

impl SpeechSynthesizer for CommandSpeech {
    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        let program = self
            .program
            .as_deref()
            .ok_or_else(|| CinematicError::Speech("no speech program".into()))?;

        let mut child = Command::new(program)
            .args(Self::arguments(program, utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CinematicError::Speech(format!("failed to spawn {}: {e}", program.display())))?;

        log::info!("voice-over started (pid {})", child.id());
        // Reap the child so it does not linger as a zombie
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// First `dirs` entry containing a file named `name`
pub fn find_program(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    dirs.iter().find_map(|dir| {
        let path = dir.join(name);
        if path.is_file() {
            return Some(path);
        }
        let exe = path.with_extension(std::env::consts::EXE_EXTENSION);
        exe.is_file().then_some(exe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_over_defaults() {
        let u = Utterance::voice_over();
        assert_eq!(u.lang, "hi-IN");
        assert_eq!((u.rate, u.pitch, u.volume), (1.0, 1.0, 1.0));
        assert!(u.text.contains("Your Data is Our Responsibility!"));
    }

    #[test]
    fn espeak_arguments() {
        let args = CommandSpeech::arguments(Path::new("/usr/bin/espeak-ng"), &Utterance::new("hello"));
        assert_eq!(args, vec!["-v", "hi", "-s", "175", "-p", "50", "-a", "100", "hello"]);
    }

    #[test]
    fn say_arguments() {
        let mut u = Utterance::new("hello");
        u.rate = 2.0;
        let args = CommandSpeech::arguments(Path::new("/usr/bin/say"), &u);
        assert_eq!(args, vec!["-r", "350", "hello"]);
    }

    #[test]
    fn missing_program_is_unavailable() {
        let speech = CommandSpeech::detect(Some("definitely-not-a-speech-program-xyz"));
        assert!(!speech.is_available());
        assert!(!NoSpeech.is_available());
    }

    #[test]
    fn finds_program_in_directory() {
        let dir = std::env::temp_dir().join(format!("cinematic-speech-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("fake-speak");
        std::fs::write(&file, b"").unwrap();

        assert_eq!(find_program("fake-speak", &[dir.clone()]), Some(file));
        assert_eq!(find_program("other", &[dir.clone()]), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
