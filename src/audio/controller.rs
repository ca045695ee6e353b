//! Starts the ambient pad and the voice-over once, and tears them down.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use super::output::{AudioOutput, CpalOutput};
use super::speech::{CommandSpeech, NoSpeech, SpeechSynthesizer, Utterance, VOICE_LANGUAGE};
use super::synth::AmbientEngine;
use super::transport::{Transport, DEFAULT_BPM};
use crate::error::Result;

/// Builds the output on the audio thread
pub type OutputFactory = Box<dyn FnOnce() -> Result<Box<dyn AudioOutput>> + Send>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enabled: bool,
    /// Sample rate for offline export; live playback uses the device rate
    pub sample_rate: u32,
    pub bpm: f32,
    pub master_gain: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: 44_100,
            bpm: DEFAULT_BPM,
            master_gain: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub enabled: bool,
    /// Speech program name or path; auto-detected when unset
    pub program: Option<String>,
    pub language: String,
    pub rate: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            program: None,
            language: VOICE_LANGUAGE.to_string(),
            rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioState {
    Idle = 0,
    Initializing = 1,
    Running = 2,
    Stopped = 3,
}

impl AudioState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => AudioState::Initializing,
            2 => AudioState::Running,
            3 => AudioState::Stopped,
            _ => AudioState::Idle,
        }
    }
}

/// Owns the audio thread and the speech backend
///
/// `start` does its work at most once. Audio startup failures are logged at
/// debug level and otherwise ignored; the cinematic plays on silently.
pub struct AudioController {
    settings: AudioSettings,
    voice: VoiceSettings,
    state: Arc<AtomicU8>,
    started: bool,
    transport: Transport,
    output_factory: Option<OutputFactory>,
    speech: Box<dyn SpeechSynthesizer>,
    init_rx: Option<oneshot::Receiver<Result<()>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl AudioController {
    /// Default output device and auto-detected speech program
    pub fn new(settings: AudioSettings, voice: VoiceSettings) -> Self {
        let factory: OutputFactory =
            Box::new(|| CpalOutput::open().map(|o| Box::new(o) as Box<dyn AudioOutput>));
        let speech: Box<dyn SpeechSynthesizer> = if voice.enabled {
            Box::new(CommandSpeech::detect(voice.program.as_deref()))
        } else {
            Box::new(NoSpeech)
        };
        Self::with_backends(settings, voice, factory, speech)
    }

    pub fn with_backends(
        settings: AudioSettings,
        voice: VoiceSettings,
        output_factory: OutputFactory,
        speech: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        let transport = Transport::new(settings.bpm);
        Self {
            settings,
            voice,
            state: Arc::new(AtomicU8::new(AudioState::Idle as u8)),
            started: false,
            transport,
            output_factory: Some(output_factory),
            speech,
            init_rx: None,
            shutdown_tx: None,
            thread: None,
        }
    }

    pub fn state(&self) -> AudioState {
        AudioState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: AudioState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Begin audio startup and the voice-over. Returns false when already
    /// started.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;

        if self.settings.enabled {
            self.spawn_audio_thread();
        } else {
            log::info!("audio disabled");
            self.set_state(AudioState::Stopped);
        }

        // Issued alongside audio startup, not after it
        self.speak_voice_over();
        true
    }

    fn spawn_audio_thread(&mut self) {
        let Some(factory) = self.output_factory.take() else {
            return;
        };
        self.set_state(AudioState::Initializing);

        let (init_tx, init_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let transport = self.transport.clone();
        let state = Arc::clone(&self.state);
        let master_gain = self.settings.master_gain;

        let spawned = thread::Builder::new()
            .name("audio".into())
            .spawn(move || {
                let started = (|| -> Result<Box<dyn AudioOutput>> {
                    let mut output = factory()?;
                    let engine =
                        AmbientEngine::new(output.sample_rate() as f64, transport.clone(), master_gain);
                    output.start(engine)?;
                    transport.start();
                    Ok(output)
                })();

                match started {
                    Ok(mut output) => {
                        state.store(AudioState::Running as u8, Ordering::Release);
                        let _ = init_tx.send(Ok(()));
                        // Parked until teardown; the stream plays on its own thread
                        let _ = shutdown_rx.recv();
                        transport.stop();
                        output.stop();
                    }
                    Err(e) => {
                        state.store(AudioState::Stopped as u8, Ordering::Release);
                        let _ = init_tx.send(Err(e));
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                self.thread = Some(handle);
                self.init_rx = Some(init_rx);
                self.shutdown_tx = Some(shutdown_tx);
            }
            Err(e) => {
                log::debug!("audio thread failed to spawn: {e}");
                self.set_state(AudioState::Stopped);
            }
        }
    }

    fn speak_voice_over(&mut self) {
        if !self.voice.enabled {
            return;
        }
        if !self.speech.is_available() {
            log::debug!("speech unavailable, skipping voice-over");
            return;
        }

        let mut utterance = Utterance::voice_over();
        utterance.lang = self.voice.language.clone();
        utterance.rate = self.voice.rate;
        if let Err(e) = self.speech.speak(&utterance) {
            log::debug!("voice-over failed: {e}");
        }
    }

    /// Collect the startup result if it has arrived. Never blocks.
    pub fn poll(&mut self) {
        let Some(rx) = self.init_rx.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(None) => {}
            Ok(Some(result)) => {
                self.init_rx = None;
                Self::report(result);
            }
            Err(_) => {
                self.init_rx = None;
                log::debug!("audio thread exited before reporting");
            }
        }
    }

    /// Block until startup has finished. True when audio is running.
    pub fn wait_until_initialized(&mut self) -> bool {
        if let Some(rx) = self.init_rx.take() {
            match futures::executor::block_on(rx) {
                Ok(result) => Self::report(result),
                Err(_) => log::debug!("audio thread exited before reporting"),
            }
        }
        self.state() == AudioState::Running
    }

    fn report(result: Result<()>) {
        match result {
            Ok(()) => log::info!("ambient audio running"),
            Err(e) => log::debug!("audio startup failed: {e}"),
        }
    }

    /// Stop the transport, end the loop and join the audio thread.
    /// Errors are discarded; a running voice-over is left alone.
    pub fn shutdown(&mut self) {
        self.transport.dispose();
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.init_rx = None;
        if self.started {
            self.set_state(AudioState::Stopped);
        }
    }
}

impl Drop for AudioController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::NullOutput;
    use crate::error::CinematicError;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct RecordingSpeech {
        available: bool,
        spoken: Arc<Mutex<Vec<Utterance>>>,
    }

    impl SpeechSynthesizer for RecordingSpeech {
        fn is_available(&self) -> bool {
            self.available
        }

        fn speak(&mut self, utterance: &Utterance) -> Result<()> {
            self.spoken.lock().unwrap().push(utterance.clone());
            Ok(())
        }
    }

    fn null_factory(opened: Arc<AtomicUsize>) -> OutputFactory {
        Box::new(move || {
            opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(NullOutput::new(8000, 2)) as Box<dyn AudioOutput>)
        })
    }

    fn speech(available: bool) -> (Box<dyn SpeechSynthesizer>, Arc<Mutex<Vec<Utterance>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let speech = RecordingSpeech {
            available,
            spoken: Arc::clone(&spoken),
        };
        (Box::new(speech), spoken)
    }

    #[test]
    fn starts_once() {
        let opened = Arc::new(AtomicUsize::new(0));
        let (speech, spoken) = speech(true);
        let mut audio = AudioController::with_backends(
            AudioSettings::default(),
            VoiceSettings::default(),
            null_factory(Arc::clone(&opened)),
            speech,
        );
        assert_eq!(audio.state(), AudioState::Idle);

        assert!(audio.start());
        assert!(!audio.start());
        assert!(audio.wait_until_initialized());
        assert_eq!(audio.state(), AudioState::Running);
        assert!(audio.transport().is_playing());
        assert_eq!(audio.transport().bpm(), 84.0);

        assert_eq!(opened.load(Ordering::SeqCst), 1);
        let spoken = spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].lang, "hi-IN");
    }

    #[test]
    fn startup_failure_is_swallowed() {
        let (speech, spoken) = speech(true);
        let mut audio = AudioController::with_backends(
            AudioSettings::default(),
            VoiceSettings::default(),
            Box::new(|| Err(CinematicError::Audio("no device".into()))),
            speech,
        );
        assert!(audio.start());
        assert!(!audio.wait_until_initialized());
        assert_eq!(audio.state(), AudioState::Stopped);
        audio.poll();
        // Voice-over does not depend on audio startup
        assert_eq!(spoken.lock().unwrap().len(), 1);
    }

    #[test]
    fn unavailable_speech_is_skipped() {
        let (speech, spoken) = speech(false);
        let mut audio = AudioController::with_backends(
            AudioSettings::default(),
            VoiceSettings::default(),
            null_factory(Arc::new(AtomicUsize::new(0))),
            speech,
        );
        audio.start();
        assert!(spoken.lock().unwrap().is_empty());
    }

    #[test]
    fn shutdown_stops_transport() {
        let (speech, _) = speech(false);
        let mut audio = AudioController::with_backends(
            AudioSettings::default(),
            VoiceSettings::default(),
            null_factory(Arc::new(AtomicUsize::new(0))),
            speech,
        );
        audio.start();
        audio.wait_until_initialized();
        audio.shutdown();
        assert_eq!(audio.state(), AudioState::Stopped);
        assert!(!audio.transport().is_playing());
        // Teardown twice is harmless
        audio.shutdown();
    }

    #[test]
    fn disabled_audio_never_opens_output() {
        let opened = Arc::new(AtomicUsize::new(0));
        let (speech, _) = speech(false);
        let settings = AudioSettings {
            enabled: false,
            ..Default::default()
        };
        let mut audio = AudioController::with_backends(
            settings,
            VoiceSettings::default(),
            null_factory(Arc::clone(&opened)),
            speech,
        );
        audio.start();
        audio.shutdown();
        assert_eq!(opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unstarted_controller_stays_idle_on_drop() {
        let (speech, _) = speech(false);
        let mut audio = AudioController::with_backends(
            AudioSettings::default(),
            VoiceSettings::default(),
            null_factory(Arc::new(AtomicUsize::new(0))),
            speech,
        );
        audio.shutdown();
        assert_eq!(audio.state(), AudioState::Idle);
    }
}
