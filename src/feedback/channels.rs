use super::{ChannelError, HapticEmitter, SpeechSynthesizer, Tone, ToneEmitter, Utterance};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Reports every capability as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullChannel;

impl HapticEmitter for NullChannel {
    fn is_supported(&self) -> bool {
        false
    }
    fn vibrate(&mut self, _pattern: &[u64]) -> Result<(), ChannelError> {
        Err(ChannelError::Unsupported)
    }
}

impl ToneEmitter for NullChannel {
    fn is_supported(&self) -> bool {
        false
    }
    fn unlock(&mut self) -> Result<(), ChannelError> {
        Err(ChannelError::Unsupported)
    }
    fn play(&mut self, _tone: &Tone) -> Result<(), ChannelError> {
        Err(ChannelError::Unsupported)
    }
}

impl SpeechSynthesizer for NullChannel {
    fn is_supported(&self) -> bool {
        false
    }
    fn speak(&mut self, _utterance: &Utterance) -> Result<(), ChannelError> {
        Err(ChannelError::Unsupported)
    }
}

/// Writes every cue to the log. Used by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChannel;

impl HapticEmitter for LogChannel {
    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), ChannelError> {
        info!("📳 vibrate {:?}", pattern);
        Ok(())
    }
}

impl ToneEmitter for LogChannel {
    fn unlock(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
    fn play(&mut self, tone: &Tone) -> Result<(), ChannelError> {
        info!(
            "🎵 tone {:.2} Hz for {} ms (+{} ms)",
            tone.frequency, tone.duration_ms, tone.offset_ms
        );
        Ok(())
    }
}

impl SpeechSynthesizer for LogChannel {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), ChannelError> {
        info!(
            "🗣️  \"{}\"{}",
            utterance.text,
            if utterance.priority { " (priority)" } else { "" }
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FeedbackEvent {
    Unlock,
    Haptic(Vec<u64>),
    Tone(Tone),
    Speech(Utterance),
}

#[derive(Debug, Default)]
struct RecorderState {
    events: Vec<FeedbackEvent>,
    locked_unlocks: usize,
    broken: bool,
}

/// Records every successful dispatch. Clones share one log, so a test can keep a
/// handle while the coordinator owns the providers.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    state: Arc<Mutex<RecorderState>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `n` unlock attempts fail with [`ChannelError::Locked`].
    pub fn locked_for(self, n: usize) -> Self {
        if let Ok(mut s) = self.state.lock() {
            s.locked_unlocks = n;
        }
        self
    }

    /// Every dispatch fails with a device error.
    pub fn broken(self) -> Self {
        if let Ok(mut s) = self.state.lock() {
            s.broken = true;
        }
        self
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.state
            .lock()
            .map(|s| s.events.clone())
            .unwrap_or_default()
    }

    pub fn haptics(&self) -> Vec<Vec<u64>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Haptic(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Tone(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Speech(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut s) = self.state.lock() {
            s.events.clear();
        }
    }

    fn record(&self, event: FeedbackEvent) -> Result<(), ChannelError> {
        let mut s = self
            .state
            .lock()
            .map_err(|_| ChannelError::Device("recorder poisoned".into()))?;
        if s.broken {
            return Err(ChannelError::Device("simulated driver failure".into()));
        }
        s.events.push(event);
        Ok(())
    }
}

impl HapticEmitter for RecordingChannel {
    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), ChannelError> {
        self.record(FeedbackEvent::Haptic(pattern.to_vec()))
    }
}

impl ToneEmitter for RecordingChannel {
    fn unlock(&mut self) -> Result<(), ChannelError> {
        {
            let mut s = self
                .state
                .lock()
                .map_err(|_| ChannelError::Device("recorder poisoned".into()))?;
            if s.locked_unlocks > 0 {
                s.locked_unlocks -= 1;
                return Err(ChannelError::Locked);
            }
        }
        self.record(FeedbackEvent::Unlock)
    }

    fn play(&mut self, tone: &Tone) -> Result<(), ChannelError> {
        self.record(FeedbackEvent::Tone(*tone))
    }
}

impl SpeechSynthesizer for RecordingChannel {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), ChannelError> {
        self.record(FeedbackEvent::Speech(utterance.clone()))
    }
}
