pub mod channels;
pub mod clock;
pub mod cues;

use crate::config::FeedbackParams;
use crate::geometry::Direction;
use cues::Cue;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub use channels::{FeedbackEvent, LogChannel, NullChannel, RecordingChannel};
pub use clock::{Clock, ManualClock, SystemClock};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("channel not supported on this device")]
    Unsupported,
    #[error("audio output is locked until a user interaction")]
    Locked,
    #[error("device error: {0}")]
    Device(String),
}

/// One oscillator note. `offset_ms` is relative to the start of its cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency: f32,
    pub duration_ms: u64,
    pub offset_ms: u64,
    pub gain: f32,
}

impl Tone {
    pub fn new(frequency: f32, duration_ms: u64) -> Self {
        Self {
            frequency,
            duration_ms,
            offset_ms: 0,
            gain: 0.3,
        }
    }

    pub fn after(mut self, offset_ms: u64) -> Self {
        self.offset_ms = offset_ms;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    /// Interrupts whatever is queued.
    pub priority: bool,
    pub delay_ms: u64,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: false,
            delay_ms: 0,
        }
    }

    pub fn priority(mut self) -> Self {
        self.priority = true;
        self
    }

    pub fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

// === Capability providers ===

pub trait HapticEmitter: Send {
    fn is_supported(&self) -> bool {
        true
    }
    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), ChannelError>;
}

pub trait ToneEmitter: Send {
    fn is_supported(&self) -> bool {
        true
    }
    /// Must be attempted from a user interaction.
    fn unlock(&mut self) -> Result<(), ChannelError>;
    fn play(&mut self, tone: &Tone) -> Result<(), ChannelError>;
}

pub trait SpeechSynthesizer: Send {
    fn is_supported(&self) -> bool {
        true
    }
    fn speak(&mut self, utterance: &Utterance) -> Result<(), ChannelError>;
}

/// Fans engine events out to haptic, tone and speech providers.
///
/// Unsupported providers are dropped when attached, so a missing channel costs
/// nothing later. Provider failures are logged and never reach the caller; a
/// provider that panics is detached for the rest of the attempt.
pub struct FeedbackCoordinator {
    haptics: Option<Box<dyn HapticEmitter>>,
    tones: Option<Box<dyn ToneEmitter>>,
    speech: Option<Box<dyn SpeechSynthesizer>>,
    clock: Arc<dyn Clock>,
    params: FeedbackParams,
    audio_unlocked: bool,
    last_directional: Option<Duration>,
}

impl FeedbackCoordinator {
    pub fn new(params: FeedbackParams, clock: Arc<dyn Clock>) -> Self {
        Self {
            haptics: None,
            tones: None,
            speech: None,
            clock,
            params,
            audio_unlocked: false,
            last_directional: None,
        }
    }

    pub fn with_haptics(mut self, haptics: Box<dyn HapticEmitter>) -> Self {
        if haptics.is_supported() {
            self.haptics = Some(haptics);
        } else {
            debug!("Haptics unsupported, channel disabled");
        }
        self
    }

    pub fn with_tones(mut self, tones: Box<dyn ToneEmitter>) -> Self {
        if tones.is_supported() {
            self.tones = Some(tones);
        } else {
            debug!("Tones unsupported, channel disabled");
        }
        self
    }

    pub fn with_speech(mut self, speech: Box<dyn SpeechSynthesizer>) -> Self {
        if !self.params.enable_speech {
            debug!("Speech disabled by configuration");
        } else if speech.is_supported() {
            self.speech = Some(speech);
        } else {
            debug!("Speech unsupported, channel disabled");
        }
        self
    }

    pub fn has_haptics(&self) -> bool {
        self.haptics.is_some()
    }

    pub fn has_tones(&self) -> bool {
        self.tones.is_some()
    }

    pub fn has_speech(&self) -> bool {
        self.speech.is_some()
    }

    pub fn audio_unlocked(&self) -> bool {
        self.audio_unlocked
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Tries to unlock audio output. A failure leaves the coordinator locked and
    /// the next tone-bearing cue tries again.
    pub fn unlock_audio(&mut self) -> bool {
        if self.audio_unlocked {
            return true;
        }
        let Some(tones) = self.tones.as_mut() else {
            return false;
        };
        match contained("Tone", || tones.unlock()) {
            Some(Ok(())) => {
                debug!("Audio unlocked");
                self.audio_unlocked = true;
            }
            Some(Err(e)) => warn!("Audio unlock failed: {}", e),
            None => self.tones = None,
        }
        self.audio_unlocked
    }

    // === Events ===

    pub fn pointer_down(&mut self) {
        self.unlock_audio();
        self.dispatch(cues::pointer_down());
    }

    /// Off-path correction. Returns `false` when dropped by the cooldown.
    pub fn directional(&mut self, direction: Direction) -> bool {
        let now = self.clock.now();
        if let Some(last) = self.last_directional {
            if now.saturating_sub(last) <= self.params.cooldown() {
                return false;
            }
        }
        self.last_directional = Some(now);
        self.dispatch(cues::directional(direction, self.params.speech_delay_ms));
        true
    }

    pub fn stroke_success(&mut self) {
        self.dispatch(cues::stroke_success());
    }

    pub fn letter_complete(&mut self, letter: &str) {
        self.dispatch(cues::letter_complete(letter));
    }

    pub fn stage_intro(&mut self, template: bool) {
        self.dispatch(cues::stage_intro(template));
    }

    pub fn instructions_acknowledged(&mut self) {
        self.unlock_audio();
        self.dispatch(cues::instructions_acknowledged());
    }

    pub fn stage_complete(&mut self) {
        self.dispatch(cues::stage_complete());
    }

    pub fn stage_transition(&mut self) {
        self.dispatch(cues::stage_transition());
    }

    pub fn fanfare(&mut self) {
        self.dispatch(cues::fanfare());
    }

    pub fn canvas_cleared(&mut self) {
        self.unlock_audio();
        self.dispatch(cues::canvas_cleared());
    }

    /// Forgets the directional cooldown, e.g. on a new attempt.
    pub fn reset_cooldown(&mut self) {
        self.last_directional = None;
    }

    fn dispatch(&mut self, cue: Cue) {
        if let (Some(pattern), Some(haptics)) = (cue.haptic, self.haptics.as_mut()) {
            match contained("Haptic", || haptics.vibrate(pattern)) {
                Some(Ok(())) => {}
                Some(Err(e)) => warn!("Haptic dispatch failed: {}", e),
                None => self.haptics = None,
            }
        }

        if !cue.tones.is_empty() && self.tones.is_some() && self.unlock_audio() {
            let gain = self.params.tone_gain;
            let mut detach = false;
            if let Some(tones) = self.tones.as_mut() {
                for tone in &cue.tones {
                    let tone = Tone { gain, ..*tone };
                    match contained("Tone", || tones.play(&tone)) {
                        Some(Ok(())) => {}
                        Some(Err(e)) => {
                            warn!("Tone dispatch failed: {}", e);
                            break;
                        }
                        None => {
                            detach = true;
                            break;
                        }
                    }
                }
            }
            if detach {
                self.tones = None;
            }
        }

        if let (Some(utterance), Some(speech)) = (cue.speech.as_ref(), self.speech.as_mut()) {
            match contained("Speech", || speech.speak(utterance)) {
                Some(Ok(())) => {}
                Some(Err(e)) => warn!("Speech dispatch failed: {}", e),
                None => self.speech = None,
            }
        }
    }
}

/// Runs one provider call. `None` means the provider panicked.
fn contained<F>(channel: &str, call: F) -> Option<Result<(), ChannelError>>
where
    F: FnOnce() -> Result<(), ChannelError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => Some(result),
        Err(_) => {
            warn!("{} provider panicked, channel detached", channel);
            None
        }
    }
}
