use super::{Tone, Utterance};
use crate::geometry::Direction;

// Vibration patterns, alternating on/off milliseconds.
pub const PULSE: &[u64] = &[80];
pub const SUCCESS_PATTERN: &[u64] = &[100, 50, 100, 50, 200, 50, 100, 50, 100];
pub const TEMPLATE_PATTERN: &[u64] = &[100, 50, 100];
pub const GUIDED_PATTERN: &[u64] = &[200, 100, 200];

pub fn direction_pattern(direction: Direction) -> &'static [u64] {
    match direction {
        Direction::Up => &[120, 30, 120],
        Direction::Down => &[200, 30, 200],
        Direction::Left => &[120, 30, 200],
        Direction::Right => &[200, 30, 120],
    }
}

/// Higher pitch means up, lower means down.
pub fn direction_frequency(direction: Direction) -> f32 {
    match direction {
        Direction::Up => 880.0,
        Direction::Down => 220.0,
        Direction::Left => 330.0,
        Direction::Right => 660.0,
    }
}

/// One bundle of output across the three channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cue {
    pub haptic: Option<&'static [u64]>,
    pub tones: Vec<Tone>,
    pub speech: Option<Utterance>,
}

/// Notes of equal length, `spacing` ms apart.
fn sequence(frequencies: &[f32], duration_ms: u64, spacing_ms: u64) -> Vec<Tone> {
    frequencies
        .iter()
        .enumerate()
        .map(|(i, &f)| Tone::new(f, duration_ms).after(i as u64 * spacing_ms))
        .collect()
}

pub fn directional(direction: Direction, speech_delay_ms: u64) -> Cue {
    Cue {
        haptic: Some(direction_pattern(direction)),
        tones: vec![Tone::new(direction_frequency(direction), 200)],
        speech: Some(Utterance::new(direction.word()).delayed(speech_delay_ms)),
    }
}

pub fn pointer_down() -> Cue {
    Cue {
        haptic: Some(PULSE),
        ..Cue::default()
    }
}

pub fn stroke_success() -> Cue {
    Cue {
        haptic: Some(PULSE),
        tones: sequence(&[659.25, 783.99], 200, 200),
        speech: Some(Utterance::new("Good stroke!")),
    }
}

pub fn letter_complete(letter: &str) -> Cue {
    Cue {
        haptic: Some(SUCCESS_PATTERN),
        tones: sequence(&[261.63, 329.63, 392.0, 523.25], 200, 200),
        speech: Some(Utterance::new(format!("Good job! Letter {} complete.", letter)).priority()),
    }
}

/// Instruction motif: C E G up for tracing, G E C down for guided practice.
pub fn stage_intro(template: bool) -> Cue {
    if template {
        Cue {
            haptic: Some(TEMPLATE_PATTERN),
            tones: sequence(&[262.0, 330.0, 392.0], 150, 200),
            speech: None,
        }
    } else {
        Cue {
            haptic: Some(GUIDED_PATTERN),
            tones: sequence(&[392.0, 330.0, 262.0], 150, 200),
            speech: None,
        }
    }
}

pub fn instructions_acknowledged() -> Cue {
    Cue {
        haptic: Some(PULSE),
        tones: sequence(&[330.0, 392.0, 440.0], 100, 100),
        speech: None,
    }
}

pub fn stage_complete() -> Cue {
    Cue {
        haptic: Some(SUCCESS_PATTERN),
        tones: sequence(&[262.0, 330.0, 392.0, 523.0], 100, 100),
        speech: None,
    }
}

pub fn stage_transition() -> Cue {
    Cue {
        haptic: None,
        tones: sequence(&[330.0, 392.0, 440.0, 494.0], 100, 150),
        speech: None,
    }
}

/// G4 G4 A4 G4 C5 B4 with a 50 ms gap between notes.
pub fn fanfare() -> Cue {
    const NOTES: [(f32, u64); 6] = [
        (392.0, 150),
        (392.0, 150),
        (440.0, 300),
        (392.0, 300),
        (523.0, 300),
        (494.0, 450),
    ];
    let mut offset = 0;
    let tones = NOTES
        .iter()
        .map(|&(f, d)| {
            let tone = Tone::new(f, d).after(offset);
            offset += d + 50;
            tone
        })
        .collect();
    Cue {
        haptic: None,
        tones,
        speech: None,
    }
}

pub fn canvas_cleared() -> Cue {
    Cue {
        haptic: None,
        tones: vec![Tone::new(440.0, 100)],
        speech: Some(Utterance::new("Canvas cleared. Try again.").priority()),
    }
}
