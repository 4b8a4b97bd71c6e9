use crate::error::{TraceError, TraceResult};
use crate::geometry::{distance_to_segment, Point};
use crate::letters::ReferenceStore;
use serde::{Deserialize, Serialize};

/// Turning angle (degrees) at which smoothness bottoms out.
const MAX_MEAN_TURN_DEG: f32 = 90.0;
/// Mean distance to the reference (logical units) at which accuracy bottoms out.
const ACCURACY_FALLOFF: f32 = 60.0;
/// Comfortable writing speed, logical units per millisecond.
const SPEED_BAND: (f32, f32) = (0.2, 1.5);
/// Speed score when the strokes carry no usable timestamps.
const UNTIMED_SPEED: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandwritingMetrics {
    pub smoothness: f32,
    pub accuracy: f32,
    pub speed: f32,
    pub beauty_score: f32,
}

pub fn beauty_score(smoothness: f32, accuracy: f32, speed: f32) -> f32 {
    smoothness * 0.4 + accuracy * 0.4 + speed * 0.2
}

/// Whole-letter quality metrics for a finished set of strokes, given in logical units.
pub fn evaluate_handwriting(
    store: &ReferenceStore,
    letter: &str,
    strokes: &[Vec<Point>],
) -> TraceResult<HandwritingMetrics> {
    if letter.trim().is_empty() {
        return Err(TraceError::Validation("letter is required".into()));
    }
    if strokes.iter().all(|s| s.is_empty()) {
        return Err(TraceError::Validation("at least one stroke is required".into()));
    }
    let glyph = store.require(letter)?;

    let smoothness = smoothness(strokes);
    let accuracy = {
        let mut total = 0.0;
        let mut n = 0usize;
        for p in strokes.iter().flatten() {
            let d = glyph
                .paths
                .iter()
                .flat_map(|path| path.segments())
                .map(|(_, a, b)| distance_to_segment(p, a, b))
                .fold(f32::INFINITY, f32::min);
            if d.is_finite() {
                total += d;
                n += 1;
            }
        }
        if n == 0 {
            0.0
        } else {
            clamp_score(100.0 * (1.0 - (total / n as f32) / ACCURACY_FALLOFF))
        }
    };
    let speed = speed(strokes);

    Ok(HandwritingMetrics {
        smoothness,
        accuracy,
        speed,
        beauty_score: beauty_score(smoothness, accuracy, speed),
    })
}

fn clamp_score(v: f32) -> f32 {
    v.clamp(0.0, 100.0)
}

fn smoothness(strokes: &[Vec<Point>]) -> f32 {
    let mut total = 0.0;
    let mut n = 0usize;
    for stroke in strokes {
        for w in stroke.windows(3) {
            let (ax, ay) = (w[1].x - w[0].x, w[1].y - w[0].y);
            let (bx, by) = (w[2].x - w[1].x, w[2].y - w[1].y);
            if (ax == 0.0 && ay == 0.0) || (bx == 0.0 && by == 0.0) {
                continue;
            }
            let turn = (ax * by - ay * bx).atan2(ax * bx + ay * by).abs();
            total += turn.to_degrees();
            n += 1;
        }
    }
    if n == 0 {
        return 100.0;
    }
    clamp_score(100.0 * (1.0 - (total / n as f32) / MAX_MEAN_TURN_DEG))
}

fn speed(strokes: &[Vec<Point>]) -> f32 {
    let mut total = 0.0;
    let mut n = 0usize;
    for stroke in strokes {
        for w in stroke.windows(2) {
            let dt = w[1].timestamp.saturating_sub(w[0].timestamp);
            if dt == 0 {
                continue;
            }
            total += w[0].distance_to(&w[1]) / dt as f32;
            n += 1;
        }
    }
    if n == 0 {
        return UNTIMED_SPEED;
    }

    let v = total / n as f32;
    let (lo, hi) = SPEED_BAND;
    if v < lo {
        clamp_score(100.0 * v / lo)
    } else if v > hi {
        clamp_score(100.0 * hi / v)
    } else {
        100.0
    }
}
