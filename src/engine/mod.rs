mod attempt;
pub mod background;
pub mod coverage;
pub mod dtw;
pub mod foreground;
pub mod protocol;

use crate::config::{Config, ExecutionForm, MatcherKind};
use crate::error::TraceResult;
use crate::geometry::{Direction, Point, SurfaceScale};
use crate::letters::ReferenceStore;
use crate::render::RenderSurface;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strum_macros::Display;
use tracing::{info, warn};

pub use background::BackgroundEvaluator;
pub use coverage::{CoverageScorer, PathMatch, PathScorer};
pub use dtw::AlignmentScorer;
pub use foreground::ForegroundEvaluator;

/// Identifier of one pointer-down to pointer-up interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeId(pub u64);

impl StrokeId {
    pub fn fresh() -> Self {
        StrokeId(fastrand::u64(..))
    }
}

impl fmt::Display for StrokeId {
    /// Base 36, like the ids the input surface hands out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut n = self.0;
        let mut digits = Vec::with_capacity(13);
        loop {
            digits.extend(char::from_digit((n % 36) as u32, 36));
            n /= 36;
            if n == 0 {
                break;
            }
        }
        let id: String = digits.iter().rev().collect();
        f.write_str(&id)
    }
}

/// Outcome of a finished stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeEvaluation {
    pub stroke_id: StrokeId,
    pub score: f32,
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_index: Option<usize>,
    #[serde(default)]
    pub letter_complete: bool,
}

impl StrokeEvaluation {
    /// Taps and noise: zero score, nothing completed.
    pub fn rejected(stroke_id: StrokeId) -> Self {
        Self {
            stroke_id,
            score: 0.0,
            complete: false,
            path_index: None,
            letter_complete: false,
        }
    }
}

/// Off-path sample with the direction that leads back to the nearest open path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub point: Point,
    pub direction: Direction,
    /// Surface pixels.
    #[serde(default)]
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EvaluatorKind {
    Foreground,
    Background,
}

/// Common contract of both execution forms. The stage machine only ever sees this.
pub trait StrokeEvaluator: Send {
    fn kind(&self) -> EvaluatorKind;

    /// Switches letter and resets all per-attempt state.
    fn set_letter(&mut self, letter: &str) -> TraceResult<()>;

    /// Drops strokes, coverage and completed paths; `template_visible` selects the stage overlay.
    fn clear(&mut self, template_visible: bool);

    /// `None` when no letter is set or the letter is already complete.
    fn start_stroke(&mut self, point: Point) -> Option<StrokeId>;

    /// Deviations observed so far. Stale ids are ignored.
    fn update_stroke(&mut self, id: StrokeId, point: Point) -> Vec<Deviation>;

    /// `None` for stale ids.
    fn end_stroke(&mut self, id: StrokeId) -> Option<StrokeEvaluation>;

    fn cancel_stroke(&mut self, id: StrokeId);
}

pub(crate) fn scale_for(config: &Config) -> SurfaceScale {
    SurfaceScale::new(config.session.surface_size, config.matching.logical_size)
}

pub(crate) fn scorer_for(kind: MatcherKind) -> Box<dyn PathScorer> {
    match kind {
        MatcherKind::Alignment => Box::new(AlignmentScorer),
        MatcherKind::Coverage => Box::new(CoverageScorer),
    }
}

/// Picks the execution form once for the lifetime of a session.
pub fn select_evaluator(
    config: &Config,
    store: Arc<ReferenceStore>,
    surface: Box<dyn RenderSurface>,
) -> Box<dyn StrokeEvaluator> {
    let want_background = match config.session.execution {
        ExecutionForm::Foreground => false,
        ExecutionForm::Background => true,
        ExecutionForm::Auto => std::thread::available_parallelism()
            .map(|n| n.get() > 1)
            .unwrap_or(false),
    };

    if want_background {
        match BackgroundEvaluator::try_spawn(config, store.clone(), surface) {
            Ok(ev) => {
                info!("⚙️  Using background stroke evaluator");
                return Box::new(ev);
            }
            Err((e, surface)) => {
                warn!("Background evaluator unavailable ({}), using foreground", e);
                return Box::new(ForegroundEvaluator::new(config, store, surface));
            }
        }
    }

    info!("⚙️  Using foreground stroke evaluator");
    Box::new(ForegroundEvaluator::new(config, store, surface))
}
