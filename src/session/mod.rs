pub mod types;

use crate::config::SessionParams;
use crate::engine::{Deviation, EvaluatorKind, StrokeEvaluation, StrokeEvaluator, StrokeId};
use crate::error::TraceResult;
use crate::feedback::{Clock, FeedbackCoordinator};
use crate::geometry::Point;
use crate::letters::ReferenceStore;
use std::sync::Arc;
use tracing::{debug, info};
use types::PendingTransition;

pub use types::{final_score, Stage, StageScores, StrokeRecord};

type CompletionHandler = Box<dyn FnMut(usize, f32) + Send>;

/// Drives one learner through template tracing, then guided practice, for one letter.
///
/// Input is ignored while instructions are showing and during the transition
/// window after a stage is finished. The window closes on the next call that
/// observes the clock past its end (`tick` or any pointer event).
pub struct PracticeSession {
    store: Arc<ReferenceStore>,
    evaluator: Box<dyn StrokeEvaluator>,
    feedback: FeedbackCoordinator,
    clock: Arc<dyn Clock>,
    params: SessionParams,

    letter: String,
    path_count: usize,
    stage: Stage,
    showing_instructions: bool,
    transition: Option<PendingTransition>,
    scores: StageScores,
    completed_paths: usize,
    final_score: Option<f32>,
    active: Option<StrokeId>,
    history: Vec<StrokeRecord>,

    on_completion: Option<CompletionHandler>,
    completion_reported: bool,
}

impl PracticeSession {
    pub fn new(
        letter: &str,
        store: Arc<ReferenceStore>,
        evaluator: Box<dyn StrokeEvaluator>,
        feedback: FeedbackCoordinator,
        params: SessionParams,
    ) -> TraceResult<Self> {
        let clock = feedback.clock().clone();
        let mut session = Self {
            store,
            evaluator,
            feedback,
            clock,
            params,
            letter: String::new(),
            path_count: 0,
            stage: Stage::Template,
            showing_instructions: true,
            transition: None,
            scores: StageScores::default(),
            completed_paths: 0,
            final_score: None,
            active: None,
            history: Vec::new(),
            on_completion: None,
            completion_reported: false,
        };
        session.set_letter(letter)?;
        Ok(session)
    }

    /// Called with `(stage_count, final_score)` once the attempt is complete.
    pub fn on_completion<F>(mut self, handler: F) -> Self
    where
        F: FnMut(usize, f32) + Send + 'static,
    {
        self.on_completion = Some(Box::new(handler));
        self
    }

    // === Accessors ===

    pub fn letter(&self) -> &str {
        &self.letter
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn showing_instructions(&self) -> bool {
        self.showing_instructions
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn accepting_input(&self) -> bool {
        !self.showing_instructions && self.transition.is_none() && self.stage != Stage::Complete
    }

    pub fn scores(&self) -> StageScores {
        self.scores
    }

    pub fn stage_score(&self, stage: Stage) -> f32 {
        self.scores.get(stage)
    }

    pub fn final_score(&self) -> Option<f32> {
        self.final_score
    }

    pub fn completed_paths(&self) -> usize {
        self.completed_paths
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn evaluator_kind(&self) -> EvaluatorKind {
        self.evaluator.kind()
    }

    pub fn history(&self) -> &[StrokeRecord] {
        &self.history
    }

    pub fn feedback(&self) -> &FeedbackCoordinator {
        &self.feedback
    }

    // === Lifecycle ===

    /// Starts a fresh attempt on `letter`, back at the template stage.
    pub fn set_letter(&mut self, letter: &str) -> TraceResult<()> {
        let glyph = self.store.require(letter)?;
        self.path_count = glyph.path_count();
        self.letter = glyph.letter.clone();
        self.evaluator.set_letter(letter)?;

        self.scores = StageScores::default();
        self.final_score = None;
        self.completion_reported = false;
        self.history.clear();
        self.transition = None;
        self.enter(Stage::Template);
        Ok(())
    }

    pub fn acknowledge_instructions(&mut self) {
        self.poll_transition();
        if self.showing_instructions {
            self.showing_instructions = false;
            self.feedback.instructions_acknowledged();
        }
    }

    /// Clears the canvas and the current stage's score. The other stage keeps its score.
    pub fn reset(&mut self) {
        self.poll_transition();
        if self.stage == Stage::Complete || self.transition.is_some() {
            debug!("Reset ignored in {} stage", self.stage);
            return;
        }
        if let Some(id) = self.active.take() {
            self.evaluator.cancel_stroke(id);
        }
        self.evaluator.clear(self.stage == Stage::Template);
        self.scores.reset(self.stage);
        self.completed_paths = 0;
        self.feedback.reset_cooldown();
        self.feedback.canvas_cleared();
        info!("🧹 {} stage reset", self.stage);
    }

    /// Applies an elapsed transition window, if any.
    pub fn tick(&mut self) {
        self.poll_transition();
    }

    // === Pointer input ===

    pub fn pointer_down(&mut self, point: Point) -> Option<StrokeId> {
        self.poll_transition();
        self.feedback.pointer_down();
        if !self.accepting_input() {
            debug!("Pointer down ignored (stage {}, input closed)", self.stage);
            return None;
        }
        self.active = self.evaluator.start_stroke(point);
        self.active
    }

    pub fn pointer_move(&mut self, point: Point) -> Vec<Deviation> {
        let Some(id) = self.active else {
            return Vec::new();
        };
        let deviations = self.evaluator.update_stroke(id, point);
        if self.stage == Stage::Guided {
            for d in &deviations {
                self.feedback.directional(d.direction);
            }
        }
        deviations
    }

    pub fn pointer_up(&mut self) -> Option<StrokeEvaluation> {
        let id = self.active.take()?;
        let evaluation = self.evaluator.end_stroke(id)?;

        if evaluation.complete {
            self.scores.fold(self.stage, evaluation.score);
            self.completed_paths += 1;
            self.feedback.stroke_success();
        }

        self.history.push(StrokeRecord {
            stage: self.stage,
            evaluation,
            stage_score: self.scores.get(self.stage),
        });

        if evaluation.complete && evaluation.letter_complete {
            self.feedback.letter_complete(&self.letter);
            self.finish_stage();
        }
        Some(evaluation)
    }

    /// Pointer cancel or leave: the stroke is dropped unscored.
    pub fn pointer_cancel(&mut self) {
        if let Some(id) = self.active.take() {
            self.evaluator.cancel_stroke(id);
        }
    }

    // === Stage machine ===

    fn finish_stage(&mut self) {
        let next = self.stage.next();
        let until = self.clock.now() + self.params.transition_window();
        info!(
            "🏁 {} stage finished with score {:.1}, moving to {}",
            self.stage,
            self.scores.get(self.stage),
            next
        );
        self.feedback.stage_complete();
        self.transition = Some(PendingTransition { until, next });
    }

    fn poll_transition(&mut self) {
        let due = self
            .transition
            .is_some_and(|t| self.clock.now() >= t.until);
        if !due {
            return;
        }
        if let Some(t) = self.transition.take() {
            if t.next == Stage::Guided {
                self.feedback.stage_transition();
            }
            self.enter(t.next);
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.active = None;
        self.completed_paths = 0;

        match stage {
            Stage::Template | Stage::Guided => {
                let template = stage == Stage::Template;
                self.showing_instructions = true;
                self.evaluator.clear(template);
                self.feedback.reset_cooldown();
                self.feedback.stage_intro(template);
            }
            Stage::Complete => {
                self.showing_instructions = false;
                self.feedback.fanfare();
                self.complete();
            }
        }
    }

    fn complete(&mut self) {
        if self.completion_reported {
            return;
        }
        self.completion_reported = true;

        let score = final_score(
            self.scores.template(),
            self.scores.guided(),
            self.params.template_weight,
            self.params.guided_weight,
        );
        self.final_score = Some(score);
        info!(
            "🎉 Letter '{}' complete: template {:.1}, guided {:.1}, final {:.1}",
            self.letter,
            self.scores.template(),
            self.scores.guided(),
            score
        );

        if let Some(handler) = self.on_completion.as_mut() {
            handler(Stage::PRACTICE_STAGES, score);
        }
    }
}
