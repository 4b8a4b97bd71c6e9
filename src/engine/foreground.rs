use super::attempt::Attempt;
use super::protocol::{Inbound, Outbound};
use super::{
    scale_for, CoverageScorer, Deviation, EvaluatorKind, StrokeEvaluation, StrokeEvaluator,
    StrokeId,
};
use crate::config::Config;
use crate::error::TraceResult;
use crate::geometry::Point;
use crate::letters::ReferenceStore;
use crate::render::RenderSurface;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Synchronous evaluator: every call runs on the caller's thread and redraws the
/// surface before returning. Segment coverage is authoritative here.
pub struct ForegroundEvaluator {
    attempt: Attempt,
    surface: Box<dyn RenderSurface>,
}

impl ForegroundEvaluator {
    pub fn new(
        config: &Config,
        store: Arc<ReferenceStore>,
        surface: Box<dyn RenderSurface>,
    ) -> Self {
        let attempt = Attempt::new(
            store,
            config.matching.clone(),
            scale_for(config),
            Box::new(CoverageScorer),
        );
        Self { attempt, surface }
    }

    /// Same message shapes the background worker accepts.
    pub fn handle(&mut self, msg: Inbound) -> Vec<Outbound> {
        let out = self.attempt.apply(msg);
        self.present();
        out
    }

    pub fn coverage(&self) -> &[BTreeSet<usize>] {
        self.attempt.coverage()
    }

    pub fn completed_paths(&self) -> &BTreeSet<usize> {
        self.attempt.completed()
    }

    pub fn scorer_name(&self) -> &'static str {
        self.attempt.scorer_name()
    }

    fn present(&mut self) {
        let frame = self.attempt.frame();
        self.surface.present(&frame);
    }
}

impl StrokeEvaluator for ForegroundEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Foreground
    }

    fn set_letter(&mut self, letter: &str) -> TraceResult<()> {
        self.attempt.set_letter(letter)?;
        self.present();
        Ok(())
    }

    fn clear(&mut self, template_visible: bool) {
        self.attempt.clear(template_visible);
        self.present();
    }

    fn start_stroke(&mut self, point: Point) -> Option<StrokeId> {
        let id = StrokeId::fresh();
        if !self.attempt.start(id, point) {
            return None;
        }
        self.present();
        Some(id)
    }

    fn update_stroke(&mut self, id: StrokeId, point: Point) -> Vec<Deviation> {
        let deviation = self.attempt.update(id, point);
        self.present();
        deviation.into_iter().collect()
    }

    fn end_stroke(&mut self, id: StrokeId) -> Option<StrokeEvaluation> {
        let evaluation = self.attempt.end(id);
        self.present();
        evaluation
    }

    fn cancel_stroke(&mut self, id: StrokeId) {
        self.attempt.cancel(id);
        self.present();
    }
}
