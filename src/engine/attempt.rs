use super::coverage::{segments_touched, PathScorer, ScoringInput};
use super::protocol::{Inbound, Outbound};
use super::{Deviation, StrokeEvaluation, StrokeId};
use crate::config::MatchParams;
use crate::error::TraceResult;
use crate::geometry::classify::classify_against_reference;
use crate::geometry::{polyline_length, Point, SurfaceScale};
use crate::letters::{LetterGlyph, ReferenceStore};
use crate::render::{DeviationMarker, Frame, OverlayPath};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

struct LiveStroke {
    id: StrokeId,
    points: Vec<Point>,
}

/// Per-attempt evaluation state. Both execution forms drive one of these; the
/// background form simply owns it on another thread.
pub(crate) struct Attempt {
    store: Arc<ReferenceStore>,
    params: MatchParams,
    scale: SurfaceScale,
    scorer: Box<dyn PathScorer>,

    glyph: Option<LetterGlyph>,
    template_visible: bool,
    live: Option<LiveStroke>,
    finished: Vec<Vec<Point>>,
    coverage: Vec<BTreeSet<usize>>,
    completed: BTreeSet<usize>,
    deviation: Option<DeviationMarker>,
}

impl Attempt {
    pub fn new(
        store: Arc<ReferenceStore>,
        params: MatchParams,
        scale: SurfaceScale,
        scorer: Box<dyn PathScorer>,
    ) -> Self {
        Self {
            store,
            params,
            scale,
            scorer,
            glyph: None,
            template_visible: true,
            live: None,
            finished: Vec::new(),
            coverage: Vec::new(),
            completed: BTreeSet::new(),
            deviation: None,
        }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    pub fn set_letter(&mut self, letter: &str) -> TraceResult<()> {
        let glyph = self.store.require(letter)?.clone();
        debug!(
            "Attempt letter set to '{}' ({} paths)",
            glyph.letter,
            glyph.path_count()
        );
        self.glyph = Some(glyph);
        self.clear(self.template_visible);
        Ok(())
    }

    pub fn clear(&mut self, template_visible: bool) {
        self.template_visible = template_visible;
        self.live = None;
        self.finished.clear();
        self.completed.clear();
        self.deviation = None;
        let paths = self.glyph.as_ref().map_or(0, |g| g.path_count());
        self.coverage = vec![BTreeSet::new(); paths];
    }

    pub fn letter_complete(&self) -> bool {
        self.glyph
            .as_ref()
            .is_some_and(|g| self.completed.len() == g.path_count())
    }

    pub fn coverage(&self) -> &[BTreeSet<usize>] {
        &self.coverage
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    /// Opens a stroke under `id`, replacing any stroke still live.
    pub fn start(&mut self, id: StrokeId, point: Point) -> bool {
        if self.glyph.is_none() {
            debug!("Stroke {} ignored: no letter selected", id);
            return false;
        }
        if self.letter_complete() {
            debug!("Stroke {} ignored: letter already complete", id);
            return false;
        }
        if let Some(prev) = self.live.take() {
            debug!("Stroke {} supersedes unfinished stroke {}", id, prev.id);
        }
        self.deviation = None;
        self.live = Some(LiveStroke {
            id,
            points: vec![point],
        });
        true
    }

    fn live_mut(&mut self, id: StrokeId) -> Option<&mut LiveStroke> {
        match self.live.as_mut() {
            Some(live) if live.id == id => Some(live),
            _ => {
                debug!("Stale stroke id {} dropped", id);
                None
            }
        }
    }

    /// Appends a point; off-path points outside the template stage yield a deviation.
    pub fn update(&mut self, id: StrokeId, point: Point) -> Option<Deviation> {
        self.live_mut(id)?.points.push(point);

        let glyph = self.glyph.as_ref()?;
        let class = classify_against_reference(
            &point,
            glyph,
            &self.completed,
            self.template_visible,
            self.params.on_path_threshold,
            &self.scale,
        );

        match class.direction {
            Some(direction) if !class.on_path => {
                self.deviation = Some(DeviationMarker { point, direction });
                Some(Deviation {
                    point,
                    direction,
                    distance: class.distance,
                })
            }
            _ => {
                self.deviation = None;
                None
            }
        }
    }

    pub fn cancel(&mut self, id: StrokeId) {
        if self.live_mut(id).is_some() {
            self.live = None;
            self.deviation = None;
        }
    }

    pub fn end(&mut self, id: StrokeId) -> Option<StrokeEvaluation> {
        let stroke = match self.live.take() {
            Some(live) if live.id == id => live,
            other => {
                self.live = other;
                debug!("Stale stroke id {} dropped", id);
                return None;
            }
        };
        self.deviation = None;

        let logical: Vec<Point> = stroke
            .points
            .iter()
            .map(|p| self.scale.to_logical(p))
            .collect();
        self.finished.push(stroke.points);

        let length = polyline_length(&logical);
        if logical.len() < self.params.min_stroke_points || length < self.params.min_stroke_length {
            debug!(
                "Stroke {} rejected: {} points, length {:.1}",
                id,
                logical.len(),
                length
            );
            return Some(StrokeEvaluation::rejected(id));
        }

        let glyph = self.glyph.as_ref()?;
        for (idx, path) in glyph.paths.iter().enumerate() {
            if self.completed.contains(&idx) {
                continue;
            }
            let touched = segments_touched(&logical, path, self.params.on_path_threshold);
            if let Some(set) = self.coverage.get_mut(idx) {
                set.extend(touched);
            }
        }

        let found = self.scorer.select(&ScoringInput {
            glyph,
            stroke: &logical,
            coverage: &self.coverage,
            completed: &self.completed,
            params: &self.params,
        });

        let Some(found) = found else {
            debug!("Stroke {} matched no open path", id);
            return Some(StrokeEvaluation::rejected(id));
        };

        if found.complete {
            self.completed.insert(found.path_index);
            info!(
                "✅ Path {} of '{}' complete (score {:.1}, {}/{} paths)",
                found.path_index,
                glyph.letter,
                found.score,
                self.completed.len(),
                glyph.path_count()
            );
        }

        Some(StrokeEvaluation {
            stroke_id: id,
            score: found.score,
            complete: found.complete,
            path_index: Some(found.path_index),
            letter_complete: self.letter_complete(),
        })
    }

    /// Applies one protocol message, returning whatever it produces.
    pub fn apply(&mut self, msg: Inbound) -> Vec<Outbound> {
        let mut out = Vec::new();
        match msg {
            Inbound::Init {
                letter,
                show_template,
            } => {
                self.clear(show_template);
                if let Some(letter) = letter {
                    if let Err(e) = self.set_letter(&letter) {
                        out.push(Outbound::Error {
                            message: e.to_string(),
                        });
                    }
                }
            }
            Inbound::StartStroke { id, point } => {
                self.start(id, point);
            }
            Inbound::UpdateStroke { id, point } => {
                out.extend(self.update(id, point).map(Outbound::Deviation));
            }
            Inbound::EndStroke { id } => {
                out.extend(self.end(id).map(Outbound::Evaluation));
            }
            Inbound::CancelStroke { id } => self.cancel(id),
            Inbound::Clear { show_template } => self.clear(show_template),
            Inbound::SetLetter { letter } => {
                if let Err(e) = self.set_letter(&letter) {
                    out.push(Outbound::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
        out
    }

    /// Snapshot for the render surface, in surface coordinates.
    pub fn frame(&self) -> Frame {
        let overlay = match (&self.glyph, self.template_visible) {
            (Some(glyph), true) => glyph
                .paths
                .iter()
                .enumerate()
                .map(|(idx, path)| OverlayPath {
                    points: path.points().iter().map(|p| self.scale.to_surface(p)).collect(),
                    visible: !self.completed.contains(&idx),
                })
                .collect(),
            _ => Vec::new(),
        };

        Frame {
            completed_strokes: self.finished.clone(),
            current_stroke: self
                .live
                .as_ref()
                .map(|l| l.points.clone())
                .unwrap_or_default(),
            overlay,
            deviation: self.deviation,
        }
    }
}
