use crate::engine::StrokeEvaluation;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Template,
    Guided,
    Complete,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Template => Stage::Guided,
            Stage::Guided | Stage::Complete => Stage::Complete,
        }
    }

    /// Number of practice stages an attempt goes through.
    pub const PRACTICE_STAGES: usize = 2;
}

/// Running per-stage scores. The first completed stroke sets a stage's score,
/// every later one is averaged with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageScores {
    template: Option<f32>,
    guided: Option<f32>,
}

impl StageScores {
    fn slot(&mut self, stage: Stage) -> Option<&mut Option<f32>> {
        match stage {
            Stage::Template => Some(&mut self.template),
            Stage::Guided => Some(&mut self.guided),
            Stage::Complete => None,
        }
    }

    pub fn fold(&mut self, stage: Stage, score: f32) {
        if let Some(slot) = self.slot(stage) {
            *slot = Some(match *slot {
                Some(prev) => (prev + score) / 2.0,
                None => score,
            });
        }
    }

    pub fn get(&self, stage: Stage) -> f32 {
        match stage {
            Stage::Template => self.template.unwrap_or(0.0),
            Stage::Guided => self.guided.unwrap_or(0.0),
            Stage::Complete => 0.0,
        }
    }

    pub fn reset(&mut self, stage: Stage) {
        if let Some(slot) = self.slot(stage) {
            *slot = None;
        }
    }

    pub fn template(&self) -> f32 {
        self.get(Stage::Template)
    }

    pub fn guided(&self) -> f32 {
        self.get(Stage::Guided)
    }
}

pub fn final_score(template: f32, guided: f32, template_weight: f32, guided_weight: f32) -> f32 {
    template_weight * template + guided_weight * guided
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingTransition {
    pub until: Duration,
    pub next: Stage,
}

/// One finished stroke as the session saw it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeRecord {
    pub stage: Stage,
    pub evaluation: StrokeEvaluation,
    /// Stage score right after this stroke.
    pub stage_score: f32,
}
