use crate::config::MatchParams;
use crate::geometry::{is_point_near_segment, Point};
use crate::letters::{LetterGlyph, ReferencePath};
use std::collections::BTreeSet;

/// Everything a scorer may look at once a stroke has been accepted.
/// `stroke` is already in logical units and `coverage` already includes this stroke.
pub struct ScoringInput<'a> {
    pub glyph: &'a LetterGlyph,
    pub stroke: &'a [Point],
    pub coverage: &'a [BTreeSet<usize>],
    pub completed: &'a BTreeSet<usize>,
    pub params: &'a MatchParams,
}

impl ScoringInput<'_> {
    /// Indices of paths still eligible for matching, ascending.
    pub fn open_paths(&self) -> impl Iterator<Item = (usize, &ReferencePath)> + '_ {
        self.glyph
            .paths
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.completed.contains(idx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathMatch {
    pub path_index: usize,
    /// 0..=100
    pub score: f32,
    pub complete: bool,
}

/// Picks the reference path a finished stroke belongs to.
pub trait PathScorer: Send + Sync {
    fn name(&self) -> &'static str;
    fn select(&self, input: &ScoringInput) -> Option<PathMatch>;
}

/// Segments of `path` with at least one stroke point strictly within `threshold`.
pub fn segments_touched(stroke: &[Point], path: &ReferencePath, threshold: f32) -> BTreeSet<usize> {
    path.segments()
        .filter(|(_, a, b)| {
            stroke
                .iter()
                .any(|p| is_point_near_segment(p, a, b, threshold))
        })
        .map(|(idx, _, _)| idx)
        .collect()
}

pub fn coverage_fraction(covered: &BTreeSet<usize>, path: &ReferencePath) -> f32 {
    let total = path.segment_count();
    if total == 0 {
        return 0.0;
    }
    covered.len() as f32 / total as f32
}

/// Segment-coverage matcher. Highest covered fraction wins, lowest index on ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoverageScorer;

impl PathScorer for CoverageScorer {
    fn name(&self) -> &'static str {
        "coverage"
    }

    fn select(&self, input: &ScoringInput) -> Option<PathMatch> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, path) in input.open_paths() {
            let fraction = input
                .coverage
                .get(idx)
                .map(|covered| coverage_fraction(covered, path))
                .unwrap_or(0.0);
            match best {
                Some((_, f)) if fraction <= f => {}
                _ => best = Some((idx, fraction)),
            }
        }

        let (path_index, fraction) = best.filter(|&(_, f)| f > 0.0)?;
        Some(PathMatch {
            path_index,
            score: fraction * 100.0,
            complete: fraction >= input.params.coverage_threshold,
        })
    }
}
