use super::coverage::{PathMatch, PathScorer, ScoringInput};
use crate::geometry::{resample, Point};
use rayon::prelude::*;

/// Dynamic time warping cost between two point sequences (Euclidean local cost).
pub fn dtw_distance(a: &[Point], b: &[Point]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return f32::INFINITY;
    }

    let m = b.len();
    let mut prev = vec![f32::INFINITY; m + 1];
    let mut curr = vec![f32::INFINITY; m + 1];
    prev[0] = 0.0;

    for pa in a {
        curr[0] = f32::INFINITY;
        for (j, pb) in b.iter().enumerate() {
            let cost = pa.distance_to(pb);
            let best = prev[j + 1].min(curr[j]).min(prev[j]);
            curr[j + 1] = cost + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m]
}

/// Maps a raw alignment distance onto 0..=100.
pub fn alignment_score(distance: f32, divisor: f32) -> f32 {
    (100.0 - distance / divisor).max(0.0)
}

/// Alignment matcher: stroke and each open path are resampled by arc length to the
/// same count, the smallest warping distance wins (lowest index on ties).
#[derive(Debug, Default, Clone, Copy)]
pub struct AlignmentScorer;

impl PathScorer for AlignmentScorer {
    fn name(&self) -> &'static str {
        "alignment"
    }

    fn select(&self, input: &ScoringInput) -> Option<PathMatch> {
        let n = input.params.alignment_samples;
        let stroke = resample(input.stroke, n);

        let open: Vec<_> = input.open_paths().collect();
        let distances: Vec<(usize, f32)> = open
            .par_iter()
            .map(|(idx, path)| (*idx, dtw_distance(&stroke, &resample(path.points(), n))))
            .collect();

        let (path_index, distance) = distances
            .into_iter()
            .fold(None, |best: Option<(usize, f32)>, (idx, d)| match best {
                Some((_, bd)) if d >= bd => best,
                _ => Some((idx, d)),
            })?;

        let score = alignment_score(distance, input.params.alignment_divisor);
        Some(PathMatch {
            path_index,
            score,
            complete: score >= input.params.completion_score,
        })
    }
}
