use super::{closest_point_on_segment, distance_to_segment, Direction, Point, SurfaceScale};
use crate::letters::LetterGlyph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub on_path: bool,
    /// Surface pixels to the nearest open segment.
    pub distance: f32,
    pub direction: Option<Direction>,
}

impl Classification {
    pub fn on_template() -> Self {
        Self {
            on_path: true,
            distance: 0.0,
            direction: None,
        }
    }
}

/// Classifies a surface point against every path of `glyph` not yet in `completed`.
///
/// `threshold` is in logical units; the point is mapped into logical space before
/// comparison. While tracing a visible template nothing is ever off path.
pub fn classify_against_reference(
    point: &Point,
    glyph: &LetterGlyph,
    completed: &BTreeSet<usize>,
    template_stage: bool,
    threshold: f32,
    scale: &SurfaceScale,
) -> Classification {
    if template_stage {
        return Classification::on_template();
    }

    let p = scale.to_logical(point);
    let mut min_distance = f32::INFINITY;
    let mut nearest: Option<(Point, Point)> = None;

    for (path_idx, path) in glyph.paths.iter().enumerate() {
        if completed.contains(&path_idx) {
            continue;
        }
        for (_, a, b) in path.segments() {
            let d = distance_to_segment(&p, a, b);
            if d < min_distance {
                min_distance = d;
                nearest = Some((*a, *b));
            }
        }
    }

    let on_path = min_distance <= threshold;
    let direction = match nearest {
        Some((a, b)) if !on_path => {
            let target = closest_point_on_segment(&p, &a, &b);
            Some(Direction::dominant(target.x - p.x, target.y - p.y))
        }
        _ => None,
    };

    Classification {
        on_path,
        distance: scale.length_to_surface(min_distance),
        direction,
    }
}
