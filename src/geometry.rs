pub mod classify;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// One pointer sample in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    /// Monotonic milliseconds.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            timestamp: 0,
            pressure: None,
        }
    }

    pub fn at(x: f32, y: f32, timestamp: u64) -> Self {
        Self {
            x,
            y,
            timestamp,
            pressure: None,
        }
    }

    #[inline(always)]
    pub fn distance_to(&self, other: &Point) -> f32 {
        euclidean_dist(self.x, self.y, other.x, other.y)
    }
}

/// Corrective direction toward the nearest open reference path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Dominant axis of the vector `(dx, dy)` in screen coordinates (y grows down).
    pub fn dominant(dx: f32, dy: f32) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub fn word(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Maps between the rendered surface and the 300x300 logical authoring space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceScale {
    factor: f32,
}

impl SurfaceScale {
    pub fn new(rendered_size: f32, logical_size: f32) -> Self {
        let factor = if rendered_size > 0.0 && logical_size > 0.0 {
            rendered_size / logical_size
        } else {
            1.0
        };
        Self { factor }
    }

    pub fn identity() -> Self {
        Self { factor: 1.0 }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn to_logical(&self, p: &Point) -> Point {
        Point {
            x: p.x / self.factor,
            y: p.y / self.factor,
            ..*p
        }
    }

    pub fn to_surface(&self, p: &Point) -> Point {
        Point {
            x: p.x * self.factor,
            y: p.y * self.factor,
            ..*p
        }
    }

    /// A logical-space length expressed in surface pixels.
    pub fn length_to_surface(&self, logical: f32) -> f32 {
        logical * self.factor
    }
}

#[inline(always)]
pub fn euclidean_dist(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}

/// Clamped projection parameter of `p` onto `a -> b`, or `None` for a zero-length segment.
#[inline(always)]
fn projection(p: &Point, a: &Point, b: &Point) -> Option<f32> {
    let sx = b.x - a.x;
    let sy = b.y - a.y;
    let len_sq = sx * sx + sy * sy;
    if len_sq == 0.0 {
        return None;
    }
    let t = ((p.x - a.x) * sx + (p.y - a.y) * sy) / len_sq;
    Some(t.clamp(0.0, 1.0))
}

/// Distance from `p` to the segment `a -> b`. Infinite for a degenerate segment.
pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f32 {
    match projection(p, a, b) {
        Some(t) => {
            let cx = a.x + t * (b.x - a.x);
            let cy = a.y + t * (b.y - a.y);
            euclidean_dist(p.x, p.y, cx, cy)
        }
        None => f32::INFINITY,
    }
}

/// Closest point to `p` on `a -> b`. A degenerate segment yields `a`.
pub fn closest_point_on_segment(p: &Point, a: &Point, b: &Point) -> Point {
    match projection(p, a, b) {
        Some(t) => Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)),
        None => Point::new(a.x, a.y),
    }
}

pub fn is_point_near_segment(p: &Point, a: &Point, b: &Point, threshold: f32) -> bool {
    distance_to_segment(p, a, b) < threshold
}

pub fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Resamples a polyline to `n` points evenly spaced along its arc length.
pub fn resample(points: &[Point], n: usize) -> Vec<Point> {
    if points.len() < 2 || n < 2 {
        return points.to_vec();
    }

    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0f32);
    for w in points.windows(2) {
        let last = cumulative[cumulative.len() - 1];
        cumulative.push(last + w[0].distance_to(&w[1]));
    }
    let total = cumulative[cumulative.len() - 1];
    if total < 1e-6 {
        return vec![points[0]; n];
    }

    let mut out = Vec::with_capacity(n);
    let mut j = 1;
    for i in 0..n {
        let target = (i as f32 / (n - 1) as f32) * total;
        while j < cumulative.len() - 1 && cumulative[j] < target {
            j += 1;
        }
        let span = (cumulative[j] - cumulative[j - 1]).max(1e-6);
        let t = ((target - cumulative[j - 1]) / span).clamp(0.0, 1.0);
        let a = &points[j - 1];
        let b = &points[j];
        out.push(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)));
    }
    out
}
