pub mod loader;

use crate::error::{TraceError, TraceResult};
use crate::geometry::{polyline_length, Point};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Ideal geometry of one stroke, in logical units.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePath {
    points: Vec<Point>,
}

impl ReferencePath {
    pub fn new(points: Vec<Point>) -> TraceResult<Self> {
        if points.len() < 2 {
            return Err(TraceError::Validation(format!(
                "reference path needs at least 2 control points, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// `(index, start, end)` for every segment.
    pub fn segments(&self) -> impl Iterator<Item = (usize, &Point, &Point)> {
        self.points
            .windows(2)
            .enumerate()
            .map(|(i, w)| (i, &w[0], &w[1]))
    }

    pub fn length(&self) -> f32 {
        polyline_length(&self.points)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetterGlyph {
    pub letter: String,
    pub paths: Vec<ReferencePath>,
}

impl LetterGlyph {
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }
}

/// Letters shipped with the engine.
#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
pub enum BuiltinLetter {
    A,
}

impl BuiltinLetter {
    /// Control points in the 300x300 authoring space, one array per stroke.
    pub fn control_points(&self) -> &'static [&'static [(f32, f32)]] {
        match self {
            Self::A => &[
                // Left diagonal, bottom-left up to the apex
                &[(100.0, 200.0), (125.0, 125.0), (150.0, 50.0)],
                // Right diagonal, apex down to bottom-right
                &[(150.0, 50.0), (175.0, 125.0), (200.0, 200.0)],
                // Crossbar
                &[(115.0, 140.0), (150.0, 140.0), (185.0, 140.0)],
            ],
        }
    }

    pub fn glyph(&self) -> LetterGlyph {
        let paths = self
            .control_points()
            .iter()
            .map(|pts| ReferencePath {
                points: pts.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            })
            .collect();
        LetterGlyph {
            letter: self.to_string(),
            paths,
        }
    }
}

/// Read-only map from letter to its ordered reference paths.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    letters: BTreeMap<String, LetterGlyph>,
}

fn normalize_key(letter: &str) -> String {
    letter.trim().to_uppercase()
}

impl ReferenceStore {
    pub fn builtin() -> Self {
        let letters = BuiltinLetter::iter()
            .map(|b| {
                let glyph = b.glyph();
                (normalize_key(&glyph.letter), glyph)
            })
            .collect();
        Self { letters }
    }

    pub fn from_glyphs(glyphs: Vec<LetterGlyph>) -> TraceResult<Self> {
        let mut letters = BTreeMap::new();
        for glyph in glyphs {
            if glyph.paths.is_empty() {
                return Err(TraceError::Validation(format!(
                    "letter '{}' has no reference paths",
                    glyph.letter
                )));
            }
            letters.insert(normalize_key(&glyph.letter), glyph);
        }
        Ok(Self { letters })
    }

    /// Letters in `other` replace letters of the same name.
    pub fn merge(mut self, other: ReferenceStore) -> Self {
        self.letters.extend(other.letters);
        self
    }

    pub fn get(&self, letter: &str) -> Option<&LetterGlyph> {
        self.letters.get(&normalize_key(letter))
    }

    pub fn require(&self, letter: &str) -> TraceResult<&LetterGlyph> {
        self.get(letter)
            .ok_or_else(|| TraceError::UnknownLetter(letter.to_string()))
    }

    pub fn contains(&self, letter: &str) -> bool {
        self.get(letter).is_some()
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &LetterGlyph> {
        self.letters.values()
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}
