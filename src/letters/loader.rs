use super::{LetterGlyph, ReferencePath, ReferenceStore};
use crate::error::{TraceError, TraceResult};
use crate::geometry::Point;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Reads `letter,path,x,y` rows (with header). Points keep file order within a path.
pub fn load_letters<R: Read>(reader: R) -> TraceResult<ReferenceStore> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // letter -> path index -> points
    let mut grouped: BTreeMap<String, BTreeMap<usize, Vec<Point>>> = BTreeMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut row_idx = 0;

    for result in rdr.records() {
        row_idx += 1;
        let rec = result?;
        if rec.len() < 4 {
            return Err(TraceError::Validation(format!(
                "row {}: expected letter,path,x,y",
                row_idx
            )));
        }

        let letter = rec[0].to_string();
        if letter.is_empty() {
            return Err(TraceError::Validation(format!("row {}: empty letter", row_idx)));
        }
        let path: usize = rec[1].parse().map_err(|_| {
            TraceError::Validation(format!("row {}: bad path index '{}'", row_idx, &rec[1]))
        })?;
        let x: f32 = rec[2].parse().map_err(|_| {
            TraceError::Validation(format!("row {}: bad x '{}'", row_idx, &rec[2]))
        })?;
        let y: f32 = rec[3].parse().map_err(|_| {
            TraceError::Validation(format!("row {}: bad y '{}'", row_idx, &rec[3]))
        })?;

        if !grouped.contains_key(&letter) {
            order.push(letter.clone());
        }
        grouped
            .entry(letter)
            .or_default()
            .entry(path)
            .or_default()
            .push(Point::new(x, y));
    }

    let mut glyphs = Vec::with_capacity(order.len());
    for letter in order {
        let paths_by_index = grouped.remove(&letter).unwrap_or_default();
        let mut paths = Vec::with_capacity(paths_by_index.len());
        for (expected, (idx, points)) in paths_by_index.into_iter().enumerate() {
            if idx != expected {
                return Err(TraceError::Validation(format!(
                    "letter '{}': path indices must be contiguous from 0 (missing {})",
                    letter, expected
                )));
            }
            paths.push(ReferencePath::new(points).map_err(|e| {
                TraceError::Validation(format!("letter '{}' path {}: {}", letter, idx, e))
            })?);
        }
        debug!("   Loaded letter '{}' with {} paths", letter, paths.len());
        glyphs.push(LetterGlyph { letter, paths });
    }

    ReferenceStore::from_glyphs(glyphs)
}

pub fn load_letters_from_file<P: AsRef<Path>>(path: P) -> TraceResult<ReferenceStore> {
    let path = path.as_ref();
    info!("📚 Loading reference letters from {}", path.display());
    let file = File::open(path)?;
    load_letters(file)
}

impl ReferenceStore {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TraceResult<Self> {
        load_letters_from_file(path)
    }
}
