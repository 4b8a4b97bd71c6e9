pub mod ascii;

use crate::geometry::{Direction, Point};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// One reference path as drawn on the surface (surface coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPath {
    pub points: Vec<Point>,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationMarker {
    pub point: Point,
    pub direction: Direction,
}

/// Everything the surface needs to redraw after a mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub completed_strokes: Vec<Vec<Point>>,
    pub current_stroke: Vec<Point>,
    /// Empty outside the template stage.
    pub overlay: Vec<OverlayPath>,
    pub deviation: Option<DeviationMarker>,
}

/// Receives redraw requests. `Send` so a surface can be handed to the background evaluator.
pub trait RenderSurface: Send {
    fn present(&mut self, frame: &Frame);
}

#[derive(Debug, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn present(&mut self, _frame: &Frame) {}
}

#[derive(Debug, Default)]
struct RecorderState {
    last: Option<Frame>,
    count: usize,
}

/// Keeps the most recent frame behind a shared handle. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    state: Arc<Mutex<RecorderState>>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.state.lock().ok().and_then(|s| s.last.clone())
    }

    pub fn frame_count(&self) -> usize {
        self.state.lock().map(|s| s.count).unwrap_or(0)
    }
}

impl RenderSurface for FrameRecorder {
    fn present(&mut self, frame: &Frame) {
        if let Ok(mut s) = self.state.lock() {
            s.last = Some(frame.clone());
            s.count += 1;
        }
    }
}
