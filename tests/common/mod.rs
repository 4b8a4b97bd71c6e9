#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tracewise::config::{Config, ExecutionForm};
use tracewise::engine::{
    BackgroundEvaluator, ForegroundEvaluator, StrokeEvaluation, StrokeEvaluator,
};
use tracewise::feedback::{FeedbackCoordinator, ManualClock, RecordingChannel};
use tracewise::geometry::{resample, Point};
use tracewise::letters::ReferenceStore;
use tracewise::render::{FrameRecorder, NullSurface};
use tracewise::session::PracticeSession;

pub fn store() -> Arc<ReferenceStore> {
    Arc::new(ReferenceStore::builtin())
}

/// `n` evenly spaced samples along path `idx` of letter A, 16 ms apart.
pub fn path_stroke(idx: usize, n: usize) -> Vec<Point> {
    let store = ReferenceStore::builtin();
    let glyph = store.get("A").expect("builtin A");
    timed(resample(glyph.paths[idx].points(), n))
}

/// Straight line from `a` to `b` with `n` samples.
pub fn line(a: (f32, f32), b: (f32, f32), n: usize) -> Vec<Point> {
    timed(resample(&[Point::new(a.0, a.1), Point::new(b.0, b.1)], n))
}

pub fn timed(points: Vec<Point>) -> Vec<Point> {
    points
        .into_iter()
        .enumerate()
        .map(|(i, p)| Point::at(p.x, p.y, i as u64 * 16))
        .collect()
}

pub fn scaled(points: &[Point], factor: f32) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::at(p.x * factor, p.y * factor, p.timestamp))
        .collect()
}

pub fn foreground(config: &Config) -> ForegroundEvaluator {
    ForegroundEvaluator::new(config, store(), Box::new(NullSurface))
}

pub fn foreground_with_recorder(config: &Config) -> (ForegroundEvaluator, FrameRecorder) {
    let recorder = FrameRecorder::new();
    let ev = ForegroundEvaluator::new(config, store(), Box::new(recorder.clone()));
    (ev, recorder)
}

pub fn background(config: &Config) -> BackgroundEvaluator {
    BackgroundEvaluator::spawn(config, store(), Box::new(NullSurface)).expect("spawn worker")
}

/// Runs a whole stroke through an evaluator.
pub fn trace(ev: &mut dyn StrokeEvaluator, points: &[Point]) -> Option<StrokeEvaluation> {
    let (first, rest) = points.split_first()?;
    let id = ev.start_stroke(*first)?;
    for p in rest {
        ev.update_stroke(id, *p);
    }
    ev.end_stroke(id)
}

pub struct Harness {
    pub session: PracticeSession,
    pub clock: ManualClock,
    pub channel: RecordingChannel,
    pub completions: Arc<Mutex<Vec<(usize, f32)>>>,
}

impl Harness {
    pub fn new(form: ExecutionForm) -> Self {
        let mut config = Config::default();
        config.session.execution = form;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_providers(config, |fb, channel| {
            fb.with_haptics(Box::new(channel.clone()))
                .with_tones(Box::new(channel.clone()))
                .with_speech(Box::new(channel.clone()))
        })
    }

    /// `attach` wires providers onto the coordinator; `channel` is the recorder
    /// the harness exposes.
    pub fn with_providers<F>(config: Config, attach: F) -> Self
    where
        F: FnOnce(FeedbackCoordinator, &RecordingChannel) -> FeedbackCoordinator,
    {
        let clock = ManualClock::new();
        let channel = RecordingChannel::new();
        let feedback = attach(
            FeedbackCoordinator::new(config.feedback.clone(), Arc::new(clock.clone())),
            &channel,
        );

        let evaluator = tracewise::engine::select_evaluator(
            &config,
            store(),
            Box::new(NullSurface),
        );

        let completions = Arc::new(Mutex::new(Vec::new()));
        let sink = completions.clone();
        let session =
            PracticeSession::new("A", store(), evaluator, feedback, config.session.clone())
                .expect("session")
                .on_completion(move |stages, score| sink.lock().unwrap().push((stages, score)));

        Self {
            session,
            clock,
            channel,
            completions,
        }
    }

    pub fn draw(&mut self, points: &[Point]) -> Option<StrokeEvaluation> {
        let (first, rest) = points.split_first()?;
        self.session.pointer_down(*first)?;
        for p in rest {
            self.session.pointer_move(*p);
        }
        self.session.pointer_up()
    }

    /// Traces all three paths of A.
    pub fn complete_letter(&mut self) {
        for idx in 0..3 {
            let ev = self.draw(&path_stroke(idx, 15)).expect("stroke accepted");
            assert!(ev.complete, "path {} should complete: {:?}", idx, ev);
        }
    }

    pub fn advance(&mut self, ms: u64) {
        self.clock
            .advance(std::time::Duration::from_millis(ms));
        self.session.tick();
    }
}
