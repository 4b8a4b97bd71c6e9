use crate::reports::{self, ComparisonRow, FormRun};
use clap::Args;
use std::sync::Arc;
use tracewise::config::{Config, ExecutionForm};
use tracewise::engine::select_evaluator;
use tracewise::error::TraceResult;
use tracewise::feedback::{FeedbackCoordinator, ManualClock, RecordingChannel};
use tracewise::geometry::{resample, Point, SurfaceScale};
use tracewise::letters::ReferenceStore;
use tracewise::render::NullSurface;
use tracewise::session::{PracticeSession, Stage};
use tracing::info;

/// Milliseconds between synthetic samples.
const SAMPLE_INTERVAL_MS: u64 = 16;

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(long, default_value = "A")]
    pub letter: String,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Maximum per-axis jitter, in surface pixels.
    #[arg(long, default_value_t = 2.0)]
    pub jitter: f32,

    /// Samples per synthetic stroke.
    #[arg(long, default_value_t = 15)]
    pub points: usize,
}

/// One canonical stroke per reference path, per stage, in surface coordinates.
fn synthesize(
    store: &ReferenceStore,
    config: &Config,
    args: &DemoArgs,
) -> TraceResult<Vec<Vec<Vec<Point>>>> {
    let glyph = store.require(&args.letter)?;
    let scale = SurfaceScale::new(config.session.surface_size, config.matching.logical_size);
    let mut rng = match args.seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };

    let stages = (0..Stage::PRACTICE_STAGES)
        .map(|_| {
            glyph
                .paths
                .iter()
                .map(|path| {
                    resample(path.points(), args.points)
                        .iter()
                        .map(|p| {
                            let s = scale.to_surface(p);
                            let jx = (rng.f32() * 2.0 - 1.0) * args.jitter;
                            let jy = (rng.f32() * 2.0 - 1.0) * args.jitter;
                            Point::new(s.x + jx, s.y + jy)
                        })
                        .collect()
                })
                .collect()
        })
        .collect();
    Ok(stages)
}

fn run_form(
    form: ExecutionForm,
    config: &Config,
    store: Arc<ReferenceStore>,
    letter: &str,
    strokes: &[Vec<Vec<Point>>],
) -> TraceResult<FormRun> {
    let mut config = config.clone();
    config.session.execution = form;

    let clock = ManualClock::new();
    let channel = RecordingChannel::new();
    let feedback = FeedbackCoordinator::new(config.feedback.clone(), Arc::new(clock.clone()))
        .with_haptics(Box::new(channel.clone()))
        .with_tones(Box::new(channel.clone()))
        .with_speech(Box::new(channel.clone()));

    let evaluator = select_evaluator(&config, store.clone(), Box::new(NullSurface));
    let kind = evaluator.kind();
    let mut session =
        PracticeSession::new(letter, store, evaluator, feedback, config.session.clone())?;

    let mut now = 0;
    for stage_strokes in strokes {
        session.acknowledge_instructions();
        for stroke in stage_strokes {
            let mut samples = stroke.iter();
            let Some(first) = samples.next() else {
                continue;
            };
            session.pointer_down(Point::at(first.x, first.y, now));
            for p in samples {
                now += SAMPLE_INTERVAL_MS;
                clock.set_millis(now);
                session.pointer_move(Point::at(p.x, p.y, now));
            }
            session.pointer_up();
        }
        now += config.session.transition_ms + 1;
        clock.set_millis(now);
        session.tick();
    }

    Ok(FormRun {
        kind,
        history: session.history().to_vec(),
        scores: session.scores(),
        final_score: session.final_score(),
        cues: channel.events().len(),
    })
}

pub fn run(args: &DemoArgs, config: Config, store: Arc<ReferenceStore>) -> TraceResult<()> {
    let strokes = synthesize(&store, &config, args)?;
    info!(
        "✍️  Synthesized {} strokes per stage for '{}'",
        strokes.first().map_or(0, |s| s.len()),
        args.letter
    );

    let fg = run_form(
        ExecutionForm::Foreground,
        &config,
        store.clone(),
        &args.letter,
        &strokes,
    )?;
    let bg = run_form(
        ExecutionForm::Background,
        &config,
        store,
        &args.letter,
        &strokes,
    )?;

    let rows: Vec<ComparisonRow> = fg
        .history
        .iter()
        .zip(bg.history.iter())
        .map(|(a, b)| ComparisonRow {
            stage: a.stage,
            path: a.evaluation.path_index,
            fg_score: a.evaluation.score,
            fg_complete: a.evaluation.complete,
            bg_score: b.evaluation.score,
            bg_complete: b.evaluation.complete,
        })
        .collect();

    reports::print_comparison(&rows);
    reports::print_form_summary(&[&fg, &bg]);

    let agree = rows.iter().all(|r| r.fg_complete == r.bg_complete)
        && fg.history.len() == bg.history.len();
    if agree {
        println!("✅ Forms agree on every completion decision");
    } else {
        println!("⚠️  Forms disagree on at least one completion decision");
    }
    Ok(())
}
