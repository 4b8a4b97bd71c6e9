use crate::reports;
use clap::Args;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::sync::{Arc, Mutex};
use tracewise::config::Config;
use tracewise::engine::select_evaluator;
use tracewise::error::{TraceError, TraceResult};
use tracewise::feedback::{FeedbackCoordinator, LogChannel, ManualClock};
use tracewise::geometry::Point;
use tracewise::letters::ReferenceStore;
use tracewise::render::ascii::rasterize;
use tracewise::render::FrameRecorder;
use tracewise::session::PracticeSession;
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub config: Config,

    /// Recorded input: `event,x,y,t` rows.
    #[arg(short, long)]
    pub events: String,

    #[arg(long, default_value = "A")]
    pub letter: String,

    #[arg(long, default_value_t = 40)]
    pub cols: usize,

    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EventKind {
    Down,
    Move,
    Up,
    Cancel,
    Ack,
    Reset,
    Tick,
}

#[derive(Debug, Clone, Deserialize)]
struct EventRow {
    event: EventKind,
    x: Option<f32>,
    y: Option<f32>,
    t: u64,
}

impl EventRow {
    fn point(&self, row: usize) -> TraceResult<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Ok(Point::at(x, y, self.t)),
            _ => Err(TraceError::Validation(format!(
                "event row {}: {:?} needs x and y",
                row, self.event
            ))),
        }
    }
}

fn load_events<R: Read>(reader: R) -> TraceResult<Vec<EventRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn run(args: &ReplayArgs, config: Config, store: Arc<ReferenceStore>) -> TraceResult<()> {
    info!("📂 Loading events: {}", args.events);
    let events = load_events(File::open(&args.events)?)?;
    info!("   {} events", events.len());

    let clock = ManualClock::new();
    let feedback = FeedbackCoordinator::new(config.feedback.clone(), Arc::new(clock.clone()))
        .with_haptics(Box::new(LogChannel))
        .with_tones(Box::new(LogChannel))
        .with_speech(Box::new(LogChannel));

    let recorder = FrameRecorder::new();
    let evaluator = select_evaluator(&config, store.clone(), Box::new(recorder.clone()));

    let outcome: Arc<Mutex<Option<(usize, f32)>>> = Arc::new(Mutex::new(None));
    let sink = outcome.clone();
    let mut session = PracticeSession::new(
        &args.letter,
        store,
        evaluator,
        feedback,
        config.session.clone(),
    )?
    .on_completion(move |stages, score| {
        if let Ok(mut slot) = sink.lock() {
            *slot = Some((stages, score));
        }
    });

    for (i, ev) in events.iter().enumerate() {
        let row = i + 1;
        clock.set_millis(ev.t);
        match ev.event {
            EventKind::Down => {
                if session.pointer_down(ev.point(row)?).is_none() {
                    debug!("row {}: pointer down not accepted", row);
                }
            }
            EventKind::Move => {
                session.pointer_move(ev.point(row)?);
            }
            EventKind::Up => {
                session.pointer_up();
            }
            EventKind::Cancel => session.pointer_cancel(),
            EventKind::Ack => session.acknowledge_instructions(),
            EventKind::Reset => session.reset(),
            EventKind::Tick => session.tick(),
        }
    }
    session.tick();

    reports::print_stroke_table(session.history());
    reports::print_session_summary(
        session.letter(),
        session.evaluator_kind(),
        session.stage(),
        session.scores(),
        session.final_score(),
    );
    if let Ok(slot) = outcome.lock() {
        if let Some((stages, score)) = *slot {
            println!("Completion reported: {} stages, final score {:.1}", stages, score);
        }
    }

    // Joins a background worker so the recorder holds its last frame.
    drop(session);

    if let Some(frame) = recorder.last_frame() {
        let lines = rasterize(&frame, config.session.surface_size, args.cols, args.rows);
        reports::print_frame(&lines);
    }
    Ok(())
}
