use super::attempt::Attempt;
use super::protocol::{Inbound, Outbound};
use super::{
    scale_for, scorer_for, Deviation, EvaluatorKind, StrokeEvaluation, StrokeEvaluator, StrokeId,
};
use crate::config::Config;
use crate::error::{TraceError, TraceResult};
use crate::geometry::Point;
use crate::letters::ReferenceStore;
use crate::render::{NullSurface, RenderSurface};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

const REPLY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Evaluator whose stroke state and render surface live on a dedicated thread.
///
/// The caller side only keeps a mirror of which stroke is active and whether the
/// letter is done; everything else travels as [`Inbound`] / [`Outbound`] messages.
pub struct BackgroundEvaluator {
    tx: Option<Sender<Inbound>>,
    rx: Receiver<Outbound>,
    handle: Option<JoinHandle<()>>,
    store: Arc<ReferenceStore>,
    scorer: &'static str,
    active: Option<StrokeId>,
    letter_set: bool,
    letter_complete: bool,
}

impl BackgroundEvaluator {
    pub fn spawn(
        config: &Config,
        store: Arc<ReferenceStore>,
        surface: Box<dyn RenderSurface>,
    ) -> TraceResult<Self> {
        Self::try_spawn(config, store, surface).map_err(|(e, _)| e)
    }

    /// Like [`spawn`](Self::spawn) but hands the surface back when no thread could be started.
    pub(crate) fn try_spawn(
        config: &Config,
        store: Arc<ReferenceStore>,
        surface: Box<dyn RenderSurface>,
    ) -> Result<Self, (TraceError, Box<dyn RenderSurface>)> {
        let attempt = Attempt::new(
            store.clone(),
            config.matching.clone(),
            scale_for(config),
            scorer_for(config.session.background_matcher),
        );
        let scorer = attempt.scorer_name();

        // The surface is parked here until the worker claims it.
        let slot: Arc<Mutex<Option<Box<dyn RenderSurface>>>> = Arc::new(Mutex::new(Some(surface)));
        let worker_slot = slot.clone();

        let (in_tx, in_rx) = mpsc::channel::<Inbound>();
        let (out_tx, out_rx) = mpsc::channel::<Outbound>();

        let spawned = thread::Builder::new()
            .name("tracewise-stroke".into())
            .spawn(move || {
                let surface = worker_slot.lock().ok().and_then(|mut s| s.take());
                match surface {
                    Some(surface) => worker_loop(attempt, surface, in_rx, out_tx),
                    None => error!("Stroke worker started without a render surface"),
                }
            });

        match spawned {
            Ok(handle) => {
                let mut ev = Self {
                    tx: Some(in_tx),
                    rx: out_rx,
                    handle: Some(handle),
                    store,
                    scorer,
                    active: None,
                    letter_set: false,
                    letter_complete: false,
                };
                ev.send(Inbound::Init {
                    letter: None,
                    show_template: true,
                });
                Ok(ev)
            }
            Err(e) => {
                let err = TraceError::Worker(format!("failed to spawn stroke worker: {}", e));
                let surface = slot
                    .lock()
                    .ok()
                    .and_then(|mut s| s.take())
                    .unwrap_or_else(|| Box::new(NullSurface));
                Err((err, surface))
            }
        }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer
    }

    /// Blocks up to `timeout` for at least one deviation, then returns everything queued.
    pub fn wait_for_deviations(&mut self, timeout: Duration) -> Vec<Deviation> {
        let mut out = Vec::new();
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => self.absorb(msg, &mut out),
            Err(_) => return out,
        }
        self.drain_into(&mut out);
        out
    }

    fn send(&mut self, msg: Inbound) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(msg) {
            error!("Stroke worker is gone, dropping message: {:?}", e.0);
            self.tx = None;
        }
    }

    fn absorb(&mut self, msg: Outbound, out: &mut Vec<Deviation>) {
        match msg {
            Outbound::Deviation(d) => out.push(d),
            Outbound::Evaluation(ev) => {
                debug!("Late evaluation for stroke {} discarded", ev.stroke_id)
            }
            Outbound::Error { message } => warn!("Stroke worker: {}", message),
        }
    }

    fn drain_into(&mut self, out: &mut Vec<Deviation>) {
        while let Ok(msg) = self.rx.try_recv() {
            self.absorb(msg, out);
        }
    }
}

impl StrokeEvaluator for BackgroundEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Background
    }

    fn set_letter(&mut self, letter: &str) -> TraceResult<()> {
        self.store.require(letter)?;
        self.send(Inbound::SetLetter {
            letter: letter.to_string(),
        });
        self.letter_set = true;
        self.letter_complete = false;
        self.active = None;
        Ok(())
    }

    fn clear(&mut self, template_visible: bool) {
        self.send(Inbound::Clear {
            show_template: template_visible,
        });
        self.letter_complete = false;
        self.active = None;
    }

    fn start_stroke(&mut self, point: Point) -> Option<StrokeId> {
        if !self.letter_set || self.letter_complete {
            return None;
        }
        let id = StrokeId::fresh();
        self.active = Some(id);
        self.send(Inbound::StartStroke { id, point });
        Some(id)
    }

    fn update_stroke(&mut self, id: StrokeId, point: Point) -> Vec<Deviation> {
        // Stale ids still go through; the worker drops them.
        self.send(Inbound::UpdateStroke { id, point });
        let mut out = Vec::new();
        self.drain_into(&mut out);
        out
    }

    fn end_stroke(&mut self, id: StrokeId) -> Option<StrokeEvaluation> {
        if self.active != Some(id) {
            debug!("Stale stroke id {} dropped", id);
            return None;
        }
        self.active = None;
        self.send(Inbound::EndStroke { id });

        let deadline = Instant::now() + REPLY_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(Outbound::Evaluation(ev)) if ev.stroke_id == id => {
                    self.letter_complete = ev.letter_complete;
                    return Some(ev);
                }
                Ok(Outbound::Error { message }) => warn!("Stroke worker: {}", message),
                // Deviations of the stroke that just ended are no longer useful.
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {
                    error!("No evaluation for stroke {} within {:?}", id, REPLY_TIMEOUT);
                    return None;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    error!("Stroke worker disconnected while evaluating {}", id);
                    return None;
                }
            }
        }
    }

    fn cancel_stroke(&mut self, id: StrokeId) {
        if self.active == Some(id) {
            self.active = None;
        }
        self.send(Inbound::CancelStroke { id });
    }
}

impl Drop for BackgroundEvaluator {
    fn drop(&mut self) {
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Stroke worker panicked");
            }
        }
    }
}

fn worker_loop(
    mut attempt: Attempt,
    mut surface: Box<dyn RenderSurface>,
    rx: Receiver<Inbound>,
    tx: Sender<Outbound>,
) {
    while let Ok(msg) = rx.recv() {
        for out in attempt.apply(msg) {
            if tx.send(out).is_err() {
                return;
            }
        }
        surface.present(&attempt.frame());
    }
    debug!("Stroke worker shutting down");
}
