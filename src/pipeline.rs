use std::{fmt, rc::Rc};

use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};

use crate::{
    capture::{InputCapture, InputEvent, SealedPath},
    config::{GestureConfig, ThresholdConfig},
    direction::DirectionFallback,
    dispatch::{ActionBinding, ActionDispatcher, DispatchDecision},
    error::GestureError,
    recognition::RecognitionEngine,
    types::{GestureResult, Point, SessionId},
};

pub const RECOGNITION_QUEUE_DEPTH: usize = 4;

pub type RecognitionQueue = Channel<NoopRawMutex, RecognitionJob, RECOGNITION_QUEUE_DEPTH>;

#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionJob {
    pub session: SessionId,
    pub path: SealedPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultSource {
    Template,
    DirectionFallback,
    Unrecognized,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionOutcome {
    pub session: SessionId,
    pub result: GestureResult,
    pub source: ResultSource,
    /// The stroke that was classified, kept for diagnostics.
    pub path: SealedPath,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionStatus {
    Applied(DispatchDecision),
    /// A newer session sealed first; the outcome was dropped unseen.
    Stale,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub sessions: u32,
    pub short_sessions: u32,
    pub template_matches: u32,
    pub fallbacks: u32,
    pub unknowns: u32,
    pub stale_discards: u32,
    pub dispatches: u32,
    pub queue_drops: u32,
}

/// Consumer end of the recognition queue.
///
/// Every worker handed out by [`GesturePipeline::worker`] shares the queue
/// with the pipeline but owns its engine handle, so a task can await
/// [`RecognitionWorker::next_outcome`] while input keeps flowing through
/// [`GesturePipeline::handle`].
#[derive(Clone)]
pub struct RecognitionWorker {
    jobs: Rc<RecognitionQueue>,
    engine: RecognitionEngine,
    fallback: DirectionFallback,
    thresholds: ThresholdConfig,
}

impl fmt::Debug for RecognitionWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionWorker")
            .field("queued", &self.jobs.len())
            .field("engine", &self.engine)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl RecognitionWorker {
    /// Waits for the next queued job and classifies it.
    pub async fn next_outcome(&self) -> RecognitionOutcome {
        let job = self.jobs.receive().await;
        self.classify(job)
    }

    pub fn try_next_outcome(&self) -> Option<RecognitionOutcome> {
        self.jobs.try_receive().ok().map(|job| self.classify(job))
    }

    /// Jobs sealed but not yet taken by any worker.
    pub fn queued(&self) -> usize {
        self.jobs.len()
    }

    /// Template match first; the direction fallback only when the matcher
    /// was skipped or fell under the accept floor.
    pub fn classify(&self, job: RecognitionJob) -> RecognitionOutcome {
        let points = job.path.points();
        let matched = if points.len() >= self.engine.min_points() {
            let result = self.engine.recognize(points);
            (result.is_recognized() && self.thresholds.accepts(result.confidence()))
                .then_some(result)
        } else {
            None
        };

        let (result, source) = match matched {
            Some(result) => (result, ResultSource::Template),
            None => match self.fallback.classify(points) {
                Some(result) => (result, ResultSource::DirectionFallback),
                None => (GestureResult::unknown(), ResultSource::Unrecognized),
            },
        };

        RecognitionOutcome {
            session: job.session,
            result,
            source,
            path: job.path,
        }
    }

    pub fn engine(&self) -> &RecognitionEngine {
        &self.engine
    }
}

/// Capture, recognition and dispatch for one input surface.
///
/// [`GesturePipeline::handle`] never runs the matcher. Sealed paths are queued
/// as [`RecognitionJob`]s and resolved either by [`GesturePipeline::pump`] or
/// by a task awaiting a [`RecognitionWorker`] and passing the result back to
/// [`GesturePipeline::complete`].
pub struct GesturePipeline {
    capture: InputCapture,
    worker: RecognitionWorker,
    thresholds: ThresholdConfig,
    dispatcher: ActionDispatcher,
    // Outcome whose action found the deferred queue full; retried by `run_deferred`.
    held_dispatch: Option<(SessionId, GestureResult)>,
    last_session: SessionId,
    active_session: Option<SessionId>,
    newest_sealed: Option<SessionId>,
    last_result: Option<GestureResult>,
    stats: PipelineStats,
}

impl GesturePipeline {
    pub fn new(config: &GestureConfig, bindings: Vec<ActionBinding>) -> Self {
        Self::with_engine(config, RecognitionEngine::new(config), bindings)
    }

    pub fn with_engine(
        config: &GestureConfig,
        engine: RecognitionEngine,
        bindings: Vec<ActionBinding>,
    ) -> Self {
        Self {
            capture: InputCapture::new(&config.capture),
            worker: RecognitionWorker {
                jobs: Rc::new(Channel::new()),
                engine,
                fallback: DirectionFallback::new(&config.fallback),
                thresholds: config.thresholds,
            },
            thresholds: config.thresholds,
            dispatcher: ActionDispatcher::new(config, bindings),
            held_dispatch: None,
            last_session: SessionId::default(),
            active_session: None,
            newest_sealed: None,
            last_result: None,
            stats: PipelineStats::default(),
        }
    }

    /// Feeds one input event. Returns the id of a session this event sealed,
    /// which is now queued for recognition.
    pub fn handle(&mut self, event: InputEvent) -> Result<Option<SessionId>, GestureError> {
        let output = self.capture.handle(event);

        let mut sealed_id = None;
        let mut queue_error = None;
        if let Some(path) = output.sealed {
            let session = self.active_session.take().unwrap_or(self.last_session);
            match self.seal(session, path) {
                Ok(()) => sealed_id = Some(session),
                Err(err) => queue_error = Some(err),
            }
        }

        if let Some(trigger) = output.started {
            self.last_session = self.last_session.next();
            self.active_session = Some(self.last_session);
            log::info!(
                "gesture: session_start id={} trigger={:?}",
                self.last_session,
                trigger
            );
        }

        match queue_error {
            Some(err) => Err(err),
            None => Ok(sealed_id),
        }
    }

    pub fn tick(&mut self, now_ms: u64) -> Result<Option<SessionId>, GestureError> {
        self.handle(InputEvent::Tick { t_ms: now_ms })
    }

    fn seal(&mut self, session: SessionId, path: SealedPath) -> Result<(), GestureError> {
        self.stats.sessions += 1;
        self.newest_sealed = Some(session);
        if path.len() < self.worker.engine.min_points() {
            self.stats.short_sessions += 1;
        }
        log::info!(
            "gesture: session_sealed id={} reason={:?} points={}",
            session,
            path.reason(),
            path.len()
        );
        if self.worker.jobs.try_send(RecognitionJob { session, path }).is_err() {
            self.stats.queue_drops += 1;
            log::warn!("gesture: recognition_dropped id={} reason=queue_full", session);
            return Err(GestureError::RecognitionQueueFull(session));
        }
        Ok(())
    }

    /// A new consumer of this pipeline's recognition queue.
    pub fn worker(&self) -> RecognitionWorker {
        self.worker.clone()
    }

    pub fn try_next_outcome(&self) -> Option<RecognitionOutcome> {
        self.worker.try_next_outcome()
    }

    /// Publishes an outcome unless a newer session has sealed since.
    pub fn complete(&mut self, outcome: RecognitionOutcome) -> CompletionStatus {
        if self
            .newest_sealed
            .is_some_and(|newest| outcome.session < newest)
        {
            self.stats.stale_discards += 1;
            log::debug!(
                "gesture: result_stale id={} newest={:?}",
                outcome.session,
                self.newest_sealed
            );
            return CompletionStatus::Stale;
        }

        match outcome.source {
            ResultSource::Template => self.stats.template_matches += 1,
            ResultSource::DirectionFallback => self.stats.fallbacks += 1,
            ResultSource::Unrecognized => self.stats.unknowns += 1,
        }
        log::info!(
            "gesture: result id={} source={:?} kind={} value={} confidence={:.2}",
            outcome.session,
            outcome.source,
            outcome.result.kind(),
            outcome.result.value(),
            outcome.result.confidence()
        );

        let decision = self.dispatcher.schedule(outcome.session, &outcome.result);
        match decision {
            DispatchDecision::Scheduled { .. } => self.stats.dispatches += 1,
            DispatchDecision::QueueFull { .. } => {
                if let Some((held, _)) = &self.held_dispatch {
                    log::warn!(
                        "gesture: dispatch_dropped id={} replaced_by={}",
                        held,
                        outcome.session
                    );
                }
                self.held_dispatch = Some((outcome.session, outcome.result.clone()));
            }
            _ => {}
        }
        self.last_result = Some(outcome.result);
        CompletionStatus::Applied(decision)
    }

    /// Resolves every queued job inline. Returns the statuses in queue order.
    pub fn pump(&mut self) -> Vec<CompletionStatus> {
        let mut statuses = Vec::new();
        while let Some(outcome) = self.try_next_outcome() {
            statuses.push(self.complete(outcome));
        }
        statuses
    }

    /// Runs queued handlers, then retries an action that found the deferred
    /// queue full. Returns the number of handlers run.
    pub fn run_deferred(&mut self) -> usize {
        let mut ran = self.dispatcher.run_deferred();
        if let Some((session, result)) = self.held_dispatch.take() {
            match self.dispatcher.schedule(session, &result) {
                DispatchDecision::Scheduled { .. } => {
                    self.stats.dispatches += 1;
                    ran += self.dispatcher.run_deferred();
                }
                DispatchDecision::QueueFull { .. } => {
                    self.held_dispatch = Some((session, result));
                }
                decision => {
                    log::debug!(
                        "gesture: held_dispatch_skipped id={} decision={:?}",
                        session,
                        decision
                    );
                }
            }
        }
        ran
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    pub fn current_path(&self) -> &[Point] {
        self.capture.current_path()
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active_session
    }

    pub fn last_result(&self) -> Option<&GestureResult> {
        self.last_result.as_ref()
    }

    /// Most recent result, if it clears the display floor.
    pub fn displayed(&self) -> Option<&GestureResult> {
        self.last_result
            .as_ref()
            .filter(|result| self.thresholds.displays(result.confidence()))
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn engine(&self) -> &RecognitionEngine {
        &self.worker.engine
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Swaps the binding table between sessions.
    pub fn set_bindings(&mut self, bindings: Vec<ActionBinding>) -> Result<(), GestureError> {
        if let Some(session) = self.active_session.filter(|_| self.capture.is_drawing()) {
            return Err(GestureError::SessionActive(session));
        }
        self.dispatcher.replace_bindings(bindings);
        Ok(())
    }
}
