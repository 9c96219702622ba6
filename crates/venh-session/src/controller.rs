//! Processing run controller.
//!
//! The controller is the single writer of [`RunState`]. Each run spawns two
//! tasks: a driver that awaits the backend and the display floor, and a
//! simulation that publishes fabricated frame samples. Both measure time from
//! the same start instant, and the driver publishes the terminal state only
//! after the last sample. Both tag every write with their [`RunId`], and
//! starting a new run aborts the previous run's tasks, so a superseded run can
//! never touch the state again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use venh_client::{EnhanceClient, VideoProcessor};
use venh_models::{
    resolve_method, BackendMethod, ProcessingRequest, ProcessingResult, RunId, RunState,
};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::logging::RunLogger;
use crate::simulator::{sleep_until_offset, ProgressSimulator, SimulationPlan};

type Outcome = SessionResult<Arc<ProcessingResult>>;

struct ActiveRun {
    run_id: RunId,
    driver: JoinHandle<()>,
    simulation: JoinHandle<()>,
}

impl ActiveRun {
    fn abort(&self) {
        self.driver.abort();
        self.simulation.abort();
    }
}

/// Handle to a started run.
#[derive(Debug)]
pub struct RunHandle {
    run_id: RunId,
    outcome: oneshot::Receiver<Outcome>,
}

impl RunHandle {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Wait for the run to finish.
    ///
    /// Returns [`SessionError::Superseded`] if another run (or a reset)
    /// replaced this one first.
    pub async fn wait(self) -> Outcome {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(_) => Err(SessionError::Superseded(self.run_id)),
        }
    }
}

/// Drives processing runs and owns their state.
pub struct ProcessingController {
    processor: Arc<dyn VideoProcessor>,
    simulator: ProgressSimulator,
    config: SessionConfig,
    state: Arc<watch::Sender<RunState>>,
    active: Mutex<Option<ActiveRun>>,
}

impl ProcessingController {
    pub fn new(processor: Arc<dyn VideoProcessor>, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(RunState::default());

        Self {
            processor,
            simulator: ProgressSimulator::new(config.frame_interval),
            config,
            state: Arc::new(state),
            active: Mutex::new(None),
        }
    }

    /// Create a controller backed by the HTTP client.
    pub fn with_client(client: EnhanceClient, config: SessionConfig) -> Self {
        Self::new(Arc::new(client), config)
    }

    /// Read-only view that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> RunState {
        self.state.borrow().clone()
    }

    /// Start a run for `request` with the user-selected `method`.
    ///
    /// Any run still in flight is aborted and its state (including a held
    /// result) is dropped before the new run becomes visible. Must be called
    /// from within a Tokio runtime.
    pub fn start(&self, request: ProcessingRequest, method: &str) -> RunHandle {
        let backend = resolve_method(method);
        let run_id = RunId::new();
        let logger = RunLogger::new(run_id, backend);
        debug!("Resolved method {:?} to {}", method, backend);

        let plan = self.simulator.plan(request.size(), backend.as_str());
        let total_frames = plan.total_frames();
        let floor = plan.nominal_duration().max(self.config.min_display);

        let mut active = self.lock_active();
        if let Some(previous) = active.take() {
            previous.abort();
            logger.log_warning(&format!("superseding run {}", previous.run_id));
        }

        let previous = self
            .state
            .send_replace(RunState::started(run_id, backend, total_frames));
        release(previous);

        logger.log_start(request.file_name(), request.size(), total_frames);

        let started = Instant::now();
        let (simulated_tx, simulated_rx) = oneshot::channel();
        let simulation = tokio::spawn(simulate(
            Arc::clone(&self.state),
            run_id,
            plan,
            started,
            logger.clone(),
            simulated_tx,
        ));

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let driver = tokio::spawn(drive(
            Arc::clone(&self.processor),
            Arc::clone(&self.state),
            RunSpec {
                run_id,
                request,
                method: backend,
                started,
                floor,
            },
            simulated_rx,
            logger,
            outcome_tx,
        ));

        *active = Some(ActiveRun {
            run_id,
            driver,
            simulation,
        });

        RunHandle {
            run_id,
            outcome: outcome_rx,
        }
    }

    /// Start a run and wait for it to finish.
    pub async fn process(&self, request: ProcessingRequest, method: &str) -> Outcome {
        self.start(request, method).wait().await
    }

    /// Abort any active run and return to `idle`, releasing the held result.
    pub fn reset(&self) {
        let mut active = self.lock_active();
        if let Some(run) = active.take() {
            run.abort();
        }
        release(self.state.send_replace(RunState::default()));
    }

    /// ID of the most recently started run, if it has not been reset.
    pub fn current_run(&self) -> Option<RunId> {
        self.state.borrow().run_id
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ProcessingController {
    fn drop(&mut self) {
        if let Some(run) = self.lock_active().take() {
            run.abort();
        }
    }
}

struct RunSpec {
    run_id: RunId,
    request: ProcessingRequest,
    method: BackendMethod,
    started: Instant,
    floor: Duration,
}

fn release(previous: RunState) {
    if let (Some(run_id), Some(result)) = (previous.run_id, previous.result) {
        debug!("Releasing {} byte result of run {}", result.size(), run_id);
    }
}

async fn simulate(
    state: Arc<watch::Sender<RunState>>,
    run_id: RunId,
    plan: SimulationPlan,
    started: Instant,
    logger: RunLogger,
    done: oneshot::Sender<()>,
) {
    plan.emit(started, |sample| {
        state.send_if_modified(|s| {
            if !s.is_run(run_id) || !s.is_processing() {
                return false;
            }
            s.push_sample(sample);
            logger.log_progress(s.stats.processed_frames, s.stats.total_frames);
            true
        });
    })
    .await;
    let _ = done.send(());
}

async fn drive(
    processor: Arc<dyn VideoProcessor>,
    state: Arc<watch::Sender<RunState>>,
    run: RunSpec,
    simulated: oneshot::Receiver<()>,
    logger: RunLogger,
    outcome_tx: oneshot::Sender<Outcome>,
) {
    let RunSpec {
        run_id,
        request,
        method,
        started,
        floor,
    } = run;

    // The simulator's sender drops if it is aborted, which also ends the wait.
    let (result, (), _) = tokio::join!(
        processor.process(&request, method),
        sleep_until_offset(started, floor),
        simulated,
    );

    let outcome: Outcome = match result {
        Ok(result) => Ok(Arc::new(result)),
        Err(e) => {
            logger.log_error(&e.to_string());
            Err(SessionError::from(&e))
        }
    };

    let published = state.send_if_modified(|s| {
        if !s.is_run(run_id) || !s.is_processing() {
            return false;
        }
        match &outcome {
            Ok(result) => s.complete(Arc::clone(result)),
            Err(e) => s.fail(e.to_string()),
        }
        true
    });

    let outcome = if published {
        if let Ok(result) = &outcome {
            logger.log_completion(
                result.size(),
                result.metadata.as_ref().is_some_and(|m| !m.is_empty()),
            );
        }
        outcome
    } else {
        Err(SessionError::Superseded(run_id))
    };

    // Receiver may have been dropped; nothing to do then.
    let _ = outcome_tx.send(outcome);
}
