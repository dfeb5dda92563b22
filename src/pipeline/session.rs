use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
};

use tracing::{debug, warn};

use crate::error::PipelineError;

use super::{FeatureBatch, Pipeline, PipelineConfig, RunOutput, Stage};

/// Progress messages sent by a background run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunEvent {
    /// A stage has started.
    Stage(Stage),
    /// The worker is done; the result is available from [`RunHandle::wait`].
    Finished,
}

impl RunEvent {
    pub fn progress(&self) -> f32 {
        match self {
            RunEvent::Stage(stage) => stage.progress(),
            RunEvent::Finished => 1.0,
        }
    }
}

/// Snapshot returned by [`RunHandle::poll`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunStatus {
    Running { stage: Option<Stage>, progress: f32 },
    Finished,
}

/// Holds the configuration and enforces a single active run at a time.
#[derive(Debug, Clone)]
pub struct Session {
    pipeline: Arc<Pipeline>,
    busy: Arc<AtomicBool>,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(config)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline] pub fn config(&self) -> &PipelineConfig { self.pipeline.config() }

    /// Check whether a run currently holds the session.
    #[inline] pub fn is_busy(&self) -> bool { self.busy.load(Ordering::Acquire) }

    /// Claim the session for one run. Released when the returned scope is dropped.
    pub fn acquire(&self) -> Result<RunScope, PipelineError> {
        self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PipelineError::RunInProgress)?;
        debug!("session acquired");

        Ok(RunScope { pipeline: Arc::clone(&self.pipeline), busy: Arc::clone(&self.busy) })
    }

    /// Run synchronously on the calling thread.
    pub fn run(&self, batch: &FeatureBatch) -> Result<RunOutput, PipelineError> {
        self.acquire()?.run(batch)
    }

    /// Start a run on a background worker. Rejected while another run is active.
    pub fn submit(&self, batch: FeatureBatch) -> Result<RunHandle, PipelineError> {
        if batch.is_empty() { return Err(PipelineError::EmptyBatch) }

        let scope = self.acquire()?;
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, events) = mpsc::channel();

        let worker_cancel = Arc::clone(&cancel);
        let worker = thread::spawn(move || {
            let result = scope.run_with(&batch, &worker_cancel, |stage| {
                // The handle may have been dropped; the run still completes.
                let _ = sender.send(RunEvent::Stage(stage));
            });
            let _ = sender.send(RunEvent::Finished);
            result
        });

        Ok(RunHandle {
            events,
            worker,
            cancel,
            stage: None,
            finished: false,
        })
    }
}

/// Exclusive claim on a session. Dropping it releases the session.
#[derive(Debug)]
pub struct RunScope {
    pipeline: Arc<Pipeline>,
    busy: Arc<AtomicBool>,
}

impl RunScope {
    pub fn run(&self, batch: &FeatureBatch) -> Result<RunOutput, PipelineError> {
        self.pipeline.run(batch)
    }

    fn run_with(&self, batch: &FeatureBatch, cancel: &AtomicBool, on_stage: impl FnMut(Stage)) -> Result<RunOutput, PipelineError> {
        self.pipeline.run_with(batch, cancel, on_stage)
    }
}

impl Drop for RunScope {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        debug!("session released");
    }
}

/// Handle to a background run: poll for progress, cancel, or wait for the result.
#[derive(Debug)]
pub struct RunHandle {
    events: Receiver<RunEvent>,
    worker: JoinHandle<Result<RunOutput, PipelineError>>,
    cancel: Arc<AtomicBool>,
    stage: Option<Stage>,
    finished: bool,
}

impl RunHandle {
    /// Drain pending progress events without blocking.
    pub fn poll(&mut self) -> RunStatus {
        loop {
            match self.events.try_recv() {
                Ok(RunEvent::Stage(stage)) => self.stage = Some(stage),
                Ok(RunEvent::Finished) => self.finished = true,
                Err(TryRecvError::Empty) => break,
                // Worker gone without a Finished event: it panicked.
                Err(TryRecvError::Disconnected) => { self.finished = true; break }
            }
        }

        if self.finished {
            RunStatus::Finished
        } else {
            RunStatus::Running {
                stage: self.stage,
                progress: self.stage.map_or(0.0, |stage| stage.progress()),
            }
        }
    }

    /// Request cancellation; honored before the next stage starts.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Block until the run ends and return its result.
    pub fn wait(self) -> Result<RunOutput, PipelineError> {
        self.worker.join().unwrap_or_else(|_| {
            warn!("pipeline worker panicked");
            Err(PipelineError::WorkerPanicked)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{feature::RawFeature, normalize::Locale};

    fn batch() -> FeatureBatch {
        FeatureBatch::labeled(vec![
            RawFeature::new(Some("Rue de la Paix"), "residential", [(0.0, 0.0), (0.0, 1.0)]).with_region("Paris"),
            RawFeature::new(Some("Rue de la Paix"), "residential", [(0.0, 1.0), (0.0, 2.0)]).with_region("Paris"),
        ])
    }

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let session = Session::new(PipelineConfig::new(Locale::Fr));

        let scope = session.acquire().unwrap();
        assert!(session.is_busy());
        assert_eq!(session.acquire().unwrap_err(), PipelineError::RunInProgress);
        assert_eq!(session.submit(batch()).unwrap_err(), PipelineError::RunInProgress);
        assert_eq!(session.run(&batch()).unwrap_err(), PipelineError::RunInProgress);

        drop(scope);
        assert!(!session.is_busy());
        assert!(session.run(&batch()).is_ok());
    }

    #[test]
    fn submitted_run_completes_and_releases_session() {
        let session = Session::new(PipelineConfig::new(Locale::Fr));
        let mut handle = session.submit(batch()).unwrap();

        let output = loop {
            if handle.poll() == RunStatus::Finished { break handle.wait().unwrap() }
            thread::yield_now();
        };

        assert_eq!(output.catalog.len(), 1);
        assert_eq!(output.catalog.region("Paris").occurrence_count("PAIX"), 2);
        assert!(!session.is_busy());
    }

    #[test]
    fn empty_batch_is_rejected_before_acquiring() {
        let session = Session::new(PipelineConfig::default());
        let err = session.submit(FeatureBatch::labeled(vec![])).unwrap_err();
        assert_eq!(err, PipelineError::EmptyBatch);
        assert!(!session.is_busy());
    }

    #[test]
    fn run_event_progress() {
        assert_eq!(RunEvent::Stage(Stage::Normalize).progress(), 0.1);
        assert_eq!(RunEvent::Finished.progress(), 1.0);
    }
}
