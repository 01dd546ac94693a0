//! Pipeline orchestrator.
//!
//! The [`Orchestrator`] owns the lifecycle of one cleaning session:
//!
//! ```text
//!   Idle ──load──▶ Loaded ──process──▶ Processing ──▶ Completed
//!                    ▲                                 │ Failed
//!                    └────────────── load ─────────────┘
//! ```
//!
//! Cleaning runs on a blocking worker (`spawn_blocking`) while the progress
//! ramp runs on its own task. The caller gets a [`ProcessHandle`] back
//! immediately and awaits the report through it. State lives behind a
//! `parking_lot::RwLock`; `load` and `process` take the write lock, `export`
//! and the accessors take the read lock.

use parking_lot::RwLock;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::config::CleaningConfig;
use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use crate::pipeline::executor::{CleaningExecutor, CleaningRun};
use crate::pipeline::progress::{
    ClosureProgressSubscriber, ProgressControl, ProgressEvent, ProgressHandle, ProgressReporter,
    ProgressState, ProgressSubscriber,
};
use crate::types::{CleaningReport, LoadResult, PipelineFailure, PipelineState};

/// Everything a session holds between operations.
#[derive(Debug, Default)]
struct Session {
    state: PipelineState,
    input: Option<PathBuf>,
    dataset: Option<Dataset>,
    report: Option<CleaningReport>,
    steps: Vec<String>,
    failure: Option<PipelineFailure>,
    progress: Option<ProgressControl>,
}

impl Session {
    fn reset_results(&mut self) {
        self.dataset = None;
        self.report = None;
        self.steps.clear();
        self.failure = None;
    }
}

/// Owns the input path, the cleaned dataset and the last report.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::{CleaningConfig, Orchestrator};
///
/// let orchestrator = Orchestrator::new(CleaningConfig::default());
/// orchestrator.on_progress(|event| println!("{}%", event.percent));
///
/// orchestrator.load("data/customers.csv")?;
/// let report = orchestrator.process()?.wait().await?;
/// println!("{}", report.to_text());
/// orchestrator.export("output/customers_clean.csv")?;
/// ```
pub struct Orchestrator {
    config: CleaningConfig,
    session: Arc<RwLock<Session>>,
    subscribers: RwLock<Vec<Arc<dyn ProgressSubscriber>>>,
}

static_assertions::assert_impl_all!(Orchestrator: Send, Sync);

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}

impl Orchestrator {
    pub fn new(config: CleaningConfig) -> Self {
        Self {
            config,
            session: Arc::new(RwLock::new(Session::default())),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Register a subscriber for the progress ramp of every later run.
    pub fn subscribe(&self, subscriber: Arc<dyn ProgressSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Register a closure for the progress ramp of every later run.
    pub fn on_progress<F>(&self, callback: F)
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(ClosureProgressSubscriber::new(callback)));
    }

    /// Select the input file.
    ///
    /// The file must exist, be a regular file and be readable. On success
    /// the pipeline is `Loaded` and any previous dataset, report or failure
    /// is discarded. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// - [`CleaningError::AlreadyProcessing`] while a run is in flight
    /// - [`CleaningError::Io`] if the file cannot be opened
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadResult> {
        let path = path.as_ref();
        if self.state() == PipelineState::Processing {
            return Err(CleaningError::AlreadyProcessing);
        }

        let size_bytes = check_readable(path)?;

        let mut session = self.session.write();
        if session.state == PipelineState::Processing {
            return Err(CleaningError::AlreadyProcessing);
        }
        session.reset_results();
        session.input = Some(path.to_path_buf());
        if let Some(previous) = session.progress.take() {
            previous.cancel();
        }
        session.state = PipelineState::Loaded;

        info!("Loaded input: {} ({} bytes)", path.display(), size_bytes);
        Ok(LoadResult {
            path: path.to_path_buf(),
            size_bytes,
        })
    }

    /// Start cleaning the loaded file.
    ///
    /// Returns as soon as the run is started; the state is `Processing` by
    /// then. The run continues, and the state is updated, even if the
    /// returned handle is dropped.
    ///
    /// # Errors
    ///
    /// - [`CleaningError::AlreadyProcessing`] if a run is already in flight
    /// - [`CleaningError::InvalidState`] if no file is loaded or the last run
    ///   has already finished
    /// - [`CleaningError::Internal`] if called outside of a tokio runtime
    pub fn process(&self) -> Result<ProcessHandle> {
        let runtime = Handle::try_current()
            .map_err(|e| CleaningError::Internal(format!("No tokio runtime: {}", e)))?;

        let (input, started_at, progress) = {
            let mut session = self.session.write();
            match session.state {
                PipelineState::Loaded => {}
                PipelineState::Processing => return Err(CleaningError::AlreadyProcessing),
                state => {
                    return Err(CleaningError::InvalidState {
                        operation: "process",
                        state,
                    });
                }
            }
            let input = session.input.clone().ok_or_else(|| {
                CleaningError::Internal("Loaded pipeline has no input path".to_string())
            })?;

            let started_at = Instant::now();
            let progress = self.progress_reporter().spawn_on(&runtime, started_at);

            session.reset_results();
            session.progress = Some(progress.control());
            session.state = PipelineState::Processing;
            (input, started_at, progress)
        };

        info!("Processing started: {}", input.display());

        let executor = CleaningExecutor::new(&self.config);
        let session = Arc::clone(&self.session);
        let control = progress.control();
        let (sender, receiver) = oneshot::channel();

        runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || executor.run(&input, started_at))
                .await
                .unwrap_or_else(|e| {
                    Err(CleaningError::Internal(format!("Cleaning worker failed: {}", e))
                        .processing(&[]))
                });

            let outcome = finish_run(&session, &control, result);
            // The caller may have dropped the handle.
            sender.send(outcome).ok();
        });

        Ok(ProcessHandle { receiver, progress })
    }

    /// Load a file, process it and wait for the report.
    pub async fn run(&self, path: impl AsRef<Path>) -> Result<CleaningReport> {
        self.load(path)?;
        self.process()?.wait().await
    }

    /// Write the cleaned dataset as CSV, overwriting `path`.
    ///
    /// Does not change the pipeline state. On failure the dataset is kept
    /// so the export can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::Export`] if no cleaned dataset is held or the
    /// destination cannot be written.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let session = self.session.read();

        let dataset = session.dataset.as_ref().ok_or_else(|| CleaningError::Export {
            path: path.to_path_buf(),
            reason: format!("no cleaned dataset (pipeline is {})", session.state),
        })?;

        dataset.write_csv(path).map_err(|e| {
            warn!("Export to {} failed: {}", path.display(), e);
            CleaningError::Export {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        info!("Exported {} rows to {}", dataset.height(), path.display());
        Ok(())
    }

    pub fn state(&self) -> PipelineState {
        self.session.read().state
    }

    /// Report of the last successful run.
    pub fn current_report(&self) -> Option<CleaningReport> {
        self.session.read().report.clone()
    }

    /// Five-line text form of [`current_report`](Self::current_report).
    pub fn report_text(&self) -> Option<String> {
        self.session.read().report.as_ref().map(CleaningReport::to_text)
    }

    /// Copy of the cleaned dataset, only while `Completed`.
    pub fn dataset(&self) -> Option<Dataset> {
        self.session.read().dataset.clone()
    }

    /// Error of the last run, only while `Failed`.
    pub fn failure(&self) -> Option<PipelineFailure> {
        self.session.read().failure.clone()
    }

    /// Steps completed by the last run, successful or not.
    pub fn steps(&self) -> Vec<String> {
        self.session.read().steps.clone()
    }

    pub fn input_path(&self) -> Option<PathBuf> {
        self.session.read().input.clone()
    }

    /// State of the most recent progress ramp, `Idle` if none was started.
    pub fn progress_state(&self) -> ProgressState {
        self.session
            .read()
            .progress
            .as_ref()
            .map_or(ProgressState::Idle, ProgressControl::state)
    }

    /// Stop the current progress ramp. Cleaning itself is not interrupted.
    pub fn cancel_progress(&self) {
        if let Some(progress) = self.session.read().progress.as_ref() {
            progress.cancel();
        }
    }

    fn progress_reporter(&self) -> ProgressReporter {
        let mut reporter = ProgressReporter::new(self.config.progress_interval());
        for subscriber in self.subscribers.read().iter() {
            reporter.subscribe(Arc::clone(subscriber));
        }
        reporter
    }
}

/// Size of `path` if it is a regular file that can be opened for reading.
fn check_readable(path: &Path) -> Result<u64> {
    let file = File::open(path).map_err(|e| CleaningError::io(path, e))?;
    let metadata = file.metadata().map_err(|e| CleaningError::io(path, e))?;
    if !metadata.is_file() {
        return Err(CleaningError::io(
            path,
            std::io::Error::other("not a regular file"),
        ));
    }
    Ok(metadata.len())
}

/// Store the outcome of a run and move to `Completed` or `Failed`.
fn finish_run(
    session: &RwLock<Session>,
    progress: &ProgressControl,
    result: Result<CleaningRun>,
) -> Result<CleaningReport> {
    let mut session = session.write();
    match result {
        Ok(run) => {
            info!(
                "Processing completed: {} -> {} rows",
                run.report.rows_before, run.report.rows_after
            );
            session.dataset = Some(run.dataset);
            session.report = Some(run.report.clone());
            session.steps = run.steps;
            session.state = PipelineState::Completed;
            Ok(run.report)
        }
        Err(e) => {
            error!("Processing failed: {}", e);
            progress.cancel();
            session.dataset = None;
            session.report = None;
            session.steps = e.processing_log().to_vec();
            session.failure = Some(PipelineFailure::from(&e));
            session.state = PipelineState::Failed;
            Err(e)
        }
    }
}

/// Handle to an in-flight processing run.
#[derive(Debug)]
pub struct ProcessHandle {
    receiver: oneshot::Receiver<Result<CleaningReport>>,
    progress: ProgressHandle,
}

impl ProcessHandle {
    /// Progress ramp of this run.
    pub fn progress(&self) -> &ProgressHandle {
        &self.progress
    }

    pub fn cancel_progress(&self) {
        self.progress.cancel();
    }

    /// Wait for cleaning to finish. The progress ramp may still be running.
    pub async fn wait(self) -> Result<CleaningReport> {
        self.receiver
            .await
            .map_err(|_| CleaningError::Internal("Processing task was dropped".to_string()))?
    }

    /// Wait for cleaning and for the progress ramp to finish.
    pub async fn finish(self) -> (Result<CleaningReport>, ProgressState) {
        let result = self
            .receiver
            .await
            .map_err(|_| CleaningError::Internal("Processing task was dropped".to_string()))
            .and_then(|r| r);
        let progress = self.progress.wait().await;
        (result, progress)
    }
}
