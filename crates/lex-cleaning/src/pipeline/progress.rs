//! Progress reporting and cancellation for cleaning runs.
//!
//! Progress is a synthetic ramp: exactly [`PROGRESS_STEPS`] events with
//! percentages 1 through 100, one per interval, emitted from a dedicated
//! tokio task. The ramp is not tied to how far the cleaning has actually
//! got; it only tells an observer that a run is alive. Elapsed time in each
//! event is measured from the run's start instant.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_cleaning::pipeline::progress::ProgressReporter;
//! use std::time::{Duration, Instant};
//!
//! let mut reporter = ProgressReporter::new(Duration::from_millis(50));
//! reporter.on_progress(|event| {
//!     println!("{:>3}% after {:.2}s", event.percent, event.elapsed_seconds);
//! });
//!
//! let handle = reporter.start(Instant::now());
//! // ... later, from any thread
//! handle.cancel();
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Number of events in a full progress ramp.
pub const PROGRESS_STEPS: u8 = 100;

/// One tick of the progress ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// 1 through 100, strictly increasing within a run.
    pub percent: u8,
    /// Seconds since the run started.
    pub elapsed_seconds: f64,
}

/// Lifecycle of one progress ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgressState::Idle => "idle",
            ProgressState::Running => "running",
            ProgressState::Completed => "completed",
            ProgressState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Receives progress events.
///
/// Events are delivered on the reporter task, one at a time, in increasing
/// percent order. Implementations should return quickly; a slow subscriber
/// delays the following events.
pub trait ProgressSubscriber: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// Wrapper that implements [`ProgressSubscriber`] using a closure.
pub struct ClosureProgressSubscriber<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressSubscriber<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressSubscriber for ClosureProgressSubscriber<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        (self.callback)(event);
    }
}

/// Forwards events into an unbounded channel.
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelProgressSubscriber {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressSubscriber {
    /// Create a subscriber and the receiving end of its stream.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSubscriber for ChannelProgressSubscriber {
    fn on_progress(&self, event: ProgressEvent) {
        self.sender.send(event).ok();
    }
}

/// Token for cancelling a running progress ramp.
///
/// Uses an atomic boolean internally, so it is safe to clone and share
/// across threads.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
static_assertions::assert_impl_all!(ProgressEvent: Send, Sync);
static_assertions::assert_impl_all!(ProgressHandle: Send, Sync);

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Thread-safe; affects every clone.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Configures and starts a progress ramp.
pub struct ProgressReporter {
    interval: Duration,
    subscribers: Vec<Arc<dyn ProgressSubscriber>>,
}

impl ProgressReporter {
    /// A reporter that waits `interval` before each event.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Arc<dyn ProgressSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Subscribe a closure.
    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(ClosureProgressSubscriber::new(callback)));
    }

    /// Start the ramp on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime, like [`tokio::spawn`].
    pub fn start(self, started_at: Instant) -> ProgressHandle {
        self.spawn_on(&Handle::current(), started_at)
    }

    /// Start the ramp on the given runtime. Returns immediately.
    pub fn spawn_on(self, runtime: &Handle, started_at: Instant) -> ProgressHandle {
        let token = CancellationToken::new();
        let state = Arc::new(Mutex::new(ProgressState::Running));
        let (latest_tx, latest_rx) = watch::channel(None);

        let task = runtime.spawn(run_ramp(
            self.interval,
            started_at,
            self.subscribers,
            token.clone(),
            Arc::clone(&state),
            latest_tx,
        ));

        ProgressHandle {
            control: ProgressControl { token, state },
            latest: latest_rx,
            task,
        }
    }
}

async fn run_ramp(
    interval: Duration,
    started_at: Instant,
    subscribers: Vec<Arc<dyn ProgressSubscriber>>,
    token: CancellationToken,
    state: Arc<Mutex<ProgressState>>,
    latest: watch::Sender<Option<ProgressEvent>>,
) {
    let mut finished = true;

    for percent in 1..=PROGRESS_STEPS {
        tokio::time::sleep(interval).await;
        if token.is_cancelled() {
            finished = false;
            break;
        }

        let event = ProgressEvent {
            percent,
            elapsed_seconds: started_at.elapsed().as_secs_f64(),
        };
        latest.send_replace(Some(event));
        for subscriber in &subscribers {
            subscriber.on_progress(event);
        }
    }

    let mut state = state.lock();
    if *state == ProgressState::Running {
        *state = if finished {
            ProgressState::Completed
        } else {
            ProgressState::Cancelled
        };
    }
    debug!("Progress ramp ended: {}", *state);
}

/// Cloneable control over a running ramp.
#[derive(Debug, Clone)]
pub struct ProgressControl {
    token: CancellationToken,
    state: Arc<Mutex<ProgressState>>,
}

impl ProgressControl {
    /// Stop the ramp. No event starts after this returns.
    ///
    /// Has no effect once the ramp has completed.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if *state == ProgressState::Running {
            self.token.cancel();
            *state = ProgressState::Cancelled;
        }
    }

    pub fn state(&self) -> ProgressState {
        *self.state.lock()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Handle to a running progress ramp.
#[derive(Debug)]
pub struct ProgressHandle {
    control: ProgressControl,
    latest: watch::Receiver<Option<ProgressEvent>>,
    task: JoinHandle<()>,
}

impl ProgressHandle {
    pub fn cancel(&self) {
        self.control.cancel();
    }

    pub fn state(&self) -> ProgressState {
        self.control.state()
    }

    pub fn control(&self) -> ProgressControl {
        self.control.clone()
    }

    /// Receiver that always holds the most recent event, `None` before the first one.
    pub fn latest(&self) -> watch::Receiver<Option<ProgressEvent>> {
        self.latest.clone()
    }

    /// Wait for the ramp to finish and return its final state.
    pub async fn wait(self) -> ProgressState {
        if let Err(e) = self.task.await {
            warn!("Progress task ended abnormally: {}", e);
        }
        self.control.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collecting_reporter(interval_ms: u64) -> (ProgressReporter, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut reporter = ProgressReporter::new(Duration::from_millis(interval_ms));
        reporter.on_progress(move |event| sink.lock().push(event));
        (reporter, events)
    }

    #[test]
    fn test_cancellation_token_clone_shares_state() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();
        assert!(!token2.is_cancelled());

        token1.cancel();
        assert!(token2.is_cancelled());
    }

    #[tokio::test]
    async fn test_full_ramp_is_monotonic() {
        let (reporter, events) = collecting_reporter(0);

        let handle = reporter.start(Instant::now());
        assert_eq!(handle.wait().await, ProgressState::Completed);

        let events = events.lock();
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, (1..=PROGRESS_STEPS).collect::<Vec<_>>());
        assert!(
            events
                .windows(2)
                .all(|w| w[0].elapsed_seconds <= w[1].elapsed_seconds)
        );
    }

    #[tokio::test]
    async fn test_cancel_from_subscriber_stops_ramp() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let control: Arc<Mutex<Option<ProgressControl>>> = Arc::new(Mutex::new(None));

        let mut reporter = ProgressReporter::new(Duration::from_millis(1));
        let sink = Arc::clone(&events);
        let slot = Arc::clone(&control);
        reporter.on_progress(move |event| {
            sink.lock().push(event.percent);
            if event.percent == 10 {
                if let Some(control) = slot.lock().as_ref() {
                    control.cancel();
                }
            }
        });

        // The slot is filled before the ramp task first gets polled.
        let handle = reporter.start(Instant::now());
        *control.lock() = Some(handle.control());

        assert_eq!(handle.wait().await, ProgressState::Cancelled);
        assert_eq!(events.lock().len(), 10);
    }

    #[tokio::test]
    async fn test_cancel_before_first_event() {
        let (reporter, events) = collecting_reporter(50);

        let handle = reporter.start(Instant::now());
        handle.cancel();

        assert_eq!(handle.state(), ProgressState::Cancelled);
        assert_eq!(handle.wait().await, ProgressState::Cancelled);
        assert!(events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_noop() {
        let (reporter, _events) = collecting_reporter(0);

        let handle = reporter.start(Instant::now());
        let control = handle.control();
        assert_eq!(handle.wait().await, ProgressState::Completed);

        control.cancel();
        assert_eq!(control.state(), ProgressState::Completed);
    }

    #[tokio::test]
    async fn test_channel_subscriber_and_latest() {
        let (subscriber, mut receiver) = ChannelProgressSubscriber::channel();
        let mut reporter = ProgressReporter::new(Duration::ZERO);
        reporter.subscribe(Arc::new(subscriber));

        let handle = reporter.start(Instant::now());
        let latest = handle.latest();
        handle.wait().await;

        let mut last = 0;
        let mut count = 0;
        while let Some(event) = receiver.recv().await {
            assert!(event.percent > last);
            last = event.percent;
            count += 1;
        }
        assert_eq!(count, 100);

        let last_seen = *latest.borrow();
        assert_eq!(last_seen.map(|e| e.percent), Some(100));
    }
}
