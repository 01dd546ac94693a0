//! Pipeline module.
//!
//! This module provides the cleaning executor, the progress reporter and
//! the orchestrator that ties them together.

mod executor;
mod orchestrator;
pub mod progress;

pub use executor::{CleaningExecutor, CleaningRun};
pub use orchestrator::{Orchestrator, ProcessHandle};
pub use progress::{
    CancellationToken, ChannelProgressSubscriber, ClosureProgressSubscriber, PROGRESS_STEPS,
    ProgressControl, ProgressEvent, ProgressHandle, ProgressReporter, ProgressState,
    ProgressSubscriber,
};
