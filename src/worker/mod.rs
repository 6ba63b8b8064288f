//! Page worker
//!
//! A `ParserWorker` walks a `LoaderSettings` range one page at a time:
//! - sequences the URL for each position
//! - loads it, retrying empty responses with randomized, escalating backoff
//! - parses and extracts with its `ParsingStrategy`
//! - reports results and completion to its `Notifier`
//!
//! Runs can be aborted through a shared `WorkerHandle`.

mod retry;
mod state;
#[allow(clippy::module_inception)]
mod worker;

pub use retry::RetryPolicy;
pub use state::{WorkerHandle, WorkerState};
pub use worker::{ParseFailurePolicy, ParserWorker, RunReport};
