//! Multi-stage pipelines
//!
//! Stages are independent workers connected by a FIFO hand-off queue: the
//! producer pushes every result it extracts, the consumer processes them in
//! order on its own task.

pub mod handoff;
mod two_stage;

pub use handoff::{HandOffReceiver, HandOffSender, QueueClosed};
pub use two_stage::{detail_settings, TwoStagePipeline, TwoStageReport};
