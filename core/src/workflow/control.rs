// agrimarket/src/workflow/control.rs

//! Flow signals returned by step handlers and by a whole pipeline run.

/// Returned by a handler to keep going or halt the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt immediately. Remaining handlers and steps are not executed.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every non-skipped step ran.
  Completed,
  /// A handler returned [`PipelineControl::Stop`].
  Stopped,
}
