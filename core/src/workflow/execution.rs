// agrimarket/src/workflow/execution.rs

//! `Pipeline::run()`: drives the steps in order against one shared context.

use super::error::FlowError;
use super::pipeline::{Phase, Pipeline};
use super::{ContextData, PipelineControl, PipelineResult};
use tracing::{event, instrument, span, Instrument, Level};

const PHASES: [Phase; 3] = [Phase::Before, Phase::On, Phase::After];

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned as-is. A handler
  /// returning [`PipelineControl::Stop`] ends the run with
  /// [`PipelineResult::Stopped`].
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step = step_name, "Step skipped by condition.");
          continue;
        }
      }

      let has_any = PHASES.iter().any(|p| !self.handlers_for(step_name, *p).is_empty());
      if !has_any {
        if step_def.optional {
          event!(Level::DEBUG, step = step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step = step_name, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = span!(Level::DEBUG, "pipeline_step", step_name, step_index = step_idx);
      for phase in PHASES {
        for handler_fn in self.handlers_for(step_name, phase) {
          let outcome = handler_fn(ctx_data.clone()).instrument(step_span.clone()).await;
          match outcome {
            Ok(PipelineControl::Continue) => {}
            Ok(PipelineControl::Stop) => {
              event!(Level::INFO, step = step_name, ?phase, "Pipeline stopped by handler.");
              return Ok(PipelineResult::Stopped);
            }
            Err(e) => {
              event!(Level::DEBUG, step = step_name, ?phase, error = %e, "Step handler failed.");
              return Err(e);
            }
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
