// agrimarket/src/workflow/mod.rs

//! Named-step async pipelines over shared context data.
//!
//! Multi-step business operations (placing an order, moving an order through
//! its lifecycle, signing a user up) are written as a [`Pipeline`] of named
//! steps. Each step has `before`/`on`/`after` handler slots; handlers lock the
//! shared [`ContextData`] briefly, do their work, and either continue or stop
//! the run. The first error aborts the run.

pub mod context_data;
pub mod control;
pub mod error;
pub mod execution;
pub mod pipeline;
pub mod registry;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use error::{FlowError, FlowResult};
pub use pipeline::Pipeline;
pub use registry::PipelineRegistry;
pub use step::{Handler, SkipCondition, StepDef};
