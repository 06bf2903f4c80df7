// agrimarket-server/src/pipelines/mod.rs

//! Account pipelines run through the application's `PipelineRegistry`.

use crate::errors::AppError;
use agrimarket::workflow::PipelineRegistry;

pub mod contexts;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every request pipeline. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &PipelineRegistry<AppError>) {
  tracing::info!("Registering pipelines...");
  signup_pipeline::register_signup_pipeline(registry);
  signin_pipeline::register_signin_pipeline(registry);
  tracing::info!("All application pipelines registered.");
}
