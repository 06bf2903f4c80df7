// agrimarket-server/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::TokenService;
use agrimarket::workflow::PipelineRegistry;
use agrimarket::{Catalog, Dashboard, OrderEngine, Stores};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub stores: Stores,
  pub catalog: Catalog,
  pub engine: OrderEngine,
  pub dashboard: Dashboard,
  pub tokens: Arc<TokenService>,
  pub pipelines: Arc<PipelineRegistry<AppError>>,
}

impl AppState {
  /// Wires the services over `stores` and registers the request pipelines.
  pub fn new(config: &AppConfig, stores: Stores) -> Self {
    let registry = PipelineRegistry::<AppError>::new();
    pipelines::register_all_pipelines(&registry);

    Self {
      catalog: Catalog::new(stores.clone()),
      engine: OrderEngine::new(stores.clone()),
      dashboard: Dashboard::new(stores.clone()),
      tokens: Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl)),
      pipelines: Arc::new(registry),
      stores,
    }
  }
}
