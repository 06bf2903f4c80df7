// agrimarket-server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use agrimarket::{MemoryStore, PgStore, Stores};
use agrimarket_server::web::configure_app_routes;
use agrimarket_server::{telemetry, AppConfig, AppState};
use anyhow::Context;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  telemetry::init_tracing(app_config.log_format)?;
  tracing::info!(config = ?app_config, "Starting agrimarket server...");

  let (stores, pg_store) = match &app_config.database_url {
    Some(url) => {
      let pg = PgStore::connect(url, app_config.database_max_connections, app_config.store_timeout)
        .await
        .context("Failed to connect to the database")?;
      pg.migrate().await.context("Failed to apply database schema")?;
      let pg = Arc::new(pg);
      (Stores::shared(pg.clone(), app_config.store_timeout), Some(pg))
    }
    None => {
      tracing::warn!("DATABASE_URL not set; using the in-memory store. Data is lost on restart.");
      (Stores::shared(Arc::new(MemoryStore::new()), app_config.store_timeout), None)
    }
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(&app_config, stores);

  tracing::info!("Binding server to {}...", server_address);
  let served = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await;

  if let Some(pg) = pg_store {
    pg.close().await;
    tracing::info!("Database pool closed.");
  }
  served?;
  tracing::info!("Server stopped.");
  Ok(())
}
