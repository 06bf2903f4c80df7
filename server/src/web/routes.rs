// agrimarket-server/src/web/routes.rs

use crate::errors::AppError;
use agrimarket::MarketError;
use crate::web::handlers::{auth_handlers, dashboard_handlers, order_handlers, produce_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every route under `/api`. Malformed JSON bodies and query strings
/// are answered as validation errors; a path id that is not a UUID cannot name
/// a record, so it is answered as not found.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default().error_handler(|err, _req| AppError::validation(format!("Invalid JSON body: {}", err)).into()),
    )
    .app_data(
      web::QueryConfig::default()
        .error_handler(|err, _req| AppError::validation(format!("Invalid query string: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default().error_handler(|err, req| {
        tracing::debug!(path = %req.path(), error = %err, "Unparseable id in path.");
        AppError::Market(MarketError::not_found("Resource not found.")).into()
      }),
    );

  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/me", web::get().to(auth_handlers::me_handler)),
      )
      .service(
        web::scope("/produce")
          .route("", web::post().to(produce_handlers::create_produce_handler))
          .route("", web::get().to(produce_handlers::list_produce_handler))
          .route("/farmer/{farmer_id}", web::get().to(produce_handlers::farmer_produce_handler))
          .route("/{produce_id}", web::get().to(produce_handlers::get_produce_handler))
          .route("/{produce_id}", web::put().to(produce_handlers::update_produce_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}/status", web::put().to(order_handlers::update_order_status_handler)),
      )
      .service(web::scope("/dashboard").route("/stats", web::get().to(dashboard_handlers::stats_handler))),
  );
}
