// agrimarket-server/src/web/handlers/dashboard_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::AuthenticatedUser;

#[instrument(name = "handler::dashboard_stats", skip(app_state, auth_user), fields(user_id = %auth_user.0.id))]
pub async fn stats_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let stats = app_state.dashboard.stats(&auth_user.0).await?;
  Ok(HttpResponse::Ok().json(stats))
}
