// agrimarket-server/src/web/handlers/produce_handlers.rs

use actix_web::{web, HttpResponse};
use agrimarket::{ProduceChanges, ProduceDraft, ProduceFilter};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::AuthenticatedUser;

#[instrument(name = "handler::create_produce", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.0.id))]
pub async fn create_produce_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<ProduceDraft>,
) -> Result<HttpResponse, AppError> {
  let produce = app_state
    .catalog
    .create_listing(&auth_user.0, req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(produce))
}

#[instrument(name = "handler::list_produce", skip(app_state))]
pub async fn list_produce_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProduceFilter>,
) -> Result<HttpResponse, AppError> {
  let listings = app_state.catalog.list_listings(&query_params).await?;
  info!(count = listings.len(), "Listings fetched.");
  Ok(HttpResponse::Ok().json(listings))
}

#[instrument(name = "handler::get_produce", skip(app_state, path), fields(produce_id = %path.as_ref()))]
pub async fn get_produce_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let produce = app_state.catalog.get_listing(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(produce))
}

#[instrument(name = "handler::farmer_produce", skip(app_state, path), fields(farmer_id = %path.as_ref()))]
pub async fn farmer_produce_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let listings = app_state.catalog.listings_by_farmer(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(listings))
}

#[instrument(
  name = "handler::update_produce",
  skip(app_state, auth_user, path, req_payload),
  fields(user_id = %auth_user.0.id, produce_id = %path.as_ref())
)]
pub async fn update_produce_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProduceChanges>,
) -> Result<HttpResponse, AppError> {
  let produce = app_state
    .catalog
    .update_listing(&auth_user.0, path.into_inner(), req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(produce))
}
