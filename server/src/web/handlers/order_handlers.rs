// agrimarket-server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use agrimarket::OrderStatus;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CreateOrderRequestPayload {
  pub produce_id: Uuid,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct StatusUpdateRequestPayload {
  pub status: OrderStatus,
}

#[instrument(
  name = "handler::create_order",
  skip(app_state, auth_user, req_payload),
  fields(user_id = %auth_user.0.id, produce_id = %req_payload.produce_id, quantity = req_payload.quantity)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CreateOrderRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .engine
    .create_order(&auth_user.0, req_payload.produce_id, req_payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.0.id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.engine.list_orders_for(&auth_user.0).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(
  name = "handler::update_order_status",
  skip(app_state, auth_user, path, req_payload),
  fields(user_id = %auth_user.0.id, order_id = %path.as_ref(), status = %req_payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<StatusUpdateRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .engine
    .update_status(&auth_user.0, path.into_inner(), req_payload.status)
    .await?;
  Ok(HttpResponse::Ok().json(order))
}
