// agrimarket/src/orders/status_pipeline.rs

use super::contexts::StatusUpdateCtx;
use crate::error::{MarketError, MarketResult};
use crate::models::Role;
use crate::workflow::{ContextData, Pipeline, PipelineControl};
use chrono::Utc;
use tracing::{info, warn};

pub fn build() -> Pipeline<StatusUpdateCtx, MarketError> {
  let mut p = Pipeline::<StatusUpdateCtx, MarketError>::new(&[
    ("load_order", false, None),
    ("authorize_party", false, None),
    ("validate_transition", false, None),
    ("apply_transition", false, None),
  ]);

  p.on_root("load_order", load_order);
  p.on_root("authorize_party", authorize_party);
  p.on_root("validate_transition", validate_transition);
  p.on_root("apply_transition", apply_transition);
  p
}

async fn load_order(ctx: ContextData<StatusUpdateCtx>) -> MarketResult<PipelineControl> {
  let (stores, order_id) = {
    let guard = ctx.read();
    (guard.stores.clone(), guard.order_id)
  }; // guard dropped

  let order = stores
    .bounded("find_order", stores.orders.find_order(order_id))
    .await?
    .ok_or_else(|| MarketError::not_found(format!("Order {} not found.", order_id)))?;
  ctx.write().current = Some(order);
  Ok(PipelineControl::Continue)
}

async fn authorize_party(ctx: ContextData<StatusUpdateCtx>) -> MarketResult<PipelineControl> {
  let guard = ctx.read();
  let order = guard
    .current
    .as_ref()
    .ok_or_else(|| MarketError::Internal("order missing before authorization".to_string()))?;
  let user = &guard.user;

  let is_party = match user.role {
    Role::Farmer => order.farmer_id == user.id,
    Role::Buyer => order.buyer_id == user.id,
    Role::Supplier => false,
  };
  if !is_party {
    warn!(user_id = %user.id, order_id = %order.id, "Status update refused for non-party.");
    return Err(MarketError::authorization("Not authorized to update this order."));
  }
  Ok(PipelineControl::Continue)
}

async fn validate_transition(ctx: ContextData<StatusUpdateCtx>) -> MarketResult<PipelineControl> {
  let guard = ctx.read();
  let from = guard
    .current
    .as_ref()
    .map(|o| o.status)
    .ok_or_else(|| MarketError::Internal("order missing before transition check".to_string()))?;
  let to = guard.new_status;
  if !from.can_transition_to(to) {
    return Err(MarketError::InvalidTransition(format!("cannot move order from {} to {}", from, to)));
  }
  Ok(PipelineControl::Continue)
}

async fn apply_transition(ctx: ContextData<StatusUpdateCtx>) -> MarketResult<PipelineControl> {
  let (stores, order_id, from, to) = {
    let guard = ctx.read();
    let from = guard.current.as_ref().map(|o| o.status);
    (guard.stores.clone(), guard.order_id, from, guard.new_status)
  }; // guard dropped
  let from = from.ok_or_else(|| MarketError::Internal("order missing at transition".to_string()))?;

  let updated = stores
    .bounded("transition_order", stores.orders.transition_order(order_id, from, to, Utc::now()))
    .await?
    .ok_or_else(|| MarketError::conflict("Order status changed concurrently; reload and retry."))?;

  info!(%order_id, %from, %to, "Order status updated.");
  ctx.write().updated = Some(updated);
  Ok(PipelineControl::Continue)
}
