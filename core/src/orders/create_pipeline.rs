// agrimarket/src/orders/create_pipeline.rs

use super::contexts::CreateOrderCtx;
use crate::error::{MarketError, MarketResult};
use crate::models::{Order, Role};
use crate::store::{INSUFFICIENT_STOCK, NOT_AVAILABLE};
use crate::workflow::{ContextData, Pipeline, PipelineControl};
use tracing::{event, info, warn, Level};

/// Builds the order-creation pipeline.
///
/// The availability and stock steps reject early with a clear message; the
/// decisive check happens again inside `commit_order`, where the store guards
/// the decrement against concurrent orders and re-copies the listing terms
/// from the row it reserved.
pub fn build() -> Pipeline<CreateOrderCtx, MarketError> {
  let mut p = Pipeline::<CreateOrderCtx, MarketError>::new(&[
    ("authorize_buyer", false, None),
    ("validate_quantity", false, None),
    ("load_produce", false, None),
    ("check_availability", false, None),
    ("check_stock", false, None),
    ("snapshot_order", false, None),
    ("commit_order", false, None),
  ]);

  p.on_root("authorize_buyer", authorize_buyer);
  p.on_root("validate_quantity", validate_quantity);
  p.on_root("load_produce", load_produce);
  p.on_root("check_availability", check_availability);
  p.on_root("check_stock", check_stock);
  p.on_root("snapshot_order", snapshot_order);
  p.on_root("commit_order", commit_order);
  p.after_root("commit_order", log_placed);
  p
}

async fn authorize_buyer(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let (user_id, role) = {
    let guard = ctx.read();
    (guard.buyer.id, guard.buyer.role)
  }; // guard dropped

  match role {
    Role::Buyer => Ok(PipelineControl::Continue),
    Role::Farmer | Role::Supplier => {
      warn!(%user_id, %role, "Order creation refused for non-buyer.");
      Err(MarketError::authorization("Only buyers can place orders."))
    }
  }
}

async fn validate_quantity(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let quantity = ctx.read().quantity;
  if quantity <= 0 {
    return Err(MarketError::validation("Quantity must be greater than zero."));
  }
  Ok(PipelineControl::Continue)
}

async fn load_produce(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let (stores, produce_id) = {
    let guard = ctx.read();
    (guard.stores.clone(), guard.produce_id)
  }; // guard dropped

  event!(Level::DEBUG, %produce_id, "Loading produce for order.");
  let produce = stores
    .bounded("find_produce", stores.catalog.find_produce(produce_id))
    .await?
    .ok_or_else(|| MarketError::not_found(format!("Produce {} not found.", produce_id)))?;

  ctx.write().produce = Some(produce);
  Ok(PipelineControl::Continue)
}

async fn check_availability(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let available = {
    let guard = ctx.read();
    guard.produce.as_ref().map(|p| p.is_available)
  };
  match available {
    Some(true) => Ok(PipelineControl::Continue),
    Some(false) => Err(MarketError::conflict(NOT_AVAILABLE)),
    None => Err(MarketError::Internal("produce missing before availability check".to_string())),
  }
}

async fn check_stock(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let (requested, in_stock) = {
    let guard = ctx.read();
    (guard.quantity, guard.produce.as_ref().map(|p| p.quantity))
  };
  let in_stock =
    in_stock.ok_or_else(|| MarketError::Internal("produce missing before stock check".to_string()))?;
  if requested > in_stock {
    event!(Level::INFO, requested, in_stock, "Order exceeds stock.");
    return Err(MarketError::conflict(INSUFFICIENT_STOCK));
  }
  Ok(PipelineControl::Continue)
}

async fn snapshot_order(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let mut guard = ctx.write();
  let order = match &guard.produce {
    Some(produce) => Order::snapshot(&guard.buyer, produce, guard.quantity)?,
    None => return Err(MarketError::Internal("produce missing before snapshot".to_string())),
  };
  guard.draft = Some(order);
  Ok(PipelineControl::Continue)
}

async fn commit_order(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let (stores, draft) = {
    let mut guard = ctx.write();
    (guard.stores.clone(), guard.draft.take())
  }; // guard dropped
  let draft = draft.ok_or_else(|| MarketError::Internal("order draft missing at commit".to_string()))?;

  let placed = stores.bounded("place_order", stores.orders.place_order(draft)).await?;
  ctx.write().placed = Some(placed);
  Ok(PipelineControl::Continue)
}

async fn log_placed(ctx: ContextData<CreateOrderCtx>) -> MarketResult<PipelineControl> {
  let guard = ctx.read();
  if let Some(order) = &guard.placed {
    info!(
      order_id = %order.id,
      produce_id = %order.produce_id,
      quantity = order.quantity,
      total = %order.total_amount,
      "Order placed."
    );
  }
  Ok(PipelineControl::Continue)
}
