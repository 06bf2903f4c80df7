// agrimarket/src/orders/engine.rs

use super::contexts::{CreateOrderCtx, StatusUpdateCtx};
use super::{create_pipeline, status_pipeline};
use crate::error::{MarketError, MarketResult};
use crate::models::{Order, OrderParty, OrderStatus, Role, User};
use crate::store::Stores;
use crate::workflow::{ContextData, PipelineRegistry, PipelineResult};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Creates orders against the catalog, scopes order listings to the caller,
/// and drives orders through their lifecycle.
#[derive(Clone)]
pub struct OrderEngine {
  stores: Stores,
  pipelines: Arc<PipelineRegistry<MarketError>>,
}

fn expect_completed(result: PipelineResult, what: &str) -> MarketResult<()> {
  match result {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => Err(MarketError::Internal(format!("{} pipeline stopped early", what))),
  }
}

impl OrderEngine {
  pub fn new(stores: Stores) -> Self {
    let pipelines = PipelineRegistry::new();
    pipelines.register_pipeline(create_pipeline::build());
    pipelines.register_pipeline(status_pipeline::build());
    Self {
      stores,
      pipelines: Arc::new(pipelines),
    }
  }

  /// Places an order for `quantity` units of a listing and reserves that
  /// stock. Either the order exists and the stock is decremented, or neither.
  #[instrument(name = "OrderEngine::create_order", skip(self, buyer), fields(buyer_id = %buyer.id), err(Display))]
  pub async fn create_order(&self, buyer: &User, produce_id: Uuid, quantity: i32) -> MarketResult<Order> {
    let ctx = ContextData::new(CreateOrderCtx::new(self.stores.clone(), buyer.clone(), produce_id, quantity));
    let result = self.pipelines.run(ctx.clone()).await?;
    expect_completed(result, "create_order")?;

    let placed = ctx.write().placed.take();
    placed.ok_or_else(|| MarketError::Internal("order pipeline completed without an order".to_string()))
  }

  /// Orders where the caller is buyer (for buyers) or seller (for farmers).
  /// Other roles see nothing.
  pub async fn list_orders_for(&self, user: &User) -> MarketResult<Vec<Order>> {
    let party = match user.role {
      Role::Buyer => OrderParty::Buyer(user.id),
      Role::Farmer => OrderParty::Farmer(user.id),
      Role::Supplier => return Ok(Vec::new()),
    };
    self
      .stores
      .bounded("orders_for", self.stores.orders.orders_for(party))
      .await
  }

  #[instrument(name = "OrderEngine::update_status", skip(self, user), fields(user_id = %user.id), err(Display))]
  pub async fn update_status(&self, user: &User, order_id: Uuid, new_status: OrderStatus) -> MarketResult<Order> {
    let ctx = ContextData::new(StatusUpdateCtx::new(self.stores.clone(), user.clone(), order_id, new_status));
    let result = self.pipelines.run(ctx.clone()).await?;
    expect_completed(result, "update_status")?;

    let updated = ctx.write().updated.take();
    updated.ok_or_else(|| MarketError::Internal("status pipeline completed without an order".to_string()))
  }
}
