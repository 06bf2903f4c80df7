// agrimarket/src/dashboard.rs

use crate::error::MarketResult;
use crate::models::{OrderParty, OrderStatus, Role, User};
use crate::store::Stores;
use std::collections::BTreeMap;
use tracing::instrument;

pub type DashboardStats = BTreeMap<&'static str, u64>;

/// Per-role counters, read straight from the stores on every call.
#[derive(Clone)]
pub struct Dashboard {
  stores: Stores,
}

impl Dashboard {
  pub fn new(stores: Stores) -> Self {
    Self { stores }
  }

  #[instrument(name = "Dashboard::stats", skip(self, user), fields(user_id = %user.id, role = %user.role), err(Display))]
  pub async fn stats(&self, user: &User) -> MarketResult<DashboardStats> {
    let mut stats = DashboardStats::new();
    match user.role {
      Role::Farmer => {
        let party = OrderParty::Farmer(user.id);
        stats.insert("total_produce", self.count_produce(user, false).await?);
        stats.insert("active_produce", self.count_produce(user, true).await?);
        stats.insert("total_orders", self.count_orders(party, None).await?);
        stats.insert("pending_orders", self.count_orders(party, Some(OrderStatus::Pending)).await?);
      }
      Role::Buyer => {
        let party = OrderParty::Buyer(user.id);
        stats.insert("total_orders", self.count_orders(party, None).await?);
        stats.insert("pending_orders", self.count_orders(party, Some(OrderStatus::Pending)).await?);
        stats.insert("completed_orders", self.count_orders(party, Some(OrderStatus::Delivered)).await?);
      }
      Role::Supplier => {}
    }
    Ok(stats)
  }

  async fn count_produce(&self, farmer: &User, available_only: bool) -> MarketResult<u64> {
    self
      .stores
      .bounded("count_produce", self.stores.catalog.count_produce(farmer.id, available_only))
      .await
  }

  async fn count_orders(&self, party: OrderParty, status: Option<OrderStatus>) -> MarketResult<u64> {
    self
      .stores
      .bounded("count_orders", self.stores.orders.count_orders(party, status))
      .await
  }
}
