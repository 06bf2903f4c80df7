// agrimarket/src/store/mod.rs

//! Persistence contracts consumed by the catalog, order engine and dashboard.
//!
//! Stores are injected as trait objects through [`Stores`]; nothing in the
//! core reaches for a process-wide connection. Every call made through the
//! services is bounded by [`Stores::timeout`], and a call that overruns it
//! surfaces as [`MarketError::TransientStore`].

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::error::{MarketError, MarketResult};
use crate::models::{Order, OrderParty, OrderStatus, Produce, ProduceChanges, ProduceFilter, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

pub(crate) const NOT_AVAILABLE: &str = "Produce is not available.";
pub(crate) const INSUFFICIENT_STOCK: &str = "Requested quantity exceeds available stock.";

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with `Conflict` when the email is already registered.
  async fn insert_user(&self, user: User) -> MarketResult<User>;
  async fn find_user(&self, id: Uuid) -> MarketResult<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> MarketResult<Option<User>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// Fails with `Conflict` when `unique_code` is already taken.
  async fn insert_produce(&self, produce: Produce) -> MarketResult<Produce>;
  async fn find_produce(&self, id: Uuid) -> MarketResult<Option<Produce>>;
  /// Available listings matching every supplied filter.
  async fn search_produce(&self, filter: &ProduceFilter) -> MarketResult<Vec<Produce>>;
  /// Every listing owned by the farmer, available or not.
  async fn produce_by_farmer(&self, farmer_id: Uuid) -> MarketResult<Vec<Produce>>;
  /// Applies `changes` to the current record in one atomic step. `None` if absent.
  async fn update_produce(&self, id: Uuid, changes: &ProduceChanges) -> MarketResult<Option<Produce>>;
  async fn count_produce(&self, farmer_id: Uuid, available_only: bool) -> MarketResult<u64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Decrements the listing's stock by `order.quantity` and inserts `order`,
  /// as one unit.
  ///
  /// The decrement only happens if the listing is still available and still
  /// holds at least `order.quantity`; otherwise nothing is written and the
  /// call fails with `NotFound` or `Conflict`. The farmer, title and unit
  /// price are taken from the listing row as reserved, overriding the values
  /// on `order`, and the total is recomputed from them.
  async fn place_order(&self, order: Order) -> MarketResult<Order>;
  async fn find_order(&self, id: Uuid) -> MarketResult<Option<Order>>;
  async fn orders_for(&self, party: OrderParty) -> MarketResult<Vec<Order>>;
  /// Sets `to` only if the order is currently in `from`. `None` if the order
  /// is absent or its status moved on in the meantime.
  async fn transition_order(
    &self,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
    at: DateTime<Utc>,
  ) -> MarketResult<Option<Order>>;
  async fn count_orders(&self, party: OrderParty, status: Option<OrderStatus>) -> MarketResult<u64>;
}

/// The store handles a service is constructed with.
#[derive(Clone)]
pub struct Stores {
  pub users: Arc<dyn UserStore>,
  pub catalog: Arc<dyn CatalogStore>,
  pub orders: Arc<dyn OrderStore>,
  pub timeout: Duration,
}

impl Stores {
  /// Uses one backend for every record kind.
  pub fn shared<S>(store: Arc<S>, timeout: Duration) -> Self
  where
    S: UserStore + CatalogStore + OrderStore + 'static,
  {
    Self {
      users: store.clone(),
      catalog: store.clone(),
      orders: store,
      timeout,
    }
  }

  pub fn in_memory() -> Self {
    Self::shared(Arc::new(MemoryStore::new()), DEFAULT_STORE_TIMEOUT)
  }

  /// Awaits `fut`, converting an overrun of the store timeout into a transient error.
  pub async fn bounded<T, F>(&self, op: &'static str, fut: F) -> MarketResult<T>
  where
    F: Future<Output = MarketResult<T>>,
  {
    match tokio::time::timeout(self.timeout, fut).await {
      Ok(result) => result,
      Err(_) => {
        tracing::warn!(op, timeout_ms = self.timeout.as_millis() as u64, "Store call timed out.");
        Err(MarketError::TransientStore(format!("{} timed out", op)))
      }
    }
  }
}
