// tests/common/mod.rs
#![allow(dead_code)]

use agrimarket::store::CatalogStore;
use agrimarket::{
  Catalog, Dashboard, MarketResult, MemoryStore, OrderEngine, Produce, ProduceCategory, ProduceChanges, ProduceDraft,
  ProduceFilter, Region, Role, Stores, User, UserStore, DEFAULT_STORE_TIMEOUT,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Services sharing one in-memory backend.
pub struct Market {
  pub stores: Stores,
  pub catalog: Catalog,
  pub engine: OrderEngine,
  pub dashboard: Dashboard,
}

impl Market {
  pub fn new() -> Self {
    Self::with_stores(Stores::in_memory())
  }

  pub fn with_stores(stores: Stores) -> Self {
    Self {
      catalog: Catalog::new(stores.clone()),
      engine: OrderEngine::new(stores.clone()),
      dashboard: Dashboard::new(stores.clone()),
      stores,
    }
  }

  pub async fn register(&self, name: &str, role: Role) -> User {
    let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4().simple());
    let user = User::new(email, "not-a-real-hash", name, role, "+233200000000", Region::Ashanti);
    self.stores.users.insert_user(user).await.expect("insert user")
  }

  pub async fn list(&self, farmer: &User, quantity: i32, price: Decimal) -> Produce {
    self
      .catalog
      .create_listing(farmer, draft(quantity, price))
      .await
      .expect("create listing")
  }
}

pub fn draft(quantity: i32, price: Decimal) -> ProduceDraft {
  ProduceDraft {
    title: "White Maize".to_string(),
    category: ProduceCategory::Grains,
    description: "Dried and bagged".to_string(),
    price,
    quantity,
    unit: "bags".to_string(),
  }
}

pub fn cedis(amount: &str) -> Decimal {
  amount.parse().expect("decimal literal")
}

/// Catalog backend whose calls never complete.
pub struct StalledCatalog;

#[async_trait]
impl CatalogStore for StalledCatalog {
  async fn insert_produce(&self, _produce: Produce) -> MarketResult<Produce> {
    std::future::pending().await
  }

  async fn find_produce(&self, _id: Uuid) -> MarketResult<Option<Produce>> {
    std::future::pending().await
  }

  async fn search_produce(&self, _filter: &ProduceFilter) -> MarketResult<Vec<Produce>> {
    std::future::pending().await
  }

  async fn produce_by_farmer(&self, _farmer_id: Uuid) -> MarketResult<Vec<Produce>> {
    std::future::pending().await
  }

  async fn update_produce(&self, _id: Uuid, _changes: &ProduceChanges) -> MarketResult<Option<Produce>> {
    std::future::pending().await
  }

  async fn count_produce(&self, _farmer_id: Uuid, _available_only: bool) -> MarketResult<u64> {
    std::future::pending().await
  }
}

/// Users and orders in memory, catalog stalled, with a short store timeout.
pub fn stalled_catalog_stores() -> Stores {
  let memory = Arc::new(MemoryStore::new());
  Stores {
    users: memory.clone(),
    catalog: Arc::new(StalledCatalog),
    orders: memory,
    timeout: Duration::from_millis(50),
  }
}

/// Catalog over a shared `MemoryStore` whose point lookups report an old
/// price and title, as a read taken before the farmer's last edit would.
pub struct StaleListingCatalog {
  inner: Arc<MemoryStore>,
  stale_price: Decimal,
}

#[async_trait]
impl CatalogStore for StaleListingCatalog {
  async fn insert_produce(&self, produce: Produce) -> MarketResult<Produce> {
    self.inner.insert_produce(produce).await
  }

  async fn find_produce(&self, id: Uuid) -> MarketResult<Option<Produce>> {
    let found = self.inner.find_produce(id).await?;
    Ok(found.map(|mut p| {
      p.price = self.stale_price;
      p.title = "Stale title".to_string();
      p
    }))
  }

  async fn search_produce(&self, filter: &ProduceFilter) -> MarketResult<Vec<Produce>> {
    self.inner.search_produce(filter).await
  }

  async fn produce_by_farmer(&self, farmer_id: Uuid) -> MarketResult<Vec<Produce>> {
    self.inner.produce_by_farmer(farmer_id).await
  }

  async fn update_produce(&self, id: Uuid, changes: &ProduceChanges) -> MarketResult<Option<Produce>> {
    self.inner.update_produce(id, changes).await
  }

  async fn count_produce(&self, farmer_id: Uuid, available_only: bool) -> MarketResult<u64> {
    self.inner.count_produce(farmer_id, available_only).await
  }
}

/// Memory-backed stores whose catalog lookups lag behind the stored listing.
pub fn stale_listing_stores(stale_price: Decimal) -> Stores {
  let memory = Arc::new(MemoryStore::new());
  Stores {
    users: memory.clone(),
    catalog: Arc::new(StaleListingCatalog { inner: memory.clone(), stale_price }),
    orders: memory,
    timeout: DEFAULT_STORE_TIMEOUT,
  }
}
