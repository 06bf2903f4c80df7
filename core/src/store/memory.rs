// agrimarket/src/store/memory.rs

//! Process-local store. All tables sit behind one lock, so every compound
//! operation (stock decrement plus order insert, status compare-and-swap) is
//! atomic with respect to concurrent requests.

use super::{CatalogStore, OrderStore, UserStore, INSUFFICIENT_STOCK, NOT_AVAILABLE};
use crate::error::{MarketError, MarketResult};
use crate::models::{Order, OrderParty, OrderStatus, Produce, ProduceChanges, ProduceFilter, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  users: HashMap<Uuid, User>,
  produce: HashMap<Uuid, Produce>,
  orders: HashMap<Uuid, Order>,
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn sorted_by_creation<T>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) -> Vec<T> {
  let mut out: Vec<T> = rows.collect();
  out.sort_by_key(key);
  out
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn insert_user(&self, user: User) -> MarketResult<User> {
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.email == user.email) {
      return Err(MarketError::conflict("Email already registered."));
    }
    tables.users.insert(user.id, user.clone());
    Ok(user)
  }

  async fn find_user(&self, id: Uuid) -> MarketResult<Option<User>> {
    Ok(self.tables.read().users.get(&id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> MarketResult<Option<User>> {
    Ok(self.tables.read().users.values().find(|u| u.email == email).cloned())
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn insert_produce(&self, produce: Produce) -> MarketResult<Produce> {
    let mut tables = self.tables.write();
    if tables.produce.values().any(|p| p.unique_code == produce.unique_code) {
      return Err(MarketError::conflict("Listing code already in use."));
    }
    tables.produce.insert(produce.id, produce.clone());
    Ok(produce)
  }

  async fn find_produce(&self, id: Uuid) -> MarketResult<Option<Produce>> {
    Ok(self.tables.read().produce.get(&id).cloned())
  }

  async fn search_produce(&self, filter: &ProduceFilter) -> MarketResult<Vec<Produce>> {
    let tables = self.tables.read();
    Ok(sorted_by_creation(
      tables.produce.values().filter(|p| filter.matches(p)).cloned(),
      |p| (p.created_at, p.id),
    ))
  }

  async fn produce_by_farmer(&self, farmer_id: Uuid) -> MarketResult<Vec<Produce>> {
    let tables = self.tables.read();
    Ok(sorted_by_creation(
      tables.produce.values().filter(|p| p.farmer_id == farmer_id).cloned(),
      |p| (p.created_at, p.id),
    ))
  }

  async fn update_produce(&self, id: Uuid, changes: &ProduceChanges) -> MarketResult<Option<Produce>> {
    let mut tables = self.tables.write();
    Ok(tables.produce.get_mut(&id).map(|p| {
      changes.apply_to(p, Utc::now());
      p.clone()
    }))
  }

  async fn count_produce(&self, farmer_id: Uuid, available_only: bool) -> MarketResult<u64> {
    let tables = self.tables.read();
    let n = tables
      .produce
      .values()
      .filter(|p| p.farmer_id == farmer_id && (!available_only || p.is_available))
      .count();
    Ok(n as u64)
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn place_order(&self, mut order: Order) -> MarketResult<Order> {
    let mut tables = self.tables.write();
    let produce = tables
      .produce
      .get_mut(&order.produce_id)
      .ok_or_else(|| MarketError::not_found(format!("Produce {} not found.", order.produce_id)))?;
    if !produce.is_available {
      return Err(MarketError::conflict(NOT_AVAILABLE));
    }
    if produce.quantity < order.quantity {
      return Err(MarketError::conflict(INSUFFICIENT_STOCK));
    }
    order.copy_listing_terms(produce.farmer_id, &produce.farmer_name, &produce.title, produce.price)?;
    produce.quantity -= order.quantity;
    produce.updated_at = Utc::now();
    tables.orders.insert(order.id, order.clone());
    Ok(order)
  }

  async fn find_order(&self, id: Uuid) -> MarketResult<Option<Order>> {
    Ok(self.tables.read().orders.get(&id).cloned())
  }

  async fn orders_for(&self, party: OrderParty) -> MarketResult<Vec<Order>> {
    let tables = self.tables.read();
    Ok(sorted_by_creation(
      tables.orders.values().filter(|o| party.includes(o)).cloned(),
      |o| (o.created_at, o.id),
    ))
  }

  async fn transition_order(
    &self,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
    at: DateTime<Utc>,
  ) -> MarketResult<Option<Order>> {
    let mut tables = self.tables.write();
    Ok(match tables.orders.get_mut(&id) {
      Some(order) if order.status == from => {
        order.status = to;
        order.updated_at = at;
        Some(order.clone())
      }
      _ => None,
    })
  }

  async fn count_orders(&self, party: OrderParty, status: Option<OrderStatus>) -> MarketResult<u64> {
    let tables = self.tables.read();
    let n = tables
      .orders
      .values()
      .filter(|o| party.includes(o) && status.map_or(true, |s| o.status == s))
      .count();
    Ok(n as u64)
  }
}
