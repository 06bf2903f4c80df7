// agrimarket/src/orders/contexts.rs

//! Data threaded through the order pipelines, wrapped in `ContextData`.

use crate::models::{Order, OrderStatus, Produce, User};
use crate::store::Stores;
use uuid::Uuid;

pub struct CreateOrderCtx {
  pub stores: Stores,
  pub buyer: User,
  pub produce_id: Uuid,
  pub quantity: i32,
  /// Listing as read by `load_produce`; only used for the pre-checks and snapshot.
  pub produce: Option<Produce>,
  pub draft: Option<Order>,
  pub placed: Option<Order>,
}

impl CreateOrderCtx {
  pub fn new(stores: Stores, buyer: User, produce_id: Uuid, quantity: i32) -> Self {
    Self {
      stores,
      buyer,
      produce_id,
      quantity,
      produce: None,
      draft: None,
      placed: None,
    }
  }
}

pub struct StatusUpdateCtx {
  pub stores: Stores,
  pub user: User,
  pub order_id: Uuid,
  pub new_status: OrderStatus,
  pub current: Option<Order>,
  pub updated: Option<Order>,
}

impl StatusUpdateCtx {
  pub fn new(stores: Stores, user: User, order_id: Uuid, new_status: OrderStatus) -> Self {
    Self {
      stores,
      user,
      order_id,
      new_status,
      current: None,
      updated: None,
    }
  }
}
