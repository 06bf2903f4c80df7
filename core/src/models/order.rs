// agrimarket/src/models/order.rs

use super::produce::Produce;
use super::user::User;
use crate::error::{MarketError, MarketResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle.
///
/// ```text
/// pending -> confirmed -> paid -> delivered
///    \           \
///     +-----------+--> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "order_status_enum", rename_all = "lowercase"))]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Paid,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Confirmed) | (Confirmed, Paid) | (Paid, Delivered) | (Pending, Cancelled) | (Confirmed, Cancelled)
    )
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Paid => "paid",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl std::fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A buyer's commitment to a quantity of one listing.
///
/// `buyer_name`, `farmer_name`, `produce_title` and `unit_price` are copied at
/// creation and never follow later edits to the user or listing.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
  pub id: Uuid,
  pub produce_id: Uuid,
  pub farmer_id: Uuid,
  pub buyer_id: Uuid,
  pub buyer_name: String,
  pub farmer_name: String,
  pub produce_title: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Builds a pending order from the listing as observed right now.
  pub fn snapshot(buyer: &User, produce: &Produce, quantity: i32) -> MarketResult<Self> {
    let now = Utc::now();
    let mut order = Self {
      id: Uuid::new_v4(),
      produce_id: produce.id,
      farmer_id: produce.farmer_id,
      buyer_id: buyer.id,
      buyer_name: buyer.name.clone(),
      farmer_name: String::new(),
      produce_title: String::new(),
      quantity,
      unit_price: Decimal::ZERO,
      total_amount: Decimal::ZERO,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    };
    order.copy_listing_terms(produce.farmer_id, &produce.farmer_name, &produce.title, produce.price)?;
    Ok(order)
  }

  /// Overwrites the listing-derived fields and recomputes the total.
  ///
  /// Stores call this with the row they reserved stock on, so the committed
  /// order always carries the terms of the listing it decremented.
  pub fn copy_listing_terms(
    &mut self,
    farmer_id: Uuid,
    farmer_name: &str,
    title: &str,
    unit_price: Decimal,
  ) -> MarketResult<()> {
    self.total_amount = line_total(self.quantity, unit_price)?;
    self.farmer_id = farmer_id;
    self.farmer_name = farmer_name.to_string();
    self.produce_title = title.to_string();
    self.unit_price = unit_price;
    Ok(())
  }
}

/// Largest total the `orders.total_amount NUMERIC(14, 2)` column holds.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

pub fn line_total(quantity: i32, unit_price: Decimal) -> MarketResult<Decimal> {
  Decimal::from(quantity)
    .checked_mul(unit_price)
    .filter(|total| *total <= MAX_ORDER_TOTAL)
    .ok_or_else(|| MarketError::validation("Order total is out of range."))
}

/// Which side of an order a user is looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderParty {
  Buyer(Uuid),
  Farmer(Uuid),
}

impl OrderParty {
  pub fn includes(&self, order: &Order) -> bool {
    match self {
      OrderParty::Buyer(id) => order.buyer_id == *id,
      OrderParty::Farmer(id) => order.farmer_id == *id,
    }
  }
}
