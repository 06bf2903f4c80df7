// src/lib.rs

//! agrimarket: the order and inventory core of a farmer/buyer marketplace.
//!
//! - [`Catalog`] holds produce listings and enforces farmer ownership.
//! - [`OrderEngine`] validates purchases against stock, reserves that stock
//!   atomically, and drives orders through their status lifecycle.
//! - [`Dashboard`] counts listings and orders per role.
//!
//! All three are constructed with an explicit [`Stores`] bundle; the
//! in-memory and PostgreSQL backends both implement the store traits.

pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod orders;
pub mod store;
pub mod workflow;

pub use crate::catalog::Catalog;
pub use crate::dashboard::{Dashboard, DashboardStats};
pub use crate::error::{MarketError, MarketResult};
pub use crate::models::{
  Order, OrderParty, OrderStatus, Produce, ProduceCategory, ProduceChanges, ProduceDraft, ProduceFilter, Region,
  Role, User,
};
pub use crate::orders::OrderEngine;
pub use crate::store::{CatalogStore, MemoryStore, OrderStore, Stores, UserStore, DEFAULT_STORE_TIMEOUT};
#[cfg(feature = "postgres")]
pub use crate::store::PgStore;
