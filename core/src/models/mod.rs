// agrimarket/src/models/mod.rs

//! Records held by the store: users, produce listings and orders.

pub mod order;
pub mod produce;
pub mod user;

pub use order::{Order, OrderParty, OrderStatus};
pub use produce::{Produce, ProduceCategory, ProduceChanges, ProduceDraft, ProduceFilter};
pub use user::{Region, Role, User};
