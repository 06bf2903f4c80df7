// agrimarket/src/orders/mod.rs

//! The order engine.
//!
//! Order creation and status updates each run as a step pipeline over their
//! own context type; [`OrderEngine`] owns the registry they are kept in.

pub mod contexts;
pub mod create_pipeline;
pub mod engine;
pub mod status_pipeline;

pub use contexts::{CreateOrderCtx, StatusUpdateCtx};
pub use engine::OrderEngine;
