// agrimarket-server/src/lib.rs

//! HTTP surface for the agrimarket core: accounts, produce listings, orders
//! and dashboard counters, served by actix-web under `/api`.

pub mod config;
pub mod errors;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;

pub use config::AppConfig;
pub use errors::AppError;
pub use state::AppState;
