// agrimarket-server/src/services/mod.rs

//! Identity services: password hashing and access tokens.

pub mod auth_service;
pub mod token_service;

pub use token_service::{Claims, TokenService};
