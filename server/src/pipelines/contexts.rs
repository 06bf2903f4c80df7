// agrimarket-server/src/pipelines/contexts.rs

//! Data structs the account pipelines run over, wrapped in `ContextData`.

use crate::services::TokenService;
use agrimarket::{Region, Role, Stores, User};
use std::sync::Arc;

pub struct SignupCtxData {
  pub stores: Stores,
  pub tokens: Arc<TokenService>,
  pub email: String,
  pub password: String,
  pub name: String,
  pub role: Role,
  pub phone: String,
  pub region: Region,
  pub created_user: Option<User>,
  pub access_token: Option<String>,
}

pub struct SigninCtxData {
  pub stores: Stores,
  pub tokens: Arc<TokenService>,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub access_token: Option<String>,
}
