// agrimarket/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an account is allowed to do. Fixed at registration.
///
/// Authorization sites match on this exhaustively so that adding a role forces
/// every check to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "user_role_enum", rename_all = "lowercase"))]
pub enum Role {
  Farmer,
  // Defined for registration; no operation grants it anything yet.
  Supplier,
  Buyer,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Farmer => "farmer",
      Role::Supplier => "supplier",
      Role::Buyer => "buyer",
    }
  }
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "region_enum", rename_all = "lowercase"))]
pub enum Region {
  Accra,
  Ashanti,
  Western,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub name: String,
  pub role: Role,
  pub phone: String,
  pub region: Region,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn new(
    email: impl Into<String>,
    password_hash: impl Into<String>,
    name: impl Into<String>,
    role: Role,
    phone: impl Into<String>,
    region: Region,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      email: email.into(),
      password_hash: password_hash.into(),
      name: name.into(),
      role,
      phone: phone.into(),
      region,
      is_active: true,
      created_at: Utc::now(),
    }
  }
}
