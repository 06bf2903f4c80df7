// agrimarket-server/src/services/token_service.rs

//! HS256 access tokens carrying the user id and role.

use crate::errors::AppError;
use agrimarket::{Role, User};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// User id.
  pub sub: String,
  pub role: Role,
  pub exp: usize,
  pub iat: usize,
}

impl Claims {
  pub fn user_id(&self) -> Result<Uuid, AppError> {
    Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthenticated("Invalid or expired token."))
  }
}

pub struct TokenService {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl: chrono::Duration,
}

impl TokenService {
  pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl,
    }
  }

  pub fn issue(&self, user: &User) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user.id.to_string(),
      role: user.role,
      exp: (now + self.ttl).timestamp() as usize,
      iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
      .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
  }

  /// Checks signature and expiry. Every failure is an authentication error.
  pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
      .map(|data| data.claims)
      .map_err(|e| {
        debug!("JWT validation failed: {e}");
        AppError::unauthenticated("Invalid or expired token.")
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use agrimarket::Region;

  const SECRET: &str = "0123456789abcdef0123456789abcdef";

  fn user() -> User {
    User::new("ama@example.com", "hash", "Ama", Role::Buyer, "+233", Region::Accra)
  }

  #[test]
  fn issued_token_verifies_with_same_secret() {
    let tokens = TokenService::new(SECRET, chrono::Duration::minutes(30));
    let u = user();
    let claims = tokens.verify(&tokens.issue(&u).unwrap()).unwrap();
    assert_eq!(claims.user_id().unwrap(), u.id);
    assert_eq!(claims.role, Role::Buyer);
    assert!(claims.exp > claims.iat);
  }

  #[test]
  fn foreign_or_expired_tokens_are_rejected() {
    let tokens = TokenService::new(SECRET, chrono::Duration::minutes(30));
    let other = TokenService::new("ffffffffffffffffffffffffffffffff", chrono::Duration::minutes(30));
    let expired = TokenService::new(SECRET, chrono::Duration::minutes(-10));
    let u = user();

    for token in [other.issue(&u).unwrap(), expired.issue(&u).unwrap(), "garbage".to_string()] {
      let err = tokens.verify(&token).unwrap_err();
      assert_eq!(err.code(), "AUTHENTICATION_ERROR");
    }
  }
}
