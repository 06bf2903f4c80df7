// agrimarket/src/error.rs
use crate::workflow::FlowError;
use thiserror::Error;

/// Every failure the marketplace core reports to its callers.
///
/// Each variant carries a human-readable message; [`MarketError::code`] gives
/// the stable machine code clients should branch on.
#[derive(Debug, Error)]
pub enum MarketError {
  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Authentication failed: {0}")]
  Authentication(String),

  #[error("Not authorized: {0}")]
  Authorization(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Invalid status transition: {0}")]
  InvalidTransition(String),

  /// Timeout or unavailability of the backing store. Safe to retry.
  #[error("Store temporarily unavailable: {0}")]
  TransientStore(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl MarketError {
  pub fn validation(msg: impl Into<String>) -> Self {
    MarketError::Validation(msg.into())
  }

  pub fn authorization(msg: impl Into<String>) -> Self {
    MarketError::Authorization(msg.into())
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    MarketError::NotFound(msg.into())
  }

  pub fn conflict(msg: impl Into<String>) -> Self {
    MarketError::Conflict(msg.into())
  }

  pub fn code(&self) -> &'static str {
    match self {
      MarketError::Validation(_) => "VALIDATION_ERROR",
      MarketError::Authentication(_) => "AUTHENTICATION_ERROR",
      MarketError::Authorization(_) => "AUTHORIZATION_ERROR",
      MarketError::NotFound(_) => "NOT_FOUND",
      MarketError::Conflict(_) => "CONFLICT",
      MarketError::InvalidTransition(_) => "INVALID_TRANSITION",
      MarketError::TransientStore(_) => "TRANSIENT_STORE_ERROR",
      MarketError::Internal(_) => "INTERNAL_ERROR",
    }
  }

  /// The message without the variant prefix added by `Display`.
  pub fn message(&self) -> &str {
    match self {
      MarketError::Validation(m)
      | MarketError::Authentication(m)
      | MarketError::Authorization(m)
      | MarketError::NotFound(m)
      | MarketError::Conflict(m)
      | MarketError::InvalidTransition(m)
      | MarketError::TransientStore(m)
      | MarketError::Internal(m) => m,
    }
  }

  pub fn is_retryable(&self) -> bool {
    matches!(self, MarketError::TransientStore(_))
  }
}

// Workflow wiring errors are programming mistakes, never caller mistakes.
impl From<FlowError> for MarketError {
  fn from(err: FlowError) -> Self {
    MarketError::Internal(err.to_string())
  }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for MarketError {
  fn from(err: sqlx::Error) -> Self {
    match err {
      sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
        MarketError::TransientStore(err.to_string())
      }
      sqlx::Error::RowNotFound => MarketError::NotFound("record not found".to_string()),
      other => MarketError::Internal(format!("database error: {}", other)),
    }
  }
}

pub type MarketResult<T, E = MarketError> = std::result::Result<T, E>;
