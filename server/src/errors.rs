// agrimarket-server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use agrimarket::workflow::FlowError;
use agrimarket::MarketError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Market(#[from] MarketError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn validation(msg: impl Into<String>) -> Self {
    AppError::Market(MarketError::validation(msg))
  }

  pub fn unauthenticated(msg: impl Into<String>) -> Self {
    AppError::Market(MarketError::Authentication(msg.into()))
  }

  /// Stable machine-readable code sent to clients.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Market(e) => e.code(),
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => "INTERNAL_ERROR",
    }
  }

  fn client_message(&self) -> String {
    match self {
      AppError::Market(MarketError::Internal(_)) => "An internal error occurred.".to_string(),
      AppError::Market(e) => e.message().to_string(),
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        "An internal error occurred.".to_string()
      }
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<MarketError>() {
      Ok(market) => AppError::Market(market),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Market(e) => match e {
        MarketError::Validation(_) | MarketError::Conflict(_) => StatusCode::BAD_REQUEST,
        MarketError::Authentication(_) => StatusCode::UNAUTHORIZED,
        MarketError::Authorization(_) => StatusCode::FORBIDDEN,
        MarketError::NotFound(_) => StatusCode::NOT_FOUND,
        MarketError::InvalidTransition(_) => StatusCode::CONFLICT,
        MarketError::TransientStore(_) => StatusCode::SERVICE_UNAVAILABLE,
        MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    HttpResponse::build(status).json(json!({
      "code": self.code(),
      "error": self.client_message(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn market_errors_map_to_http_statuses() {
    let cases = [
      (MarketError::validation("x"), 400),
      (MarketError::conflict("x"), 400),
      (MarketError::Authentication("x".into()), 401),
      (MarketError::authorization("x"), 403),
      (MarketError::not_found("x"), 404),
      (MarketError::InvalidTransition("x".into()), 409),
      (MarketError::TransientStore("x".into()), 503),
      (MarketError::Internal("x".into()), 500),
    ];
    for (err, status) in cases {
      assert_eq!(AppError::from(err).status_code().as_u16(), status);
    }
  }

  #[test]
  fn internal_details_are_not_leaked() {
    let err = AppError::Internal("connection string postgres://secret".into());
    assert_eq!(err.code(), "INTERNAL_ERROR");
    assert!(!err.client_message().contains("secret"));
  }

  #[test]
  fn anyhow_wrapping_a_market_error_keeps_its_code() {
    let err = AppError::from(anyhow::Error::new(MarketError::not_found("gone")));
    assert_eq!(err.code(), "NOT_FOUND");
  }
}
