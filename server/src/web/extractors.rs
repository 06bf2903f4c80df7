// agrimarket-server/src/web/extractors.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use agrimarket::User;
use futures_util::future::LocalBoxFuture;
use tracing::warn;

/// The caller identified by a valid bearer token whose account still exists.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

fn bearer_token(req: &HttpRequest) -> Option<String> {
  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
    Some(token.trim().to_string())
  } else {
    None
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req);

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("AppState is not configured.".to_string()))?;
      let token = token.ok_or_else(|| {
        warn!("Missing or malformed Authorization header.");
        AppError::unauthenticated("Not authenticated.")
      })?;

      let claims = state.tokens.verify(&token)?;
      let user_id = claims.user_id()?;
      let user = state
        .stores
        .bounded("find_user", state.stores.users.find_user(user_id))
        .await?
        .ok_or_else(|| AppError::unauthenticated("User no longer exists."))?;
      if !user.is_active {
        return Err(AppError::unauthenticated("Account is disabled."));
      }
      Ok(AuthenticatedUser(user))
    })
  }
}
