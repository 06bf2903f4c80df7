// agrimarket-server/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use agrimarket::workflow::{ContextData, Pipeline, PipelineControl, PipelineRegistry};
use tracing::{event, warn, Level};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

/// Registers the sign-in pipeline.
pub fn register_signin_pipeline(registry: &PipelineRegistry<AppError>) {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email_signin", false, None),
    ("verify_user_password_signin", false, None),
    ("issue_token_signin", false, None),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email_blank, password_blank) = {
        let guard = ctx_data.read();
        (guard.email.trim().is_empty(), guard.password.is_empty())
      }; // guard dropped

      if email_blank {
        return Err(AppError::validation("Email is required."));
      }
      if password_blank {
        return Err(AppError::validation("Password is required."));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signin_p.on_root("fetch_user_by_email_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email, stores) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.stores.clone())
      }; // guard dropped

      event!(Level::DEBUG, %email, "Fetching user by email for signin.");
      match stores
        .bounded("find_user_by_email", stores.users.find_user_by_email(&email))
        .await?
      {
        Some(user) => {
          ctx_data.write().user = Some(user);
          Ok::<_, AppError>(PipelineControl::Continue)
        }
        None => {
          warn!(%email, "User not found during signin.");
          Err(AppError::unauthenticated(BAD_CREDENTIALS))
        }
      }
    })
  });

  signin_p.on_root("verify_user_password_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (stored, password) = {
        let guard = ctx_data.read();
        let stored = guard.user.as_ref().map(|u| (u.id, u.password_hash.clone(), u.is_active));
        (stored, guard.password.clone())
      }; // guard dropped

      let (user_id, stored_hash, is_active) =
        stored.ok_or_else(|| AppError::Internal("User missing before password verification.".to_string()))?;

      if !auth_service::verify_password(&stored_hash, &password)? {
        warn!(%user_id, "Password mismatch during signin.");
        return Err(AppError::unauthenticated(BAD_CREDENTIALS));
      }
      if !is_active {
        warn!(%user_id, "Signin refused for inactive account.");
        return Err(AppError::unauthenticated("Account is disabled."));
      }
      event!(Level::INFO, %user_id, "Password verified for signin.");
      Ok(PipelineControl::Continue)
    })
  });

  signin_p.on_root("issue_token_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let token = match &guard.user {
        Some(user) => guard.tokens.issue(user)?,
        None => return Err(AppError::Internal("User missing when issuing signin token.".to_string())),
      };
      guard.access_token = Some(token);
      Ok(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(signin_p);
  tracing::info!("Sign-in pipeline registered.");
}
