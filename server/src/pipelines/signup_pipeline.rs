// agrimarket-server/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service;
use agrimarket::workflow::{ContextData, Pipeline, PipelineControl, PipelineRegistry};
use agrimarket::{MarketError, User};
use tracing::{event, info, warn, Level};

/// Registers the account registration pipeline.
pub fn register_signup_pipeline(registry: &PipelineRegistry<AppError>) {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user_signup", false, None),
    ("create_user_signup", false, None),
    ("issue_token_signup", false, None),
  ]);

  signup_p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (email, password_len, name_blank, phone_blank) = {
        let guard = ctx_data.read();
        (
          guard.email.clone(),
          guard.password.chars().count(),
          guard.name.trim().is_empty(),
          guard.phone.trim().is_empty(),
        )
      }; // guard dropped

      event!(Level::DEBUG, %email, "Validating signup input.");
      if email.is_empty() || !email.contains('@') {
        warn!("Invalid email format provided for signup.");
        return Err(AppError::validation("Valid email is required."));
      }
      if password_len < 8 {
        return Err(AppError::validation("Password must be at least 8 characters long."));
      }
      if name_blank {
        return Err(AppError::validation("Name is required."));
      }
      if phone_blank {
        return Err(AppError::validation("Phone is required."));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signup_p.on_root("check_existing_user_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (email, stores) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.stores.clone())
      }; // guard dropped

      let existing = stores
        .bounded("find_user_by_email", stores.users.find_user_by_email(&email))
        .await?;
      if existing.is_some() {
        warn!(%email, "Attempt to sign up with an existing email.");
        return Err(AppError::Market(MarketError::conflict("Email already registered.")));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signup_p.on_root("create_user_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (stores, draft, password) = {
        let guard = ctx_data.read();
        let draft = User::new(
          guard.email.clone(),
          String::new(),
          guard.name.trim(),
          guard.role,
          guard.phone.trim(),
          guard.region,
        );
        (guard.stores.clone(), draft, guard.password.clone())
      }; // guard dropped

      let password_hash = auth_service::hash_password(&password)?;
      let user = User { password_hash, ..draft };
      let created = stores.bounded("insert_user", stores.users.insert_user(user)).await?;

      info!(user_id = %created.id, role = %created.role, "User created.");
      ctx_data.write().created_user = Some(created);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signup_p.on_root("issue_token_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let token = match &guard.created_user {
        Some(user) => guard.tokens.issue(user)?,
        None => return Err(AppError::Internal("User missing when issuing signup token.".to_string())),
      };
      guard.access_token = Some(token);
      Ok(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(signup_p);
  tracing::info!("Sign-up pipeline registered.");
}
