// agrimarket-server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use agrimarket::workflow::{ContextData, PipelineResult};
use agrimarket::{Region, Role, User};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  pub email: String,
  pub password: String,
  pub name: String,
  pub role: Role,
  pub phone: String,
  pub region: Region,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Serialize, Debug)]
pub struct TokenResponse {
  pub access_token: String,
  pub token_type: &'static str,
  pub user: User,
}

fn token_response(token: Option<String>, user: Option<User>, flow: &str) -> Result<HttpResponse, AppError> {
  match (token, user) {
    (Some(access_token), Some(user)) => Ok(HttpResponse::Ok().json(TokenResponse {
      access_token,
      token_type: "bearer",
      user,
    })),
    _ => {
      warn!(flow, "Pipeline completed without a user or token.");
      Err(AppError::Internal(format!("{} completed without issuing a token.", flow)))
    }
  }
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(SignupCtxData {
    stores: app_state.stores.clone(),
    tokens: app_state.tokens.clone(),
    email: payload.email.trim().to_string(),
    password: payload.password,
    name: payload.name,
    role: payload.role,
    phone: payload.phone,
    region: payload.region,
    created_user: None,
    access_token: None,
  });

  match app_state.pipelines.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let (token, user) = {
        let mut guard = ctx_data.write();
        (guard.access_token.take(), guard.created_user.take())
      };
      info!("Registration successful.");
      token_response(token, user, "Registration")
    }
    PipelineResult::Stopped => Err(AppError::Internal("Registration was halted by an internal step.".to_string())),
  }
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(SigninCtxData {
    stores: app_state.stores.clone(),
    tokens: app_state.tokens.clone(),
    email: payload.email.trim().to_string(),
    password: payload.password,
    user: None,
    access_token: None,
  });

  match app_state.pipelines.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let (token, user) = {
        let mut guard = ctx_data.write();
        (guard.access_token.take(), guard.user.take())
      };
      token_response(token, user, "Login")
    }
    PipelineResult::Stopped => Err(AppError::unauthenticated("Authentication process was unexpectedly halted.")),
  }
}

#[instrument(name = "handler::me", skip(auth_user), fields(user_id = %auth_user.0.id))]
pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(auth_user.0))
}
