// agrimarket-server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Absent means the in-memory store is used.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub store_timeout: Duration,
  pub jwt_secret: String,
  pub token_ttl: chrono::Duration,
  pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("database_max_connections", &self.database_max_connections)
      .field("store_timeout", &self.store_timeout)
      .field("jwt_secret", &"[REDACTED]")
      .field("token_ttl_minutes", &self.token_ttl.num_minutes())
      .field("log_format", &self.log_format)
      .finish()
  }
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(v) => v
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `lookup` returns `None` for unset names.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", lookup("SERVER_PORT"), 8080u16)?;
    let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
    let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", lookup("DATABASE_MAX_CONNECTIONS"), 10u32)?;
    if database_max_connections == 0 {
      return Err(AppError::Config("DATABASE_MAX_CONNECTIONS must be at least 1".to_string()));
    }
    let store_timeout_ms = parse_var("STORE_TIMEOUT_MS", lookup("STORE_TIMEOUT_MS"), 5000u64)?;
    if store_timeout_ms == 0 {
      return Err(AppError::Config("STORE_TIMEOUT_MS must be positive".to_string()));
    }

    let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| AppError::Config("Missing JWT_SECRET".to_string()))?;
    if jwt_secret.len() < MIN_JWT_SECRET_LEN {
      return Err(AppError::Config(format!(
        "JWT_SECRET must be at least {} characters",
        MIN_JWT_SECRET_LEN
      )));
    }
    let token_ttl_minutes = parse_var("TOKEN_TTL_MINUTES", lookup("TOKEN_TTL_MINUTES"), 30i64)?;
    if token_ttl_minutes <= 0 {
      return Err(AppError::Config("TOKEN_TTL_MINUTES must be positive".to_string()));
    }

    let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
      None | Some("") | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      store_timeout: Duration::from_millis(store_timeout_ms),
      jwt_secret,
      token_ttl: chrono::Duration::minutes(token_ttl_minutes),
      log_format,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  const SECRET: &str = "0123456789abcdef0123456789abcdef";

  fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| map.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_only_secret_is_set() {
    let cfg = load(&[("JWT_SECRET", SECRET)]).unwrap();
    assert_eq!(cfg.server_host, "127.0.0.1");
    assert_eq!(cfg.server_port, 8080);
    assert!(cfg.database_url.is_none());
    assert_eq!(cfg.store_timeout, Duration::from_millis(5000));
    assert_eq!(cfg.token_ttl.num_minutes(), 30);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
  }

  #[test]
  fn short_or_missing_secret_is_rejected() {
    assert!(matches!(load(&[]), Err(AppError::Config(_))));
    assert!(matches!(load(&[("JWT_SECRET", "short")]), Err(AppError::Config(_))));
  }

  #[test]
  fn malformed_numbers_are_rejected() {
    let bad_port = load(&[("JWT_SECRET", SECRET), ("SERVER_PORT", "eighty")]);
    let zero_timeout = load(&[("JWT_SECRET", SECRET), ("STORE_TIMEOUT_MS", "0")]);
    let bad_format = load(&[("JWT_SECRET", SECRET), ("LOG_FORMAT", "xml")]);
    assert!(matches!(bad_port, Err(AppError::Config(_))));
    assert!(matches!(zero_timeout, Err(AppError::Config(_))));
    assert!(matches!(bad_format, Err(AppError::Config(_))));
  }

  #[test]
  fn debug_output_redacts_secrets() {
    let cfg = load(&[("JWT_SECRET", SECRET), ("DATABASE_URL", "postgres://u:pw@db/market")]).unwrap();
    let printed = format!("{:?}", cfg);
    assert!(!printed.contains(SECRET));
    assert!(!printed.contains("pw@db"));
  }
}
