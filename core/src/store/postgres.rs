// agrimarket/src/store/postgres.rs

//! PostgreSQL-backed store using runtime-checked sqlx queries.

use super::{CatalogStore, OrderStore, UserStore, INSUFFICIENT_STOCK, NOT_AVAILABLE};
use crate::error::{MarketError, MarketResult};
use crate::models::{Order, OrderParty, OrderStatus, Produce, ProduceChanges, ProduceFilter, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const SCHEMA: &str = include_str!("../../schema.sql");

const USER_COLUMNS: &str = "id, email, password_hash, name, role, phone, region, is_active, created_at";
const PRODUCE_COLUMNS: &str = "id, farmer_id, farmer_name, title, category, description, price, quantity, unit, \
   region, unique_code, is_available, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, produce_id, farmer_id, buyer_id, buyer_name, farmer_name, produce_title, quantity, \
   unit_price, total_amount, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

/// Maps a unique-constraint violation to `Conflict(msg)`, everything else through `From<sqlx::Error>`.
fn unique_or(err: sqlx::Error, msg: &str) -> MarketError {
  let is_unique = err
    .as_database_error()
    .map(|db| db.is_unique_violation())
    .unwrap_or(false);
  if is_unique {
    MarketError::conflict(msg)
  } else {
    MarketError::from(err)
  }
}

/// Escapes LIKE metacharacters so the search term matches literally.
fn like_pattern(term: &str) -> String {
  let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
  format!("%{}%", escaped)
}

fn party_column(party: OrderParty) -> (&'static str, Uuid) {
  match party {
    OrderParty::Buyer(id) => ("buyer_id", id),
    OrderParty::Farmer(id) => ("farmer_id", id),
  }
}

impl PgStore {
  #[instrument(name = "PgStore::connect", skip(database_url))]
  pub async fn connect(database_url: &str, max_connections: u32, acquire_timeout: Duration) -> MarketResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .acquire_timeout(acquire_timeout)
      .connect(database_url)
      .await?;
    info!("Connected to PostgreSQL.");
    Ok(Self { pool })
  }

  /// Creates enum types, tables and indexes if they do not exist yet.
  pub async fn migrate(&self) -> MarketResult<()> {
    sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
    info!("Database schema is up to date.");
    Ok(())
  }

  pub async fn close(&self) {
    self.pool.close().await;
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn insert_user(&self, user: User) -> MarketResult<User> {
    sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
    ))
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.role)
    .bind(&user.phone)
    .bind(user.region)
    .bind(user.is_active)
    .bind(user.created_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| unique_or(e, "Email already registered."))
  }

  async fn find_user(&self, id: Uuid) -> MarketResult<Option<User>> {
    Ok(
      sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn find_user_by_email(&self, email: &str) -> MarketResult<Option<User>> {
    Ok(
      sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?,
    )
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn insert_produce(&self, produce: Produce) -> MarketResult<Produce> {
    sqlx::query_as::<_, Produce>(&format!(
      "INSERT INTO produce ({PRODUCE_COLUMNS}) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING {PRODUCE_COLUMNS}"
    ))
    .bind(produce.id)
    .bind(produce.farmer_id)
    .bind(&produce.farmer_name)
    .bind(&produce.title)
    .bind(produce.category)
    .bind(&produce.description)
    .bind(produce.price)
    .bind(produce.quantity)
    .bind(&produce.unit)
    .bind(produce.region)
    .bind(&produce.unique_code)
    .bind(produce.is_available)
    .bind(produce.created_at)
    .bind(produce.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| unique_or(e, "Listing code already in use."))
  }

  async fn find_produce(&self, id: Uuid) -> MarketResult<Option<Produce>> {
    Ok(
      sqlx::query_as::<_, Produce>(&format!("SELECT {PRODUCE_COLUMNS} FROM produce WHERE id = $1"))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn search_produce(&self, filter: &ProduceFilter) -> MarketResult<Vec<Produce>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
      "SELECT {PRODUCE_COLUMNS} FROM produce WHERE is_available = TRUE"
    ));
    if let Some(category) = filter.category {
      qb.push(" AND category = ").push_bind(category);
    }
    if let Some(region) = filter.region {
      qb.push(" AND region = ").push_bind(region);
    }
    if let Some(term) = filter.search_term() {
      let pattern = like_pattern(term);
      qb.push(" AND (title ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR description ILIKE ")
        .push_bind(pattern)
        .push(")");
    }
    qb.push(" ORDER BY created_at, id");
    Ok(qb.build_query_as::<Produce>().fetch_all(&self.pool).await?)
  }

  async fn produce_by_farmer(&self, farmer_id: Uuid) -> MarketResult<Vec<Produce>> {
    Ok(
      sqlx::query_as::<_, Produce>(&format!(
        "SELECT {PRODUCE_COLUMNS} FROM produce WHERE farmer_id = $1 ORDER BY created_at, id"
      ))
      .bind(farmer_id)
      .fetch_all(&self.pool)
      .await?,
    )
  }

  async fn update_produce(&self, id: Uuid, changes: &ProduceChanges) -> MarketResult<Option<Produce>> {
    let mut tx = self.pool.begin().await?;
    let current = sqlx::query_as::<_, Produce>(&format!(
      "SELECT {PRODUCE_COLUMNS} FROM produce WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(mut produce) = current else {
      tx.rollback().await?;
      return Ok(None);
    };
    changes.apply_to(&mut produce, Utc::now());

    let updated = sqlx::query_as::<_, Produce>(&format!(
      "UPDATE produce SET title = $2, category = $3, description = $4, price = $5, quantity = $6, unit = $7, \
       is_available = $8, updated_at = $9 WHERE id = $1 RETURNING {PRODUCE_COLUMNS}"
    ))
    .bind(id)
    .bind(&produce.title)
    .bind(produce.category)
    .bind(&produce.description)
    .bind(produce.price)
    .bind(produce.quantity)
    .bind(&produce.unit)
    .bind(produce.is_available)
    .bind(produce.updated_at)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(Some(updated))
  }

  async fn count_produce(&self, farmer_id: Uuid, available_only: bool) -> MarketResult<u64> {
    let count: i64 = sqlx::query_scalar(
      "SELECT COUNT(*) FROM produce WHERE farmer_id = $1 AND (is_available OR NOT $2)",
    )
    .bind(farmer_id)
    .bind(available_only)
    .fetch_one(&self.pool)
    .await?;
    Ok(count as u64)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "PgStore::place_order", skip(self, order), fields(order_id = %order.id, produce_id = %order.produce_id))]
  async fn place_order(&self, mut order: Order) -> MarketResult<Order> {
    let mut tx = self.pool.begin().await?;

    let reserved: Option<(Uuid, String, String, Decimal)> = sqlx::query_as(
      "UPDATE produce SET quantity = quantity - $1, updated_at = $2 \
       WHERE id = $3 AND is_available AND quantity >= $1 \
       RETURNING farmer_id, farmer_name, title, price",
    )
    .bind(order.quantity)
    .bind(Utc::now())
    .bind(order.produce_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((farmer_id, farmer_name, title, price)) = reserved else {
      let current: Option<(bool, i32)> = sqlx::query_as("SELECT is_available, quantity FROM produce WHERE id = $1")
        .bind(order.produce_id)
        .fetch_optional(&mut *tx)
        .await?;
      tx.rollback().await?;
      warn!(?current, requested = order.quantity, "Stock reservation guard rejected order.");
      return Err(match current {
        None => MarketError::not_found(format!("Produce {} not found.", order.produce_id)),
        Some((false, _)) => MarketError::conflict(NOT_AVAILABLE),
        Some(_) => MarketError::conflict(INSUFFICIENT_STOCK),
      });
    };

    if let Err(e) = order.copy_listing_terms(farmer_id, &farmer_name, &title, price) {
      tx.rollback().await?;
      return Err(e);
    }

    let inserted = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders ({ORDER_COLUMNS}) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.id)
    .bind(order.produce_id)
    .bind(order.farmer_id)
    .bind(order.buyer_id)
    .bind(&order.buyer_name)
    .bind(&order.farmer_name)
    .bind(&order.produce_title)
    .bind(order.quantity)
    .bind(order.unit_price)
    .bind(order.total_amount)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(inserted)
  }

  async fn find_order(&self, id: Uuid) -> MarketResult<Option<Order>> {
    Ok(
      sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn orders_for(&self, party: OrderParty) -> MarketResult<Vec<Order>> {
    let (column, id) = party_column(party);
    Ok(
      sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE {column} = $1 ORDER BY created_at, id"
      ))
      .bind(id)
      .fetch_all(&self.pool)
      .await?,
    )
  }

  async fn transition_order(
    &self,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
    at: DateTime<Utc>,
  ) -> MarketResult<Option<Order>> {
    Ok(
      sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 RETURNING {ORDER_COLUMNS}"
      ))
      .bind(to)
      .bind(at)
      .bind(id)
      .bind(from)
      .fetch_optional(&self.pool)
      .await?,
    )
  }

  async fn count_orders(&self, party: OrderParty, status: Option<OrderStatus>) -> MarketResult<u64> {
    let (column, id) = party_column(party);
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM orders WHERE {column} = "));
    qb.push_bind(id);
    if let Some(status) = status {
      qb.push(" AND status = ").push_bind(status);
    }
    let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
    Ok(count as u64)
  }
}
