// agrimarket/src/catalog.rs

//! Produce listings: creation by farmers, public browsing, owner-only edits.

use crate::error::{MarketError, MarketResult};
use crate::models::produce::generate_listing_code;
use crate::models::{Produce, ProduceChanges, ProduceDraft, ProduceFilter, Role, User};
use crate::store::Stores;
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Listing codes are random; a collision is retried this many times.
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct Catalog {
  stores: Stores,
}

impl Catalog {
  pub fn new(stores: Stores) -> Self {
    Self { stores }
  }

  /// Creates a listing owned by `farmer`. Region and farmer name are copied
  /// from the account at creation.
  #[instrument(name = "Catalog::create_listing", skip(self, farmer, draft), fields(farmer_id = %farmer.id), err(Display))]
  pub async fn create_listing(&self, farmer: &User, draft: ProduceDraft) -> MarketResult<Produce> {
    match farmer.role {
      Role::Farmer => {}
      Role::Buyer | Role::Supplier => {
        warn!(role = %farmer.role, "Listing creation refused for non-farmer.");
        return Err(MarketError::authorization("Only farmers can create produce listings."));
      }
    }
    draft.validate()?;

    let mut attempt = 0;
    loop {
      attempt += 1;
      let now = Utc::now();
      let produce = Produce {
        id: Uuid::new_v4(),
        farmer_id: farmer.id,
        farmer_name: farmer.name.clone(),
        title: draft.title.trim().to_string(),
        category: draft.category,
        description: draft.description.clone(),
        price: draft.price,
        quantity: draft.quantity,
        unit: draft.unit.trim().to_string(),
        region: farmer.region,
        unique_code: generate_listing_code(),
        is_available: true,
        created_at: now,
        updated_at: now,
      };

      match self
        .stores
        .bounded("insert_produce", self.stores.catalog.insert_produce(produce))
        .await
      {
        Ok(created) => {
          info!(produce_id = %created.id, code = %created.unique_code, "Listing created.");
          return Ok(created);
        }
        Err(MarketError::Conflict(msg)) if attempt < MAX_CODE_ATTEMPTS => {
          warn!(attempt, %msg, "Listing code collision, regenerating.");
        }
        Err(e) => return Err(e),
      }
    }
  }

  pub async fn get_listing(&self, id: Uuid) -> MarketResult<Produce> {
    self
      .stores
      .bounded("find_produce", self.stores.catalog.find_produce(id))
      .await?
      .ok_or_else(|| MarketError::not_found(format!("Produce {} not found.", id)))
  }

  /// Available listings matching every supplied filter field.
  #[instrument(name = "Catalog::list_listings", skip(self), err(Display))]
  pub async fn list_listings(&self, filter: &ProduceFilter) -> MarketResult<Vec<Produce>> {
    self
      .stores
      .bounded("search_produce", self.stores.catalog.search_produce(filter))
      .await
  }

  pub async fn listings_by_farmer(&self, farmer_id: Uuid) -> MarketResult<Vec<Produce>> {
    self
      .stores
      .bounded("produce_by_farmer", self.stores.catalog.produce_by_farmer(farmer_id))
      .await
  }

  #[instrument(name = "Catalog::update_listing", skip(self, user, changes), fields(user_id = %user.id), err(Display))]
  pub async fn update_listing(&self, user: &User, id: Uuid, changes: ProduceChanges) -> MarketResult<Produce> {
    let current = self.get_listing(id).await?;
    if current.farmer_id != user.id {
      warn!(owner = %current.farmer_id, "Listing update refused for non-owner.");
      return Err(MarketError::authorization("Only the owning farmer can update this listing."));
    }
    changes.validate()?;

    let updated = self
      .stores
      .bounded("update_produce", self.stores.catalog.update_produce(id, &changes))
      .await?
      .ok_or_else(|| MarketError::not_found(format!("Produce {} not found.", id)))?;
    info!(produce_id = %updated.id, "Listing updated.");
    Ok(updated)
  }
}
