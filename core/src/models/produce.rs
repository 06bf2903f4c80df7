// agrimarket/src/models/produce.rs

use super::user::Region;
use crate::error::{MarketError, MarketResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "produce_category_enum", rename_all = "lowercase"))]
pub enum ProduceCategory {
  Grains,
  Vegetables,
  Fruits,
  Livestock,
}

/// A farmer's listing. `quantity` is the stock still available to order.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Produce {
  pub id: Uuid,
  pub farmer_id: Uuid,
  pub farmer_name: String,
  pub title: String,
  pub category: ProduceCategory,
  pub description: String,
  pub price: Decimal,
  pub quantity: i32,
  pub unit: String,
  pub region: Region,
  pub unique_code: String,
  pub is_available: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Short human-facing listing code: 8 upper-case hex characters.
pub fn generate_listing_code() -> String {
  Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// Fields a farmer supplies when creating a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProduceDraft {
  pub title: String,
  pub category: ProduceCategory,
  #[serde(default)]
  pub description: String,
  pub price: Decimal,
  pub quantity: i32,
  pub unit: String,
}

fn check_title(title: &str) -> MarketResult<()> {
  if title.trim().is_empty() {
    return Err(MarketError::validation("Title is required."));
  }
  Ok(())
}

/// Largest unit price the `produce.price NUMERIC(12, 2)` column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

fn check_price(price: Decimal) -> MarketResult<()> {
  if price <= Decimal::ZERO {
    return Err(MarketError::validation("Price must be greater than zero."));
  }
  if price.normalize().scale() > 2 {
    return Err(MarketError::validation("Price cannot have more than two decimal places."));
  }
  if price > MAX_PRICE {
    return Err(MarketError::validation(format!("Price cannot exceed {}.", MAX_PRICE)));
  }
  Ok(())
}

fn check_quantity(quantity: i32) -> MarketResult<()> {
  if quantity < 0 {
    return Err(MarketError::validation("Quantity cannot be negative."));
  }
  Ok(())
}

fn check_unit(unit: &str) -> MarketResult<()> {
  if unit.trim().is_empty() {
    return Err(MarketError::validation("Unit is required."));
  }
  Ok(())
}

impl ProduceDraft {
  pub fn validate(&self) -> MarketResult<()> {
    check_title(&self.title)?;
    check_price(self.price)?;
    check_quantity(self.quantity)?;
    check_unit(&self.unit)
  }
}

/// Partial update to a listing. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProduceChanges {
  pub title: Option<String>,
  pub category: Option<ProduceCategory>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub quantity: Option<i32>,
  pub unit: Option<String>,
  pub is_available: Option<bool>,
}

impl ProduceChanges {
  pub fn validate(&self) -> MarketResult<()> {
    if let Some(title) = &self.title {
      check_title(title)?;
    }
    if let Some(price) = self.price {
      check_price(price)?;
    }
    if let Some(quantity) = self.quantity {
      check_quantity(quantity)?;
    }
    if let Some(unit) = &self.unit {
      check_unit(unit)?;
    }
    Ok(())
  }

  pub fn apply_to(&self, produce: &mut Produce, now: DateTime<Utc>) {
    if let Some(title) = &self.title {
      produce.title = title.trim().to_string();
    }
    if let Some(category) = self.category {
      produce.category = category;
    }
    if let Some(description) = &self.description {
      produce.description = description.clone();
    }
    if let Some(price) = self.price {
      produce.price = price;
    }
    if let Some(quantity) = self.quantity {
      produce.quantity = quantity;
    }
    if let Some(unit) = &self.unit {
      produce.unit = unit.trim().to_string();
    }
    if let Some(is_available) = self.is_available {
      produce.is_available = is_available;
    }
    produce.updated_at = now;
  }
}

/// Public catalog filter. Only available listings ever match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProduceFilter {
  pub category: Option<ProduceCategory>,
  pub region: Option<Region>,
  pub search: Option<String>,
}

impl ProduceFilter {
  /// The search term, trimmed; blank terms are treated as absent.
  pub fn search_term(&self) -> Option<&str> {
    self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  pub fn matches(&self, produce: &Produce) -> bool {
    if !produce.is_available {
      return false;
    }
    if self.category.is_some_and(|c| c != produce.category) {
      return false;
    }
    if self.region.is_some_and(|r| r != produce.region) {
      return false;
    }
    match self.search_term() {
      Some(term) => {
        let needle = term.to_lowercase();
        produce.title.to_lowercase().contains(&needle) || produce.description.to_lowercase().contains(&needle)
      }
      None => true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Produce {
    let now = Utc::now();
    Produce {
      id: Uuid::new_v4(),
      farmer_id: Uuid::new_v4(),
      farmer_name: "Ama".to_string(),
      title: "Fresh Tomatoes".to_string(),
      category: ProduceCategory::Vegetables,
      description: "Vine ripened, picked this morning".to_string(),
      price: Decimal::new(1200, 2),
      quantity: 40,
      unit: "kg".to_string(),
      region: Region::Ashanti,
      unique_code: generate_listing_code(),
      is_available: true,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn listing_code_is_eight_uppercase_hex_chars() {
    let code = generate_listing_code();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
  }

  #[test]
  fn search_matches_title_or_description_case_insensitively() {
    let p = sample();
    let by_title = ProduceFilter { search: Some("TOMATO".into()), ..Default::default() };
    let by_desc = ProduceFilter { search: Some("picked".into()), ..Default::default() };
    let miss = ProduceFilter { search: Some("maize".into()), ..Default::default() };
    assert!(by_title.matches(&p));
    assert!(by_desc.matches(&p));
    assert!(!miss.matches(&p));
  }

  #[test]
  fn filter_never_matches_unavailable_listing() {
    let mut p = sample();
    p.is_available = false;
    assert!(!ProduceFilter::default().matches(&p));
  }

  #[test]
  fn category_and_region_must_both_match() {
    let p = sample();
    let ok = ProduceFilter {
      category: Some(ProduceCategory::Vegetables),
      region: Some(Region::Ashanti),
      search: None,
    };
    let wrong_region = ProduceFilter { region: Some(Region::Accra), ..ok.clone() };
    assert!(ok.matches(&p));
    assert!(!wrong_region.matches(&p));
  }

  #[test]
  fn changes_reject_non_positive_price() {
    let changes = ProduceChanges { price: Some(Decimal::ZERO), ..Default::default() };
    assert!(matches!(changes.validate(), Err(MarketError::Validation(_))));
  }

  #[test]
  fn price_must_fit_two_decimal_places_and_column_range() {
    for bad in [Decimal::new(1, 3), Decimal::new(1005, 3), MAX_PRICE + Decimal::new(1, 2)] {
      let changes = ProduceChanges { price: Some(bad), ..Default::default() };
      assert!(matches!(changes.validate(), Err(MarketError::Validation(_))), "{}", bad);
    }
    for good in [Decimal::new(1, 2), Decimal::new(2500, 3), MAX_PRICE] {
      let changes = ProduceChanges { price: Some(good), ..Default::default() };
      assert!(changes.validate().is_ok(), "{}", good);
    }
  }

  #[test]
  fn changes_trim_title_and_unit() {
    let mut p = sample();
    let changes = ProduceChanges {
      title: Some("  Roma Tomatoes ".into()),
      unit: Some(" crate ".into()),
      ..Default::default()
    };
    changes.apply_to(&mut p, Utc::now());
    assert_eq!(p.title, "Roma Tomatoes");
    assert_eq!(p.unit, "crate");
  }

  #[test]
  fn changes_leave_unset_fields_alone() {
    let mut p = sample();
    let before_title = p.title.clone();
    let changes = ProduceChanges { quantity: Some(5), is_available: Some(false), ..Default::default() };
    changes.apply_to(&mut p, Utc::now());
    assert_eq!(p.title, before_title);
    assert_eq!(p.quantity, 5);
    assert!(!p.is_available);
  }
}
