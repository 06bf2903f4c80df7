// tests/order_engine_tests.rs
mod common;

use agrimarket::models::produce::{generate_listing_code, MAX_PRICE};
use agrimarket::{CatalogStore, MarketError, OrderStatus, Produce, ProduceChanges, Role};
use common::*;
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn order_snapshots_listing_and_reserves_stock() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 100, cedis("25.50")).await;

  let order = market.engine.create_order(&buyer, produce.id, 5).await.unwrap();

  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.total_amount, cedis("127.50"));
  assert_eq!(order.total_amount, Decimal::from(order.quantity) * order.unit_price);
  assert_eq!(order.farmer_id, farmer.id);
  assert_eq!(order.buyer_id, buyer.id);
  assert_eq!(order.buyer_name, "Abena");
  assert_eq!(order.farmer_name, "Kofi");
  assert_eq!(order.produce_title, produce.title);
  assert_eq!(market.catalog.get_listing(produce.id).await.unwrap().quantity, 95);
}

#[tokio::test]
async fn snapshot_fields_do_not_follow_listing_edits() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 10, cedis("4.00")).await;
  let order = market.engine.create_order(&buyer, produce.id, 2).await.unwrap();

  market
    .catalog
    .update_listing(
      &farmer,
      produce.id,
      ProduceChanges { title: Some("Renamed".into()), price: Some(cedis("9.99")), ..Default::default() },
    )
    .await
    .unwrap();

  let listed = market.engine.list_orders_for(&buyer).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].id, order.id);
  assert_eq!(listed[0].produce_title, produce.title);
  assert_eq!(listed[0].unit_price, cedis("4.00"));
}

#[tokio::test]
async fn non_buyers_cannot_order_regardless_of_stock() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let supplier = market.register("Kwame", Role::Supplier).await;
  let produce = market.list(&farmer, 0, cedis("1")).await;

  for caller in [&farmer, &supplier] {
    let err = market.engine.create_order(caller, produce.id, 1).await.unwrap_err();
    assert!(matches!(err, MarketError::Authorization(_)));
    let err = market.engine.create_order(caller, Uuid::new_v4(), 1).await.unwrap_err();
    assert!(matches!(err, MarketError::Authorization(_)));
  }
}

#[tokio::test]
async fn order_failures_leave_stock_untouched() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 3, cedis("2")).await;

  let err = market.engine.create_order(&buyer, Uuid::new_v4(), 1).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));

  let err = market.engine.create_order(&buyer, produce.id, 0).await.unwrap_err();
  assert!(matches!(err, MarketError::Validation(_)));

  let err = market.engine.create_order(&buyer, produce.id, 4).await.unwrap_err();
  match err {
    MarketError::Conflict(msg) => assert!(msg.contains("stock")),
    other => panic!("expected stock conflict, got {:?}", other),
  }

  market
    .catalog
    .update_listing(&farmer, produce.id, ProduceChanges { is_available: Some(false), ..Default::default() })
    .await
    .unwrap();
  let err = market.engine.create_order(&buyer, produce.id, 1).await.unwrap_err();
  match err {
    MarketError::Conflict(msg) => assert!(msg.contains("not available")),
    other => panic!("expected availability conflict, got {:?}", other),
  }

  assert_eq!(market.catalog.get_listing(produce.id).await.unwrap().quantity, 3);
  assert!(market.engine.list_orders_for(&buyer).await.unwrap().is_empty());
}

#[tokio::test]
async fn ordering_exact_remaining_stock_succeeds() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 7, cedis("3")).await;

  market.engine.create_order(&buyer, produce.id, 7).await.unwrap();
  let after = market.catalog.get_listing(produce.id).await.unwrap();
  assert_eq!(after.quantity, 0);
  assert!(after.is_available);

  let err = market.engine.create_order(&buyer, produce.id, 1).await.unwrap_err();
  assert_eq!(err.code(), "CONFLICT");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_never_oversell() {
  setup_tracing();
  for _ in 0..25 {
    let market = Market::new();
    let farmer = market.register("Kofi", Role::Farmer).await;
    let first = market.register("Abena", Role::Buyer).await;
    let second = market.register("Akua", Role::Buyer).await;
    let produce = market.list(&farmer, 10, cedis("1")).await;

    let (e1, e2) = (market.engine.clone(), market.engine.clone());
    let (id1, id2) = (produce.id, produce.id);
    let h1 = tokio::spawn(async move { e1.create_order(&first, id1, 6).await });
    let h2 = tokio::spawn(async move { e2.create_order(&second, id2, 6).await });
    let results = [h1.await.unwrap(), h2.await.unwrap()];

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "{:?}", results);
    let failed = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(failed, MarketError::Conflict(_)));
    assert_eq!(market.catalog.get_listing(produce.id).await.unwrap().quantity, 4);
  }
}

#[tokio::test]
async fn orders_are_scoped_to_the_caller() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let other_farmer = market.register("Yaw", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let other_buyer = market.register("Akua", Role::Buyer).await;
  let supplier = market.register("Kwame", Role::Supplier).await;
  let produce = market.list(&farmer, 50, cedis("2")).await;

  market.engine.create_order(&buyer, produce.id, 1).await.unwrap();
  market.engine.create_order(&buyer, produce.id, 2).await.unwrap();
  market.engine.create_order(&other_buyer, produce.id, 3).await.unwrap();

  assert_eq!(market.engine.list_orders_for(&buyer).await.unwrap().len(), 2);
  assert_eq!(market.engine.list_orders_for(&other_buyer).await.unwrap().len(), 1);
  assert_eq!(market.engine.list_orders_for(&farmer).await.unwrap().len(), 3);
  assert!(market.engine.list_orders_for(&other_farmer).await.unwrap().is_empty());
  assert!(market.engine.list_orders_for(&supplier).await.unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_follows_transition_table() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 50, cedis("2")).await;
  let order = market.engine.create_order(&buyer, produce.id, 1).await.unwrap();

  for next in [OrderStatus::Confirmed, OrderStatus::Paid, OrderStatus::Delivered] {
    let updated = market.engine.update_status(&farmer, order.id, next).await.unwrap();
    assert_eq!(updated.status, next);
    assert!(updated.updated_at >= order.updated_at);
  }

  let err = market
    .engine
    .update_status(&buyer, order.id, OrderStatus::Pending)
    .await
    .unwrap_err();
  assert!(matches!(err, MarketError::InvalidTransition(_)));
  assert_eq!(err.code(), "INVALID_TRANSITION");
}

#[tokio::test]
async fn cancellation_is_terminal_and_keeps_stock_consumed() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 10, cedis("2")).await;
  let order = market.engine.create_order(&buyer, produce.id, 4).await.unwrap();

  let cancelled = market
    .engine
    .update_status(&buyer, order.id, OrderStatus::Cancelled)
    .await
    .unwrap();
  assert_eq!(cancelled.status, OrderStatus::Cancelled);
  assert_eq!(market.catalog.get_listing(produce.id).await.unwrap().quantity, 6);

  let err = market
    .engine
    .update_status(&farmer, order.id, OrderStatus::Confirmed)
    .await
    .unwrap_err();
  assert!(matches!(err, MarketError::InvalidTransition(_)));
}

#[tokio::test]
async fn only_parties_to_an_order_can_move_it() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let stranger_farmer = market.register("Yaw", Role::Farmer).await;
  let stranger_buyer = market.register("Akua", Role::Buyer).await;
  let supplier = market.register("Kwame", Role::Supplier).await;
  let produce = market.list(&farmer, 10, cedis("2")).await;
  let order = market.engine.create_order(&buyer, produce.id, 1).await.unwrap();

  for outsider in [&stranger_farmer, &stranger_buyer, &supplier] {
    let err = market
      .engine
      .update_status(outsider, order.id, OrderStatus::Confirmed)
      .await
      .unwrap_err();
    assert!(matches!(err, MarketError::Authorization(_)));
  }

  let err = market
    .engine
    .update_status(&farmer, Uuid::new_v4(), OrderStatus::Confirmed)
    .await
    .unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));

  let listed = market.engine.list_orders_for(&buyer).await.unwrap();
  assert_eq!(listed[0].status, OrderStatus::Pending);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_status_updates_apply_once() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 10, cedis("2")).await;
  let order = market.engine.create_order(&buyer, produce.id, 1).await.unwrap();

  let (e1, e2) = (market.engine.clone(), market.engine.clone());
  let id = order.id;
  let h1 = tokio::spawn(async move { e1.update_status(&farmer, id, OrderStatus::Confirmed).await });
  let h2 = tokio::spawn(async move { e2.update_status(&buyer, id, OrderStatus::Confirmed).await });
  let results = [h1.await.unwrap(), h2.await.unwrap()];

  let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
  assert_eq!(winners.len(), 1, "{:?}", results);
  let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
  assert!(
    matches!(loser, MarketError::Conflict(_) | MarketError::InvalidTransition(_)),
    "{:?}",
    loser
  );
}

#[tokio::test]
async fn oversized_totals_are_rejected_without_touching_stock() {
  setup_tracing();
  let market = Market::new();
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;

  let priciest = market.list(&farmer, i32::MAX, MAX_PRICE).await;
  let err = market.engine.create_order(&buyer, priciest.id, i32::MAX).await.unwrap_err();
  assert!(matches!(err, MarketError::Validation(_)), "{:?}", err);
  assert_eq!(market.catalog.get_listing(priciest.id).await.unwrap().quantity, i32::MAX);

  // A row written by another tool can hold any price; the total must still not panic.
  let unchecked = Produce {
    id: Uuid::new_v4(),
    unique_code: generate_listing_code(),
    price: Decimal::MAX,
    ..priciest
  };
  market.stores.catalog.insert_produce(unchecked.clone()).await.unwrap();
  let err = market.engine.create_order(&buyer, unchecked.id, i32::MAX).await.unwrap_err();
  assert_eq!(err.code(), "VALIDATION_ERROR");
  assert_eq!(market.catalog.get_listing(unchecked.id).await.unwrap().quantity, i32::MAX);
  assert!(market.engine.list_orders_for(&buyer).await.unwrap().is_empty());
}

#[tokio::test]
async fn committed_order_uses_listing_terms_at_reservation() {
  setup_tracing();
  let market = Market::with_stores(stale_listing_stores(cedis("1.00")));
  let farmer = market.register("Kofi", Role::Farmer).await;
  let buyer = market.register("Abena", Role::Buyer).await;
  let produce = market.list(&farmer, 10, cedis("25.50")).await;

  let order = market.engine.create_order(&buyer, produce.id, 2).await.unwrap();

  assert_eq!(order.unit_price, cedis("25.50"));
  assert_eq!(order.total_amount, cedis("51.00"));
  assert_eq!(order.produce_title, produce.title);
  assert_eq!(order.farmer_name, "Kofi");
}
