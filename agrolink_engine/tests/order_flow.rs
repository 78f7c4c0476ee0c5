//! Order lifecycle tests: creation with reservation, the state machine, and cancellation with
//! compensation.
mod common;

use agl_common::Money;
use agrolink_engine::{
    db_types::{NewOrder, NewOrderItem, OrderStatusType, ProductUpdate, Role},
    CatalogManagement,
    LocationDirectory,
    MarketplaceError,
};
use common::*;

fn items(specs: &[(i64, i64)]) -> Vec<NewOrderItem> {
    specs.iter().map(|(product_id, quantity)| NewOrderItem { product_id: *product_id, quantity: *quantity }).collect()
}

#[tokio::test]
async fn placing_an_order_reserves_stock_and_computes_the_total() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let manzanas = seed_product(&db, producer.id, "Manzanas", 10, 10).await;
    let miel = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let api = order_flow(&db);
    let order = api
        .place_order(
            &ctx(&consumer),
            NewOrder { producer_id: producer.id, items: items(&[(manzanas.id, 3), (miel.id, 1)]) },
        )
        .await
        .unwrap();

    assert_eq!(order.order.total, Money::from_units(35));
    assert_eq!(order.order.status, OrderStatusType::Pending);
    assert_eq!(order.items.len(), 2);
    assert_eq!(stock_of(&db, manzanas.id).await, 7);
    assert_eq!(stock_of(&db, miel.id).await, 9);
    // The consumer view carries the producer's contact info.
    let producer_contact = order.producer.expect("producer contact missing");
    assert_eq!(producer_contact.name, "Rosa");
}

#[tokio::test]
async fn order_total_is_a_snapshot_of_creation_time_prices() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let papas = seed_product(&db, producer.id, "Papas", 8, 20).await;

    let api = order_flow(&db);
    let order =
        api.place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(papas.id, 2)]) }).await.unwrap();

    // The producer doubles the price afterwards; the order keeps the old one.
    db.update_product(papas.id, producer.id, ProductUpdate {
        price: Some(Money::from_units(16)),
        ..Default::default()
    })
    .await
    .unwrap();

    let detail = api.order_detail(&ctx(&consumer), order.order.id).await.unwrap();
    assert_eq!(detail.order.total, Money::from_units(16));
    assert_eq!(detail.items[0].price, Money::from_units(8));
    assert_eq!(detail.order.total, detail.items.iter().map(|it| it.price * it.quantity).sum());
}

#[tokio::test]
async fn order_creation_fails_whole_without_partial_mutation() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let other = seed_user(&db, "Pedro", "pedro@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let manzanas = seed_product(&db, producer.id, "Manzanas", 10, 10).await;
    let ajenas = seed_product(&db, other.id, "Peras", 7, 10).await;
    let escasas = seed_product(&db, producer.id, "Frutillas", 12, 2).await;

    let api = order_flow(&db);

    let err = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[]) })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::EmptyOrder));

    let err = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(9999, 1)]) })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::ProductNotFound(9999)));

    // Mixing producers fails the whole order.
    let err = api
        .place_order(
            &ctx(&consumer),
            NewOrder { producer_id: producer.id, items: items(&[(manzanas.id, 1), (ajenas.id, 1)]) },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::ProducerMismatch));
    assert_eq!(stock_of(&db, manzanas.id).await, 10);

    // The second item exceeds its stock; the first item's reservation must roll back.
    let err = api
        .place_order(
            &ctx(&consumer),
            NewOrder { producer_id: producer.id, items: items(&[(manzanas.id, 5), (escasas.id, 3)]) },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::InsufficientStock(name) if name == "Frutillas"));
    assert_eq!(stock_of(&db, manzanas.id).await, 10);
    assert_eq!(stock_of(&db, escasas.id).await, 2);
}

#[tokio::test]
async fn ship_from_pending_succeeds_and_deliver_from_pending_fails() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Huevos", 4, 30).await;

    let api = order_flow(&db);
    let order = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(producto.id, 6)]) })
        .await
        .unwrap();

    // Skipping the ship step is not on the table.
    let err = api.deliver_order(&ctx(&producer), order.order.id).await.unwrap_err();
    assert!(matches!(
        err,
        MarketplaceError::InvalidTransition { from: OrderStatusType::Pending, to: OrderStatusType::Delivered }
    ));

    let shipped = api.ship_order(&ctx(&producer), order.order.id).await.unwrap();
    assert_eq!(shipped.status, OrderStatusType::InTransit);

    let delivered = api.deliver_order(&ctx(&producer), order.order.id).await.unwrap();
    assert_eq!(delivered.status, OrderStatusType::Delivered);

    // Terminal: no further transitions.
    let err = api.ship_order(&ctx(&producer), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidTransition { from: OrderStatusType::Delivered, .. }));
    let err = api.cancel_order(&ctx(&producer), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidTransition { from: OrderStatusType::Delivered, .. }));
}

#[tokio::test]
async fn only_the_owning_producer_may_ship_or_deliver() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let intruder = seed_user(&db, "Pedro", "pedro@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Queso", 9, 5).await;

    let api = order_flow(&db);
    let order = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(producto.id, 1)]) })
        .await
        .unwrap();

    let err = api.ship_order(&ctx(&intruder), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotFound(_)));
}

#[tokio::test]
async fn cancelling_restores_the_snapshot_quantities() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let manzanas = seed_product(&db, producer.id, "Manzanas", 10, 10).await;
    let miel = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let api = order_flow(&db);
    let order = api
        .place_order(
            &ctx(&consumer),
            NewOrder { producer_id: producer.id, items: items(&[(manzanas.id, 3), (miel.id, 1)]) },
        )
        .await
        .unwrap();
    assert_eq!(stock_of(&db, manzanas.id).await, 7);

    let cancelled = api.cancel_order(&ctx(&consumer), order.order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);
    assert_eq!(stock_of(&db, manzanas.id).await, 10);
    assert_eq!(stock_of(&db, miel.id).await, 10);

    // The status guard blocks a second compensation.
    let err = api.cancel_order(&ctx(&consumer), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidTransition { from: OrderStatusType::Cancelled, .. }));
    assert_eq!(stock_of(&db, manzanas.id).await, 10);
}

#[tokio::test]
async fn paid_orders_are_cancellable_by_producer_but_not_consumer() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Nueces", 15, 8).await;

    let api = order_flow(&db);
    let pay = payment_api(&db);
    let order = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(producto.id, 4)]) })
        .await
        .unwrap();
    pay.record_payment(&ctx(&consumer), agrolink_engine::db_types::NewPayment {
        order_id: order.order.id,
        amount: Money::from_units(60),
        method: "transferencia".to_string(),
    })
    .await
    .unwrap();

    let err = api.cancel_order(&ctx(&consumer), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::PaidCancelForbidden));
    assert_eq!(stock_of(&db, producto.id).await, 4);

    let cancelled = api.cancel_order(&ctx(&producer), order.order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);
    assert_eq!(stock_of(&db, producto.id).await, 8);
}

#[tokio::test]
async fn admin_may_cancel_a_paid_order() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let admin = seed_user(&db, "Admin", "admin@agrolink.cl", Role::Admin).await;
    let producto = seed_product(&db, producer.id, "Aceite", 20, 3).await;

    let api = order_flow(&db);
    let pay = payment_api(&db);
    let order = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(producto.id, 2)]) })
        .await
        .unwrap();
    pay.record_payment(&ctx(&consumer), agrolink_engine::db_types::NewPayment {
        order_id: order.order.id,
        amount: Money::from_units(40),
        method: "webpay".to_string(),
    })
    .await
    .unwrap();

    let cancelled = api.cancel_order(&ctx(&admin), order.order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);
    assert_eq!(stock_of(&db, producto.id).await, 3);
}

#[tokio::test]
async fn in_transit_orders_are_not_cancellable() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Harina", 6, 10).await;

    let api = order_flow(&db);
    let order = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(producto.id, 1)]) })
        .await
        .unwrap();
    api.ship_order(&ctx(&producer), order.order.id).await.unwrap();

    let err = api.cancel_order(&ctx(&producer), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidTransition { from: OrderStatusType::InTransit, .. }));
    assert_eq!(stock_of(&db, producto.id).await, 9);
}

#[tokio::test]
async fn read_paths_are_role_scoped_and_enriched() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let stranger = seed_user(&db, "Mirona", "mirona@correo.cl", Role::Consumer).await;
    let admin = seed_user(&db, "Admin", "admin@agrolink.cl", Role::Admin).await;
    let producto = seed_product(&db, producer.id, "Tomates", 3, 50).await;

    db.upsert_location(consumer.id, agrolink_engine::db_types::NewLocation {
        address: "Calle Larga 123".to_string(),
        commune: "Melipilla".to_string(),
        region: "Metropolitana".to_string(),
        latitude: None,
        longitude: None,
    })
    .await
    .unwrap();

    let api = order_flow(&db);
    let order = api
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: items(&[(producto.id, 5)]) })
        .await
        .unwrap();

    // A non-party cannot tell the order exists.
    let err = api.order_detail(&ctx(&stranger), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotFound(_)));

    // The producer's listing carries the consumer contact and region/commune.
    let mine = api.my_orders(&ctx(&producer)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].consumer.as_ref().unwrap().name, "Carlos");
    assert_eq!(mine[0].consumer_region.as_deref(), Some("Metropolitana"));
    assert_eq!(mine[0].consumer_commune.as_deref(), Some("Melipilla"));
    assert!(mine[0].producer.is_none());

    // The consumer's listing shows the producer but no region enrichment.
    let mine = api.my_orders(&ctx(&consumer)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].producer.as_ref().unwrap().name, "Rosa");
    assert!(mine[0].consumer_region.is_none());

    // An uninvolved consumer sees nothing; the admin sees both sides.
    assert!(api.my_orders(&ctx(&stranger)).await.unwrap().is_empty());
    let all = api.my_orders(&ctx(&admin)).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].consumer.is_some() && all[0].producer.is_some());

    // Detail view includes counterpart emails.
    let detail = api.order_detail(&ctx(&admin), order.order.id).await.unwrap();
    assert_eq!(detail.consumer.as_ref().unwrap().email.as_deref(), Some("carlos@correo.cl"));
}
