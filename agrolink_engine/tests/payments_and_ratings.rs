//! Payment ledger and rating store tests.
mod common;

use agl_common::Money;
use agrolink_engine::{
    db_types::{NewOrder, NewOrderItem, NewPayment, NewRating, OrderStatusType, Role},
    MarketplaceError,
};
use common::*;

fn one_item(product_id: i64, quantity: i64) -> Vec<NewOrderItem> {
    vec![NewOrderItem { product_id, quantity }]
}

fn payment(order_id: i64, amount_units: i64) -> NewPayment {
    NewPayment { order_id, amount: Money::from_units(amount_units), method: "transferencia".to_string() }
}

#[tokio::test]
async fn a_matching_payment_marks_the_order_paid() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let orders = order_flow(&db);
    let pay = payment_api(&db);
    let order = orders
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: one_item(producto.id, 3) })
        .await
        .unwrap();

    let recorded = pay.record_payment(&ctx(&consumer), payment(order.order.id, 15)).await.unwrap();
    assert_eq!(recorded.amount, Money::from_units(15));
    assert_eq!(recorded.order_id, order.order.id);

    let detail = orders.order_detail(&ctx(&consumer), order.order.id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatusType::Paid);
}

#[tokio::test]
async fn payment_amount_must_match_the_total_exactly() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let orders = order_flow(&db);
    let pay = payment_api(&db);
    let order = orders
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: one_item(producto.id, 3) })
        .await
        .unwrap();

    let err = pay.record_payment(&ctx(&consumer), payment(order.order.id, 14)).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::AmountMismatch));

    // The failed attempt must not have moved the order.
    let detail = orders.order_detail(&ctx(&consumer), order.order.id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatusType::Pending);
    assert!(pay.payments_for_order(&ctx(&consumer), order.order.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn an_order_accepts_exactly_one_payment() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let orders = order_flow(&db);
    let pay = payment_api(&db);
    let order = orders
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: one_item(producto.id, 2) })
        .await
        .unwrap();

    pay.record_payment(&ctx(&consumer), payment(order.order.id, 10)).await.unwrap();
    let err = pay.record_payment(&ctx(&consumer), payment(order.order.id, 10)).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotPayable));
    assert_eq!(pay.payments_for_order(&ctx(&consumer), order.order.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancelled_orders_reject_payment() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let orders = order_flow(&db);
    let pay = payment_api(&db);
    let order = orders
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: one_item(producto.id, 2) })
        .await
        .unwrap();
    orders.cancel_order(&ctx(&consumer), order.order.id).await.unwrap();

    let err = pay.record_payment(&ctx(&consumer), payment(order.order.id, 10)).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotPayable));
}

#[tokio::test]
async fn only_the_orders_consumer_may_pay_and_only_parties_may_read_payments() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let stranger = seed_user(&db, "Mirona", "mirona@correo.cl", Role::Consumer).await;
    let admin = seed_user(&db, "Admin", "admin@agrolink.cl", Role::Admin).await;
    let producto = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let orders = order_flow(&db);
    let pay = payment_api(&db);
    let order = orders
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: one_item(producto.id, 1) })
        .await
        .unwrap();

    let err = pay.record_payment(&ctx(&stranger), payment(order.order.id, 5)).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotFound(_)));

    pay.record_payment(&ctx(&consumer), payment(order.order.id, 5)).await.unwrap();

    let err = pay.payments_for_order(&ctx(&stranger), order.order.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotFound(_)));
    assert_eq!(pay.payments_for_order(&ctx(&producer), order.order.id).await.unwrap().len(), 1);
    assert_eq!(pay.payments_for_order(&ctx(&admin), order.order.id).await.unwrap().len(), 1);
}

async fn delivered_order(
    db: &agrolink_engine::SqliteDatabase,
    producer: &agrolink_engine::db_types::User,
    consumer: &agrolink_engine::db_types::User,
    product_id: i64,
) -> i64 {
    let orders = order_flow(db);
    let order = orders
        .place_order(&ctx(consumer), NewOrder { producer_id: producer.id, items: one_item(product_id, 1) })
        .await
        .unwrap();
    orders.ship_order(&ctx(producer), order.order.id).await.unwrap();
    orders.deliver_order(&ctx(producer), order.order.id).await.unwrap();
    order.order.id
}

#[tokio::test]
async fn ratings_require_a_delivered_order_and_its_consumer() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let stranger = seed_user(&db, "Mirona", "mirona@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let orders = order_flow(&db);
    let ratings = rating_api(&db);
    let undelivered = orders
        .place_order(&ctx(&consumer), NewOrder { producer_id: producer.id, items: one_item(producto.id, 1) })
        .await
        .unwrap();

    let err = ratings
        .create_rating(&ctx(&consumer), NewRating { order_id: undelivered.order.id, score: 5, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotRateable));

    let delivered = delivered_order(&db, &producer, &consumer, producto.id).await;

    let err = ratings
        .create_rating(&ctx(&stranger), NewRating { order_id: delivered, score: 5, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::OrderNotFound(_)));

    let err = ratings
        .create_rating(&ctx(&consumer), NewRating { order_id: delivered, score: 6, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidScore));

    let rating = ratings
        .create_rating(&ctx(&consumer), NewRating {
            order_id: delivered,
            score: 4,
            comment: Some("Muy fresco".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(rating.producer_id, producer.id);
    assert_eq!(rating.consumer_id, consumer.id);

    // One rating per order.
    let err = ratings
        .create_rating(&ctx(&consumer), NewRating { order_id: delivered, score: 2, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::DuplicateRating));
}

#[tokio::test]
async fn producer_summary_aggregates_and_never_errors_when_empty() {
    let db = new_db().await;
    let producer = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let consumer = seed_user(&db, "Carlos", "carlos@correo.cl", Role::Consumer).await;
    let otro = seed_user(&db, "Elena", "elena@correo.cl", Role::Consumer).await;
    let producto = seed_product(&db, producer.id, "Miel", 5, 10).await;

    let ratings = rating_api(&db);
    let empty = ratings.producer_summary(producer.id).await.unwrap();
    assert_eq!(empty.average_score, None);
    assert_eq!(empty.count, 0);

    let first = delivered_order(&db, &producer, &consumer, producto.id).await;
    let second = delivered_order(&db, &producer, &otro, producto.id).await;
    ratings.create_rating(&ctx(&consumer), NewRating { order_id: first, score: 5, comment: None }).await.unwrap();
    ratings.create_rating(&ctx(&otro), NewRating { order_id: second, score: 2, comment: None }).await.unwrap();

    let summary = ratings.producer_summary(producer.id).await.unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average_score, Some(3.5));
}
