use actix_web::{web, web::ServiceConfig};
use agl_common::Money;
use agrolink_engine::{
    db_types::{OrderStatusType, Payment, PaymentStatus, Role},
    events::EventProducers,
    PaymentApi,
};
use chrono::Utc;
use serde_json::json;

use super::{
    helpers::{issue_token, post, send_request, test_order},
    mocks::MockBackend,
};
use crate::routes::CreatePaymentRoute;

const CONSUMER: i64 = 10;
const PRODUCER: i64 = 20;

fn configure_payments(backend: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PaymentApi::new(backend, EventProducers::default());
        cfg.app_data(web::Data::new(api)).service(CreatePaymentRoute::<MockBackend>::new());
    }
}

fn confirmed_payment(order_id: i64, amount_units: i64) -> Payment {
    Payment {
        id: 1,
        order_id,
        amount: Money::from_units(amount_units),
        method: "transferencia".to_string(),
        status: PaymentStatus::Confirmed,
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn a_matching_payment_is_recorded_and_confirmed() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order()
        .returning(|id| Ok(Some(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Pending))));
    backend.expect_insert_payment_and_mark_paid().returning(|payment| {
        let order = test_order(payment.order_id, CONSUMER, PRODUCER, 35, OrderStatusType::Paid);
        Ok((order, confirmed_payment(payment.order_id, 35)))
    });

    let token = issue_token(CONSUMER, Role::Consumer);
    let req = post("/payments", &token, json!({"orderId": 1, "amount": 3500, "method": "transferencia"}));
    let (status, body) = send_request(req, configure_payments(backend)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""status":"confirmed""#), "was: {body}");
}

#[actix_web::test]
async fn a_mismatched_amount_is_rejected() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order()
        .returning(|id| Ok(Some(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Pending))));

    let token = issue_token(CONSUMER, Role::Consumer);
    let req = post("/payments", &token, json!({"orderId": 1, "amount": 3400, "method": "transferencia"}));
    let (status, body) = send_request(req, configure_payments(backend)).await;
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, r#"{"error":"El monto no coincide con el total del pedido"}"#);
}

#[actix_web::test]
async fn paying_an_already_paid_order_is_rejected() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order()
        .returning(|id| Ok(Some(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Paid))));

    let token = issue_token(CONSUMER, Role::Consumer);
    let req = post("/payments", &token, json!({"orderId": 1, "amount": 3500, "method": "transferencia"}));
    let (status, body) = send_request(req, configure_payments(backend)).await;
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, r#"{"error":"El pedido no admite pagos en su estado actual"}"#);
}

#[actix_web::test]
async fn someone_elses_order_cannot_be_paid() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order()
        .returning(|id| Ok(Some(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Pending))));

    let token = issue_token(999, Role::Consumer);
    let req = post("/payments", &token, json!({"orderId": 1, "amount": 3500, "method": "transferencia"}));
    let (status, body) = send_request(req, configure_payments(backend)).await;
    assert_eq!(status.as_u16(), 404);
    assert_eq!(body, r#"{"error":"Pedido no encontrado"}"#);
}
