use actix_web::{web, web::ServiceConfig};
use agrolink_engine::{
    db_types::{OrderStatusType, Role},
    events::EventProducers,
    MarketplaceError,
    OrderFlowApi,
};
use serde_json::json;

use super::{
    helpers::{get, issue_token, post, put, send_request, test_order, test_user, with_items},
    mocks::MockBackend,
};
use crate::routes::{CancelOrderRoute, CreateOrderRoute, DeliverOrderRoute, OrderDetailRoute, ShipOrderRoute};

const CONSUMER: i64 = 10;
const PRODUCER: i64 = 20;

fn configure_orders(backend: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(backend, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(CreateOrderRoute::<MockBackend>::new())
            .service(OrderDetailRoute::<MockBackend>::new())
            .service(ShipOrderRoute::<MockBackend>::new())
            .service(DeliverOrderRoute::<MockBackend>::new())
            .service(CancelOrderRoute::<MockBackend>::new());
    }
}

#[actix_web::test]
async fn creating_an_order_returns_the_enriched_snapshot() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_insert_order()
        .returning(|consumer_id, order| Ok(with_items(test_order(1, consumer_id, order.producer_id, 35, OrderStatusType::Pending))));
    backend.expect_fetch_users_by_ids().returning(|ids| Ok(ids.iter().map(|id| test_user(*id, Role::Producer)).collect()));
    backend.expect_fetch_locations_for_users().returning(|_| Ok(Vec::new()));

    let token = issue_token(CONSUMER, Role::Consumer);
    let req = post("/orders", &token, json!({"producerId": PRODUCER, "items": [{"productId": 7, "quantity": 1}]}));
    let (status, body) = send_request(req, configure_orders(backend)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""status":"pending""#), "was: {body}");
    assert!(body.contains(r#""total":3500"#), "was: {body}");
    assert!(body.contains(r#""items""#), "was: {body}");
}

#[actix_web::test]
async fn producers_cannot_place_orders() {
    let token = issue_token(PRODUCER, Role::Producer);
    let req = post("/orders", &token, json!({"producerId": PRODUCER, "items": [{"productId": 7, "quantity": 1}]}));
    let (status, body) = send_request(req, configure_orders(MockBackend::new())).await;
    assert_eq!(status.as_u16(), 403);
    assert_eq!(body, r#"{"error":"Permisos insuficientes"}"#);
}

#[actix_web::test]
async fn delivering_a_pending_order_is_an_invalid_transition() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order()
        .returning(|id| Ok(Some(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Pending))));
    backend.expect_transition_order().returning(|_, _, to| {
        Err(MarketplaceError::InvalidTransition { from: OrderStatusType::Pending, to })
    });

    let token = issue_token(PRODUCER, Role::Producer);
    let (status, body) = send_request(put("/orders/1/deliver", &token), configure_orders(backend)).await;
    assert_eq!(status.as_u16(), 400, "was: {body}");
    assert_eq!(body, r#"{"error":"El pedido no admite la transición pending → delivered"}"#);
}

#[actix_web::test]
async fn shipping_someone_elses_order_is_a_404() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order()
        .returning(|id| Ok(Some(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Pending))));

    let token = issue_token(999, Role::Producer);
    let (status, body) = send_request(put("/orders/1/ship", &token), configure_orders(backend)).await;
    assert_eq!(status.as_u16(), 404);
    assert_eq!(body, r#"{"error":"Pedido no encontrado"}"#);
}

#[actix_web::test]
async fn a_consumer_cannot_cancel_a_paid_order() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order()
        .returning(|id| Ok(Some(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Paid))));

    let token = issue_token(CONSUMER, Role::Consumer);
    let (status, body) = send_request(put("/orders/1/cancel", &token), configure_orders(backend)).await;
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, r#"{"error":"Solo el productor puede cancelar un pedido pagado"}"#);
}

#[actix_web::test]
async fn order_detail_is_party_or_admin_scoped() {
    let token = issue_token(999, Role::Consumer);
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order_with_items()
        .returning(|id| Ok(Some(with_items(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Pending)))));
    let (status, body) = send_request(get("/orders/1", &token), configure_orders(backend)).await;
    assert_eq!(status.as_u16(), 404, "was: {body}");
    assert_eq!(body, r#"{"error":"Pedido no encontrado"}"#);

    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order_with_items()
        .returning(|id| Ok(Some(with_items(test_order(id, CONSUMER, PRODUCER, 35, OrderStatusType::Pending)))));
    backend
        .expect_fetch_users_by_ids()
        .returning(|ids| Ok(ids.iter().map(|id| test_user(*id, Role::Consumer)).collect()));
    backend.expect_fetch_locations_for_users().returning(|_| Ok(Vec::new()));
    let token = issue_token(42, Role::Admin);
    let (status, body) = send_request(get("/orders/1", &token), configure_orders(backend)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""consumer""#), "was: {body}");
}
