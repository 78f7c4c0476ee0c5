use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use agl_common::{Money, Secret};
use agrolink_engine::db_types::{Order, OrderItem, OrderStatusType, Role, User};
use agrolink_engine::order_objects::OrderWithItems;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::{auth::TokenIssuer, config::AuthConfig};

pub fn test_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("endpoint-test-secret".to_string()), token_validity: Duration::days(1) }
}

pub fn issue_token(user_id: i64, role: Role) -> String {
    TokenIssuer::new(&test_auth_config()).issue_token(user_id, role).expect("Error issuing test token")
}

/// A token whose expiry is already in the past.
pub fn expired_token(user_id: i64, role: Role) -> String {
    let config = AuthConfig { token_validity: Duration::hours(-2), ..test_auth_config() };
    TokenIssuer::new(&config).issue_token(user_id, role).expect("Error issuing test token")
}

/// Builds the app with the given routes/mocks, fires the request and returns (status, body).
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().app_data(web::Data::new(TokenIssuer::new(&test_auth_config()))).configure(configure);
    let app = test::init_service(app).await;
    // Middleware (e.g. the ACL layer) signals rejection by returning `Err`, which a real server
    // renders through `ResponseError`. `test::call_service` panics on `Err` instead of rendering it,
    // so use `try_call_service` and render the error the same way the server would.
    match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(err) => {
            let res = err.error_response();
            let status = res.status();
            let bytes = actix_web::body::to_bytes(res.into_body()).await.unwrap();
            (status, String::from_utf8_lossy(&bytes).into_owned())
        },
    }
}

pub fn get(path: &str, token: &str) -> TestRequest {
    TestRequest::get().uri(path).insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn post(path: &str, token: &str, body: Value) -> TestRequest {
    TestRequest::post().uri(path).insert_header(("Authorization", format!("Bearer {token}"))).set_json(body)
}

pub fn put(path: &str, token: &str) -> TestRequest {
    TestRequest::put().uri(path).insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn test_user(id: i64, role: Role) -> User {
    User {
        id,
        name: format!("Usuario {id}"),
        email: format!("usuario{id}@correo.cl"),
        password_hash: "unused-hash".to_string(),
        role,
        phone: "+56 9 1111 1111".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_order(id: i64, consumer_id: i64, producer_id: i64, total_units: i64, status: OrderStatusType) -> Order {
    Order {
        id,
        consumer_id,
        producer_id,
        total: Money::from_units(total_units),
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn with_items(order: Order) -> OrderWithItems {
    let item = OrderItem {
        id: 1,
        order_id: order.id,
        product_id: 7,
        name: "Manzanas".to_string(),
        price: order.total,
        quantity: 1,
    };
    OrderWithItems { order, items: vec![item] }
}
