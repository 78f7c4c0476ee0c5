//! Shared fixtures for the engine integration tests.
#![allow(dead_code)]

use agl_common::Money;
use agrolink_engine::{
    db_types::{AuthContext, NewProduct, NewUser, Product, Role, User},
    events::EventProducers,
    test_utils::prepare_test_env,
    CatalogManagement,
    IdentityManagement,
    OrderFlowApi,
    PaymentApi,
    RatingApi,
    SqliteDatabase,
};

pub async fn new_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    prepare_test_env().await
}

/// Inserts a user directly, skipping the (slow) argon2 hashing that registration tests exercise
/// separately.
pub async fn seed_user(db: &SqliteDatabase, name: &str, email: &str, role: Role) -> User {
    db.create_user(NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "unused-hash".to_string(),
        role,
        phone: "+56 9 1111 1111".to_string(),
    })
    .await
    .expect("Error seeding user")
}

pub async fn seed_product(db: &SqliteDatabase, producer_id: i64, name: &str, price_units: i64, stock: i64) -> Product {
    db.insert_product(producer_id, NewProduct {
        name: name.to_string(),
        description: None,
        price: Money::from_units(price_units),
        stock,
        category: Some("Frutas".to_string()),
        image_url: None,
    })
    .await
    .expect("Error seeding product")
}

pub fn ctx(user: &User) -> AuthContext {
    AuthContext::new(user.id, user.role)
}

pub fn order_flow(db: &SqliteDatabase) -> OrderFlowApi<SqliteDatabase> {
    OrderFlowApi::new(db.clone(), EventProducers::default())
}

pub fn payment_api(db: &SqliteDatabase) -> PaymentApi<SqliteDatabase> {
    PaymentApi::new(db.clone(), EventProducers::default())
}

pub fn rating_api(db: &SqliteDatabase) -> RatingApi<SqliteDatabase> {
    RatingApi::new(db.clone())
}

pub async fn stock_of(db: &SqliteDatabase, product_id: i64) -> i64 {
    db.fetch_product(product_id).await.expect("Error fetching product").expect("Product missing").stock
}
