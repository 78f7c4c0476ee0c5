//! Identity directory, catalog and location directory tests.
mod common;

use agl_common::Money;
use agrolink_engine::{
    db_types::{NewLocation, NewProduct, ProductUpdate, ProfileUpdate, Role},
    order_objects::ProductQueryFilter,
    CatalogApi,
    CatalogApiError,
    CatalogManagement,
    IdentityApi,
    IdentityApiError,
    LocationApi,
    RegisterUser,
};
use common::*;

fn registration(email: &str, role: Role) -> RegisterUser {
    RegisterUser {
        name: "Alguien".to_string(),
        email: email.to_string(),
        password: "secreto-largo".to_string(),
        role,
        phone: "+56 9 1234 5678".to_string(),
    }
}

#[tokio::test]
async fn duplicate_emails_are_rejected_case_insensitively() {
    let db = new_db().await;
    let api = IdentityApi::new(db.clone());
    api.register(registration("ana@correo.cl", Role::Consumer)).await.unwrap();
    let err = api.register(registration("ANA@Correo.CL", Role::Producer)).await.unwrap_err();
    assert!(matches!(err, IdentityApiError::EmailTaken));
    assert_eq!(err.to_string(), "Correo ya registrado");
}

#[tokio::test]
async fn registration_validates_role_and_phone() {
    let db = new_db().await;
    let api = IdentityApi::new(db.clone());

    let err = api.register(registration("admin@agrolink.cl", Role::Admin)).await.unwrap_err();
    assert!(matches!(err, IdentityApiError::InvalidRole));

    let mut reg = registration("corto@correo.cl", Role::Consumer);
    reg.phone = "123".to_string();
    let err = api.register(reg).await.unwrap_err();
    assert!(matches!(err, IdentityApiError::InvalidPhone));
}

#[tokio::test]
async fn login_verifies_credentials_without_leaking_account_existence() {
    let db = new_db().await;
    let api = IdentityApi::new(db.clone());
    api.register(registration("ana@correo.cl", Role::Consumer)).await.unwrap();

    let user = api.verify_credentials("Ana@Correo.cl", "secreto-largo").await.unwrap();
    assert_eq!(user.email, "ana@correo.cl");

    let err = api.verify_credentials("ana@correo.cl", "equivocada").await.unwrap_err();
    assert!(matches!(err, IdentityApiError::InvalidCredentials));
    let err = api.verify_credentials("nadie@correo.cl", "secreto-largo").await.unwrap_err();
    assert!(matches!(err, IdentityApiError::InvalidCredentials));
}

#[tokio::test]
async fn password_recovery_is_enumeration_resistant() {
    let db = new_db().await;
    let api = IdentityApi::new(db.clone());
    api.register(registration("ana@correo.cl", Role::Consumer)).await.unwrap();

    // Unknown email still reports success.
    api.recover_password("nadie@correo.cl", "da-igual-123").await.unwrap();

    api.recover_password("ana@correo.cl", "nueva-clave-123").await.unwrap();
    api.verify_credentials("ana@correo.cl", "nueva-clave-123").await.unwrap();
    let err = api.verify_credentials("ana@correo.cl", "secreto-largo").await.unwrap_err();
    assert!(matches!(err, IdentityApiError::InvalidCredentials));
}

#[tokio::test]
async fn profile_updates_check_email_collisions() {
    let db = new_db().await;
    let api = IdentityApi::new(db.clone());
    let ana = api.register(registration("ana@correo.cl", Role::Consumer)).await.unwrap();
    api.register(registration("otro@correo.cl", Role::Consumer)).await.unwrap();

    let updated = api
        .update_profile(ana.id, ProfileUpdate {
            name: "Ana María".to_string(),
            email: "ana.maria@correo.cl".to_string(),
            phone: "+56 9 8765 4321".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Ana María");

    let err = api
        .update_profile(ana.id, ProfileUpdate {
            name: "Ana".to_string(),
            email: "OTRO@correo.cl".to_string(),
            phone: "+56 9 8765 4321".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityApiError::EmailInUse));
}

#[tokio::test]
async fn product_crud_is_scoped_to_the_owning_producer() {
    let db = new_db().await;
    let rosa = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let pedro = seed_user(&db, "Pedro", "pedro@campo.cl", Role::Producer).await;
    let api = CatalogApi::new(db.clone());

    let product = api
        .create_product(&ctx(&rosa), NewProduct {
            name: "Manzanas".to_string(),
            description: Some("Fuji del valle".to_string()),
            price: Money::from_units(10),
            stock: 10,
            category: Some("Frutas".to_string()),
            image_url: None,
        })
        .await
        .unwrap();

    // Another producer can neither edit nor delete it.
    let err = api
        .update_product(&ctx(&pedro), product.id, ProductUpdate { stock: Some(99), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogApiError::ProductNotFound));
    let err = api.delete_product(&ctx(&pedro), product.id).await.unwrap_err();
    assert!(matches!(err, CatalogApiError::ProductNotFound));

    let updated = api
        .update_product(&ctx(&rosa), product.id, ProductUpdate {
            price: Some(Money::from_units(12)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.price, Money::from_units(12));
    assert_eq!(updated.stock, 10);

    api.delete_product(&ctx(&rosa), product.id).await.unwrap();
    let err = api.product_detail(product.id).await.unwrap_err();
    assert!(matches!(err, CatalogApiError::ProductNotFound));
}

#[tokio::test]
async fn listing_filters_by_category_and_region_with_pagination() {
    let db = new_db().await;
    let rosa = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let pedro = seed_user(&db, "Pedro", "pedro@campo.cl", Role::Producer).await;
    LocationApi::new(db.clone())
        .set_my_location(&ctx(&rosa), NewLocation {
            address: "Parcela 5".to_string(),
            commune: "Molina".to_string(),
            region: "Maule".to_string(),
            latitude: Some(-35.11),
            longitude: Some(-71.28),
        })
        .await
        .unwrap();

    seed_product(&db, rosa.id, "Manzanas", 10, 10).await;
    seed_product(&db, rosa.id, "Peras", 9, 10).await;
    let mut miel = NewProduct {
        name: "Miel".to_string(),
        description: None,
        price: Money::from_units(5),
        stock: 4,
        category: Some("Abarrotes".to_string()),
        image_url: None,
    };
    db.insert_product(pedro.id, miel.clone()).await.unwrap();
    miel.name = "Miel de ulmo".to_string();
    db.insert_product(pedro.id, miel).await.unwrap();

    let api = CatalogApi::new(db.clone());

    let listing = api
        .list_products(ProductQueryFilter { category: Some("Frutas".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(listing.total, 2);
    assert!(listing.items.iter().all(|card| card.product.category.as_deref() == Some("Frutas")));

    // Region filter follows the producer's location; Pedro has none on file.
    let listing = api
        .list_products(ProductQueryFilter { region: Some("Maule".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(listing.total, 2);
    assert!(listing.items.iter().all(|card| card.product.producer_id == rosa.id));
    let card = &listing.items[0];
    assert_eq!(card.producer_public.as_ref().unwrap().name, "Rosa");
    assert_eq!(card.producer_location.as_ref().unwrap().commune, "Molina");

    let page = api
        .list_products(ProductQueryFilter { page: 2, limit: 3, ..Default::default() })
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);

    let categories = api.categories().await.unwrap();
    assert_eq!(categories, vec!["Abarrotes".to_string(), "Frutas".to_string()]);
}

#[tokio::test]
async fn stock_reservation_round_trips() {
    let db = new_db().await;
    let rosa = seed_user(&db, "Rosa", "rosa@campo.cl", Role::Producer).await;
    let product = seed_product(&db, rosa.id, "Manzanas", 10, 10).await;

    assert!(db.reserve_stock(product.id, 4).await.unwrap());
    assert_eq!(stock_of(&db, product.id).await, 6);
    // More than remains: the conditional decrement refuses, stock untouched.
    assert!(!db.reserve_stock(product.id, 7).await.unwrap());
    assert_eq!(stock_of(&db, product.id).await, 6);
    db.restore_stock(product.id, 4).await.unwrap();
    assert_eq!(stock_of(&db, product.id).await, 10);
}

#[tokio::test]
async fn location_upsert_and_delete() {
    let db = new_db().await;
    let ana = seed_user(&db, "Ana", "ana@correo.cl", Role::Consumer).await;
    let api = LocationApi::new(db.clone());

    assert!(api.my_location(&ctx(&ana)).await.unwrap().is_none());

    let loc = api
        .set_my_location(&ctx(&ana), NewLocation {
            address: "Calle Larga 123".to_string(),
            commune: "Melipilla".to_string(),
            region: "Metropolitana".to_string(),
            latitude: None,
            longitude: None,
        })
        .await
        .unwrap();
    assert_eq!(loc.commune, "Melipilla");

    // Upsert replaces in place.
    let loc = api
        .set_my_location(&ctx(&ana), NewLocation {
            address: "Camino Nuevo 44".to_string(),
            commune: "Buin".to_string(),
            region: "Metropolitana".to_string(),
            latitude: Some(-33.73),
            longitude: Some(-70.74),
        })
        .await
        .unwrap();
    assert_eq!(loc.user_id, ana.id);
    assert_eq!(loc.commune, "Buin");

    api.delete_my_location(&ctx(&ana)).await.unwrap();
    assert!(api.my_location(&ctx(&ana)).await.unwrap().is_none());
}
