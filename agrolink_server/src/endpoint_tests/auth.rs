use actix_web::{test::TestRequest, web, web::ServiceConfig};
use agrolink_engine::{
    db_types::Role,
    IdentityApi,
    IdentityApiError,
};
use serde_json::json;

use super::{
    helpers::{expired_token, get, issue_token, send_request, test_user},
    mocks::MockBackend,
};
use crate::routes::{LoginRoute, MeRoute, MyProductsRoute, RegisterRoute};

fn configure_identity(backend: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = IdentityApi::new(backend);
        cfg.app_data(web::Data::new(api))
            .service(RegisterRoute::<MockBackend>::new())
            .service(LoginRoute::<MockBackend>::new())
            .service(MeRoute::<MockBackend>::new());
    }
}

#[actix_web::test]
async fn register_returns_the_new_user_without_credentials() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_create_user().returning(|new_user| {
        let mut user = test_user(1, new_user.role);
        user.email = new_user.email;
        Ok(user)
    });
    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "name": "Ana",
        "email": "ana@correo.cl",
        "password": "secreto-largo",
        "role": "consumer",
        "phone": "+56 9 1234 5678"
    }));
    let (status, body) = send_request(req, configure_identity(backend)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""email":"ana@correo.cl""#), "was: {body}");
    assert!(!body.contains("password"), "was: {body}");
}

#[actix_web::test]
async fn duplicate_registration_is_a_400_with_the_product_message() {
    let mut backend = MockBackend::new();
    backend.expect_create_user().returning(|_| Err(IdentityApiError::EmailTaken));
    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "name": "Ana",
        "email": "ana@correo.cl",
        "password": "secreto-largo",
        "role": "consumer",
        "phone": "+56 9 1234 5678"
    }));
    let (status, body) = send_request(req, configure_identity(backend)).await;
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, r#"{"error":"Correo ya registrado"}"#);
}

#[actix_web::test]
async fn registering_an_admin_is_rejected() {
    let backend = MockBackend::new();
    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "name": "Eve",
        "email": "eve@correo.cl",
        "password": "secreto-largo",
        "role": "admin",
        "phone": "+56 9 1234 5678"
    }));
    let (status, body) = send_request(req, configure_identity(backend)).await;
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, r#"{"error":"Rol inválido"}"#);
}

#[actix_web::test]
async fn login_with_unknown_email_is_a_401() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_email().returning(|_| Ok(None));
    let req = TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "nadie@correo.cl", "password": "da-igual"}));
    let (status, body) = send_request(req, configure_identity(backend)).await;
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body, r#"{"error":"Credenciales inválidas"}"#);
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let (status, body) = send_request(TestRequest::get().uri("/me"), configure_identity(MockBackend::new())).await;
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body, r#"{"error":"Token requerido"}"#);
}

#[actix_web::test]
async fn garbage_and_expired_tokens_are_rejected() {
    let (status, body) =
        send_request(get("/me", "made up nonsense"), configure_identity(MockBackend::new())).await;
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body, r#"{"error":"Token inválido o expirado"}"#);

    let token = expired_token(1, Role::Consumer);
    let (status, body) = send_request(get("/me", &token), configure_identity(MockBackend::new())).await;
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body, r#"{"error":"Token inválido o expirado"}"#);
}

#[actix_web::test]
async fn me_returns_the_callers_profile() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_id().returning(|id| Ok(Some(test_user(id, Role::Consumer))));
    let token = issue_token(3, Role::Consumer);
    let (status, body) = send_request(get("/me", &token), configure_identity(backend)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""id":3"#), "was: {body}");
}

fn configure_catalog(backend: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = agrolink_engine::CatalogApi::new(backend);
        cfg.app_data(web::Data::new(api)).service(MyProductsRoute::<MockBackend>::new());
    }
}

#[actix_web::test]
async fn producer_routes_reject_consumers_but_admit_admins() {
    let token = issue_token(5, Role::Consumer);
    let (status, body) = send_request(get("/products/mine", &token), configure_catalog(MockBackend::new())).await;
    assert_eq!(status.as_u16(), 403);
    assert_eq!(body, r#"{"error":"Permisos insuficientes"}"#);

    let mut backend = MockBackend::new();
    backend.expect_fetch_products_for_producer().returning(|_| Ok(Vec::new()));
    let token = issue_token(9, Role::Admin);
    let (status, body) = send_request(get("/products/mine", &token), configure_catalog(backend)).await;
    assert!(status.is_success(), "was: {body}");
}
