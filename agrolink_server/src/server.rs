use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use agrolink_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CatalogApi,
    IdentityApi,
    LocationApi,
    OrderFlowApi,
    PaymentApi,
    RatingApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    notifier::Notifier,
    routes::{
        health,
        CancelOrderRoute,
        CreateOrderRoute,
        CreatePaymentRoute,
        CreateProductRoute,
        CreateRatingRoute,
        DeleteMyLocationRoute,
        DeleteProductRoute,
        DeliverOrderRoute,
        ListProductsRoute,
        LoginRoute,
        MeRoute,
        MyLocationRoute,
        MyOrdersRoute,
        MyProductsRoute,
        OrderDetailRoute,
        PaymentsForOrderRoute,
        ProducerRatingSummaryRoute,
        ProductCategoriesRoute,
        ProductDetailRoute,
        RecoverPasswordRoute,
        RegisterRoute,
        SetMyLocationRoute,
        ShipOrderRoute,
        UpdateMeRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mut hooks = EventHooks::default();
    Notifier::new(db.clone(), config.mail.clone()).attach(&mut hooks);
    let handlers = EventHandlers::new(128, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let identity_api = IdentityApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let location_api = LocationApi::new(db.clone());
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let payments_api = PaymentApi::new(db.clone(), producers.clone());
        let ratings_api = RatingApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("agl::access_log"))
            .app_data(web::Data::new(identity_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(location_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(ratings_api))
            .app_data(web::Data::new(jwt_signer));
        // Literal paths (/products/categories, /products/mine, /orders/my) must be registered
        // before their parameterised siblings.
        let api_scope = web::scope("/api")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(RecoverPasswordRoute::<SqliteDatabase>::new())
            .service(MeRoute::<SqliteDatabase>::new())
            .service(UpdateMeRoute::<SqliteDatabase>::new())
            .service(MyLocationRoute::<SqliteDatabase>::new())
            .service(SetMyLocationRoute::<SqliteDatabase>::new())
            .service(DeleteMyLocationRoute::<SqliteDatabase>::new())
            .service(ProductCategoriesRoute::<SqliteDatabase>::new())
            .service(MyProductsRoute::<SqliteDatabase>::new())
            .service(ListProductsRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(ProductDetailRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrderDetailRoute::<SqliteDatabase>::new())
            .service(ShipOrderRoute::<SqliteDatabase>::new())
            .service(DeliverOrderRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(CreatePaymentRoute::<SqliteDatabase>::new())
            .service(PaymentsForOrderRoute::<SqliteDatabase>::new())
            .service(CreateRatingRoute::<SqliteDatabase>::new())
            .service(ProducerRatingSummaryRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
