//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current
//! thread will cause the current worker to stop processing new requests. For this reason, any
//! long, non-cpu-bound operation (e.g. I/O, database operations, etc.) must be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads
//! and thus don't block execution.
mod auth_routes;
mod order_routes;
mod payment_routes;
mod product_routes;
mod profile_routes;
mod rating_routes;

use actix_web::{get, HttpResponse, Responder};
use log::trace;

pub use auth_routes::{LoginRoute, RecoverPasswordRoute, RegisterRoute};
pub use order_routes::{
    CancelOrderRoute,
    CreateOrderRoute,
    DeliverOrderRoute,
    MyOrdersRoute,
    OrderDetailRoute,
    ShipOrderRoute,
};
pub use payment_routes::{CreatePaymentRoute, PaymentsForOrderRoute};
pub use product_routes::{
    CreateProductRoute,
    DeleteProductRoute,
    ListProductsRoute,
    MyProductsRoute,
    ProductCategoriesRoute,
    ProductDetailRoute,
    UpdateProductRoute,
};
pub use profile_routes::{
    DeleteMyLocationRoute,
    MeRoute,
    MyLocationRoute,
    SetMyLocationRoute,
    UpdateMeRoute,
};
pub use rating_routes::{CreateRatingRoute, ProducerRatingSummaryRoute};

// Web-actix cannot handle generics in handlers, so routes are registered manually using the
// `route!` macro. A route declared with `requires [...]` is wrapped in the ACL middleware; an
// empty role list means "any authenticated user", and admins pass every role check.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),*]) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),*]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}
