use agrolink_engine::{
    db_types::{
        Location,
        NewLocation,
        NewOrder,
        NewPayment,
        NewProduct,
        NewUser,
        Order,
        OrderStatusType,
        Payment,
        Product,
        ProductUpdate,
        ProfileUpdate,
        Rating,
        User,
    },
    order_objects::{OrderQueryFilter, OrderWithItems, ProductCard, ProductListing, ProductQueryFilter, RatingSummary},
    CatalogApiError,
    CatalogManagement,
    IdentityApiError,
    IdentityManagement,
    LocationApiError,
    LocationDirectory,
    MarketplaceDatabase,
    MarketplaceError,
};
use mockall::mock;

mock! {
    pub Backend {}

    impl Clone for Backend {
        fn clone(&self) -> Self;
    }

    impl IdentityManagement for Backend {
        async fn create_user(&self, user: NewUser) -> Result<User, IdentityApiError>;
        async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, IdentityApiError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityApiError>;
        async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User, IdentityApiError>;
        async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, IdentityApiError>;
        async fn fetch_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, IdentityApiError>;
    }

    impl CatalogManagement for Backend {
        async fn insert_product(&self, producer_id: i64, product: NewProduct) -> Result<Product, CatalogApiError>;
        async fn update_product(
            &self,
            id: i64,
            producer_id: i64,
            update: ProductUpdate,
        ) -> Result<Option<Product>, CatalogApiError>;
        async fn delete_product(&self, id: i64, producer_id: i64) -> Result<bool, CatalogApiError>;
        async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;
        async fn fetch_product_card(&self, id: i64) -> Result<Option<ProductCard>, CatalogApiError>;
        async fn search_products(&self, filter: ProductQueryFilter) -> Result<ProductListing, CatalogApiError>;
        async fn fetch_categories(&self) -> Result<Vec<String>, CatalogApiError>;
        async fn fetch_products_for_producer(&self, producer_id: i64) -> Result<Vec<Product>, CatalogApiError>;
        async fn reserve_stock(&self, product_id: i64, quantity: i64) -> Result<bool, CatalogApiError>;
        async fn restore_stock(&self, product_id: i64, quantity: i64) -> Result<(), CatalogApiError>;
    }

    impl LocationDirectory for Backend {
        async fn upsert_location(&self, user_id: i64, location: NewLocation) -> Result<Location, LocationApiError>;
        async fn fetch_location_for_user(&self, user_id: i64) -> Result<Option<Location>, LocationApiError>;
        async fn delete_location_for_user(&self, user_id: i64) -> Result<bool, LocationApiError>;
        async fn fetch_locations_for_users(&self, user_ids: &[i64]) -> Result<Vec<Location>, LocationApiError>;
    }

    impl MarketplaceDatabase for Backend {
        fn url(&self) -> &str;
        async fn insert_order(&self, consumer_id: i64, order: NewOrder) -> Result<OrderWithItems, MarketplaceError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<Order>, MarketplaceError>;
        async fn fetch_order_with_items(&self, id: i64) -> Result<Option<OrderWithItems>, MarketplaceError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<OrderWithItems>, MarketplaceError>;
        async fn transition_order(
            &self,
            id: i64,
            allowed_from: &[OrderStatusType],
            new_status: OrderStatusType,
        ) -> Result<Order, MarketplaceError>;
        async fn cancel_order_with_compensation(&self, id: i64) -> Result<Order, MarketplaceError>;
        async fn insert_payment_and_mark_paid(&self, payment: NewPayment) -> Result<(Order, Payment), MarketplaceError>;
        async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, MarketplaceError>;
        async fn insert_rating(
            &self,
            order_id: i64,
            producer_id: i64,
            consumer_id: i64,
            score: i64,
            comment: Option<String>,
        ) -> Result<Rating, MarketplaceError>;
        async fn fetch_rating_for_order(&self, order_id: i64) -> Result<Option<Rating>, MarketplaceError>;
        async fn rating_summary_for_producer(&self, producer_id: i64) -> Result<RatingSummary, MarketplaceError>;
    }
}
