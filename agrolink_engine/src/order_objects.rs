use std::fmt::Display;

use agl_common::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Location, Order, OrderItem, OrderStatusType, Product, User};

//--------------------------------------   OrderWithItems   ----------------------------------------------------------
/// An order together with its embedded line item snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Public contact fields of an order counterpart, exposed to the other party.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ContactInfo {
    pub fn from_user(user: &User, with_email: bool) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            email: with_email.then(|| user.email.clone()),
        }
    }
}

/// An order as returned by the read paths: the snapshot plus counterpart contact details and, for
/// producer/admin viewers, the consumer's region and commune.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_commune: Option<String>,
}

//--------------------------------------  OrderQueryFilter  ----------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub consumer_id: Option<i64>,
    pub producer_id: Option<i64>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub status: Option<Vec<OrderStatusType>>,
}

impl OrderQueryFilter {
    pub fn with_consumer_id(mut self, consumer_id: i64) -> Self {
        self.consumer_id = Some(consumer_id);
        self
    }

    pub fn with_producer_id(mut self, producer_id: i64) -> Self {
        self.producer_id = Some(producer_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.consumer_id.is_none() &&
            self.producer_id.is_none() &&
            self.since.is_none() &&
            self.until.is_none() &&
            self.status.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters.");
        }
        if let Some(id) = self.consumer_id {
            write!(f, "consumer_id: {id}. ")?;
        }
        if let Some(id) = self.producer_id {
            write!(f, "producer_id: {id}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        Ok(())
    }
}

//-------------------------------------- ProductQueryFilter ----------------------------------------------------------
pub const DEFAULT_PAGE_SIZE: i64 = 9;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Public catalog listing filter. Pagination is clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProductQueryFilter {
    pub category: Option<String>,
    pub region: Option<String>,
    pub commune: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductQueryFilter {
    fn default() -> Self {
        Self { category: None, region: None, commune: None, page: 1, limit: DEFAULT_PAGE_SIZE }
    }
}

impl ProductQueryFilter {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

//--------------------------------------    ProductCard     ----------------------------------------------------------
/// Public name and phone of a product's producer, denormalized into listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerPublic {
    pub name: String,
    pub phone: String,
}

/// A catalog entry as shown publicly: the product plus its producer's public fields and location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_public: Option<ProducerPublic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_location: Option<Location>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub items: Vec<ProductCard>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

//--------------------------------------   RatingSummary    ----------------------------------------------------------
/// Aggregate over all ratings tied to a producer's orders. `{None, 0}` when unrated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_score: Option<f64>,
    pub count: i64,
}

//--------------------------------------   Order helpers    ----------------------------------------------------------
impl OrderWithItems {
    /// The total as derived from the item snapshot. Always equals `order.total`.
    pub fn computed_total(&self) -> Money {
        self.items.iter().map(|it| it.price * it.quantity).sum()
    }
}
