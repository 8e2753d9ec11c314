//! Document types for the demo collections.
//!
//! Field names serialize in camelCase so the stored documents match what
//! downstream CDC consumers of the demo database expect.

use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Collection names.
pub const USERS_COLLECTION: &str = "users";
pub const POSTS_COLLECTION: &str = "posts";
pub const ORDERS_COLLECTION: &str = "orders";

/// The collections this tool owns, in insertion order.
pub const FIXTURE_COLLECTIONS: [&str; 3] = [USERS_COLLECTION, POSTS_COLLECTION, ORDERS_COLLECTION];

/// A demo user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Published,
    Draft,
}

/// A blog post written by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
    Pending,
    Shipped,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ObjectId,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
}

impl OrderItem {
    /// Price of the line: quantity times unit price.
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// Postal address embedded in an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Order {
    /// Build an order, computing `total` from the line items.
    pub fn new(
        user_id: ObjectId,
        items: Vec<OrderItem>,
        status: OrderStatus,
        shipping_address: ShippingAddress,
        now: DateTime,
    ) -> Self {
        let total: f64 = items.iter().map(OrderItem::subtotal).sum();
        Self {
            id: ObjectId::new(),
            user_id,
            items,
            total,
            status,
            shipping_address,
            created_at: now,
            updated_at: now,
        }
    }
}
