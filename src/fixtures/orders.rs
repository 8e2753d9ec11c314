use bson::oid::ObjectId;
use bson::DateTime;

use crate::models::{Order, OrderItem, OrderStatus, ShippingAddress};

/// An order waiting for its customer's id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderFixture {
    /// Username of the customer.
    pub customer: &'static str,
    /// (product name, quantity, unit price)
    pub items: &'static [(&'static str, i32, f64)],
    pub status: OrderStatus,
    /// (street, city, state, zip code)
    pub address: (&'static str, &'static str, &'static str, &'static str),
}

impl OrderFixture {
    /// Materialize the order for the resolved customer id.
    ///
    /// Every line item gets a fresh product id; the total is computed.
    pub fn into_order(self, user_id: ObjectId, now: DateTime) -> Order {
        let items = self
            .items
            .iter()
            .map(|&(name, quantity, price)| OrderItem {
                product_id: ObjectId::new(),
                product_name: name.to_string(),
                quantity,
                price,
            })
            .collect();

        let (street, city, state, zip_code) = self.address;
        let shipping_address = ShippingAddress {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip_code: zip_code.to_string(),
        };

        Order::new(user_id, items, self.status, shipping_address, now)
    }
}

const ORDERS: [OrderFixture; 3] = [
    OrderFixture {
        customer: "john_doe",
        items: &[("Laptop", 1, 999.99)],
        status: OrderStatus::Completed,
        address: ("123 Main St", "New York", "NY", "10001"),
    },
    OrderFixture {
        customer: "jane_smith",
        items: &[("Mouse", 2, 29.99)],
        status: OrderStatus::Pending,
        address: ("456 Oak Ave", "Los Angeles", "CA", "90210"),
    },
    OrderFixture {
        customer: "bob_wilson",
        items: &[("Keyboard", 1, 79.99)],
        status: OrderStatus::Shipped,
        address: ("789 Pine St", "Chicago", "IL", "60601"),
    },
];

/// Demo orders.
pub fn orders() -> Vec<OrderFixture> {
    ORDERS.to_vec()
}
