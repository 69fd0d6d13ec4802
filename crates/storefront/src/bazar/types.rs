//! Data transfer types for the Bazar Pepe REST API.
//!
//! Every endpoint answers with the same [`ApiEnvelope`]; the client narrows it
//! into the per-operation result types defined at the bottom of this module.

use chrono::NaiveDateTime;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use bazar_pepe_core::cart::DEFAULT_IMAGE_TYPE;
use bazar_pepe_core::{
    AddressId, CartLineItem, CategoryId, OrderItemId, OrderStatus, Price, ProductId, UserId,
};

// =============================================================================
// Response envelope
// =============================================================================

/// The response body shared by every endpoint.
///
/// Only the fields relevant to the called operation are populated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: u16,
    pub message: Option<String>,
    pub token: Option<String>,
    pub role: Option<String>,
    pub expiration_time: Option<String>,
    pub total_page: Option<u32>,
    pub total_element: Option<u64>,
    pub user: Option<User>,
    pub category: Option<Category>,
    pub category_list: Option<Vec<Category>>,
    pub product: Option<Product>,
    pub product_list: Option<Vec<Product>>,
    pub order_item_list: Option<Vec<OrderItem>>,
    pub address: Option<Address>,
}

// =============================================================================
// Entities
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub product_list: Vec<Product>,
}

/// A product as returned by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Base64-encoded image bytes.
    pub image: Option<String>,
    pub image_type: Option<String>,
    pub category: Option<Box<Category>>,
    pub category_id: Option<CategoryId>,
}

impl Product {
    /// `data:` URL for rendering the image inline.
    #[must_use]
    pub fn image_data_url(&self) -> Option<String> {
        self.image.as_ref().map(|image| {
            let mime = self.image_type.as_deref().unwrap_or(DEFAULT_IMAGE_TYPE);
            format!("data:{mime};base64,{image}")
        })
    }

    /// Category id, whether sent flat or nested.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
            .or_else(|| self.category.as_ref().map(|category| category.id))
    }

    /// Cart payload for one unit of this product.
    #[must_use]
    pub fn to_cart_item(&self) -> CartLineItem {
        CartLineItem {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            image: self.image.clone(),
            image_type: self.image_type.clone(),
            quantity: 1,
        }
    }
}

/// A shipping address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: u32,
    pub price: Price,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: Option<String>,
    pub product: Option<Product>,
    pub user: Option<User>,
}

impl OrderItem {
    /// Creation time as `YYYY-MM-DD HH:MM`, or the raw value if it does not
    /// parse as an ISO local date-time.
    #[must_use]
    pub fn created_at_display(&self) -> String {
        let Some(raw) = self.created_at.as_deref() else {
            return String::new();
        };
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map_or_else(
            |_| raw.to_string(),
            |at| at.format("%Y-%m-%d %H:%M").to_string(),
        )
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub role: String,
    pub address: Option<Address>,
    #[serde(default)]
    pub order_item_list: Vec<OrderItem>,
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /auth/register`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/login`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of category create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// Body of `POST /order/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub total_price: Price,
    pub items: Vec<OrderLineRequest>,
}

/// One product and quantity within an [`OrderRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderRequest {
    /// Order for everything in `cart` at the cart's total price.
    #[must_use]
    pub fn from_cart(cart: &bazar_pepe_core::Cart) -> Self {
        Self {
            total_price: cart.total_price(),
            items: cart
                .items()
                .iter()
                .map(|item| OrderLineRequest {
                    product_id: item.id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// Uploaded image for product create and update.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart fields of product create and update.
///
/// `price` is forwarded as entered; the API validates it.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<ImageUpload>,
}

/// Which order items `GET /order/filter` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    All,
    ItemId(OrderItemId),
    Status(OrderStatus),
}

// =============================================================================
// Narrowed results
// =============================================================================

/// Outcome of an operation that only reports a status and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiMessage {
    pub status: u16,
    pub message: Option<String>,
}

impl ApiMessage {
    /// Whether the body reported status 200.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The server message, or `default` when there is none.
    #[must_use]
    pub fn message_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(default)
    }
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub status: u16,
    pub message: Option<String>,
    pub token: SecretString,
    pub role: String,
}

/// A page of order items from `GET /order/filter`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderItemPage {
    pub items: Vec<OrderItem>,
    pub total_pages: u32,
    pub total_elements: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_product_list() {
        let body = r#"{
            "status": 200,
            "productList": [
                {"id": 1, "name": "Mug", "description": "Blue", "price": 4.5, "image": "aGk=", "category": {"id": 3, "name": "Kitchen"}}
            ]
        }"#;
        let envelope: ApiEnvelope = serde_json::from_str(body).unwrap();
        let products = envelope.product_list.unwrap();

        assert_eq!(envelope.status, 200);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, Price::from_cents(450));
        assert_eq!(products[0].category_id(), Some(CategoryId::new(3)));
        assert_eq!(
            products[0].image_data_url().as_deref(),
            Some("data:image/jpeg;base64,aGk=")
        );
    }

    #[test]
    fn test_envelope_parses_user_with_orders() {
        let body = r#"{
            "status": 200,
            "user": {
                "id": 7, "name": "Pepe", "email": "pepe@example.com", "phoneNumber": "600",
                "role": "USER",
                "address": {"id": 2, "street": "Calle 1", "city": "Madrid", "state": "MD", "zipCode": "28001", "country": "ES"},
                "orderItemList": [
                    {"id": 11, "quantity": 2, "price": 9, "status": "SHIPPED", "createdAt": "2024-05-01T10:30:00.123"}
                ]
            }
        }"#;
        let envelope: ApiEnvelope = serde_json::from_str(body).unwrap();
        let user = envelope.user.unwrap();

        assert_eq!(user.address.as_ref().unwrap().zip_code, "28001");
        assert_eq!(user.order_item_list[0].status, OrderStatus::Shipped);
        assert_eq!(user.order_item_list[0].created_at_display(), "2024-05-01 10:30");
    }

    #[test]
    fn test_category_without_products_defaults_to_empty_list() {
        let category: Category = serde_json::from_str(r#"{"id": 1, "name": "Toys"}"#).unwrap();
        assert!(category.product_list.is_empty());
    }

    #[test]
    fn test_order_request_from_cart() {
        let mug = Product {
            id: ProductId::new(4),
            name: "Mug".to_string(),
            description: String::new(),
            price: Price::from_cents(250),
            image: None,
            image_type: None,
            category: None,
            category_id: None,
        };
        let cart = bazar_pepe_core::Cart::new()
            .reduce(bazar_pepe_core::CartAction::Add(mug.to_cart_item()))
            .reduce(bazar_pepe_core::CartAction::Add(mug.to_cart_item()));

        let json = serde_json::to_value(OrderRequest::from_cart(&cart)).unwrap();
        assert_eq!(json["items"][0]["productId"], 4);
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["totalPrice"], "5.00");
    }

    #[test]
    fn test_address_omits_missing_id() {
        let json = serde_json::to_value(Address {
            street: "Calle 1".to_string(),
            zip_code: "28001".to_string(),
            ..Address::default()
        })
        .unwrap();

        assert!(json.get("id").is_none());
        assert_eq!(json["zipCode"], "28001");
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "pepe@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug_output = format!("{request:?}");

        assert!(debug_output.contains("pepe@example.com"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_unparsable_created_at_is_shown_raw() {
        let item: OrderItem =
            serde_json::from_str(r#"{"id": 1, "quantity": 1, "price": 1, "createdAt": "yesterday"}"#)
                .unwrap();
        assert_eq!(item.status, OrderStatus::Pending);
        assert_eq!(item.created_at_display(), "yesterday");
    }
}
