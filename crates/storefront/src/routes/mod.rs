//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Product listing and search (?search=&page=)
//! GET  /health                   - Health check
//!
//! # Catalog
//! GET  /product/{id}             - Product detail
//! GET  /categories               - Category listing
//! GET  /category/{id}            - Products of a category (?page=)
//!
//! # Cart
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add one unit (fetches the product)
//! POST /cart/increment           - Add one unit of a product in the cart
//! POST /cart/decrement           - Remove one unit, dropping the line at 1
//! POST /cart/remove              - Drop a line
//! POST /cart/checkout            - Place the order
//!
//! # Auth
//! GET  /login, POST /login       - Login page and action (?from=)
//! GET  /register, POST /register - Register page and action
//! POST /logout                   - Logout action
//!
//! # Account (requires auth)
//! GET  /profile                  - User info, address, order history (?page=)
//! GET  /add-address, POST        - New address form
//! GET  /edit-address, POST       - Edit address form
//!
//! # Admin (requires ADMIN role)
//! GET  /admin                    - Dashboard
//! GET  /admin/categories         - Category list
//! POST /admin/categories/{id}/delete
//! GET  /admin/add-category, POST
//! GET  /admin/edit-category/{id}, POST
//! GET  /admin/products           - Product list (?page=)
//! POST /admin/products/{id}/delete
//! GET  /admin/add-product, POST  - Multipart
//! GET  /admin/edit-product/{id}, POST - Multipart, image optional
//! GET  /admin/orders             - Order items (?status=&page=)
//! GET  /admin/order-details/{id}, POST - Item details and status update
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer};

use crate::state::AppState;

/// `?page=` query shared by paginated pages.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<usize>,
}

impl PageQuery {
    /// Requested page, 1 when absent.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }
}

/// Read a `page` parameter; anything that is not a page number reads as absent.
pub(crate) fn lenient_page<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| raw.trim().parse().ok()))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/product/{id}", get(products::show))
        .route("/categories", get(categories::index))
        .route("/category/{id}", get(categories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile))
        .route(
            "/add-address",
            get(account::add_address).post(account::save_address),
        )
        .route(
            "/edit-address",
            get(account::edit_address).post(account::save_address),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .merge(auth_routes())
        .merge(account_routes())
        .nest("/admin", admin::routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    fn page_of(uri: &'static str) -> usize {
        let uri = Uri::from_static(uri);
        Query::<PageQuery>::try_from_uri(&uri).unwrap().0.page()
    }

    #[test]
    fn test_malformed_page_falls_back_to_first() {
        assert_eq!(page_of("/profile"), 1);
        assert_eq!(page_of("/profile?page="), 1);
        assert_eq!(page_of("/profile?page=abc"), 1);
        assert_eq!(page_of("/profile?page=-1"), 1);
        assert_eq!(page_of("/profile?page=3"), 3);
    }
}
