//! HTTP implementation of the Bazar Pepe API client.
//!
//! Uses `reqwest` 0.13 for HTTP. Caches product lookups using `moka`
//! (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument, warn};
use url::Url;

use bazar_pepe_core::{CategoryId, OrderItemId, OrderStatus, ProductId};

use super::types::{
    Address, ApiEnvelope, ApiMessage, Category, CategoryRequest, LoginRequest, LoginResponse,
    OrderFilter, OrderItemPage, OrderRequest, Product, ProductForm, RegisterRequest, User,
};
use super::{ApiError, parse_server_message};
use crate::config::StorefrontConfig;

const PRODUCT_CACHE_CAPACITY: u64 = 1000;
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Longest body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// BazarClient
// =============================================================================

/// Client for the Bazar Pepe REST API.
///
/// Cheap to clone. Product lookups made through
/// [`cached_product`](Self::cached_product) are cached for 5 minutes.
#[derive(Clone)]
pub struct BazarClient {
    inner: Arc<BazarClientInner>,
}

struct BazarClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl BazarClient {
    /// Create a client for the API configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry paths or the HTTP client
    /// cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config.api_base_url.clone(), config.api_timeout)
    }

    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry paths or the HTTP client
    /// cannot be built.
    pub fn with_base_url(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BazarClientInner {
                client,
                base_url,
                products,
            }),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the URL for an endpoint below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // Checked in the constructor: the base URL always has a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Attach the bearer and JSON content-type headers.
    ///
    /// A missing token is sent as the literal `null`, as the API expects.
    fn authorized(
        request: reqwest::RequestBuilder,
        token: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, bearer(token))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send a request and parse the response envelope.
    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiEnvelope, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(operation, error = %e, "Bazar API request failed");
            ApiError::Http(e)
        })?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = parse_server_message(&body);
            warn!(
                operation,
                status = %status,
                message = ?message,
                "Bazar API returned non-success status"
            );
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            debug!(operation, status = %status, "Bazar API returned empty body");
            return Ok(ApiEnvelope {
                status: status.as_u16(),
                ..ApiEnvelope::default()
            });
        }

        let mut envelope: ApiEnvelope = serde_json::from_str(&body).map_err(|e| {
            error!(
                operation,
                error = %e,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse Bazar API response"
            );
            ApiError::Parse(e)
        })?;

        if envelope.status == 0 {
            envelope.status = status.as_u16();
        }

        debug!(operation, status = envelope.status, "Bazar API call succeeded");
        Ok(envelope)
    }

    // =========================================================================
    // Auth & Users
    // =========================================================================

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &RegisterRequest) -> Result<ApiMessage, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["auth", "register"]))
            .json(registration);

        self.send("register", request).await.map(into_message)
    }

    /// Log in and obtain a bearer token and role.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response carries no
    /// token.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["auth", "login"]))
            .json(credentials);

        let envelope = self.send("login", request).await?;
        let token = envelope
            .token
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingField("token"))?;

        Ok(LoginResponse {
            status: envelope.status,
            message: envelope.message,
            token: SecretString::from(token),
            role: envelope.role.unwrap_or_default(),
        })
    }

    /// Fetch the logged-in user, including address and order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or no user is returned.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: Option<&SecretString>) -> Result<User, ApiError> {
        let request = Self::authorized(
            self.inner.client.get(self.endpoint(&["user", "my-info"])),
            token,
        );

        self.send("current_user", request)
            .await?
            .user
            .ok_or(ApiError::MissingField("user"))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.inner.client.get(self.endpoint(&["product", "get-all"]));
        Ok(self.send("all_products", request).await?.product_list.unwrap_or_default())
    }

    /// Search products by a free-text value.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, search_value: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint(&["product", "search"]);
        url.query_pairs_mut().append_pair("searchValue", search_value);

        let request = self.inner.client.get(url);
        Ok(self.send("search_products", request).await?.product_list.unwrap_or_default())
    }

    /// List the products of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        let id = category_id.to_string();
        let request = self
            .inner
            .client
            .get(self.endpoint(&["product", "get-by-category-id", &id]));

        Ok(self
            .send("products_by_category", request)
            .await?
            .product_list
            .unwrap_or_default())
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or no product is returned.
    #[instrument(skip(self))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let id = product_id.to_string();
        let request = self
            .inner
            .client
            .get(self.endpoint(&["product", "get-by-product-id", &id]));

        self.send("product", request)
            .await?
            .product
            .ok_or(ApiError::MissingField("product"))
    }

    /// Fetch one product through the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not cached and the API request
    /// fails.
    #[instrument(skip(self))]
    pub async fn cached_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(&product_id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product = self.product(product_id).await?;

        self.inner
            .products
            .insert(product_id, product.clone())
            .await;

        Ok(product)
    }

    /// Drop a product from the lookup cache.
    pub async fn invalidate_product(&self, product_id: ProductId) {
        self.inner.products.invalidate(&product_id).await;
    }

    /// Create a product from multipart form data.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, form), fields(name = %form.name))]
    pub async fn create_product(
        &self,
        token: Option<&SecretString>,
        form: ProductForm,
    ) -> Result<ApiMessage, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["product", "create"]))
            .header(AUTHORIZATION, bearer(token))
            .multipart(product_multipart(form)?);

        self.send("create_product", request).await.map(into_message)
    }

    /// Update a product; the image is replaced only when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, form), fields(name = %form.name))]
    pub async fn update_product(
        &self,
        token: Option<&SecretString>,
        product_id: ProductId,
        form: ProductForm,
    ) -> Result<ApiMessage, ApiError> {
        let id = product_id.to_string();
        let request = self
            .inner
            .client
            .put(self.endpoint(&["product", "update", &id]))
            .header(AUTHORIZATION, bearer(token))
            .multipart(product_multipart(form)?);

        let result = self.send("update_product", request).await.map(into_message);
        self.invalidate_product(product_id).await;
        result
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_product(
        &self,
        token: Option<&SecretString>,
        product_id: ProductId,
    ) -> Result<ApiMessage, ApiError> {
        let id = product_id.to_string();
        let request = Self::authorized(
            self.inner.client.delete(self.endpoint(&["product", "delete", &id])),
            token,
        );

        let result = self.send("delete_product", request).await.map(into_message);
        self.invalidate_product(product_id).await;
        result
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn create_category(
        &self,
        token: Option<&SecretString>,
        category: &CategoryRequest,
    ) -> Result<ApiMessage, ApiError> {
        let request = Self::authorized(
            self.inner.client.post(self.endpoint(&["category", "create"])),
            token,
        )
        .json(category);

        self.send("create_category", request).await.map(into_message)
    }

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.inner.client.get(self.endpoint(&["category", "get-all"]));
        Ok(self.send("categories", request).await?.category_list.unwrap_or_default())
    }

    /// Fetch one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or no category is returned.
    #[instrument(skip(self))]
    pub async fn category(&self, category_id: CategoryId) -> Result<Category, ApiError> {
        let id = category_id.to_string();
        let request = self
            .inner
            .client
            .get(self.endpoint(&["category", "get-category-by-id", &id]));

        self.send("category", request)
            .await?
            .category
            .ok_or(ApiError::MissingField("category"))
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_category(
        &self,
        token: Option<&SecretString>,
        category_id: CategoryId,
        category: &CategoryRequest,
    ) -> Result<ApiMessage, ApiError> {
        let id = category_id.to_string();
        let request = Self::authorized(
            self.inner.client.put(self.endpoint(&["category", "update", &id])),
            token,
        )
        .json(category);

        self.send("update_category", request).await.map(into_message)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_category(
        &self,
        token: Option<&SecretString>,
        category_id: CategoryId,
    ) -> Result<ApiMessage, ApiError> {
        let id = category_id.to_string();
        let request = Self::authorized(
            self.inner.client.delete(self.endpoint(&["category", "delete", &id])),
            token,
        );

        self.send("delete_category", request).await.map(into_message)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, order), fields(lines = order.items.len()))]
    pub async fn create_order(
        &self,
        token: Option<&SecretString>,
        order: &OrderRequest,
    ) -> Result<ApiMessage, ApiError> {
        let request = Self::authorized(
            self.inner.client.post(self.endpoint(&["order", "create"])),
            token,
        )
        .json(order);

        self.send("create_order", request).await.map(into_message)
    }

    /// List order items, optionally narrowed to one item or one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn filter_orders(
        &self,
        token: Option<&SecretString>,
        filter: OrderFilter,
    ) -> Result<OrderItemPage, ApiError> {
        let mut url = self.endpoint(&["order", "filter"]);
        match filter {
            OrderFilter::All => {}
            OrderFilter::ItemId(id) => {
                url.query_pairs_mut().append_pair("itemId", &id.to_string());
            }
            OrderFilter::Status(status) => {
                url.query_pairs_mut().append_pair("status", status.as_str());
            }
        }

        let request = Self::authorized(self.inner.client.get(url), token);
        let envelope = self.send("filter_orders", request).await?;

        Ok(OrderItemPage {
            items: envelope.order_item_list.unwrap_or_default(),
            total_pages: envelope.total_page.unwrap_or_default(),
            total_elements: envelope.total_element.unwrap_or_default(),
        })
    }

    /// Move an order item to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_order_item_status(
        &self,
        token: Option<&SecretString>,
        item_id: OrderItemId,
        status: OrderStatus,
    ) -> Result<ApiMessage, ApiError> {
        let id = item_id.to_string();
        let mut url = self.endpoint(&["order", "update-item-status", &id]);
        url.query_pairs_mut().append_pair("status", status.as_str());

        let request = Self::authorized(self.inner.client.put(url), token).body("{}");

        self.send("update_order_item_status", request)
            .await
            .map(into_message)
    }

    // =========================================================================
    // Address
    // =========================================================================

    /// Create or replace the logged-in user's address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, address))]
    pub async fn save_address(
        &self,
        token: Option<&SecretString>,
        address: &Address,
    ) -> Result<ApiMessage, ApiError> {
        let request = Self::authorized(
            self.inner.client.post(self.endpoint(&["address", "save"])),
            token,
        )
        .json(address);

        self.send("save_address", request).await.map(into_message)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// `Authorization` header value for an optional token.
fn bearer(token: Option<&SecretString>) -> String {
    format!(
        "Bearer {}",
        token.map_or("null", |token| token.expose_secret())
    )
}

fn into_message(envelope: ApiEnvelope) -> ApiMessage {
    ApiMessage {
        status: envelope.status,
        message: envelope.message,
    }
}

/// Multipart body for product create and update.
fn product_multipart(form: ProductForm) -> Result<Form, ApiError> {
    let mut multipart = Form::new()
        .text("categoryId", form.category_id.to_string())
        .text("name", form.name)
        .text("description", form.description)
        .text("price", form.price);

    if let Some(image) = form.image {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        multipart = multipart.part("image", part);
    }

    Ok(multipart)
}
