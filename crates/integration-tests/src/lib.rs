//! Integration tests for the Bazar Pepe storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazar-pepe-integration-tests
//! ```
//!
//! Nothing external is needed: each test starts a `wiremock` server standing
//! in for the Bazar Pepe API and a storefront bound to an ephemeral port.
//!
//! # Test Categories
//!
//! - `api_client` - `BazarClient` against a mocked API
//! - `storefront_flows` - guards, login, logout and checkout through HTTP

#![allow(clippy::missing_panics_doc)]

use bazar_pepe_storefront::{app, config::StorefrontConfig, state::AppState};
use reqwest::{Client, redirect::Policy};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A running storefront wired to a mock API.
pub struct TestApp {
    /// Base URL of the storefront, e.g. `http://127.0.0.1:49152`.
    pub address: String,
    /// Mock Bazar Pepe API.
    pub api: MockServer,
    /// Cookie-keeping client that does not follow redirects.
    pub client: Client,
}

impl TestApp {
    /// Start a mock API and a storefront pointed at it.
    pub async fn spawn() -> Self {
        let api = MockServer::start().await;
        let api_url = Url::parse(&api.uri()).expect("mock server URI is a URL");

        let state = AppState::new(StorefrontConfig::local(api_url)).expect("state builds");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let address = format!(
            "http://{}",
            listener.local_addr().expect("listener has an address")
        );

        tokio::spawn(async move {
            axum::serve(listener, app(state))
                .await
                .expect("storefront server failed");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            api,
            client,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// GET a storefront page.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a form to the storefront.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Mock a successful login returning `token` and `role`.
    pub async fn mock_login(&self, token: &str, role: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "message": "success",
                "token": token,
                "role": role,
                "expirationTime": "6 months",
            })))
            .mount(&self.api)
            .await;
    }

    /// Mock the product lookup used by "add to cart".
    pub async fn mock_product(&self, product: Value) {
        let id = product["id"].as_i64().expect("product has an id");
        Mock::given(method("GET"))
            .and(path(format!("/product/get-by-product-id/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "product": product,
            })))
            .mount(&self.api)
            .await;
    }

    /// Log in through the storefront's login form.
    pub async fn login(&self, token: &str, role: &str) -> reqwest::Response {
        self.mock_login(token, role).await;
        self.post_form(
            "/login",
            &[("email", "pepe@bazar.es"), ("password", "secret")],
        )
        .await
    }
}

/// A product as the API returns it.
#[must_use]
pub fn product_json(id: i64, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "price": price,
        "category": {"id": 1, "name": "Cocina"},
    })
}
