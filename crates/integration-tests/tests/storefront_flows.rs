//! End-to-end flows through a running storefront and a mocked API.
//!
//! Run with: cargo test -p bazar-pepe-integration-tests --test storefront_flows

#![allow(clippy::unwrap_used)]

use bazar_pepe_integration_tests::{TestApp, product_json};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn refresh(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("refresh")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_admin_redirects_anonymous_visitor_to_login() {
    let app = TestApp::spawn().await;

    let response = app.get("/admin/products?page=2").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?from=%2Fadmin%2Fproducts%3Fpage%3D2");
}

#[tokio::test]
async fn test_profile_redirects_anonymous_visitor_to_login() {
    let app = TestApp::spawn().await;

    let response = app.get("/profile").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?from=%2Fprofile");
}

#[tokio::test]
async fn test_admin_requires_admin_role() {
    let app = TestApp::spawn().await;

    let login = app.login("user-token", "USER").await;
    assert_eq!(login.status(), StatusCode::OK);

    let response = app.get("/admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?from=%2Fadmin");
}

#[tokio::test]
async fn test_admin_dashboard_renders_for_admin() {
    let app = TestApp::spawn().await;

    app.login("admin-token", "ADMIN").await;
    let response = app.get("/admin").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Bienvenido Admin"));
}

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let app = TestApp::spawn().await;
    app.mock_login("admin-token", "ADMIN").await;

    let response = app
        .post_form(
            "/login",
            &[
                ("email", "pepe@bazar.es"),
                ("password", "secret"),
                ("from", "/admin/orders"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(refresh(&response), "4; url=/admin/orders");
    assert!(response.text().await.unwrap().contains("Se ha iniciado sesión con éxito"));
}

#[tokio::test]
async fn test_login_ignores_foreign_return_path() {
    let app = TestApp::spawn().await;
    app.mock_login("user-token", "USER").await;

    let response = app
        .post_form(
            "/login",
            &[
                ("email", "pepe@bazar.es"),
                ("password", "secret"),
                ("from", "//evil.example"),
            ],
        )
        .await;

    assert_eq!(refresh(&response), "4; url=/profile");
}

#[tokio::test]
async fn test_failed_login_shows_server_message() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"status": 400, "message": "Password Does Not Match"})),
        )
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/login", &[("email", "pepe@bazar.es"), ("password", "bad")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("refresh").is_none());
    assert!(response.text().await.unwrap().contains("Password Does Not Match"));
}

#[tokio::test]
async fn test_logout_forgets_login_and_keeps_cart() {
    let app = TestApp::spawn().await;
    app.mock_product(product_json(1, "Taza", 3.5)).await;

    app.login("user-token", "USER").await;
    app.post_form("/cart/add", &[("product_id", "1")]).await;

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(refresh(&response), "1; url=/login");

    let profile = app.get("/profile").await;
    assert_eq!(profile.status(), StatusCode::SEE_OTHER);

    let cart = app.get("/cart").await.text().await.unwrap();
    assert!(cart.contains("Taza"));
}

#[tokio::test]
async fn test_cart_add_and_decrement() {
    let app = TestApp::spawn().await;
    app.mock_product(product_json(2, "Jarra", 12.0)).await;

    let added = app
        .post_form("/cart/add", &[("product_id", "2"), ("return_to", "/?page=1")])
        .await;
    assert_eq!(added.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&added), "/?page=1");

    let cart = app.get("/cart").await.text().await.unwrap();
    assert!(cart.contains("Jarra"));
    assert!(cart.contains("€12.00"));

    let decremented = app.post_form("/cart/decrement", &[("product_id", "2")]).await;
    assert_eq!(location(&decremented), "/cart");

    let cart = app.get("/cart").await.text().await.unwrap();
    assert!(!cart.contains("Jarra"));
}

#[tokio::test]
async fn test_cart_ignores_foreign_return_to() {
    let app = TestApp::spawn().await;
    app.mock_product(product_json(3, "Plato", 6.0)).await;

    let response = app
        .post_form(
            "/cart/add",
            &[("product_id", "3"), ("return_to", "https://evil.example/")],
        )
        .await;

    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_anonymous_checkout_sends_to_login_without_ordering() {
    let app = TestApp::spawn().await;
    app.mock_product(product_json(1, "Taza", 3.5)).await;
    Mock::given(method("POST"))
        .and(path("/order/create"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.api)
        .await;

    app.post_form("/cart/add", &[("product_id", "1")]).await;
    let response = app.post_form("/cart/checkout", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(refresh(&response), "3; url=/login");
    let body = response.text().await.unwrap();
    assert!(body.contains("Tienes que hacer login antes de hacer el pedido"));
    assert!(body.contains("Taza"));
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let app = TestApp::spawn().await;
    app.mock_product(product_json(1, "Taza", 3.5)).await;
    Mock::given(method("POST"))
        .and(path("/order/create"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "Order was successfully placed",
        })))
        .expect(1)
        .mount(&app.api)
        .await;

    app.login("user-token", "USER").await;
    app.post_form("/cart/add", &[("product_id", "1")]).await;
    app.post_form("/cart/increment", &[("product_id", "1")]).await;

    let response = app.post_form("/cart/checkout", &[]).await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Order was successfully placed"));
    assert!(!body.contains("Taza"));

    let cart = app.get("/cart").await.text().await.unwrap();
    assert!(!cart.contains("Taza"));
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let app = TestApp::spawn().await;
    app.mock_product(product_json(1, "Taza", 3.5)).await;
    Mock::given(method("POST"))
        .and(path("/order/create"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.api)
        .await;

    app.login("user-token", "USER").await;
    app.post_form("/cart/add", &[("product_id", "1")]).await;

    let body = app.post_form("/cart/checkout", &[]).await.text().await.unwrap();
    assert!(body.contains("Request failed with status code 500"));
    assert!(body.contains("Taza"));
}

#[tokio::test]
async fn test_checkout_error_shows_server_message() {
    let app = TestApp::spawn().await;
    app.mock_product(product_json(1, "Taza", 3.5)).await;
    Mock::given(method("POST"))
        .and(path("/order/create"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Producto agotado"})),
        )
        .mount(&app.api)
        .await;

    app.login("user-token", "USER").await;
    app.post_form("/cart/add", &[("product_id", "1")]).await;

    let body = app.post_form("/cart/checkout", &[]).await.text().await.unwrap();
    assert!(body.contains("Producto agotado"));
    assert!(!body.contains("Se ha producido un error con el pedido"));
    assert!(body.contains("Taza"));
}

#[tokio::test]
async fn test_status_update_error_shows_server_message() {
    let app = TestApp::spawn().await;
    Mock::given(method("PUT"))
        .and(path("/order/update-item-status/11"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "No se puede devolver un pedido pendiente"})),
        )
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/order/filter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "orderItemList": [
                {"id": 11, "quantity": 1, "price": 5.0, "status": "PENDING"}
            ],
            "totalPage": 1,
            "totalElement": 1,
        })))
        .mount(&app.api)
        .await;

    app.login("admin-token", "ADMIN").await;
    let body = app
        .post_form("/admin/order-details/11", &[("status", "RETURNED")])
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("No se puede devolver un pedido pendiente"));
    assert!(!body.contains("No ha sido posible actualizar el estado"));
}

#[tokio::test]
async fn test_empty_search_shows_no_match_message() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/product/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "productList": [],
        })))
        .mount(&app.api)
        .await;

    let body = app.get("/?search=zzz").await.text().await.unwrap();

    assert!(body.contains("No existen productos que coincidan con la busqueda"));
}

#[tokio::test]
async fn test_home_paginates_four_per_page() {
    let app = TestApp::spawn().await;
    let products: Vec<_> = (1..=5)
        .map(|id| product_json(id, &format!("Producto {id}"), 1.0))
        .collect();
    Mock::given(method("GET"))
        .and(path("/product/get-all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "productList": products,
        })))
        .mount(&app.api)
        .await;

    let first = app.get("/").await.text().await.unwrap();
    assert!(first.contains("Producto 4"));
    assert!(!first.contains("Producto 5"));

    let second = app.get("/?page=2").await.text().await.unwrap();
    assert!(second.contains("Producto 5"));
    assert!(!second.contains("Producto 1 description"));
}

#[tokio::test]
async fn test_malformed_page_shows_first_page() {
    let app = TestApp::spawn().await;
    let products: Vec<_> = (1..=5)
        .map(|id| product_json(id, &format!("Producto {id}"), 1.0))
        .collect();
    Mock::given(method("GET"))
        .and(path("/product/get-all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "productList": products,
        })))
        .mount(&app.api)
        .await;

    let response = app.get("/?page=abc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Producto 1"));
    assert!(!body.contains("Producto 5"));
}
