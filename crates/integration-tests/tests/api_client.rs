//! Integration tests for `BazarClient` against a mocked Bazar Pepe API.
//!
//! Run with: cargo test -p bazar-pepe-integration-tests --test api_client

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use bazar_pepe_core::{Cart, CartAction, OrderItemId, OrderStatus, Price, ProductId};
use bazar_pepe_storefront::bazar::{
    ApiError, BazarClient, LoginRequest, OrderFilter, OrderRequest,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BazarClient {
    BazarClient::with_base_url(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_login_returns_token_and_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "pepe@bazar.es", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "success",
            "token": "jwt-token",
            "role": "ADMIN",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .login(&LoginRequest {
            email: "pepe@bazar.es".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.token.expose_secret(), "jwt-token");
    assert_eq!(response.role, "ADMIN");
}

#[tokio::test]
async fn test_server_error_carries_structured_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"status": 404, "message": "User Not Found"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&LoginRequest {
            email: "nobody@bazar.es".to_string(),
            password: "x".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.server_message(), Some("User Not Found"));
    assert_eq!(err.display_message("fallback"), "User Not Found");
}

#[tokio::test]
async fn test_server_error_without_message_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product/get-all"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).all_products().await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, message: None }));
    assert_eq!(err.to_string(), "Request failed with status code 500");
}

#[tokio::test]
async fn test_search_sends_search_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product/search"))
        .and(query_param("searchValue", "taza azul"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "productList": [{"id": 4, "name": "Taza azul", "price": 3.5}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let products = client(&server).search_products("taza azul").await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products.first().map(|p| p.id), Some(ProductId::new(4)));
}

#[tokio::test]
async fn test_cached_product_hits_api_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product/get-by-product-id/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "product": {"id": 7, "name": "Jarra", "price": 12.0},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let first = api.cached_product(ProductId::new(7)).await.unwrap();
    let second = api.cached_product(ProductId::new(7)).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_create_order_sends_bearer_and_cart_lines() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order/create"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(body_json(json!({
            "totalPrice": "7.00",
            "items": [{"productId": 1, "quantity": 2}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "Order was successfully placed",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cart = Cart::new().reduce(CartAction::Add(bazar_pepe_core::CartLineItem::new(
        ProductId::new(1),
        "Taza",
        Price::from_cents(350),
    )));
    let cart = cart.reduce(CartAction::Increment(ProductId::new(1)));

    let token = SecretString::from("jwt-token");
    let outcome = client(&server)
        .create_order(Some(&token), &OrderRequest::from_cart(&cart))
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert_eq!(outcome.message.as_deref(), Some("Order was successfully placed"));
}

#[tokio::test]
async fn test_filter_orders_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/order/filter"))
        .and(query_param("status", "SHIPPED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "orderItemList": [
                {"id": 11, "quantity": 1, "price": 5.0, "status": "SHIPPED"}
            ],
            "totalPage": 1,
            "totalElement": 1,
        })))
        .mount(&server)
        .await;

    let token = SecretString::from("jwt-token");
    let page = client(&server)
        .filter_orders(Some(&token), OrderFilter::Status(OrderStatus::Shipped))
        .await
        .unwrap();

    assert_eq!(page.total_elements, 1);
    assert_eq!(page.items.first().map(|item| item.id), Some(OrderItemId::new(11)));
}

#[tokio::test]
async fn test_update_order_item_status_uses_query() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/order/update-item-status/11"))
        .and(query_param("status", "DELIVERED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "Order status updated successfully",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = SecretString::from("jwt-token");
    let outcome = client(&server)
        .update_order_item_status(Some(&token), OrderItemId::new(11), OrderStatus::Delivered)
        .await
        .unwrap();

    assert!(outcome.is_ok());
}
