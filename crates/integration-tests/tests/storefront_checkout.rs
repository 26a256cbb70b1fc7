//! Placing orders from the session cart.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use liahna_integration_tests::TestClient;
use serde_json::{Value, json};

fn checkout_body(coupon: Option<&str>) -> Value {
    json!({
        "customer": {
            "name": "Ana Souza",
            "email": "ana@example.com",
            "phone": "(11) 98765-4321"
        },
        "address": {
            "postalCode": "01310-100",
            "street": "Av. Paulista",
            "number": "1000",
            "district": "Bela Vista",
            "city": "São Paulo",
            "state": "SP"
        },
        "paymentMethod": "pix",
        "coupon": coupon
    })
}

#[tokio::test]
async fn test_place_order_empties_cart() {
    let mut client = TestClient::storefront();
    client
        .post(
            "/api/cart/items",
            json!({ "productId": "prd-brinco-aurora", "quantity": 2 }),
        )
        .await;

    let res = client.post("/api/checkout", checkout_body(Some("LIAHNA10"))).await;
    assert_eq!(res.status, StatusCode::CREATED);

    let order = res.body;
    assert!(order["id"].as_str().unwrap().starts_with("LIA-"));
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["totals"]["total"], "72.00");
    assert_eq!(order["coupon"], "LIAHNA10");
    assert_eq!(order["finalTotal"], "64.80");
    assert_eq!(order["paymentMethod"], "pix");

    let res = client.get("/api/cart/count").await;
    assert_eq!(res.body["count"], 0);

    let res = client.get("/api/orders/last").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], order["id"]);
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let mut client = TestClient::storefront();
    let res = client.post("/api/checkout", checkout_body(None)).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"].as_str().unwrap().contains("vazio"));
}

#[tokio::test]
async fn test_checkout_reports_every_invalid_field() {
    let mut client = TestClient::storefront();
    client
        .post("/api/cart/items", json!({ "productId": "prd-colar-mare" }))
        .await;

    let res = client
        .post(
            "/api/checkout",
            json!({
                "customer": { "name": "", "email": "sem-arroba", "phone": "123" },
                "address": { "postalCode": "123" },
                "paymentMethod": "boleto"
            }),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = res.body["fields"].as_object().unwrap();
    for field in [
        "name",
        "email",
        "phone",
        "postalCode",
        "street",
        "number",
        "district",
        "city",
        "state",
        "paymentMethod",
    ] {
        assert!(fields.contains_key(field), "missing message for {field}");
    }

    // A rejected checkout leaves the cart alone
    let res = client.get("/api/cart/count").await;
    assert_eq!(res.body["count"], 1);
}

#[tokio::test]
async fn test_no_last_order_for_new_visitor() {
    let mut client = TestClient::storefront();
    let res = client.get("/api/orders/last").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
