//! Session cart flows through the storefront API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use liahna_integration_tests::TestClient;
use serde_json::json;

const AURORA: &str = "prd-brinco-aurora";
const BRISA: &str = "prd-brinco-brisa-delicada";

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let mut client = TestClient::storefront();
    let res = client.get("/api/cart").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["items"], json!([]));
    assert_eq!(res.body["itemCount"], 0);
    assert_eq!(res.body["totals"]["total"], "0.00");

    let res = client.get("/api/cart/count").await;
    assert_eq!(res.body["count"], 0);
}

#[tokio::test]
async fn test_add_snapshots_promo_price() {
    let mut client = TestClient::storefront();
    let res = client
        .post("/api/cart/items", json!({ "productId": AURORA, "quantity": 2 }))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(client.has_session());

    let line = &res.body["items"][0];
    assert_eq!(line["id"], AURORA);
    assert_eq!(line["price"], "36.00");
    assert_eq!(line["originalPrice"], "42.00");
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["image"], "/products/brinco-aurora-1.jpg");

    assert_eq!(res.body["totals"]["subtotal"], "84.00");
    assert_eq!(res.body["totals"]["discount"], "12.00");
    assert_eq!(res.body["totals"]["total"], "72.00");
}

#[tokio::test]
async fn test_cart_survives_between_requests() {
    let mut client = TestClient::storefront();
    client
        .post("/api/cart/items", json!({ "productId": AURORA }))
        .await;
    client
        .post("/api/cart/items", json!({ "productId": BRISA, "quantity": 3 }))
        .await;

    let res = client.get("/api/cart").await;
    assert_eq!(res.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["itemCount"], 4);

    let res = client.get("/api/cart/count").await;
    assert_eq!(res.body["count"], 4);
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let mut client = TestClient::storefront();
    client
        .post("/api/cart/items", json!({ "productId": AURORA }))
        .await;

    client.forget_session();
    let res = client.get("/api/cart").await;
    assert_eq!(res.body["itemCount"], 0);
}

#[tokio::test]
async fn test_adding_again_merges_lines() {
    let mut client = TestClient::storefront();
    client
        .post("/api/cart/items", json!({ "productId": AURORA }))
        .await;
    let res = client
        .post("/api/cart/items", json!({ "productId": AURORA, "quantity": 2 }))
        .await;

    let items = res.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
}

#[tokio::test]
async fn test_chosen_gallery_image_is_kept() {
    let mut client = TestClient::storefront();
    let res = client
        .post(
            "/api/cart/items",
            json!({ "productId": AURORA, "image": "/brand/mood-collection.png" }),
        )
        .await;
    assert_eq!(res.body["items"][0]["image"], "/brand/mood-collection.png");
}

#[tokio::test]
async fn test_add_rejects_bad_quantity() {
    let mut client = TestClient::storefront();
    let res = client
        .post("/api/cart/items", json!({ "productId": AURORA, "quantity": 0 }))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"].as_str().unwrap().contains("Quantidade inválida"));
}

#[tokio::test]
async fn test_add_unknown_product_is_404() {
    let mut client = TestClient::storefront();
    let res = client
        .post("/api/cart/items", json!({ "productId": "prd-nao-existe" }))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_quantity_and_remove_at_zero() {
    let mut client = TestClient::storefront();
    client
        .post("/api/cart/items", json!({ "productId": AURORA }))
        .await;
    client
        .post("/api/cart/items", json!({ "productId": BRISA }))
        .await;

    let res = client
        .patch(&format!("/api/cart/items/{BRISA}"), json!({ "quantity": 4 }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["itemCount"], 5);

    let res = client
        .patch(&format!("/api/cart/items/{AURORA}"), json!({ "quantity": 0 }))
        .await;
    let items = res.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], BRISA);
}

#[tokio::test]
async fn test_remove_and_clear() {
    let mut client = TestClient::storefront();
    client
        .post("/api/cart/items", json!({ "productId": AURORA }))
        .await;
    client
        .post("/api/cart/items", json!({ "productId": BRISA }))
        .await;

    let res = client.delete(&format!("/api/cart/items/{AURORA}")).await;
    assert_eq!(res.body["items"].as_array().unwrap().len(), 1);

    // Removing a line that is not there leaves the cart alone
    let res = client.delete(&format!("/api/cart/items/{AURORA}")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["items"].as_array().unwrap().len(), 1);

    let res = client.delete("/api/cart").await;
    assert_eq!(res.body["items"], json!([]));
}

#[tokio::test]
async fn test_coupon_in_summary() {
    let mut client = TestClient::storefront();
    client
        .post("/api/cart/items", json!({ "productId": AURORA, "quantity": 2 }))
        .await;

    let res = client.get("/api/cart?coupon=liahna10").await;
    let summary = &res.body["summary"];
    assert_eq!(summary["coupon"], "LIAHNA10");
    assert_eq!(summary["couponDiscount"], "7.20");
    assert_eq!(summary["finalTotal"], "64.80");

    let res = client.get("/api/cart?coupon=OUTRO").await;
    assert_eq!(res.body["summary"]["coupon"], json!(null));
    assert_eq!(res.body["summary"]["finalTotal"], "72.00");
}

#[tokio::test]
async fn test_free_shipping_progress() {
    let mut client = TestClient::storefront();
    let res = client
        .post("/api/cart/items", json!({ "productId": AURORA, "quantity": 2 }))
        .await;
    assert_eq!(res.body["summary"]["freeShippingRemaining"], "108.00");
    assert_eq!(res.body["summary"]["freeShippingProgress"], 40);

    let res = client
        .post("/api/cart/items", json!({ "productId": AURORA, "quantity": 3 }))
        .await;
    assert_eq!(res.body["summary"]["finalTotal"], "180.00");
    assert_eq!(res.body["summary"]["freeShippingRemaining"], "0.00");
    assert_eq!(res.body["summary"]["freeShippingProgress"], 100);
}
