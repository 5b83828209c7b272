//! Visit lifecycle over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use chrono::TimeDelta;
use serde_json::{Value, json};

use shoptrail_integration_tests::TestApp;

fn empty_visit() -> Value {
    json!({"user": "ada@example.com", "shopId": "downtown", "items": [], "total": 0})
}

#[tokio::test]
async fn test_create_and_fetch() {
    let app = TestApp::new();

    let response = app.post("/visits", &empty_visit()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["message"], "Visit saved");
    let id = body["visitId"].as_str().unwrap();

    let response = app.get(&format!("/visits/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "id": id,
            "user": "ada@example.com",
            "shopId": "downtown",
            "enteredAt": "2026-03-14T09:00:00Z",
            "exitedAt": null,
            "items": [],
            "total": 0
        })
    );
}

#[tokio::test]
async fn test_add_product_accumulates_total() {
    let app = TestApp::new();
    let id = app.create_visit(&empty_visit()).await;
    let uri = format!("/visits/{id}/add-product");

    let response = app.post(&uri, &json!({"name": "Apple", "price": 10})).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], "Product added");
    assert_eq!(body["updatedVisit"]["items"], json!([{"name": "Apple", "price": 10}]));
    assert_eq!(body["updatedVisit"]["total"], json!(10));

    let response = app.post(&uri, &json!({"name": "Pear", "price": 5})).await;
    assert_eq!(response.json()["updatedVisit"]["total"], json!(15));
}

#[tokio::test]
async fn test_add_product_with_fractional_price() {
    let app = TestApp::new();
    let id = app.create_visit(&empty_visit()).await;
    let uri = format!("/visits/{id}/add-product");

    app.post(&uri, &json!({"name": "Gum", "price": 0.25})).await;
    let response = app.post(&uri, &json!({"name": "Gum", "price": 0.5})).await;
    assert_eq!(response.json()["updatedVisit"]["total"], json!(0.75));
}

#[tokio::test]
async fn test_add_product_rejects_bad_products() {
    let app = TestApp::new();
    let id = app.create_visit(&empty_visit()).await;
    let uri = format!("/visits/{id}/add-product");

    for body in [
        json!({"price": 3}),
        json!({"name": "", "price": 3}),
        json!({"name": "Pear", "price": "3"}),
        json!({"name": "Pear"}),
        json!({"name": "Pear", "price": -1}),
    ] {
        let response = app.post(&uri, &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
    }

    let visit = app.get(&format!("/visits/{id}")).await.json();
    assert_eq!(visit["items"], json!([]));
}

#[tokio::test]
async fn test_huge_prices_are_rejected_without_breaking_the_visit() {
    let app = TestApp::new();

    let response = app
        .post(
            "/visits",
            &json!({
                "user": "ada@example.com",
                "shopId": "downtown",
                "items": [{"name": "Yacht", "price": 5e28}, {"name": "Yacht", "price": 5e28}]
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let id = app.create_visit(&empty_visit()).await;
    let uri = format!("/visits/{id}/add-product");

    let response = app.post(&uri, &json!({"name": "Yacht", "price": 5e28})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let cap = json!(1_000_000_000_000_000_i64);
    let response = app.post(&uri, &json!({"name": "Gold", "price": cap})).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.post(&uri, &json!({"name": "Gold", "price": cap})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Visit total out of range");

    let response = app.get(&format!("/visits/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let visit = response.json();
    assert_eq!(visit["items"].as_array().unwrap().len(), 1);
    assert_eq!(visit["total"], cap);

    let response = app.get("/visits").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_visit_is_not_found() {
    let app = TestApp::new();
    let missing = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    let response = app.get(&format!("/visits/{missing}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Visit not found");

    let response = app
        .post(
            &format!("/visits/{missing}/add-product"),
            &json!({"name": "Apple", "price": 1}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // 404 wins over an unusable body.
    let response = app
        .post_raw(&format!("/visits/{missing}/add-product"), "{broken")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_visit_id_is_bad_request() {
    let app = TestApp::new();

    assert_eq!(app.get("/visits/12345").await.status, StatusCode::BAD_REQUEST);
    let response = app
        .post("/visits/12345/add-product", &json!({"name": "Apple", "price": 1}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new();

    for body in [
        json!({"shopId": "downtown"}),
        json!({"user": "", "shopId": "downtown"}),
        json!({"user": "a", "shopId": "downtown", "items": [{"name": "Apple", "price": 10}], "total": 3}),
        json!({"user": "a", "shopId": "downtown", "coupon": "FREE"}),
        json!({"user": "a", "shopId": "downtown", "enteredAt": "2026-01-01T10:00:00Z", "exitedAt": "2026-01-01T09:00:00Z"}),
    ] {
        let response = app.post("/visits", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn test_list_most_recent_first() {
    let app = TestApp::new();
    let mut ids = Vec::new();
    for hour in ["08", "11", "10"] {
        let id = app
            .create_visit(&json!({
                "user": "a@b.c",
                "shopId": "mall",
                "enteredAt": format!("2026-03-14T{hour}:00:00Z"),
            }))
            .await;
        ids.push(id);
    }

    let response = app.get("/visits").await;
    assert_eq!(response.status, StatusCode::OK);
    let listed: Vec<String> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(listed, vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);
}

#[tokio::test]
async fn test_exit_visit() {
    let app = TestApp::new();
    let id = app.create_visit(&empty_visit()).await;
    let uri = format!("/visits/{id}/exit");

    app.clock.advance(TimeDelta::minutes(12));
    let response = app.send(Method::POST, &uri, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], "Visit exited");
    assert_eq!(body["updatedVisit"]["exitedAt"], "2026-03-14T09:12:00Z");
    assert_eq!(body["updatedVisit"]["enteredAt"], "2026-03-14T09:00:00Z");

    let response = app.send(Method::POST, &uri, None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_exit_before_entry_is_rejected() {
    let app = TestApp::new();
    let id = app.create_visit(&empty_visit()).await;

    let response = app
        .post(
            &format!("/visits/{id}/exit"),
            &json!({"exitedAt": "2026-03-14T08:59:59Z"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
