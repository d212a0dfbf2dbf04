use axum::http::{StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use akeshya_auth_types::identity::UNAUTHENTICATED_MESSAGE;
use akeshya_store::infra::email::{LogEmailSender, Mailer};
use akeshya_store::infra::storage::LocalFileStorage;
use akeshya_store::router::build_router;
use akeshya_store::state::AppState;
use akeshya_testing::auth::MockAuth;

use crate::helpers::TEST_JWT_SECRET;

/// Router over a disconnected database. Only requests rejected before any
/// query is made can be exercised.
async fn server() -> TestServer {
    let dir = std::env::temp_dir().join(format!("akeshya-router-{}", uuid::Uuid::new_v4()));
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        jwt_ttl_secs: 3600,
        storage: LocalFileStorage::init(dir).await.unwrap(),
        mailer: Mailer::Log(LogEmailSender),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn field_names(body: &Value) -> Vec<String> {
    body["validationErrors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_liveness_and_unready_database() {
    let server = server().await;

    assert_eq!(server.get("/healthz").await.status_code(), StatusCode::OK);
    assert_eq!(
        server.get("/readyz").await.status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_missing_token_with_structured_body() {
    let server = server().await;

    let response = server.get("/api/customer/profile").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], UNAUTHENTICATED_MESSAGE);
    assert_eq!(body["path"], "/api/customer/profile");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["errorCode"], "AUTHENTICATION_FAILED");
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let server = server().await;

    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, MockAuth::customer().bearer("another-secret"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_admin_routes_to_customers() {
    let server = server().await;

    let response = server
        .get("/api/orders/statistics")
        .add_header(AUTHORIZATION, MockAuth::customer().bearer(TEST_JWT_SECRET))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["errorCode"], "ACCESS_DENIED");
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_every_invalid_signup_field() {
    let server = server().await;

    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "contactNumber": "12345",
            "password": "abc",
            "email": "not-an-email",
            "companyName": "Sri Gems",
            "branchName": "",
            "shippingAddress": "Hyderabad"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errorCode"], "VALIDATION_ERROR");
    assert_eq!(
        field_names(&body),
        vec!["branchName", "contactNumber", "email", "password"]
    );
}

#[tokio::test]
async fn should_reject_malformed_json() {
    let server = server().await;

    let response = server
        .post("/api/auth/signin")
        .content_type("application/json")
        .text("{\"email\": ")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_order_without_items_or_with_bad_quantity() {
    let server = server().await;
    let auth = MockAuth::customer();

    let empty = server
        .post("/api/orders")
        .add_header(AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
        .json(&json!({ "items": [] }))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&empty.json()), vec!["items"]);

    let zero = server
        .post("/api/orders")
        .add_header(AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
        .json(&json!({ "items": [{ "productId": 1, "quantity": 0, "unitPrice": 10.0 }] }))
        .await;
    assert_eq!(zero.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(field_names(&zero.json()), vec!["items[0].quantity"]);
}

#[tokio::test]
async fn should_reject_unknown_customer_status() {
    let server = server().await;
    let id = uuid::Uuid::new_v4();

    let response = server
        .put(&format!("/api/admin/customers/{id}/status/BANNED"))
        .add_header(AUTHORIZATION, MockAuth::admin().bearer(TEST_JWT_SECRET))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_non_positive_category_id() {
    let server = server().await;

    let response = server.get("/api/products/category/0/products").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(field_names(&body), vec!["categoryId"]);
    assert_eq!(body["validationErrors"][0]["rejectedValue"], 0);
}
