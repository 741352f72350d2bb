//! REST router exercised through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use freight_quote::api::rest::{ORGANIZATION_HEADER, SUBJECT_HEADER, create_router};
use freight_quote::bootstrap::{self, Stores};
use freight_quote::config::AppConfig;
use freight_quote::domain::value_objects::Role;
use freight_quote::infrastructure::notifications::InMemoryOutbox;
use freight_quote::infrastructure::persistence::in_memory::InMemoryAccountDirectory;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct Api {
    router: Router,
    outbox: InMemoryOutbox,
}

fn api() -> Api {
    let config = AppConfig::default();
    let accounts = Arc::new(InMemoryAccountDirectory::new().with_role("admin-1", Role::Admin));
    let stores = Stores::in_memory_with_accounts(accounts);
    let registry = bootstrap::provider_registry(&config, Arc::clone(&stores.contracts));
    let outbox = InMemoryOutbox::new();
    let state = bootstrap::app_state(&config, stores, registry, Arc::new(outbox.clone()));
    Api {
        router: create_router(state),
        outbox,
    }
}

impl Api {
    async fn call(&self, method: Method, uri: &str, subject: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.call_with_org(method, uri, subject, None, body).await
    }

    async fn call_with_org(
        &self,
        method: Method,
        uri: &str,
        subject: Option<&str>,
        organization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(subject) = subject {
            request = request.header(SUBJECT_HEADER, subject);
        }
        if let Some(org) = organization {
            request = request.header(ORGANIZATION_HEADER, org);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn quote(&self, subject: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/quotes",
                Some(subject),
                Some(json!({
                    "origin": "Shanghai",
                    "destination": "Los Angeles",
                    "weight": "1800",
                    "serviceType": "sea",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    async fn book(&self, subject: &str) -> String {
        let quote = self.quote(subject).await;
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/bookings",
                Some(subject),
                Some(json!({
                    "quoteId": quote["quoteId"],
                    "carrierId": quote["rates"][0]["carrierId"],
                    "customer": { "name": "Lin", "email": "lin@example.com" },
                    "pickup": { "address": "Pudong", "date": "2026-11-01" },
                    "delivery": { "address": "Long Beach" },
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["bookingId"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_and_location_lookup() {
    let api = api();
    let (status, body) = api.call(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, a) = api
        .call(Method::GET, "/api/v1/locations/resolve?q=Shanghai%2C%20China", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, b) = api
        .call(Method::GET, "/api/v1/locations/resolve?q=shanghai", None, None)
        .await;
    assert_eq!(a["code"], b["code"]);

    let (status, body) = api
        .call(Method::GET, "/api/v1/locations/resolve?q=Atlantis", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn quote_is_created_and_readable() {
    let api = api();
    let quote = api.quote("user-1").await;
    let id = quote["quoteId"].as_str().unwrap();
    assert!(id.starts_with("QT-"));
    assert_eq!(quote["status"], "success");
    assert!(!quote["rates"].as_array().unwrap().is_empty());

    let (status, fetched) = api
        .call(Method::GET, &format!("/api/v1/quotes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["quoteId"], quote["quoteId"]);

    let (_, listed) = api.call(Method::GET, "/api/v1/quotes", Some("user-1"), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_location_is_unprocessable() {
    let api = api();
    let (status, body) = api
        .call(
            Method::POST,
            "/api/v1/quotes",
            Some("user-1"),
            Some(json!({
                "origin": "Atlantis",
                "destination": "Rotterdam",
                "weight": 100,
                "serviceType": "air",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "location_not_found");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let api = api();
    let (status, body) = api
        .call(Method::POST, "/api/v1/quotes", Some("user-1"), Some(json!({ "origin": 1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn free_plan_limit_is_enforced() {
    let api = api();
    for _ in 0..5 {
        api.quote("user-1").await;
    }
    let (status, body) = api
        .call(
            Method::POST,
            "/api/v1/quotes",
            Some("user-1"),
            Some(json!({
                "origin": "Shanghai",
                "destination": "Los Angeles",
                "weight": 10,
                "serviceType": "sea",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "plan_limit_reached");
}

#[tokio::test]
async fn booking_review_and_payment() {
    let api = api();
    let id = api.book("user-1").await;
    assert!(id.starts_with("BK-"));

    let approve = format!("/api/v1/bookings/{id}/approve");
    let (status, _) = api
        .call(Method::POST, &approve, Some("user-1"), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pending) = api
        .call(Method::GET, "/api/v1/bookings/pending", Some("admin-1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, booking) = api
        .call(Method::POST, &approve, Some("admin-1"), Some(json!({ "notes": "ok" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "approved");

    let pay = format!("/api/v1/bookings/{id}/confirm-payment");
    let (status, body) = api.call(Method::POST, &pay, Some("user-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    let (_, body) = api
        .call(Method::POST, &format!("/api/v1/bookings/INV-{id}/confirm-payment"), Some("user-1"), None)
        .await;
    assert_eq!(body["changed"], false);

    let (status, _) = api.call(Method::POST, &pay, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, booking) = api
        .call(
            Method::PUT,
            &format!("/api/v1/bookings/{id}/status"),
            Some("admin-1"),
            Some(json!({ "status": "in_transit" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "in_transit");

    let (status, audit) = api
        .call(Method::GET, "/api/v1/audit?entityType=booking&action=payment.received", Some("admin-1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit.as_array().unwrap().len(), 1);

    assert!(api.outbox.emails().len() >= 3);
}

#[tokio::test]
async fn rejection_needs_a_reason() {
    let api = api();
    let id = api.book("user-1").await;
    let reject = format!("/api/v1/bookings/{id}/reject");

    let (status, body) = api
        .call(Method::POST, &reject, Some("admin-1"), Some(json!({ "reason": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, booking) = api
        .call(Method::POST, &reject, Some("admin-1"), Some(json!({ "reason": "No space" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "rejected");

    let (status, body) = api
        .call(Method::POST, &format!("/api/v1/bookings/{id}/approve"), Some("admin-1"), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_state");
}

#[tokio::test]
async fn booking_errors_and_visibility() {
    let api = api();
    let (status, body) = api
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some("user-1"),
            Some(json!({ "quoteId": "QT-000000000000", "carrierId": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "quote_not_found");

    let quote = api.quote("user-1").await;
    let (status, body) = api
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some("user-1"),
            Some(json!({ "quoteId": quote["quoteId"], "carrierId": "no-such-carrier" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "rate_not_found");

    let id = api.book("user-1").await;
    let path = format!("/api/v1/bookings/{id}");
    let (status, _) = api.call(Method::GET, &path, Some("user-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = api.call(Method::GET, &path, Some("user-2"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .call_with_org(Method::GET, "/api/v1/bookings?organizationId=org-9", Some("user-1"), Some("org-1"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn notifications_inbox() {
    let api = api();
    api.book("user-1").await;

    let (status, _) = api.call(Method::GET, "/api/v1/notifications", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, inbox) = api
        .call(Method::GET, "/api/v1/notifications", Some("user-1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox["unreadCount"], 1);
    let id = inbox["notifications"][0]["id"].as_str().unwrap().to_string();

    let read = format!("/api/v1/notifications/{id}/read");
    let (status, _) = api.call(Method::POST, &read, Some("user-2"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, note) = api.call(Method::POST, &read, Some("user-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["read"], true);

    let (_, inbox) = api
        .call(Method::GET, "/api/v1/notifications", Some("user-1"), None)
        .await;
    assert_eq!(inbox["unreadCount"], 0);
}
