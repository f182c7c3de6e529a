use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use mirage_core::models::CloneRecord;

use crate::integration::common::setup_test_app;

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn clone_rejects_invalid_url() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::post("/clone")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"url": "ftp://example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn clone_rejects_relative_url() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::post("/clone")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"url": "not a url at all"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_starts_empty() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total"], 0);
    assert_eq!(json["clones"], serde_json::json!([]));
}

#[tokio::test]
async fn history_and_preview_return_stored_clone() {
    let app = setup_test_app().await;

    let record = CloneRecord::create(
        "https://example.com",
        "<!DOCTYPE html><html><body>stored</body></html>".to_string(),
    );
    app.db.clone_repo().append(&record).await.unwrap();

    // History lists the record without its HTML payload
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["clones"][0]["url"], "https://example.com");
    assert_eq!(json["clones"][0]["filename"], record.filename);
    assert!(json["clones"][0].get("html").is_none());

    // Preview returns the full document
    let response = app
        .router
        .oneshot(
            Request::get(format!("/preview/{}", record.filename))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["html"],
        "<!DOCTYPE html><html><body>stored</body></html>"
    );
}

#[tokio::test]
async fn preview_unknown_filename_returns_404() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::get("/preview/does-not-exist.html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["paths"].get("/clone").is_some());
    assert!(json["paths"].get("/history").is_some());
}
