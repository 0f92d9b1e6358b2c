use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use rmx_core::StaticSessions;
use rmx_generation::MockBackend;
use rmx_storage::MemoryStore;
use rmx_web::{create_app, AppState};

const TOKEN: &str = "Token test-token";

fn app() -> Router {
    let mut tokens = HashMap::new();
    tokens.insert("test-token".to_string(), 1_i64);

    create_app(AppState {
        backend: Arc::new(MockBackend::instant()),
        store: Arc::new(MemoryStore::new()),
        sessions: Arc::new(StaticSessions::new(tokens)),
        uploads: None,
        payments: None,
    })
}

fn get(uri: &str, authed: bool) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if authed {
        builder = builder.header(header::AUTHORIZATION, TOKEN);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_data_access_requires_a_session() {
    let app = app();
    for uri in ["/api/media", "/api/articles", "/api/personas"] {
        let response = app.clone().oneshot(get(uri, false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    // Unknown tokens are rejected the same way.
    let request = Request::builder()
        .method("GET")
        .uri("/api/media")
        .header(header::AUTHORIZATION, "Token wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_generate_then_list_then_delete() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({"link": "example.com/story", "style": "meme"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let generated = body_json(response).await;
    assert_eq!(generated["success"], json!(true));
    let media_id = generated["media_id"].as_str().unwrap().to_string();
    assert!(generated["media_url"].as_str().unwrap().contains("placehold.co"));

    let response = app.clone().oneshot(get("/api/media", true)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["media"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/media/{}", media_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(get("/api/media", true)).await.unwrap();
    let listed = body_json(response).await;
    assert!(listed["media"].as_array().unwrap().is_empty());

    // Deleting the same id again is a 404.
    let response = app
        .oneshot(delete(&format!("/api/media/{}", media_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_validates_before_any_call() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({"link": "example.com", "style": "gif"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(post_json(
            "/api/generate",
            json!({"link": "not a url and spaces", "style": "meme"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_generate_mirrors_article_locally() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/api/generate",
            json!({"link": "example.com/story", "style": "comic"}),
        ))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/api/articles", true)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let articles = body_json(response).await;
    let articles = articles.as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["source"], json!("https://example.com/story"));

    let id = articles[0]["id"].as_i64().unwrap();
    let response = app
        .oneshot(get(&format!("/api/articles/{}", id), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["media"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deep_link_resolution() {
    let app = app();
    let response = app
        .clone()
        .oneshot(get("/meme/https%3A%2F%2Fa.example%2Fp%3Fq%3D1?r=2", false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let resolved = body_json(response).await;
    assert_eq!(resolved["category"], json!("meme"));
    assert_eq!(resolved["url"], json!("https://a.example/p?q=1&r=2"));

    // Unencoded paste without outer params still normalizes.
    let response = app
        .clone()
        .oneshot(get("/comic/a.example/page", false))
        .await
        .unwrap();
    let resolved = body_json(response).await;
    assert_eq!(resolved["category"], json!("comic"));
    assert_eq!(resolved["url"], json!("https://a.example/page"));

    // Unknown categories are a validation error.
    let response = app.oneshot(get("/gif/a.example", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_personas_round_trip() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/personas",
            json!({"name": "Noir", "description": "high contrast", "image_url": "https://img.example/n.png"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json("/api/personas", json!({"name": "  "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.oneshot(get("/api/personas", true)).await.unwrap();
    let personas = body_json(response).await;
    assert_eq!(personas.as_array().unwrap().len(), 1);
    assert_eq!(personas[0]["name"], json!("Noir"));
}

#[tokio::test]
async fn test_social_post_relay() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({"link": "example.com/story", "style": "meme"}),
        ))
        .await
        .unwrap();
    let generated = body_json(response).await;
    let media_id = generated["media_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/x_post",
            json!({"media_id": media_id, "text": "fresh meme"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/x_post",
            json!({"media_id": "9999", "text": "fresh meme"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(post_json("/api/x_post", json!({"media_id": "1", "text": "  "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_payment_success_redirects_without_session_id() {
    let app = app();
    let response = app.oneshot(get("/success", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/"
    );
}
