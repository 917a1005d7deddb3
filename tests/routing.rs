mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use seqlink::infrastructure::cache::MemoryCache;
use seqlink::infrastructure::persistence::MemoryStore;
use seqlink::routes::app_router;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let (state, _rx) = common::create_test_state(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryCache::new()),
        100,
    );

    let response = app_router(state)
        .oneshot(Request::get("/health/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_redirect_through_full_router() {
    let store = Arc::new(MemoryStore::new());
    let (state, _rx) = common::create_test_state(store, Arc::new(MemoryCache::new()), 100);
    state
        .link_service
        .create_short_link("https://example.com/full".to_string())
        .await
        .unwrap();

    let response = app_router(state)
        .oneshot(Request::get("/0000/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/full"
    );
}
