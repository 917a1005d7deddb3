mod common;

use seqlink::infrastructure::cache::CacheService;
use serde_json::Value;

#[tokio::test]
async fn test_redirect_success() {
    let app = common::spawn_app();
    let code = common::shorten(&app.server, "https://example.com/target").await;

    let response = app.server.get(&format!("/{code}")).await;

    assert_eq!(response.status_code(), 303);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_records_referer() {
    let mut app = common::spawn_app();
    let code = common::shorten(&app.server, "https://example.com").await;

    app.server
        .get(&format!("/{code}"))
        .add_header("Referer", "https://news.example.org/post/1")
        .await;
    app.server.get(&format!("/{code}")).await;

    let clicks = app.store.clicks();
    assert_eq!(clicks.len(), 2);
    assert_eq!(clicks[0].link_id, code);
    assert_eq!(clicks[0].referer, "https://news.example.org/post/1");
    assert_eq!(clicks[1].referer, "");

    // One counter increment queued per click.
    let first = app.increments.recv().await.unwrap();
    let second = app.increments.recv().await.unwrap();
    assert_eq!(first.click_id, clicks[0].id);
    assert_eq!(second.click_id, clicks[1].id);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let mut app = common::spawn_app();

    let response = app.server.get("/0000").await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["details"]["code"], "0000");
    assert_eq!(body["error"]["details"]["action"], "register");

    assert!(app.store.clicks().is_empty());
    assert!(app.cache.is_empty());
    assert!(app.increments.try_recv().is_err());
}

#[tokio::test]
async fn test_redirect_unknown_symbols_not_found() {
    let app = common::spawn_app();

    let response = app.server.get("/favicon.ico").await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(app.store.link_reads(), 0);
}

#[tokio::test]
async fn test_code_allocated_after_miss_becomes_reachable() {
    let app = common::spawn_app();

    let response = app.server.get("/0000").await;
    assert_eq!(response.status_code(), 404);

    common::shorten(&app.server, "https://late.example").await;

    let response = app.server.get("/0000").await;
    assert_eq!(response.status_code(), 303);
    assert_eq!(response.header("location"), "https://late.example");
}

#[tokio::test]
async fn test_repeated_redirects_read_store_once() {
    let app = common::spawn_app();
    let code = common::shorten(&app.server, "https://example.com").await;

    for _ in 0..10 {
        let response = app.server.get(&format!("/{code}")).await;
        assert_eq!(response.status_code(), 303);
    }

    assert_eq!(app.store.link_reads(), 1);
    assert_eq!(app.cache.len(), 1);
    assert_eq!(app.store.clicks().len(), 10);
}

#[tokio::test]
async fn test_click_count_converges() {
    let app = common::spawn_app_with_worker();
    let code = common::shorten(&app.server, "https://example.com").await;

    for i in 0..25 {
        app.server
            .get(&format!("/{code}"))
            .add_header("Referer", format!("https://ref{}.example", i % 3))
            .await;
    }

    assert_eq!(app.store.clicks().len(), 25);
    assert_eq!(common::wait_for_click_count(&app.store, &code, 25).await, 25);
}

#[tokio::test]
async fn test_redirect_unsendable_url_records_nothing() {
    let mut app = common::spawn_app();
    let code = common::shorten(&app.server, "https://example.com/a\nb").await;

    let response = app.server.get(&format!("/{code}")).await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "internal_error");
    assert_eq!(body["error"]["details"]["code"], code);

    assert!(app.store.clicks().is_empty());
    assert!(app.increments.try_recv().is_err());
}
