#![allow(dead_code)]

use axum_test::TestServer;
use seqlink::application::services::{ClickRecorder, LinkService};
use seqlink::domain::click_worker::{WorkerOptions, run_click_worker};
use seqlink::domain::counter_increment::CounterIncrement;
use seqlink::domain::repositories::LinkRepository;
use seqlink::infrastructure::cache::MemoryCache;
use seqlink::infrastructure::persistence::MemoryStore;
use seqlink::routes::router;
use seqlink::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const BASE_URL: &str = "http://sho.rt";

/// Server over an in-memory store whose increment queue is held by the test.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub increments: mpsc::Receiver<CounterIncrement>,
}

/// Server over an in-memory store with a running click worker.
pub struct WorkerApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub worker: JoinHandle<()>,
}

pub fn create_test_state(
    store: Arc<MemoryStore>,
    cache: Arc<MemoryCache>,
    queue_capacity: usize,
) -> (AppState, mpsc::Receiver<CounterIncrement>) {
    let (tx, rx) = mpsc::channel(queue_capacity);

    let link_service = Arc::new(LinkService::new(store.clone(), cache, BASE_URL));
    let click_recorder = Arc::new(ClickRecorder::new(store, tx));

    (AppState::new(link_service, click_recorder, 3), rx)
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let (state, increments) = create_test_state(store.clone(), cache.clone(), 1000);

    TestApp {
        server: TestServer::new(router(state)).unwrap(),
        store,
        cache,
        increments,
    }
}

pub fn spawn_app_with_worker() -> WorkerApp {
    let store = Arc::new(MemoryStore::new());
    let (state, rx) = create_test_state(store.clone(), Arc::new(MemoryCache::new()), 1000);

    let worker = tokio::spawn(run_click_worker(
        rx,
        store.clone(),
        WorkerOptions::default(),
    ));

    WorkerApp {
        server: TestServer::new(router(state)).unwrap(),
        store,
        worker,
    }
}

pub async fn shorten(server: &TestServer, url: &str) -> String {
    let response = server
        .post("/api/links")
        .json(&serde_json::json!({ "url": url }))
        .await;
    assert_eq!(response.status_code(), 201);

    response.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Polls the store until the link's counter reaches `expected` or two
/// seconds pass, returning the last observed value.
pub async fn wait_for_click_count(store: &MemoryStore, code: &str, expected: i64) -> i64 {
    let mut observed = -1;
    for _ in 0..200 {
        observed = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .find(|link| link.id == code)
            .map(|link| link.click_count)
            .unwrap_or(-1);
        if observed == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    observed
}
