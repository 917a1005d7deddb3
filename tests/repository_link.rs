use seqlink::domain::entities::NewLink;
use seqlink::domain::repositories::LinkRepository;
use seqlink::infrastructure::persistence::PgLinkRepository;
use seqlink::utils::code_generator::successor;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

async fn insert(repo: &PgLinkRepository, id: &str, url: &str) {
    let mut tx = repo.begin_allocation().await.unwrap();
    tx.insert_link(NewLink {
        id: id.to_string(),
        url: url.to_string(),
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();
}

#[sqlx::test]
async fn test_insert_and_find_by_id(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    insert(&repo, "0000", "https://example.com").await;

    let link = repo.find_by_id("0000").await.unwrap().unwrap();
    assert_eq!(link.url, "https://example.com");
    assert_eq!(link.click_count, 0);

    assert!(repo.find_by_id("0001").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_locked_max_link_empty_table(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let mut tx = repo.begin_allocation().await.unwrap();
    assert!(tx.locked_max_link().await.unwrap().is_none());
}

#[sqlx::test]
async fn test_locked_max_link_follows_allocation_order(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    // "z" sorts after "A" bytewise but comes before it in the alphabet.
    insert(&repo, "000z", "https://a.example").await;
    insert(&repo, "000A", "https://b.example").await;

    let mut tx = repo.begin_allocation().await.unwrap();
    let newest = tx.locked_max_link().await.unwrap().unwrap();
    assert_eq!(newest.id, "000A");
    assert_eq!(successor(&newest.id).unwrap(), "000B");
}

#[sqlx::test]
async fn test_uncommitted_allocation_rolls_back(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    {
        let mut tx = repo.begin_allocation().await.unwrap();
        tx.insert_link(NewLink {
            id: "0000".to_string(),
            url: "https://example.com".to_string(),
        })
        .await
        .unwrap();
    }

    assert_eq!(repo.count().await.unwrap(), 0);
}

#[sqlx::test]
async fn test_duplicate_id_is_store_error(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    insert(&repo, "0000", "https://example.com").await;

    let mut tx = repo.begin_allocation().await.unwrap();
    let result = tx
        .insert_link(NewLink {
            id: "0000".to_string(),
            url: "https://other.example".to_string(),
        })
        .await;

    assert!(result.is_err());
}

#[sqlx::test]
async fn test_list_all_in_allocation_order(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    for id in ["0000", "0001", "000a", "000Z"] {
        insert(&repo, id, "https://example.com").await;
    }

    let ids: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();

    assert_eq!(ids, vec!["0000", "0001", "000a", "000Z"]);
    assert_eq!(repo.count().await.unwrap(), 4);
}

#[sqlx::test]
async fn test_open_scope_blocks_other_scopes(pool: PgPool) {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let mut first = repo.begin_allocation().await.unwrap();
    first
        .insert_link(NewLink {
            id: "0000".to_string(),
            url: "https://example.com".to_string(),
        })
        .await
        .unwrap();

    let other = repo.clone();
    let mut second = tokio::spawn(async move { other.begin_allocation().await.is_ok() });

    // The second scope cannot open while the first holds the lock.
    let waited = tokio::time::timeout(Duration::from_millis(300), &mut second).await;
    assert!(waited.is_err());

    first.commit().await.unwrap();
    assert!(second.await.unwrap());
    assert_eq!(repo.count().await.unwrap(), 1);
}
