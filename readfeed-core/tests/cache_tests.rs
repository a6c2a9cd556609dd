use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use readfeed_core::{Article, ArticleLocalSource, ArticleStore, CachedArticle};

fn article(n: u32) -> Article {
    Article {
        title: format!("Title {n}"),
        published_at: format!("2024-01-0{n}T00:00:00Z"),
        content: format!("<p>Body {n}</p>"),
    }
}

fn articles_of(rows: &[CachedArticle]) -> Vec<Article> {
    rows.iter().cloned().map(CachedArticle::into_article).collect()
}

fn temp_dir(tag: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "readfeed_{tag}_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    dir
}

#[tokio::test]
async fn observe_all_starts_with_current_set_even_when_empty() {
    let store = ArticleStore::in_memory();
    let mut rows = store.observe_all();
    let first = rows.next().await.expect("initial emission").expect("no cache error");
    assert!(first.is_empty());
}

#[tokio::test]
async fn replace_all_is_observed_as_one_snapshot() {
    let store = ArticleStore::in_memory();
    store.replace_all(vec![article(1), article(2)]).await.unwrap();

    let mut rows = store.observe_all();
    let _ = rows.next().await;

    store.replace_all(vec![article(3), article(4)]).await.unwrap();
    let next = rows.next().await.unwrap().unwrap();
    assert_eq!(articles_of(&next), vec![article(3), article(4)]);

    // Nothing else was published in between, in particular no empty table.
    let pending = tokio::time::timeout(Duration::from_millis(50), rows.next()).await;
    assert!(pending.is_err(), "unexpected extra emission: {pending:?}");
}

#[tokio::test]
async fn replace_all_twice_yields_same_content_with_fresh_ids() {
    let store = ArticleStore::in_memory();
    let wanted = vec![article(1), article(2)];

    store.replace_all(wanted.clone()).await.unwrap();
    let first = store.snapshot();
    store.replace_all(wanted.clone()).await.unwrap();
    let second = store.snapshot();

    assert_eq!(articles_of(&first), wanted);
    assert_eq!(articles_of(&second), wanted);
    assert!(first.iter().all(|row| row.id > 0));
    assert!(second[0].id > first[1].id, "ids keep increasing");
}

#[tokio::test]
async fn replace_all_with_empty_list_clears_table() {
    let store = ArticleStore::in_memory();
    store.replace_all(vec![article(1)]).await.unwrap();
    store.replace_all(Vec::new()).await.unwrap();
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn insert_all_replaces_rows_with_existing_ids() {
    let store = ArticleStore::in_memory();
    store
        .insert_all(vec![article(1).into(), article(2).into()])
        .await
        .unwrap();
    let rows = store.snapshot();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

    let mut updated = rows[0].clone();
    updated.title = "Renamed".into();
    store.insert_all(vec![updated]).await.unwrap();

    let rows = store.snapshot();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "Renamed");
    assert_eq!(rows[0].id, 1);

    store.delete_all().await.unwrap();
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn concurrent_replacements_never_interleave() {
    let store = ArticleStore::in_memory();
    let batch_a: Vec<Article> = (1..=5).map(article).collect();
    let batch_b: Vec<Article> = (6..=9).map(|n| Article {
        title: format!("B{n}"),
        ..Article::default()
    })
    .collect();

    let mut tasks = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        let batch = if i % 2 == 0 { batch_a.clone() } else { batch_b.clone() };
        tasks.push(tokio::spawn(async move { store.replace_all(batch).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let last = articles_of(&store.snapshot());
    assert!(last == batch_a || last == batch_b, "mixed table: {last:?}");
}

#[tokio::test]
async fn persisted_store_reloads_rows_and_id_counter() {
    let dir = temp_dir("persist");
    let path = dir.join("articles.json");

    let store = ArticleStore::open(&path).await;
    store.replace_all(vec![article(1), article(2)]).await.unwrap();
    let before = store.snapshot();
    drop(store);

    let reopened = ArticleStore::open(&path).await;
    assert_eq!(reopened.snapshot(), before);

    reopened.replace_all(vec![article(3)]).await.unwrap();
    assert!(reopened.snapshot()[0].id > before[1].id);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn open_uses_tmp_fallback_on_corrupted_json() {
    let dir = temp_dir("corrupt");
    tokio::fs::create_dir_all(&dir).await.unwrap();

    let path = dir.join("articles.json");
    tokio::fs::write(&path, b"{ this is not json ").await.unwrap();

    let tmp = dir.join("articles.json.tmp");
    let rows = vec![CachedArticle {
        id: 7,
        title: "Recovered".into(),
        published_at: "2024-01-01T00:00:00Z".into(),
        content: String::new(),
    }];
    let body = serde_json::json!({ "next_id": 8, "rows": rows });
    tokio::fs::write(&tmp, serde_json::to_vec(&body).unwrap()).await.unwrap();

    let store = ArticleStore::open(&path).await;
    assert_eq!(store.snapshot(), rows, "should fall back to tmp file when main is corrupted");

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn open_with_unreadable_cache_starts_empty() {
    let dir = temp_dir("garbage");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("articles.json");
    tokio::fs::write(&path, b"garbage").await.unwrap();

    let store = ArticleStore::open(&path).await;
    assert!(store.snapshot().is_empty());

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
