use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::article::{Article, CachedArticle};
use crate::error::CacheError;

/// Local article storage as seen by the sync engine.
#[async_trait]
pub trait ArticleLocalSource: Send + Sync {
    /// Full table contents at subscription time, then again after every
    /// mutation.
    fn observe_all(&self) -> BoxStream<'static, Result<Vec<CachedArticle>, CacheError>>;

    /// Drops every row and inserts `articles` with fresh ids, as one unit.
    async fn replace_all(&self, articles: Vec<Article>) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Table {
    next_id: i64,
    rows: Vec<CachedArticle>,
}

impl Table {
    fn normalized(mut self) -> Self {
        let max_id = self.rows.iter().map(|row| row.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1).max(1);
        self
    }

    fn insert(&mut self, mut row: CachedArticle) {
        if row.id == 0 {
            row.id = self.next_id;
            self.next_id += 1;
            self.rows.push(row);
            return;
        }
        self.next_id = self.next_id.max(row.id + 1);
        match self.rows.iter_mut().find(|existing| existing.id == row.id) {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
    }
}

#[derive(Debug)]
struct StoreInner {
    table: Mutex<Table>,
    rows_tx: watch::Sender<Arc<Vec<CachedArticle>>>,
    path: Option<PathBuf>,
}

/// Single-table article store. Writers are serialized and every finished
/// write is published to observers as one complete snapshot, so a
/// delete-then-insert is never visible half done.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    inner: Arc<StoreInner>,
}

impl ArticleStore {
    pub fn in_memory() -> Self {
        Self::from_table(Table::default().normalized(), None)
    }

    /// Opens a store persisted as JSON at `path`. A corrupted file falls back
    /// to the `.json.tmp` sibling left by an interrupted write, then to an
    /// empty table.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(error = %e, path = %parent.display(), "failed to create cache dir");
            }
        }

        let table = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Table>(&bytes) {
                Ok(table) => table,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "failed to parse article cache, trying tmp fallback");
                    let tmp = path.with_extension("json.tmp");
                    match tokio::fs::read(&tmp).await {
                        Ok(tmp_bytes) => serde_json::from_slice(&tmp_bytes).unwrap_or_default(),
                        Err(_) => Table::default(),
                    }
                }
            },
            Err(_) => Table::default(),
        };
        debug!(rows = table.rows.len(), path = %path.display(), "article cache loaded");

        Self::from_table(table.normalized(), Some(path))
    }

    fn from_table(table: Table, path: Option<PathBuf>) -> Self {
        let (rows_tx, _) = watch::channel(Arc::new(table.rows.clone()));
        Self {
            inner: Arc::new(StoreInner {
                table: Mutex::new(table),
                rows_tx,
                path,
            }),
        }
    }

    pub fn snapshot(&self) -> Vec<CachedArticle> {
        self.inner.rows_tx.borrow().as_ref().clone()
    }

    pub async fn insert_all(&self, rows: Vec<CachedArticle>) -> Result<(), CacheError> {
        self.write(|table| {
            for row in rows {
                table.insert(row);
            }
        })
        .await
    }

    pub async fn delete_all(&self) -> Result<(), CacheError> {
        self.write(|table| table.rows.clear()).await
    }

    /// Applies `mutate` under the writer lock and publishes the finished
    /// table. Observers only ever see the state before or after `mutate`.
    async fn write<F>(&self, mutate: F) -> Result<(), CacheError>
    where
        F: FnOnce(&mut Table),
    {
        let mut table = self.inner.table.lock().await;
        mutate(&mut table);
        self.inner.rows_tx.send_replace(Arc::new(table.rows.clone()));
        debug!(rows = table.rows.len(), "article table updated");
        // The lock is held while persisting so files land in write order.
        self.persist(&table).await
    }

    async fn persist(&self, table: &Table) -> Result<(), CacheError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(table)?;
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(error = %e, path = %parent.display(), "failed to create cache dir");
            }
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleLocalSource for ArticleStore {
    fn observe_all(&self) -> BoxStream<'static, Result<Vec<CachedArticle>, CacheError>> {
        WatchStream::new(self.inner.rows_tx.subscribe())
            .map(|rows| Ok(rows.as_ref().clone()))
            .boxed()
    }

    async fn replace_all(&self, articles: Vec<Article>) -> Result<(), CacheError> {
        self.write(|table| {
            table.rows.clear();
            for article in articles {
                table.insert(CachedArticle::from(article));
            }
        })
        .await
    }
}
