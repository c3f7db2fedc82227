//! In-process article store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ArticleStore, StoreError, StoreResult};
use crate::model::{Article, ArticleFields, DeleteResult, UpdateResult};

/// Keeps articles in a vector, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    articles: Vec<Article>,
    closed: bool,
}

impl Inner {
    fn check_open(&self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::new("store is closed"));
        }
        Ok(())
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.articles
            .iter()
            .position(|a| a.title.as_deref() == Some(title))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Article>> {
        let inner = self.inner.read().await;
        inner.check_open()?;
        Ok(inner.articles.clone())
    }

    async fn find_one(&self, title: &str) -> StoreResult<Option<Article>> {
        let inner = self.inner.read().await;
        inner.check_open()?;
        Ok(inner.position(title).map(|i| inner.articles[i].clone()))
    }

    async fn insert(&self, fields: ArticleFields) -> StoreResult<Article> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;
        let article = Article::from_fields(fields);
        inner.articles.push(article.clone());
        Ok(article)
    }

    async fn replace_one(&self, title: &str, fields: ArticleFields) -> StoreResult<UpdateResult> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;
        Ok(match inner.position(title) {
            Some(i) => {
                let modified = inner.articles[i].replace_with(fields);
                UpdateResult::new(1, modified.into())
            }
            None => UpdateResult::new(0, 0),
        })
    }

    async fn update_one(&self, title: &str, fields: ArticleFields) -> StoreResult<UpdateResult> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;
        Ok(match inner.position(title) {
            Some(i) => {
                let modified = inner.articles[i].merge(fields);
                UpdateResult::new(1, modified.into())
            }
            None => UpdateResult::new(0, 0),
        })
    }

    async fn delete_one(&self, title: &str) -> StoreResult<DeleteResult> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;
        Ok(match inner.position(title) {
            Some(i) => {
                inner.articles.remove(i);
                DeleteResult::new(1)
            }
            None => DeleteResult::new(0),
        })
    }

    async fn delete_all(&self) -> StoreResult<DeleteResult> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;
        let deleted = inner.articles.len() as u64;
        inner.articles.clear();
        Ok(DeleteResult::new(deleted))
    }

    async fn close(&self) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.closed = true;
        inner.articles.clear();
        Ok(())
    }
}
