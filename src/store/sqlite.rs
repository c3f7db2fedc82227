//! SQLite-backed article store.
//!
//! # Invariants
//! - One `articles` table; `seq` gives insertion order and picks the first
//!   match among duplicate titles.
//! - `title` and `content` are nullable; there are no constraints beyond the
//!   primary key and the unique `id`.
//! - Every statement runs on tokio's blocking pool while holding the
//!   connection mutex, so a read-modify-write is atomic per call.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{error, info};

use super::{ArticleStore, StoreError, StoreResult};
use crate::model::{Article, ArticleFields, ArticleId, DeleteResult, UpdateResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS articles (
    seq     INTEGER PRIMARY KEY AUTOINCREMENT,
    id      TEXT NOT NULL UNIQUE,
    title   TEXT,
    content TEXT
);";

/// Article store over a single SQLite connection.
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let started_at = Instant::now();
        let conn = Connection::open(path).and_then(bootstrap).map_err(|err| {
            error!(
                path = %path.display(),
                duration_ms = started_at.elapsed().as_millis() as u64,
                "failed to open sqlite store: {err}"
            );
            StoreError::from(err)
        })?;
        info!(
            path = %path.display(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "sqlite store opened"
        );
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database. Contents vanish on close.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = bootstrap(Connection::open_in_memory()?)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self { conn: Arc::new(Mutex::new(Some(conn))) }
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> StoreResult<T> {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::new("sqlite connection lock poisoned"))?;
            let conn = guard.as_mut().ok_or_else(|| StoreError::new("store is closed"))?;
            f(conn)
        })
        .await?
    }
}

fn bootstrap(conn: Connection) -> rusqlite::Result<Connection> {
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<(String, Option<String>, Option<String>)> {
    Ok((row.get("id")?, row.get("title")?, row.get("content")?))
}

fn to_article((id, title, content): (String, Option<String>, Option<String>)) -> StoreResult<Article> {
    let id = ArticleId::parse(&id)
        .map_err(|e| StoreError::new(format!("corrupt article id `{id}`: {e}")))?;
    Ok(Article { id, title, content })
}

/// The first row, by insertion order, whose title equals `title`.
fn first_match(conn: &Connection, title: &str) -> StoreResult<Option<(i64, Article)>> {
    let row = conn
        .query_row(
            "SELECT seq, id, title, content FROM articles
             WHERE title = ?1
             ORDER BY seq
             LIMIT 1;",
            [title],
            |row| Ok((row.get::<_, i64>("seq")?, article_from_row(row)?)),
        )
        .optional()?;
    row.map(|(seq, raw)| to_article(raw).map(|article| (seq, article)))
        .transpose()
}

fn write_fields(conn: &Connection, seq: i64, article: &Article) -> StoreResult<()> {
    conn.execute(
        "UPDATE articles SET title = ?2, content = ?3 WHERE seq = ?1;",
        params![seq, article.title, article.content],
    )?;
    Ok(())
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn find_all(&self) -> StoreResult<Vec<Article>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, content FROM articles ORDER BY seq;")?;
            let rows = stmt.query_map([], article_from_row)?;
            let mut articles = Vec::new();
            for row in rows {
                articles.push(to_article(row?)?);
            }
            Ok(articles)
        })
        .await
    }

    async fn find_one(&self, title: &str) -> StoreResult<Option<Article>> {
        let title = title.to_owned();
        self.with_conn(move |conn| Ok(first_match(conn, &title)?.map(|(_, article)| article)))
            .await
    }

    async fn insert(&self, fields: ArticleFields) -> StoreResult<Article> {
        self.with_conn(move |conn| {
            let article = Article::from_fields(fields);
            conn.execute(
                "INSERT INTO articles (id, title, content) VALUES (?1, ?2, ?3);",
                params![article.id.to_string(), article.title, article.content],
            )?;
            Ok(article)
        })
        .await
    }

    async fn replace_one(&self, title: &str, fields: ArticleFields) -> StoreResult<UpdateResult> {
        let title = title.to_owned();
        self.with_conn(move |conn| {
            let Some((seq, mut article)) = first_match(conn, &title)? else {
                return Ok(UpdateResult::new(0, 0));
            };
            let modified = article.replace_with(fields);
            if modified {
                write_fields(conn, seq, &article)?;
            }
            Ok(UpdateResult::new(1, modified.into()))
        })
        .await
    }

    async fn update_one(&self, title: &str, fields: ArticleFields) -> StoreResult<UpdateResult> {
        let title = title.to_owned();
        self.with_conn(move |conn| {
            let Some((seq, mut article)) = first_match(conn, &title)? else {
                return Ok(UpdateResult::new(0, 0));
            };
            let modified = article.merge(fields);
            if modified {
                write_fields(conn, seq, &article)?;
            }
            Ok(UpdateResult::new(1, modified.into()))
        })
        .await
    }

    async fn delete_one(&self, title: &str) -> StoreResult<DeleteResult> {
        let title = title.to_owned();
        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM articles WHERE seq = (
                     SELECT seq FROM articles WHERE title = ?1 ORDER BY seq LIMIT 1
                 );",
                [title],
            )?;
            Ok(DeleteResult::new(deleted as u64))
        })
        .await
    }

    async fn delete_all(&self) -> StoreResult<DeleteResult> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM articles;", [])?;
            Ok(DeleteResult::new(deleted as u64))
        })
        .await
    }

    async fn close(&self) -> StoreResult<()> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::new("sqlite connection lock poisoned"))?;
            match guard.take() {
                Some(conn) => conn.close().map_err(|(_, e)| StoreError::from(e))?,
                None => return Ok(()),
            }
            info!("sqlite store closed");
            Ok(())
        })
        .await?
    }
}
