//! The `/articles` resource.
//!
//! | Path | Verb | Store call | On store error |
//! |---|---|---|---|
//! | `/articles` | GET | `find_all` | 200 + error JSON |
//! | `/articles` | POST | `insert` | 200 + error JSON |
//! | `/articles` | DELETE | `delete_all` | 200 + error JSON |
//! | `/articles/{title}` | GET | `find_one` | 200 + error JSON |
//! | `/articles/{title}` | PUT | `replace_one` | 500 + error JSON |
//! | `/articles/{title}` | PATCH | `update_one` | 500 + error JSON |
//! | `/articles/{title}` | DELETE | `delete_one` | 500 + error JSON |
//!
//! Collection routes answer 200 even when the store fails; clients tell the
//! two apart by the body. Writes that match no article still answer with
//! their success text.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;
use crate::store::{ArticleStore, StoreError};

mod body;

use body::decode_fields;

pub const SAVED: &str = "Successfully save the article";
pub const DELETED_ALL: &str = "Successfully deleted all the articles";
pub const NO_MATCH: &str = "No matching article was found ";
pub const REPLACED: &str = "Update Successful";
pub const UPDATED: &str = "Successfully updated the requested article";
pub const DELETED_ONE: &str = "Successfully deleted the document";

/// Builds the article routes over `store`.
pub fn routes(store: Arc<dyn ArticleStore>) -> Router {
    Router::new()
        .get("/articles", with_store(&store, list_articles))
        .post("/articles", with_store(&store, create_article))
        .delete("/articles", with_store(&store, delete_articles))
        .get("/articles/{title}", with_store(&store, get_article))
        .put("/articles/{title}", with_store(&store, replace_article))
        .patch("/articles/{title}", with_store(&store, update_article))
        .delete("/articles/{title}", with_store(&store, delete_article))
}

/// Adapts a `(store, request)` handler into a router handler.
fn with_store<F, Fut>(
    store: &Arc<dyn ArticleStore>,
    handler: F,
) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<dyn ArticleStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let store = Arc::clone(store);
    move |req| handler(Arc::clone(&store), req)
}

// ── Collection routes ─────────────────────────────────────────────────────────

async fn list_articles(store: Arc<dyn ArticleStore>, _req: Request) -> Response {
    match store.find_all().await {
        Ok(articles) => json(&articles),
        Err(e) => store_error(Status::Ok, "find_all", &e),
    }
}

async fn create_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    let fields = decode_fields(&req);
    match store.insert(fields).await {
        Ok(article) => confirm_with(SAVED, &article),
        Err(e) => store_error(Status::Ok, "insert", &e),
    }
}

async fn delete_articles(store: Arc<dyn ArticleStore>, _req: Request) -> Response {
    match store.delete_all().await {
        Ok(result) => confirm_with(DELETED_ALL, &result),
        Err(e) => store_error(Status::Ok, "delete_all", &e),
    }
}

// ── Item routes ───────────────────────────────────────────────────────────────

async fn get_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    match store.find_one(title(&req)).await {
        Ok(Some(article)) => json(&article),
        Ok(None) => Response::text(NO_MATCH),
        Err(e) => store_error(Status::Ok, "find_one", &e),
    }
}

async fn replace_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    let fields = decode_fields(&req);
    match store.replace_one(title(&req), fields).await {
        Ok(_) => Response::text(REPLACED),
        Err(e) => store_error(Status::InternalServerError, "replace_one", &e),
    }
}

async fn update_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    let fields = decode_fields(&req);
    match store.update_one(title(&req), fields).await {
        Ok(_) => Response::text(UPDATED),
        Err(e) => store_error(Status::InternalServerError, "update_one", &e),
    }
}

async fn delete_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    match store.delete_one(title(&req)).await {
        Ok(_) => Response::text(DELETED_ONE),
        Err(e) => store_error(Status::InternalServerError, "delete_one", &e),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The `{title}` segment. Always present on item routes.
fn title(req: &Request) -> &str {
    req.param("title").unwrap_or_default()
}

fn json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => Response::json(bytes),
        Err(e) => store_error(Status::InternalServerError, "serialize", &StoreError::new(e.to_string())),
    }
}

/// `text` immediately followed by the JSON form of `value`.
fn confirm_with<T: Serialize>(text: &str, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(serialized) => Response::text(format!("{text}{serialized}")),
        Err(e) => store_error(Status::InternalServerError, "serialize", &StoreError::new(e.to_string())),
    }
}

fn store_error(status: Status, op: &'static str, e: &StoreError) -> Response {
    warn!(op, "store operation failed: {e}");
    Response::builder().status(status).json(e.to_json())
}
