//! # wikiapi
//!
//! A small REST API over one collection of articles, each a `title` and a
//! `content` string.
//!
//! | Path | Verbs |
//! |---|---|
//! | `/articles` | `GET` list, `POST` create, `DELETE` delete all |
//! | `/articles/{title}` | `GET` fetch, `PUT` overwrite, `PATCH` merge, `DELETE` |
//!
//! Articles are addressed by exact title. Nothing validates writes: the
//! fields a request carries are what gets stored. See [`articles`] for the
//! per-route response contract.
//!
//! ## Pieces
//!
//! - [`store`]: the [`ArticleStore`] trait plus in-memory and SQLite engines.
//! - [`articles`]: the routes, built over an explicit store handle.
//! - [`Router`] / [`Server`]: radix-tree routing via [`matchit`] and a
//!   hyper/tokio server with graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wikiapi::{articles, MemoryStore, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wikiapi::Error> {
//!     let store = Arc::new(MemoryStore::new());
//!     let app = articles::routes(store);
//!
//!     Server::bind("127.0.0.1:3000").await?.serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod articles;
pub mod config;
pub mod model;
pub mod store;

pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use model::{Article, ArticleFields, ArticleId, DeleteResult, UpdateResult};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, DRAIN_TIMEOUT};
pub use status::Status;
pub use store::{ArticleStore, MemoryStore, SqliteStore, StoreError};
