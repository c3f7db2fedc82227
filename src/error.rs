//! Unified error type.

use thiserror::Error;

use crate::store::StoreError;

/// The error type returned by the server's fallible operations.
///
/// Application-level outcomes (404, a failed store call answered with 500)
/// are expressed as HTTP [`Response`](crate::Response) values, not as
/// `Error`s. This type surfaces infrastructure failures: binding to a port,
/// accepting a connection, or opening the article store.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}
