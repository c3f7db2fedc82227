//! HTTP status codes the API answers with.
//!
//! ```rust
//! use wikiapi::{Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::NotFound);
//!
//! Response::builder()
//!     .status(Status::InternalServerError)
//!     .json(br#"{"name":"StoreError"}"#.to_vec());
//! ```

/// The status codes produced by the article routes and the dispatcher.
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    NotFound,            // 404
    MethodNotAllowed,    // 405

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        match s {
            Status::Ok                  => http::StatusCode::OK,
            Status::NotFound            => http::StatusCode::NOT_FOUND,
            Status::MethodNotAllowed    => http::StatusCode::METHOD_NOT_ALLOWED,
            Status::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
