//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. The server turns it
//! into a hyper response on the way out.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http_body_util::Full;
use tracing::warn;

use crate::status::Status;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use wikiapi::{Response, Status};
///
/// Response::json(br#"[]"#.to_vec());
/// Response::text("Update Successful");
/// Response::status(Status::NotFound);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use wikiapi::{Response, Status};
///
/// Response::builder()
///     .status(Status::InternalServerError)
///     .json(br#"{"name":"StoreError","message":"disk full"}"#.to_vec());
///
/// Response::builder()
///     .status(Status::MethodNotAllowed)
///     .header("allow", "GET, POST")
///     .no_body();
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::bytes_raw(JSON, body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw(TEXT, body.into().into_bytes())
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The body as UTF-8 text, or `None` for binary bodies.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The same response with its body dropped, for `HEAD`.
    pub(crate) fn without_body(mut self) -> Self {
        self.body.clear();
        self
    }

    fn bytes_raw(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: Status::Ok.into(),
        }
    }

    /// Converts into the hyper response written to the wire. Header pairs
    /// that are not valid HTTP are dropped with a warning.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = http::StatusCode::from_u16(self.status)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        let headers = res.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(Status::InternalServerError)
            .header("x-request-id", "abc")
            .json(b"{}".to_vec());

        assert_eq!(res.status_code(), 500);
        assert_eq!(res.headers[0].0, "content-type");
        assert_eq!(res.header("X-Request-Id"), Some("abc"));
    }

    #[test]
    fn into_inner_drops_invalid_headers() {
        let res = Response::builder()
            .header("bad header", "value")
            .header("allow", "GET")
            .no_body()
            .into_inner();

        assert_eq!(res.status(), http::StatusCode::OK);
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.headers()["allow"], "GET");
    }

    #[test]
    fn strings_become_plain_text() {
        let res = "Update Successful".into_response();
        assert_eq!(res.header("content-type"), Some(TEXT));
        assert_eq!(res.body_text(), Some("Update Successful"));
    }
}
