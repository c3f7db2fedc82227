//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;

use crate::method::Method;

/// An incoming HTTP request with its body fully buffered.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, path, headers, body, params }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter, already percent-decoded.
    ///
    /// For a route `/articles/{title}`, `req.param("title")` on
    /// `/articles/Cats%20Rule` returns `Some("Cats Rule")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
