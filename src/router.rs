//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. `HEAD` falls back to the `GET` handler and drops the body.
//! Paths that exist under another method answer 405 with an `allow` header;
//! everything else answers 404.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves
    /// them percent-decoded:
    ///
    /// ```rust
    /// # use wikiapi::{Method, Request, Response, Router};
    /// # async fn get_article(_: Request) -> Response { Response::text("") }
    /// # async fn delete_article(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,    "/articles/{title}", get_article)
    ///     .on(Method::Delete, "/articles/{title}", delete_article);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with an existing
    /// one. Routes are registered at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Routes one buffered request and produces one response.
    ///
    /// This is what the server calls per request; it is public so the
    /// routing table can be exercised without a socket.
    pub async fn dispatch(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();

        let Ok(method) = Method::try_from(&parts.method) else {
            return Response::status(Status::MethodNotAllowed);
        };
        let path = parts.uri.path();

        match self.lookup(method, path) {
            Lookup::Found(handler, params) => {
                let req = Request::new(method, path.to_owned(), parts.headers, body, params);
                let res = handler.call(req).await;
                if method == Method::Head { res.without_body() } else { res }
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Response::builder()
                    .status(Status::MethodNotAllowed)
                    .header("allow", &allow)
                    .no_body()
            }
            Lookup::NotFound => Response::status(Status::NotFound),
        }
    }

    fn lookup(&self, method: Method, path: &str) -> Lookup {
        let found = self.find(method, path).or_else(|| match method {
            Method::Head => self.find(Method::Get, path),
            _ => None,
        });
        if let Some((handler, params)) = found {
            return Lookup::Found(handler, params);
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| *m)
            .collect();
        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        if allowed.contains(&Method::Get) && !allowed.contains(&Method::Head) {
            allowed.push(Method::Head);
        }
        allowed.sort();
        Lookup::MethodNotAllowed(allowed)
    }

    fn find(&self, method: Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let matched = self.routes.get(&method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), decode_param(v)))
            .collect();
        Some((Arc::clone(matched.value), params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Percent-decodes a raw path segment. Segments that do not decode to UTF-8
/// are passed through untouched.
fn decode_param(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_title(req: Request) -> Response {
        Response::text(req.param("title").unwrap_or_default().to_owned())
    }

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    fn request(method: &str, uri: &str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    #[tokio::test]
    async fn params_are_percent_decoded() {
        let router = Router::new().get("/articles/{title}", echo_title);
        let res = router.dispatch(request("GET", "/articles/Cats%20Rule")).await;
        assert_eq!(res.body_text(), Some("Cats Rule"));
    }

    #[tokio::test]
    async fn undecodable_params_pass_through() {
        let router = Router::new().get("/articles/{title}", echo_title);
        let res = router.dispatch(request("GET", "/articles/bad%FFbyte")).await;
        assert_eq!(res.body_text(), Some("bad%FFbyte"));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let router = Router::new().get("/articles", ok);
        let res = router.dispatch(request("GET", "/nope")).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn wrong_method_lists_allowed_ones() {
        let router = Router::new()
            .get("/articles", ok)
            .post("/articles", ok)
            .delete("/articles", ok);
        let res = router.dispatch(request("PUT", "/articles")).await;
        assert_eq!(res.status_code(), 405);
        assert_eq!(res.header("allow"), Some("DELETE, GET, HEAD, POST"));
    }

    #[tokio::test]
    async fn head_runs_the_get_handler_without_a_body() {
        let router = Router::new().get("/articles/{title}", echo_title);
        let res = router.dispatch(request("HEAD", "/articles/Cats")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn head_without_a_get_route_is_not_allowed() {
        let router = Router::new().post("/articles", ok);
        let res = router.dispatch(request("HEAD", "/articles")).await;
        assert_eq!(res.status_code(), 405);
        assert_eq!(res.header("allow"), Some("POST"));
    }

    #[tokio::test]
    async fn non_standard_method_is_rejected() {
        let router = Router::new().get("/articles", ok);
        let res = router.dispatch(request("PURGE", "/articles")).await;
        assert_eq!(res.status_code(), 405);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new()
            .get("/articles/{title}", ok)
            .get("/articles/{name}", ok);
    }
}
