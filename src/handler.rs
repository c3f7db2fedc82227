//! Handler trait and type erasure.
//!
//! The router stores handlers of different concrete types side by side, so
//! each one is wrapped in an `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! move |req| list_articles(Arc::clone(&store), req)   ← closure capturing the store
//!        ↓ router.get("/articles", closure)
//! closure.into_boxed_handler()                         ← Handler blanket impl
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req) at request time                    ← one vtable dispatch
//!        ↓
//! Box::pin(async { fut.await.into_response() })        ← BoxFuture
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any `async fn` or closure with the shape
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>`. Handlers that
/// need the article store capture an `Arc` of it in a closure.
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
