//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Tells every open connection to shut down. Idle keep-alive connections
//!    close at once; busy ones finish the request they are serving.
//! 3. Waits up to [`DRAIN_TIMEOUT`] for them, then aborts the stragglers.
//! 4. Returns from [`Server::serve`], which lets `main` close the store and
//!    exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::router::Router;

/// How long shutdown waits for open connections before dropping them.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The HTTP server, bound to a listening socket.
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
}

impl Server {
    /// Binds the listening socket.
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), wikiapi::Error> {
    /// use wikiapi::Server;
    /// let server = Server::bind("127.0.0.1:3000").await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    /// The address the server is listening on. Useful after binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by every open connection closing or [`DRAIN_TIMEOUT`]).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `signal`
    /// resolves instead of waiting for a process signal.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()> + Send,
    ) -> Result<(), Error> {
        let Self { listener, addr } = self;
        let router = Arc::new(router);

        info!(%addr, "wikiapi listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut tasks = JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Shutdown is checked first so a signal stops accepting even
                // while connections are still queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { handle(router, req, remote_addr).await }
                    });
                    let conn = graceful.watch(builder.serve_connection_with_upgrades(io, svc).into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);

        match tokio::time::timeout(DRAIN_TIMEOUT, graceful.shutdown()).await {
            Ok(()) => {
                while tasks.join_next().await.is_some() {}
            }
            Err(_) => {
                warn!(remaining = tasks.len(), "connections still open after {DRAIN_TIMEOUT:?}, aborting them");
                tasks.shutdown().await;
            }
        }

        info!("wikiapi stopped");
        Ok(())
    }
}

// ── Request handling ──────────────────────────────────────────────────────────

/// Buffers the body, routes the request and logs the outcome.
///
/// Never fails towards hyper: a body that cannot be read is treated as empty,
/// since nothing is rejected before it reaches the store.
async fn handle(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let started_at = Instant::now();
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            Bytes::new()
        }
    };

    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    let response = router.dispatch(http::Request::from_parts(parts, body)).await;

    debug!(
        peer = %remote_addr,
        %method,
        %path,
        status = response.status_code(),
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "request handled"
    );

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
