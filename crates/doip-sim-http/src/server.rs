//! Context registry and HTTP server lifecycle
//!
//! [`DoipHttpServer`] owns a set of (path prefix → handler) bindings and
//! the listening socket. Bindings and the running state live behind one
//! mutex, so registration checks and the check-then-act sequences in
//! [`DoipHttpServer::start`]/[`DoipHttpServer::stop`] are atomic under
//! concurrent calls.
//!
//! Requests are dispatched to the handler with the longest registered
//! prefix matching the request path; unmatched paths get a plain 404.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ServerError;

/// Default listen port when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// The request view handed to context handlers: method, split URI, the
/// effective Host header and the raw body.
#[derive(Debug, Clone)]
pub struct SimRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub host: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// A request dispatcher bound to a path prefix.
#[async_trait]
pub trait ContextHandler: Send + Sync {
    async fn handle(&self, request: SimRequest) -> Response;
}

/// A (path prefix, handler) pair registered with the server.
#[derive(Clone)]
pub struct ContextBinding {
    pub prefix: String,
    pub handler: Arc<dyn ContextHandler>,
}

impl ContextBinding {
    pub fn new(prefix: impl Into<String>, handler: Arc<dyn ContextHandler>) -> Self {
        Self {
            prefix: prefix.into(),
            handler,
        }
    }
}

struct RunningServer {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

struct Inner {
    bindings: Vec<ContextBinding>,
    running: Option<RunningServer>,
}

/// HTTP server with a programmable context registry.
pub struct DoipHttpServer {
    addr: SocketAddr,
    inner: Mutex<Inner>,
}

impl DoipHttpServer {
    /// Create a server that will listen on the given address once started.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            inner: Mutex::new(Inner {
                bindings: Vec::new(),
                running: None,
            }),
        }
    }

    /// Create a server listening on all interfaces on `port`.
    pub fn with_port(port: u16) -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    /// Register a handler for a path prefix.
    ///
    /// Duplicate prefixes and registration while the server is running are
    /// rejected; both are non-fatal to callers, which typically log the
    /// returned error and proceed.
    pub async fn add_binding(
        &self,
        prefix: impl Into<String>,
        handler: Arc<dyn ContextHandler>,
    ) -> Result<(), ServerError> {
        let prefix = prefix.into();
        let mut inner = self.inner.lock().await;

        if inner.running.is_some() {
            warn!(prefix = %prefix, "Server is running; binding not added");
            return Err(ServerError::Running);
        }
        if inner.bindings.iter().any(|b| b.prefix == prefix) {
            warn!(prefix = %prefix, "Mapping context already exists; not adding it again");
            return Err(ServerError::DuplicateBinding(prefix));
        }

        info!(prefix = %prefix, "Added mapping context");
        inner.bindings.push(ContextBinding::new(prefix, handler));
        Ok(())
    }

    /// Register a list of bindings in order. Rejected entries are logged
    /// and skipped; the remaining entries are still applied.
    pub async fn add_bindings(&self, bindings: Vec<ContextBinding>) {
        for binding in bindings {
            if let Err(err) = self.add_binding(binding.prefix, binding.handler).await {
                warn!(error = %err, "Skipping binding");
            }
        }
    }

    /// Whether a handler is registered for this exact prefix.
    pub async fn binding_exists(&self, prefix: &str) -> bool {
        self.inner
            .lock()
            .await
            .bindings
            .iter()
            .any(|b| b.prefix == prefix)
    }

    /// Registered prefixes, in registration order.
    pub async fn binding_prefixes(&self) -> Vec<String> {
        self.inner
            .lock()
            .await
            .bindings
            .iter()
            .map(|b| b.prefix.clone())
            .collect()
    }

    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.running.is_some()
    }

    /// The bound address while running. With port 0 this is where the OS
    /// actually put the listener.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.inner
            .lock()
            .await
            .running
            .as_ref()
            .map(|r| r.local_addr)
    }

    /// Start listening. Idempotent: a second call while running is a no-op.
    ///
    /// The current binding set is snapshotted into an immutable dispatch
    /// table; bind failures are returned to the caller since they indicate
    /// fatal misconfiguration (port in use).
    pub async fn start(&self) -> Result<(), ServerError> {
        let mut inner = self.inner.lock().await;

        if inner.running.is_some() {
            info!("Server already running");
            return Ok(());
        }

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        let table = DispatchTable {
            bindings: Arc::new(inner.bindings.clone()),
        };
        let router = Router::new()
            .fallback(dispatch)
            .with_state(table)
            .layer(TraceLayer::new_for_http());

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        info!(port = local_addr.port(), "Server is running");
        inner.running = Some(RunningServer {
            local_addr,
            shutdown_tx,
            handle,
        });

        Ok(())
    }

    /// Stop listening and release the socket immediately (no drain).
    /// Idempotent: a call while stopped is a no-op.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;

        if let Some(running) = inner.running.take() {
            let _ = running.shutdown_tx.send(());
            running.handle.abort();
            // Await the aborted task so the listener is closed before we return.
            let _ = running.handle.await;
            info!("Server stopped");
        }
    }
}

#[derive(Clone)]
struct DispatchTable {
    bindings: Arc<Vec<ContextBinding>>,
}

impl DispatchTable {
    /// Longest registered prefix that is a prefix of `path`.
    fn resolve(&self, path: &str) -> Option<&ContextBinding> {
        self.bindings
            .iter()
            .filter(|b| path.starts_with(&b.prefix))
            .max_by_key(|b| b.prefix.len())
    }
}

async fn dispatch(
    State(table): State<DispatchTable>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(binding) = table.resolve(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };

    let request = SimRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(|q| q.to_string()),
        host: header_str(header::HOST),
        content_type: header_str(header::CONTENT_TYPE),
        body,
    };

    info!(method = %request.method, path = %request.path, "Received HTTP request");
    binding.handler.handle(request).await
}
