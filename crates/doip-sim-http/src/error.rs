//! Server error types

use thiserror::Error;

/// Errors surfaced by the context registry and server lifecycle
#[derive(Debug, Error)]
pub enum ServerError {
    /// The path prefix is already bound. Registration is idempotent-but-
    /// ignored: callers log this and proceed.
    #[error("Mapping context '{0}' already exists")]
    DuplicateBinding(String),

    /// Bindings cannot change while the listener is up.
    #[error("Server is running; binding not added")]
    Running,

    /// The listen socket could not be bound (port in use, bad address).
    /// Fatal to `start()`, reported to the caller.
    #[error("Failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),
}
