//! Error types.
//!
//! Two families, kept apart on purpose:
//!
//! - [`RouteError`]: the route table is wrong. Returned by every
//!   registration call on [`Router`](crate::Router). Propagate it with `?`
//!   and let `main` fail: a malformed or ambiguous table should never serve.
//! - [`Error`]: the transport failed (bad listen address, bind, accept).
//!
//! "No such route" is neither. It is a `404` [`Response`](crate::Response).

use std::fmt;

// ── Error ─────────────────────────────────────────────────────────────────────

/// The error type returned by [`Server::serve`](crate::Server::serve).
#[derive(Debug)]
pub enum Error {
    /// The listen address is not a valid `host:port`.
    Addr(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(addr) => write!(f, "invalid socket address `{addr}`"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Addr(_) => None,
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ── RouteError ────────────────────────────────────────────────────────────────

/// What was wrong with a rejected registration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouteErrorKind {
    /// The path itself is malformed: empty, no leading `/`, trailing `/`,
    /// `//`, a bad `:param` token, or a `*` that is not the last segment.
    Syntax,
    /// A `:name(pattern)` whose pattern does not compile.
    InvalidPattern,
    /// The path needs a wildcard and a parameter (or two different
    /// parameters) at the same position.
    Conflict,
    /// A handler is already registered for exactly this method and path.
    Duplicate,
}

/// A rejected route registration.
#[derive(Clone, Debug)]
pub struct RouteError {
    kind: RouteErrorKind,
    path: String,
    message: String,
}

impl RouteError {
    pub(crate) fn new(kind: RouteErrorKind, path: &str, message: impl Into<String>) -> Self {
        Self { kind, path: path.to_owned(), message: message.into() }
    }

    pub(crate) fn syntax(path: &str, message: impl Into<String>) -> Self {
        Self::new(RouteErrorKind::Syntax, path, message)
    }

    pub fn kind(&self) -> RouteErrorKind { self.kind }

    /// The registration path that was rejected.
    pub fn path(&self) -> &str { &self.path }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid route `{}`: {}", self.path, self.message)
    }
}

impl std::error::Error for RouteError {}
