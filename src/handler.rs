//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in one tree per method,
//! and the middleware chain threads them through closures. Both need one
//! concrete type, so handlers are hidden behind a trait object:
//!
//! ```text
//! async fn hello(ctx: Context) -> Context { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_next()                               ← Handler blanket impl
//!        ↓
//! Next(Arc::new(FnHandler(hello)))                ← heap-allocated wrapper
//!        ↓
//! next.run(ctx)  at request time                  ← one vtable dispatch
//!        ↓
//! Box::pin(hello(ctx))                            ← BoxFuture
//! ```
//!
//! A handler takes the request [`Context`] by value and hands it back. The
//! context carries the response buffer, so whatever wraps the handler gets
//! the buffer back too and can still rewrite it before the flush.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

/// A heap-allocated, type-erased future that resolves to the [`Context`]
/// it was given.
///
/// `Send + 'static` let tokio move the future across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Context> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// public [`Next`] type. External crates cannot usefully interact with it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture;
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain, as seen from inside a middleware.
///
/// Cloning is one atomic increment. Call [`run`](Next::run) to continue
/// inward; drop it without calling to short-circuit.
#[derive(Clone)]
pub struct Next(Arc<dyn ErasedHandler + Send + Sync + 'static>);

impl Next {
    /// Runs everything inside this point of the chain and returns the
    /// context with whatever response the inner layers buffered.
    pub fn run(&self, ctx: Context) -> BoxFuture {
        self.0.call(ctx)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next")
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied by any `async fn`
/// (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(ctx: Context) -> Context
/// ```
///
/// The trait is **sealed**: only the blanket impl below and [`Next`] itself
/// satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_next(self) -> Next;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn into_next(self) -> Next {
        Next(Arc::new(FnHandler(self)))
    }
}

impl private::Sealed for Next {}

impl Handler for Next {
    fn into_next(self) -> Next { self }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype bridging a concrete handler `F` to the [`ErasedHandler`] object.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin((self.0)(ctx))
    }
}
