//! Middleware trait, type erasure and the `next` continuation.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, metrics, request-id injection,
//! authentication-header inspection, error-to-response conversion.
//!
//! # Double-pass model
//!
//! Every middleware sees the request on the way in and the response on the
//! way out:
//!
//! ```text
//! invoke()
//!   ├─ mw[0].process(req, res, next₁)   ← forward pass
//!   │    ├─ mw[1].process(req, res, next₂)
//!   │    │    └─ next₂.run(..)          ← chain exhausted: response untouched
//!   │    └─ post-process res            ← backward pass
//!   └─ post-process res
//! ```
//!
//! The request and response are threaded through as `&mut` borrows of the
//! dispatcher's own state, so exactly one of each exists for the whole
//! invocation. "Returning a response" means writing it into `*response`.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::BoxError;

// ── Public Middleware trait ───────────────────────────────────────────────────

/// A unit of request/response processing.
///
/// An implementation may:
///
/// - inspect or replace `*request`,
/// - call [`next.run(request, response)`](Next::run) to delegate to the rest
///   of the chain, then post-process `*response`,
/// - or write `*response` directly and return without touching `next`,
///   short-circuiting everything after it.
///
/// Errors are not caught by the dispatcher. Whatever `process` returns as
/// `Err` reaches the caller of [`Harmony::invoke`](crate::Harmony::invoke).
///
/// # Example
///
/// ```rust
/// use harmony::{BoxError, Middleware, Next, Request, Response};
///
/// struct PoweredBy;
///
/// impl Middleware<Request, Response> for PoweredBy {
///     fn process(
///         &self,
///         request: &mut Request,
///         response: &mut Response,
///         next: Next<'_, Request, Response>,
///     ) -> Result<(), BoxError> {
///         next.run(request, response)?;
///         response.headers_mut().insert("x-powered-by", "harmony".parse()?);
///         Ok(())
///     }
/// }
/// ```
pub trait Middleware<Req, Res>: Send + Sync + 'static {
    fn process(
        &self,
        request: &mut Req,
        response: &mut Res,
        next: Next<'_, Req, Res>,
    ) -> Result<(), BoxError>;
}

/// A heap-allocated, type-erased middleware.
///
/// `Arc` because the same value is held twice: once by its chain node and,
/// when registered under a name, once by the name index. Pass one to
/// [`Harmony::add_shared_middleware`](crate::Harmony::add_shared_middleware)
/// to register a middleware you keep a handle to.
pub type BoxedMiddleware<Req, Res> = Arc<dyn Middleware<Req, Res>>;

// ── Closures ──────────────────────────────────────────────────────────────────

/// Wraps a closure as a [`Middleware`].
///
/// The bound is spelled out here rather than on a blanket impl so that the
/// closure's argument types, including the lifetime of [`Next`], are inferred
/// at the call site:
///
/// ```rust
/// use harmony::{Harmony, Request, Response, middleware};
///
/// let mut harmony = Harmony::new(Request::default(), Response::default());
/// harmony.add_middleware(middleware::from_fn(
///     |request: &mut Request, response: &mut Response, next| {
///         next.run(request, response)?;
///         *response.status_mut() = http::StatusCode::ACCEPTED;
///         Ok(())
///     },
/// ));
/// ```
pub fn from_fn<Req, Res, F>(f: F) -> FromFn<F>
where
    F: Fn(&mut Req, &mut Res, Next<'_, Req, Res>) -> Result<(), BoxError>
        + Send
        + Sync
        + 'static,
{
    FromFn(f)
}

/// Newtype returned by [`from_fn`], bridging a closure to [`Middleware`].
#[derive(Clone)]
pub struct FromFn<F>(F);

impl<Req, Res, F> Middleware<Req, Res> for FromFn<F>
where
    F: Fn(&mut Req, &mut Res, Next<'_, Req, Res>) -> Result<(), BoxError>
        + Send
        + Sync
        + 'static,
{
    fn process(
        &self,
        request: &mut Req,
        response: &mut Res,
        next: Next<'_, Req, Res>,
    ) -> Result<(), BoxError> {
        (self.0)(request, response, next)
    }
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

// ── Chain nodes ───────────────────────────────────────────────────────────────

/// One node of the chain. Two nodes may share a name; only the index cares.
pub(crate) struct Entry<Req, Res> {
    pub(crate) name: Option<String>,
    pub(crate) middleware: BoxedMiddleware<Req, Res>,
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The continuation handed to each middleware: "advance and continue".
///
/// It borrows the chain and remembers its cursor. [`run`](Next::run) takes
/// `self` by value, so a middleware can delegate at most once.
pub struct Next<'a, Req, Res> {
    chain: &'a [Entry<Req, Res>],
    cursor: usize,
}

impl<'a, Req: 'static, Res: 'static> Next<'a, Req, Res> {
    pub(crate) fn new(chain: &'a [Entry<Req, Res>]) -> Self {
        Self { chain, cursor: 0 }
    }

    /// Dispatches to the middleware at the cursor, handing it a continuation
    /// for the position after it.
    ///
    /// Once the chain is exhausted this returns `Ok(())` and leaves
    /// `*response` exactly as the caller passed it: the fallback response,
    /// or whatever an upstream middleware wrote.
    pub fn run(self, request: &mut Req, response: &mut Res) -> Result<(), BoxError> {
        let Some(entry) = self.chain.get(self.cursor) else {
            trace!(position = self.cursor, "middleware chain exhausted");
            return Ok(());
        };

        trace!(
            position = self.cursor,
            name = entry.name.as_deref().unwrap_or("<anonymous>"),
            "dispatching middleware"
        );

        let next = Self { chain: self.chain, cursor: self.cursor + 1 };
        entry.middleware.process(request, response, next)
    }

    /// Number of middleware still ahead of this continuation.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.cursor)
    }
}

impl<Req, Res> fmt::Debug for Next<'_, Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("cursor", &self.cursor)
            .field("len", &self.chain.len())
            .finish()
    }
}
