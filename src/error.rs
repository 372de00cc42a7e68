//! Error type shared by middleware and the dispatcher.

/// The error type middleware return from [`Middleware::process`](crate::Middleware::process).
///
/// harmony has no failure mode of its own: a missing named middleware is a
/// plain `None`, and everything else is whatever a middleware raised. That
/// error travels back to the caller of [`Harmony::invoke`](crate::Harmony::invoke)
/// untouched, so callers can downcast it to the concrete type they expect.
///
/// Application-level failures (404, 500, etc.) are better expressed as
/// responses written by an error-handling middleware near the head of the
/// chain.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
