//! Conditions: predicates that decide whether a callback gets to reshape the
//! dispatcher before the chain runs.
//!
//! Register them with [`Harmony::add_condition`](crate::Harmony::add_condition):
//!
//! ```rust
//! use harmony::{Harmony, Request, Response, condition::PathPrefix, middleware};
//!
//! let mut harmony = Harmony::new(Request::default(), Response::default());
//! harmony.add_condition(PathPrefix::new(["/api"]), |harmony| {
//!     harmony.add_named_middleware("api-version", middleware::from_fn(
//!         |request: &mut Request, response: &mut Response, next| {
//!             next.run(request, response)?;
//!             response.headers_mut().insert("api-version", "1".parse()?);
//!             Ok(())
//!         },
//!     ));
//!     Ok(())
//! });
//! ```

use http::Method;

/// A predicate over the dispatcher's current request and response.
///
/// Evaluated once per invocation, before any middleware runs. Any
/// `Fn(&Req, &Res) -> bool` closure is a condition.
pub trait Condition<Req, Res>: Send + Sync + 'static {
    fn evaluate(&self, request: &Req, response: &Res) -> bool;
}

impl<Req, Res, F> Condition<Req, Res> for F
where
    F: Fn(&Req, &Res) -> bool + Send + Sync + 'static,
{
    fn evaluate(&self, request: &Req, response: &Res) -> bool {
        self(request, response)
    }
}

/// A condition whose outcome is fixed when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Always(bool);

/// Builds a condition that always evaluates to `outcome`.
pub fn always(outcome: bool) -> Always {
    Always(outcome)
}

impl<Req, Res> Condition<Req, Res> for Always {
    fn evaluate(&self, _request: &Req, _response: &Res) -> bool {
        self.0
    }
}

// ── HTTP conditions ───────────────────────────────────────────────────────────

/// Matches when the request method is one of the given methods.
#[derive(Debug, Clone)]
pub struct HttpMethod {
    methods: Vec<Method>,
}

impl HttpMethod {
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        Self { methods: methods.into_iter().collect() }
    }
}

impl<B, Res> Condition<http::Request<B>, Res> for HttpMethod {
    fn evaluate(&self, request: &http::Request<B>, _response: &Res) -> bool {
        self.methods.contains(request.method())
    }
}

/// Matches when the URI path equals one of the given paths.
#[derive(Debug, Clone)]
pub struct ExactPath {
    paths: Vec<String>,
}

impl ExactPath {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { paths: paths.into_iter().map(Into::into).collect() }
    }
}

impl<B, Res> Condition<http::Request<B>, Res> for ExactPath {
    fn evaluate(&self, request: &http::Request<B>, _response: &Res) -> bool {
        let path = request.uri().path();
        self.paths.iter().any(|p| p == path)
    }
}

/// Matches when the URI path starts with one of the given prefixes.
#[derive(Debug, Clone)]
pub struct PathPrefix {
    prefixes: Vec<String>,
}

impl PathPrefix {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { prefixes: prefixes.into_iter().map(Into::into).collect() }
    }
}

impl<B, Res> Condition<http::Request<B>, Res> for PathPrefix {
    fn evaluate(&self, request: &http::Request<B>, _response: &Res) -> bool {
        let path = request.uri().path();
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}
