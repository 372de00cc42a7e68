//! The dispatcher.
//!
//! One [`Harmony`] per request. Build it with the incoming request and a
//! fallback response, register middleware and conditions, invoke it once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::condition::Condition;
use crate::error::BoxError;
use crate::middleware::{BoxedMiddleware, Entry, Middleware, Next};
use crate::{Request, Response};

/// A registered (condition, callback) pair.
struct Pending<Req, Res> {
    condition: Box<dyn Condition<Req, Res>>,
    callback: Box<dyn Fn(&mut Harmony<Req, Res>) -> Result<(), BoxError> + Send + Sync>,
}

/// Owns one request/response pair and the middleware chain that runs over it.
///
/// The chain and the name index are kept apart: every
/// [`add_middleware`](Harmony::add_middleware) call appends a node, and a
/// name only decides what [`get_middleware`](Harmony::get_middleware) finds.
/// Registering twice under one name therefore runs both middleware, while
/// lookup returns the newer one.
///
/// Each `add_*` call returns `&mut Self` so registrations chain naturally.
///
/// ```rust
/// use harmony::{Harmony, Request, Response, middleware};
///
/// let mut harmony = Harmony::new(Request::default(), Response::default());
/// harmony
///     .add_named_middleware("teapot", middleware::from_fn(
///         |_: &mut Request, response: &mut Response, _next| {
///             *response.status_mut() = http::StatusCode::IM_A_TEAPOT;
///             Ok(())
///         },
///     ));
///
/// let response = harmony.invoke().unwrap();
/// assert_eq!(response.status(), http::StatusCode::IM_A_TEAPOT);
/// ```
pub struct Harmony<Req = Request, Res = Response> {
    request: Req,
    response: Res,
    chain: Vec<Entry<Req, Res>>,
    named: HashMap<String, BoxedMiddleware<Req, Res>>,
    conditions: Vec<Arc<Pending<Req, Res>>>,
}

impl<Req: 'static, Res: 'static> Harmony<Req, Res> {
    /// Creates a dispatcher holding `request` and the fallback `response`.
    ///
    /// The fallback is what [`invoke`](Harmony::invoke) yields when no
    /// middleware writes a response of its own.
    pub fn new(request: Req, response: Res) -> Self {
        Self::with_capacity(request, response, 0)
    }

    /// Like [`new`](Harmony::new), reserving room for `capacity` middleware.
    pub fn with_capacity(request: Req, response: Res, capacity: usize) -> Self {
        Self {
            request,
            response,
            chain: Vec::with_capacity(capacity),
            named: HashMap::new(),
            conditions: Vec::new(),
        }
    }

    /// Appends an anonymous middleware to the chain.
    pub fn add_middleware(&mut self, middleware: impl Middleware<Req, Res>) -> &mut Self {
        self.add_shared_middleware(None, Arc::new(middleware))
    }

    /// Appends a middleware to the chain and indexes it under `name`.
    ///
    /// A previous middleware registered under the same name stays in the
    /// chain and still runs; only the index entry is replaced.
    pub fn add_named_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: impl Middleware<Req, Res>,
    ) -> &mut Self {
        self.add_shared_middleware(Some(name.into()), Arc::new(middleware))
    }

    /// Appends an already boxed middleware, indexing it under `name` if
    /// given. The chain and the index hold `middleware` itself, so
    /// [`get_middleware`](Harmony::get_middleware) hands back the same `Arc`.
    pub fn add_shared_middleware(
        &mut self,
        name: Option<String>,
        middleware: BoxedMiddleware<Req, Res>,
    ) -> &mut Self {
        if let Some(name) = &name {
            self.named.insert(name.clone(), Arc::clone(&middleware));
        }
        self.chain.push(Entry { name, middleware });
        self
    }

    /// Registers a condition. Nothing is evaluated until
    /// [`invoke`](Harmony::invoke).
    ///
    /// When `condition` holds, `callback` receives the dispatcher and may
    /// add middleware, replace the request or the response, or register
    /// further conditions (those only take part in the next invocation).
    /// An `Err` from the callback aborts [`invoke`](Harmony::invoke) before
    /// any middleware runs and is returned unchanged.
    pub fn add_condition<C, F>(&mut self, condition: C, callback: F) -> &mut Self
    where
        C: Condition<Req, Res>,
        F: Fn(&mut Harmony<Req, Res>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.conditions.push(Arc::new(Pending {
            condition: Box::new(condition),
            callback: Box::new(callback),
        }));
        self
    }

    /// Returns the middleware most recently registered under `name`.
    pub fn get_middleware(&self, name: &str) -> Option<&BoxedMiddleware<Req, Res>> {
        self.named.get(name)
    }

    pub fn request(&self) -> &Req { &self.request }
    pub fn request_mut(&mut self) -> &mut Req { &mut self.request }
    pub fn response(&self) -> &Res { &self.response }
    pub fn response_mut(&mut self) -> &mut Res { &mut self.response }

    /// Number of nodes in the chain, named or not.
    pub fn len(&self) -> usize { self.chain.len() }
    pub fn is_empty(&self) -> bool { self.chain.is_empty() }

    /// Consumes the dispatcher, returning the current request and response.
    pub fn into_parts(self) -> (Req, Res) {
        (self.request, self.response)
    }

    /// Resolves pending conditions, then runs the chain from the start.
    ///
    /// Returns the response left behind by the outermost middleware, or the
    /// fallback when the chain is empty or nobody wrote one. Errors raised by
    /// condition callbacks or middleware are returned as-is.
    pub fn invoke(&mut self) -> Result<&Res, BoxError> {
        self.resolve_conditions()?;

        debug!(middleware = self.chain.len(), "running middleware chain");
        Next::new(&self.chain).run(&mut self.request, &mut self.response)?;
        debug!("middleware chain finished");

        Ok(&self.response)
    }

    /// Evaluates every condition registered so far, in order, exactly once.
    fn resolve_conditions(&mut self) -> Result<(), BoxError> {
        // Callbacks can only append, so entries past `registered` are the
        // ones added during this pass.
        let registered = self.conditions.len();

        for index in 0..registered {
            let pending = Arc::clone(&self.conditions[index]);
            let matched = pending.condition.evaluate(&self.request, &self.response);
            debug!(condition = index, matched, "condition evaluated");
            if matched {
                (pending.callback)(self)?;
            }
        }

        Ok(())
    }
}

impl<Req, Res> fmt::Debug for Harmony<Req, Res>
where
    Req: fmt::Debug,
    Res: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harmony")
            .field("request", &self.request)
            .field("response", &self.response)
            .field("chain", &self.chain.iter().map(|e| e.name.as_deref()).collect::<Vec<_>>())
            .field("conditions", &self.conditions.len())
            .finish()
    }
}
