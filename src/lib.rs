//! # harmony
//!
//! A minimal HTTP middleware dispatcher. One request, one response, one
//! ordered chain of middleware. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! harmony does not parse HTTP, open sockets, or route. Your server does
//! server things; harmony runs the chain. It threads a request and a response
//! through middleware and hands back whatever response comes out the other
//! end.
//!
//! What's left for harmony:
//!
//! - Double-pass middleware: every unit sees the request going in and the
//!   response coming out, and may short-circuit the rest of the chain
//! - Named middleware: look a registered unit up again by name
//! - Conditions: predicates evaluated right before the chain runs, whose
//!   callbacks may add more middleware for this request only
//!
//! Middleware errors are never caught. Put an error-handling middleware at
//! the head of the chain if you want them turned into responses.
//!
//! ## Quick start
//!
//! ```rust
//! use harmony::{BoxError, Harmony, Middleware, Next, Request, Response};
//! use harmony::condition::HttpMethod;
//! use http::{Method, StatusCode};
//!
//! struct RequestId;
//!
//! impl Middleware<Request, Response> for RequestId {
//!     fn process(
//!         &self,
//!         request: &mut Request,
//!         response: &mut Response,
//!         next: Next<'_, Request, Response>,
//!     ) -> Result<(), BoxError> {
//!         next.run(request, response)?;
//!         response.headers_mut().insert("x-request-id", "42".parse()?);
//!         Ok(())
//!     }
//! }
//!
//! struct MethodNotAllowed;
//!
//! impl Middleware<Request, Response> for MethodNotAllowed {
//!     fn process(
//!         &self,
//!         _request: &mut Request,
//!         response: &mut Response,
//!         _next: Next<'_, Request, Response>,
//!     ) -> Result<(), BoxError> {
//!         *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
//!         Ok(())
//!     }
//! }
//!
//! let request = http::Request::builder()
//!     .method(Method::DELETE)
//!     .uri("/users/42")
//!     .body(bytes::Bytes::new())
//!     .unwrap();
//!
//! let mut harmony = Harmony::new(request, Response::default());
//! harmony
//!     .add_named_middleware("request-id", RequestId)
//!     .add_condition(HttpMethod::new([Method::DELETE]), |harmony| {
//!         harmony.add_middleware(MethodNotAllowed);
//!         Ok(())
//!     });
//!
//! let response = harmony.invoke().unwrap();
//! assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
//! assert_eq!(response.headers()["x-request-id"], "42");
//! ```

mod error;
mod harmony;

pub mod condition;
pub mod middleware;

pub use condition::Condition;
pub use error::BoxError;
pub use harmony::Harmony;
pub use middleware::{BoxedMiddleware, Middleware, Next};

/// The default request type: an [`http::Request`] with a [`bytes::Bytes`] body.
pub type Request = http::Request<bytes::Bytes>;

/// The default response type: an [`http::Response`] with a [`bytes::Bytes`] body.
pub type Response = http::Response<bytes::Bytes>;
