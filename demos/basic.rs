//! Minimal harmony example — error handling, response headers and a
//! condition that injects middleware only for API requests.
//!
//! Run with:
//!   RUST_LOG=trace cargo run --example basic -- /api/users/42
//!   RUST_LOG=debug cargo run --example basic -- /about
//!   cargo run --example basic -- /boom

use bytes::Bytes;
use harmony::condition::PathPrefix;
use harmony::{BoxError, Harmony, Middleware, Next, Request, Response, middleware};
use http::StatusCode;

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "/api/users/42".to_owned());
    let request = http::Request::builder().uri(path).body(Bytes::new())?;

    let mut fallback = Response::new(Bytes::from_static(b"not found"));
    *fallback.status_mut() = StatusCode::NOT_FOUND;

    let mut app = Harmony::new(request, fallback);
    app.add_named_middleware("errors", ErrorPage)
        .add_named_middleware("server", middleware::from_fn(server_header))
        .add_middleware(middleware::from_fn(boom));

    app.add_condition(PathPrefix::new(["/api/"]), |app| {
        app.add_named_middleware("users", UserApi);
        Ok(())
    });

    let response = app.invoke()?;

    println!("{:?} {}", response.version(), response.status());
    for (name, value) in response.headers() {
        println!("{name}: {value:?}");
    }
    println!();
    println!("{}", String::from_utf8_lossy(response.body()));
    Ok(())
}

// Head of the chain: turns any downstream error into a 500.
struct ErrorPage;

impl Middleware<Request, Response> for ErrorPage {
    fn process(
        &self,
        request: &mut Request,
        response: &mut Response,
        next: Next<'_, Request, Response>,
    ) -> Result<(), BoxError> {
        if let Err(e) = next.run(request, response) {
            tracing::error!("request failed: {e}");
            *response = Response::new(Bytes::from(format!("internal error: {e}")));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        }
        Ok(())
    }
}

// Post-processing: runs after everything downstream has answered.
fn server_header(
    request: &mut Request,
    response: &mut Response,
    next: Next<'_, Request, Response>,
) -> Result<(), BoxError> {
    next.run(request, response)?;
    response.headers_mut().insert("server", "harmony".parse()?);
    Ok(())
}

fn boom(
    request: &mut Request,
    response: &mut Response,
    next: Next<'_, Request, Response>,
) -> Result<(), BoxError> {
    if request.uri().path() == "/boom" {
        return Err("the /boom endpoint always fails".into());
    }
    next.run(request, response)
}

// Only present when the condition matched. Short-circuits: nothing after it runs.
struct UserApi;

impl Middleware<Request, Response> for UserApi {
    fn process(
        &self,
        request: &mut Request,
        response: &mut Response,
        _next: Next<'_, Request, Response>,
    ) -> Result<(), BoxError> {
        let id = request.uri().path().rsplit('/').next().unwrap_or("unknown");
        *response = Response::new(Bytes::from(format!(r#"{{"id":"{id}","name":"alice"}}"#)));
        response.headers_mut().insert("content-type", "application/json".parse()?);
        Ok(())
    }
}
