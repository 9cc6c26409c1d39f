//! Middleware units and the continuation they drive.

use std::fmt;

use tracing::info;

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// The rest of the dispatch, handed to a middleware unit.
///
/// Calling [`Next::run`] runs the route handler synchronously and writes its
/// output to the response. Dropping it without running skips the handler,
/// leaving the middleware in charge of the response.
pub struct Next<'a> {
    proceed: Box<dyn FnOnce(&mut Response) + 'a>,
}

impl<'a> Next<'a> {
    /// Wraps a continuation.
    pub fn new(proceed: impl FnOnce(&mut Response) + 'a) -> Self {
        Self {
            proceed: Box::new(proceed),
        }
    }

    /// Proceeds to the handler.
    ///
    /// Handler failures are answered by the router's error fallback before
    /// this returns.
    pub fn run(self, response: &mut Response) {
        (self.proceed)(response);
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next(..)")
    }
}

/// A unit wrapped around a route handler.
///
/// # Example
///
/// ```
/// use switchback::{Middleware, Next, Request, Response, Result};
///
/// struct Maintenance;
///
/// impl Middleware for Maintenance {
///     fn handle(&self, _req: &Request, res: &mut Response, _next: Next<'_>) -> Result<()> {
///         res.status = 503;
///         res.write("Back soon");
///         Ok(())
///     }
/// }
/// ```
pub trait Middleware {
    /// Handles the request, invoking `next` to reach the route handler.
    ///
    /// # Errors
    ///
    /// Any error is answered by the router's error fallback.
    fn handle(&self, request: &Request, response: &mut Response, next: Next<'_>) -> Result<()>;
}

/// Middleware that requires an `Authorization` header or a session cookie.
#[derive(Debug, Clone, Default)]
pub struct AuthMiddleware {
    /// Where unauthenticated requests are redirected. Without one they get a 401.
    pub login_url: Option<String>,
}

impl AuthMiddleware {
    /// Creates auth middleware that answers 401.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirects unauthenticated requests to `login_url` instead.
    #[must_use]
    pub fn redirect_to(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = Some(login_url.into());
        self
    }

    fn is_authenticated(request: &Request) -> bool {
        request.get_header("Authorization").is_some()
            || request
                .get_header("Cookie")
                .is_some_and(|c| c.contains("session="))
    }
}

impl Middleware for AuthMiddleware {
    fn handle(&self, request: &Request, response: &mut Response, next: Next<'_>) -> Result<()> {
        if Self::is_authenticated(request) {
            next.run(response);
            return Ok(());
        }
        match &self.login_url {
            Some(url) => {
                response.status = 302;
                response.set_header("Location", url.clone());
            }
            None => {
                response.status = 401;
                response.write("Unauthorized");
            }
        }
        Ok(())
    }
}

/// Middleware that logs each request and its final status.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn handle(&self, request: &Request, response: &mut Response, next: Next<'_>) -> Result<()> {
        info!(method = %request.method, path = %request.path, "request");
        next.run(response);
        info!(status = response.status, "response");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_through(mw: &dyn Middleware, request: &Request) -> (Response, bool) {
        let mut reached = false;
        let mut response = Response::ok();
        mw.handle(
            request,
            &mut response,
            Next::new(|res: &mut Response| {
                reached = true;
                res.write("handler");
            }),
        )
        .unwrap();
        (response, reached)
    }

    #[test]
    fn test_auth_rejects_anonymous() {
        let (res, reached) = run_through(&AuthMiddleware::new(), &Request::get("/admin"));
        assert!(!reached);
        assert_eq!(res.status, 401);
        assert_eq!(res.body(), "Unauthorized");
    }

    #[test]
    fn test_auth_redirect() {
        let mw = AuthMiddleware::new().redirect_to("/login");
        let (res, reached) = run_through(&mw, &Request::get("/admin"));
        assert!(!reached);
        assert_eq!(res.status, 302);
        assert_eq!(res.headers.get("Location"), Some(&"/login".to_string()));
    }

    #[test]
    fn test_auth_passes_session() {
        let req = Request::get("/admin").header("Cookie", "theme=dark; session=abc");
        let (res, reached) = run_through(&AuthMiddleware::new(), &req);
        assert!(reached);
        assert_eq!(res.body(), "handler");
    }

    #[test]
    fn test_logging_forwards() {
        let (res, reached) = run_through(&LoggingMiddleware, &Request::get("/"));
        assert!(reached);
        assert_eq!(res.status, 200);
    }
}
