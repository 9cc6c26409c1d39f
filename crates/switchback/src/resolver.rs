//! Name-based lookup of controllers and middleware.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::middleware::Middleware;
use crate::request::{Params, Request};
use crate::response::Response;
use crate::route::HandlerResult;

/// A set of named actions reachable through `Controller@action` callbacks.
///
/// # Example
///
/// ```
/// use switchback::{Controller, HandlerResult, Params, Request, Response};
///
/// struct Users;
///
/// impl Controller for Users {
///     fn call(
///         &mut self,
///         action: &str,
///         _req: &Request,
///         _res: &mut Response,
///         params: &Params,
///     ) -> Option<HandlerResult> {
///         match action {
///             "show" => Some(Ok(format!("user {}", params.get(0).unwrap_or("?")))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Controller {
    /// Runs `action`, or returns `None` when the controller has no such action.
    fn call(
        &mut self,
        action: &str,
        request: &Request,
        response: &mut Response,
        params: &Params,
    ) -> Option<HandlerResult>;
}

type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;
type MiddlewareFactory = Arc<dyn Fn() -> Box<dyn Middleware> + Send + Sync>;

/// Factories keyed by fully-qualified name.
///
/// A fresh instance is built for every invocation.
#[derive(Clone, Default)]
pub struct Resolver {
    controllers: HashMap<String, ControllerFactory>,
    middleware: HashMap<String, MiddlewareFactory>,
}

impl Resolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller factory.
    pub fn register_controller<C, F>(&mut self, name: impl Into<String>, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.controllers.insert(
            name.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn Controller>),
        );
    }

    /// Registers a middleware factory.
    pub fn register_middleware<M, F>(&mut self, name: impl Into<String>, factory: F)
    where
        M: Middleware + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.middleware.insert(
            name.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn Middleware>),
        );
    }

    /// Builds the controller registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::ControllerNotFound`] for unknown names.
    pub fn controller(&self, name: &str) -> Result<Box<dyn Controller>> {
        self.controllers
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RouterError::ControllerNotFound(name.to_string()))
    }

    /// Builds the middleware registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MiddlewareNotFound`] for unknown names.
    pub fn middleware(&self, name: &str) -> Result<Box<dyn Middleware>> {
        self.middleware
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RouterError::MiddlewareNotFound(name.to_string()))
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("controllers", &self.controllers.keys().collect::<Vec<_>>())
            .field("middleware", &self.middleware.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::LoggingMiddleware;

    struct Echo;

    impl Controller for Echo {
        fn call(
            &mut self,
            action: &str,
            _request: &Request,
            _response: &mut Response,
            _params: &Params,
        ) -> Option<HandlerResult> {
            (action == "echo").then(|| Ok("echo".to_string()))
        }
    }

    #[test]
    fn test_lookup() {
        let mut resolver = Resolver::new();
        resolver.register_controller("app::Echo", || Echo);
        resolver.register_middleware("app::Log", || LoggingMiddleware);

        let mut controller = resolver.controller("app::Echo").unwrap();
        let reply = controller.call(
            "echo",
            &Request::get("/"),
            &mut Response::ok(),
            &Params::default(),
        );
        assert_eq!(reply.unwrap().unwrap(), "echo");
        assert!(resolver.middleware("app::Log").is_ok());
    }

    #[test]
    fn test_missing() {
        let resolver = Resolver::new();
        assert!(matches!(
            resolver.controller("Nope"),
            Err(RouterError::ControllerNotFound(name)) if name == "Nope"
        ));
        assert!(matches!(
            resolver.middleware("Nope"),
            Err(RouterError::MiddlewareNotFound(_))
        ));
    }
}
