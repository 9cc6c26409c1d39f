//! # switchback
//!
//! A synchronous, first-match URL router with middleware support.
//!
//! This crate provides:
//! - Path templates with `:token` placeholders backed by a regex pattern table
//! - HTTP method-based routing, including `ANY`
//! - Route groups with prefixes and composed names
//! - Named routes for reverse URL lookup
//! - A single middleware unit per route with an explicit continuation
//! - Not-found and error fallbacks, so every request gets a response
//!
//! ## Quick Start
//!
//! ```
//! use switchback::{Callback, Request, Router};
//!
//! let mut router = Router::new();
//! router
//!     .get("home", "/", Callback::closure(|_, _, _| Ok("Hello, World!".into())))
//!     .unwrap()
//!     .get("user.show", "/users/:id", Callback::closure(|_, _, params| {
//!         Ok(format!("User {}", params.require(0)?))
//!     }))
//!     .unwrap();
//!
//! let res = router.run(&Request::get("/users/42"));
//! assert_eq!(res.body(), "User 42");
//!
//! let res = router.run(&Request::get("/users/abc"));
//! assert_eq!(res.status, 404);
//! assert_eq!(res.body(), "404 Not Found");
//! ```
//!
//! ## Placeholders
//!
//! | token | matches |
//! |---|---|
//! | `:id`, `:int` | digits |
//! | `:any` | one path segment |
//! | `:all` | the rest of the path |
//! | `:number`, `:float` | signed decimals |
//! | `:bool` | `true`, `false`, `1`, `0` |
//! | `:slug`, `:string` | word characters and dashes |
//! | `:uuid` | lower-case UUIDs |
//! | `:date` | `YYYY-MM-DD` |
//!
//! More can be added with [`Router::pattern`] or [`RouterConfig::patterns`].
//!
//! ## Controllers and Middleware
//!
//! String callbacks such as `"Users@show"` and middleware names are looked up
//! in factories registered on the router, after applying the namespaces from
//! [`RouterConfig`].
//!
//! ```
//! use switchback::{
//!     AuthMiddleware, Controller, HandlerResult, Method, Params, Request, Response, Router,
//!     RouterConfig,
//! };
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn call(&mut self, action: &str, _: &Request, _: &mut Response, p: &Params)
//!         -> Option<HandlerResult>
//!     {
//!         match action {
//!             "show" => Some(Ok(format!("user {}", p.get(0)?))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let config = RouterConfig::new()
//!     .with_controller_namespace("app::controllers")
//!     .with_middleware_namespace("app::middleware");
//! let mut router = Router::with_config(config).unwrap();
//! router
//!     .register_controller("app::controllers::Users", || Users)
//!     .register_middleware("app::middleware::Auth", AuthMiddleware::new);
//! router
//!     .route(Method::Get, "user.show", "/users/:id", "Users@show", "Auth")
//!     .unwrap();
//!
//! assert_eq!(router.run(&Request::get("/users/1")).status, 401);
//!
//! let req = Request::get("/users/1").header("Authorization", "Bearer t");
//! assert_eq!(router.run(&req).body(), "user 1");
//! ```

mod config;
mod dispatch;
mod error;
mod middleware;
mod pattern;
mod request;
mod resolver;
mod response;
mod route;
mod router;

pub use config::{GroupNaming, PlaceholderPolicy, RouterConfig, NAMESPACE_SEPARATOR};
pub use error::{Result, RouterError};
pub use middleware::{AuthMiddleware, LoggingMiddleware, Middleware, Next};
pub use pattern::{CompiledPath, PatternTable};
pub use request::{Method, Params, Request};
pub use resolver::{Controller, Resolver};
pub use response::Response;
pub use route::{Callback, Handler, HandlerResult, Route};
pub use router::Router;
