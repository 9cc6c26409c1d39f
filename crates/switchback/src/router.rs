//! Route registry and the public router surface.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::{GroupNaming, RouterConfig};
use crate::dispatch::Dispatcher;
use crate::error::{Result, RouterError};
use crate::middleware::Middleware;
use crate::pattern::{self, PatternTable};
use crate::request::{Method, Request};
use crate::resolver::{Controller, Resolver};
use crate::response::Response;
use crate::route::{Callback, Route};

/// An ordered table of named routes plus the fallbacks used by dispatch.
///
/// Routes are tried in registration order; the first one whose method and
/// path both match wins.
#[derive(Debug)]
pub struct Router {
    config: RouterConfig,
    patterns: PatternTable,
    routes: Vec<Route>,
    names: HashMap<String, usize>,
    resolver: Resolver,
    not_found: Option<Callback>,
    error: Option<Callback>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty router with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(RouterConfig::default(), PatternTable::new(), Resolver::new())
    }

    /// Creates an empty router. Extra patterns in `config` are merged over
    /// the built-in table.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidToken`] when a configured token is not a
    /// colon followed by an identifier.
    pub fn with_config(config: RouterConfig) -> Result<Self> {
        let mut patterns = PatternTable::new();
        for (token, fragment) in &config.patterns {
            patterns.insert(token, fragment.clone())?;
        }
        Ok(Self::with_parts(config, patterns, Resolver::new()))
    }

    fn with_parts(config: RouterConfig, patterns: PatternTable, resolver: Resolver) -> Self {
        Self {
            config,
            patterns,
            routes: Vec::new(),
            names: HashMap::new(),
            resolver,
            not_found: None,
            error: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the pattern table routes are compiled against.
    #[must_use]
    pub const fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    /// Adds a placeholder token for routes registered afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidToken`] when `token` is not a colon
    /// followed by an identifier.
    pub fn pattern(&mut self, token: &str, fragment: impl Into<String>) -> Result<&mut Self> {
        self.patterns.insert(token, fragment)?;
        Ok(self)
    }

    /// Registers a route.
    ///
    /// `middleware` names a unit registered with
    /// [`Router::register_middleware`]; pass `""` for none.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateRouteName`] when `name` is taken, or a
    /// pattern error when `path` does not compile.
    pub fn route(
        &mut self,
        method: Method,
        name: &str,
        path: &str,
        callback: impl Into<Callback>,
        middleware: &str,
    ) -> Result<&mut Self> {
        let route = self.prepare(
            method,
            name.to_string(),
            path.to_string(),
            callback.into(),
            middleware.to_string(),
        )?;
        warn_unknown(&route, route.pattern.unknown_tokens());
        self.push(route);
        Ok(self)
    }

    /// Registers a route for every method.
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn any(
        &mut self,
        name: &str,
        path: &str,
        callback: impl Into<Callback>,
    ) -> Result<&mut Self> {
        self.route(Method::Any, name, path, callback, "")
    }

    /// Registers a GET route.
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn get(
        &mut self,
        name: &str,
        path: &str,
        callback: impl Into<Callback>,
    ) -> Result<&mut Self> {
        self.route(Method::Get, name, path, callback, "")
    }

    /// Registers a POST route.
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn post(
        &mut self,
        name: &str,
        path: &str,
        callback: impl Into<Callback>,
    ) -> Result<&mut Self> {
        self.route(Method::Post, name, path, callback, "")
    }

    /// Registers a PUT route.
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn put(
        &mut self,
        name: &str,
        path: &str,
        callback: impl Into<Callback>,
    ) -> Result<&mut Self> {
        self.route(Method::Put, name, path, callback, "")
    }

    /// Registers a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn delete(
        &mut self,
        name: &str,
        path: &str,
        callback: impl Into<Callback>,
    ) -> Result<&mut Self> {
        self.route(Method::Delete, name, path, callback, "")
    }

    /// Registers a PATCH route.
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn patch(
        &mut self,
        name: &str,
        path: &str,
        callback: impl Into<Callback>,
    ) -> Result<&mut Self> {
        self.route(Method::Patch, name, path, callback, "")
    }

    /// Registers the routes built by `build` under `prefix`.
    ///
    /// `build` receives an empty router sharing this router's configuration,
    /// pattern table and registered factories. Its routes are then merged in
    /// with the prefix prepended to their paths and their names composed per
    /// [`GroupNaming`]. Controllers and middleware registered inside `build`
    /// are kept; fallbacks set there are not. The merge is all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns the first error from `build`, or
    /// [`RouterError::DuplicateRouteName`] when a composed name is taken.
    ///
    /// # Example
    ///
    /// ```
    /// use switchback::{Callback, Router};
    ///
    /// let mut router = Router::new();
    /// router.group("/admin", |admin| {
    ///     admin.get("dashboard", "/", Callback::closure(|_, _, _| Ok("admin".into())))?;
    ///     admin.get("user", "/users/:id", "Admin/Users@show")?;
    ///     Ok(())
    /// }).unwrap();
    ///
    /// assert_eq!(router.url_for("admin.dashboard", &[]), Some("/admin".to_string()));
    /// assert_eq!(router.url_for("admin.user", &["7"]), Some("/admin/users/7".to_string()));
    /// ```
    pub fn group<F>(&mut self, prefix: &str, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut group = Self::with_parts(
            self.config.clone(),
            self.patterns.clone(),
            self.resolver.clone(),
        );
        build(&mut group)?;

        let base = prefix.trim_end_matches('/');
        let mut merged = Vec::with_capacity(group.routes.len());
        for route in group.routes {
            let path = match (route.path.as_str(), base) {
                ("/", "") => "/".to_string(),
                ("/", _) => base.to_string(),
                (child, _) => format!("{base}{child}"),
            };
            let name = self.group_name(prefix, &route.name);
            let inherited = route.pattern.unknown_tokens().len();
            let composed =
                self.prepare(route.method, name, path, route.callback, route.middleware)?;
            merged.push((composed, inherited));
        }

        debug!(prefix, routes = merged.len(), "group merged");
        for (route, inherited) in merged {
            // Tokens from the child template were reported when it was registered.
            let unknown = route.pattern.unknown_tokens();
            warn_unknown(&route, &unknown[..unknown.len() - inherited]);
            self.push(route);
        }
        self.resolver = group.resolver;
        Ok(self)
    }

    fn group_name(&self, prefix: &str, name: &str) -> String {
        match self.config.group_naming {
            GroupNaming::Verbatim => name.to_string(),
            GroupNaming::Prefixed => {
                let scope = prefix.trim_matches('/').replace('/', ".");
                if scope.is_empty() {
                    name.to_string()
                } else {
                    format!("{scope}.{name}")
                }
            }
        }
    }

    fn prepare(
        &self,
        method: Method,
        name: String,
        path: String,
        callback: Callback,
        middleware: String,
    ) -> Result<Route> {
        if self.names.contains_key(&name) {
            return Err(RouterError::DuplicateRouteName(name));
        }
        let pattern = self
            .patterns
            .compile(&path, self.config.unknown_placeholders)?;
        Ok(Route {
            name,
            path,
            method,
            callback,
            middleware,
            pattern,
        })
    }

    fn push(&mut self, route: Route) {
        debug!(
            method = %route.method,
            name = %route.name,
            path = %route.path,
            "route registered"
        );
        self.names.insert(route.name.clone(), self.routes.len());
        self.routes.push(route);
    }

    /// Sets the handler for requests no route matches.
    pub fn not_found(&mut self, callback: impl Into<Callback>) -> &mut Self {
        self.not_found = Some(callback.into());
        self
    }

    /// Sets the handler for failures during dispatch.
    ///
    /// The failure is available through [`Params::error`](crate::Params::error).
    pub fn error(&mut self, callback: impl Into<Callback>) -> &mut Self {
        self.error = Some(callback.into());
        self
    }

    /// Registers a controller factory for `Controller@action` callbacks.
    pub fn register_controller<C, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.resolver.register_controller(name, factory);
        self
    }

    /// Registers a middleware factory.
    pub fn register_middleware<M, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        M: Middleware + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.resolver.register_middleware(name, factory);
        self
    }

    /// Returns the registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Looks up a route by name.
    #[must_use]
    pub fn route_named(&self, name: &str) -> Option<&Route> {
        self.names.get(name).map(|&index| &self.routes[index])
    }

    /// Generates a URL for a named route.
    ///
    /// Placeholders are replaced positionally by `params`. The raw template is
    /// returned when `params` is empty, when the template has no
    /// placeholders, or when the counts differ.
    ///
    /// # Example
    ///
    /// ```
    /// use switchback::Router;
    ///
    /// let mut router = Router::new();
    /// router.get("user.show", "/users/:id", "Users@show").unwrap();
    ///
    /// assert_eq!(router.url_for("user.show", &[]), Some("/users/:id".to_string()));
    /// assert_eq!(router.url_for("user.show", &["42"]), Some("/users/42".to_string()));
    /// assert_eq!(router.url_for("missing", &[]), None);
    /// ```
    #[must_use]
    pub fn url_for(&self, name: &str, params: &[&str]) -> Option<String> {
        let route = self.route_named(name)?;
        Some(pattern::fill(&route.path, params).unwrap_or_else(|| route.path.clone()))
    }

    /// Finds the first route serving `request`, with its captured values.
    #[must_use]
    pub fn find(&self, request: &Request) -> Option<(&Route, Vec<String>)> {
        self.routes
            .iter()
            .find_map(|route| route.matches(request).map(|params| (route, params)))
    }

    /// Dispatches one request and returns the response.
    ///
    /// Never fails: unmatched requests go to the not-found handler and every
    /// failure goes to the error handler, or to the default messages.
    #[must_use]
    pub fn run(&self, request: &Request) -> Response {
        let mut response = Response::default();
        self.dispatch(request, &mut response);
        response
    }

    /// Dispatches one request, writing into `response`.
    pub fn dispatch(&self, request: &Request, response: &mut Response) {
        Dispatcher::new(self, request).dispatch(response);
    }

    pub(crate) const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub(crate) const fn not_found_handler(&self) -> Option<&Callback> {
        self.not_found.as_ref()
    }

    pub(crate) const fn error_handler(&self) -> Option<&Callback> {
        self.error.as_ref()
    }
}

fn warn_unknown(route: &Route, tokens: &[String]) {
    for token in tokens {
        warn!(
            name = %route.name,
            path = %route.path,
            token = %token,
            "unknown placeholder compiled as a segment capture"
        );
    }
}
