//! Route records and handler references.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::pattern::CompiledPath;
use crate::request::{Method, Params, Request};
use crate::response::Response;

/// What a handler produces: text appended to the response body.
pub type HandlerResult = Result<String>;

/// A boxed handler function.
pub type Handler = Arc<dyn Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync>;

/// The target a route dispatches to.
#[derive(Clone)]
pub enum Callback {
    /// An inline handler.
    Closure(Handler),
    /// A `Controller@action` reference. The controller is resolved through
    /// the configured controller namespace unless already qualified.
    Reference(String),
    /// A controller/action pair. The controller name is used as given.
    Pair {
        /// Fully-qualified controller name.
        controller: String,
        /// Action to invoke.
        action: String,
    },
}

impl Callback {
    /// Wraps a closure.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Closure(Arc::new(f))
    }

    /// Creates a `Controller@action` reference.
    pub fn reference(reference: impl Into<String>) -> Self {
        Self::Reference(reference.into())
    }

    /// Creates a controller/action pair.
    pub fn pair(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Pair {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl From<&str> for Callback {
    fn from(reference: &str) -> Self {
        Self::reference(reference)
    }
}

impl From<String> for Callback {
    fn from(reference: String) -> Self {
        Self::Reference(reference)
    }
}

impl From<(&str, &str)> for Callback {
    fn from((controller, action): (&str, &str)) -> Self {
        Self::pair(controller, action)
    }
}

impl From<Handler> for Callback {
    fn from(handler: Handler) -> Self {
        Self::Closure(handler)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Closure(a), Self::Closure(b)) => Arc::ptr_eq(a, b),
            (Self::Reference(a), Self::Reference(b)) => a == b,
            (
                Self::Pair {
                    controller: c1,
                    action: a1,
                },
                Self::Pair {
                    controller: c2,
                    action: a2,
                },
            ) => c1 == c2 && a1 == a2,
            _ => false,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure(_) => f.write_str("Closure(..)"),
            Self::Reference(reference) => f.debug_tuple("Reference").field(reference).finish(),
            Self::Pair { controller, action } => f
                .debug_struct("Pair")
                .field("controller", controller)
                .field("action", action)
                .finish(),
        }
    }
}

/// A single registered route.
#[derive(Debug, Clone)]
pub struct Route {
    /// Unique route name.
    pub name: String,
    /// Path template, as registered.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// Dispatch target.
    pub callback: Callback,
    /// Middleware name; empty means none.
    pub middleware: String,
    pub(crate) pattern: CompiledPath,
}

impl Route {
    /// Returns the compiled path pattern.
    #[must_use]
    pub const fn pattern(&self) -> &CompiledPath {
        &self.pattern
    }

    /// Returns the captured parameters when this route serves `request`.
    #[must_use]
    pub fn matches(&self, request: &Request) -> Option<Vec<String>> {
        if !self.method.accepts(request.method) {
            return None;
        }
        self.pattern.match_path(&request.path)
    }
}
