//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
///
/// Configuration errors are returned from registration calls. Every other
/// variant is raised during dispatch and is always turned into a response
/// by the error fallback; [`Router::run`](crate::Router::run) never fails.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route with this name is already registered.
    #[error("route already exists: {0}")]
    DuplicateRouteName(String),

    /// The compiled path template is not a valid regular expression.
    #[error("invalid path pattern `{template}`: {source}")]
    InvalidPattern {
        /// The route path template.
        template: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The template uses a placeholder the pattern table does not know.
    #[error("unknown placeholder `{token}` in path `{template}`")]
    UnknownPlaceholder {
        /// The route path template.
        template: String,
        /// The offending token, including its leading colon.
        token: String,
    },

    /// A placeholder token that is not a colon followed by an identifier.
    #[error("invalid placeholder token `{0}`")]
    InvalidToken(String),

    /// Router configuration could not be parsed.
    #[error("invalid router configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// A method string outside the supported set.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// A `Controller@action` reference without the `@` separator.
    #[error("invalid callback reference: {0}")]
    InvalidCallback(String),

    /// No controller factory is registered under this name.
    #[error("controller {0} not found")]
    ControllerNotFound(String),

    /// The controller exists but has no such action.
    #[error("method {action} not found in {controller}")]
    ActionNotFound {
        /// Fully-qualified controller name.
        controller: String,
        /// The requested action.
        action: String,
    },

    /// No middleware factory is registered under this name.
    #[error("middleware {0} not found")]
    MiddlewareNotFound(String),

    /// A handler or middleware reported a failure.
    #[error("{0}")]
    Handler(String),

    /// A handler or middleware panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl RouterError {
    /// Creates a handler failure with the given description.
    pub fn handler(message: impl std::fmt::Display) -> Self {
        Self::Handler(message.to_string())
    }

    /// Returns `true` for errors raised while building the route table.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRouteName(_)
                | Self::InvalidPattern { .. }
                | Self::UnknownPlaceholder { .. }
                | Self::InvalidToken(_)
                | Self::InvalidConfig(_)
                | Self::UnknownMethod(_)
        )
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
