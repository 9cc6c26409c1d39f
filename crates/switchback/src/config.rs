//! Router configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Separator between namespace segments in controller and middleware names.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// How [`Router::group`](crate::Router::group) names the routes it merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupNaming {
    /// `/admin/users` + `show` becomes `admin.users.show`.
    #[default]
    Prefixed,
    /// Child names are kept unchanged.
    Verbatim,
}

/// What to do with a `:token` the pattern table does not define.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderPolicy {
    /// Compile the token as a single-segment capture, `([^/]+)`.
    #[default]
    Capture,
    /// Fail registration with [`RouterError::UnknownPlaceholder`](crate::RouterError::UnknownPlaceholder).
    Reject,
    /// Match the token text literally.
    Literal,
}

/// Configuration shared by a router and the sub-routers of its groups.
///
/// # Example
///
/// ```
/// use switchback::{GroupNaming, RouterConfig};
///
/// let config = RouterConfig::from_json(r#"{
///     "controller_namespace": "app::controllers",
///     "group_naming": "verbatim",
///     "patterns": { ":year": "([0-9]{4})" }
/// }"#).unwrap();
/// assert_eq!(config.group_naming, GroupNaming::Verbatim);
/// assert_eq!(config.controller_path("Users"), "app::controllers::Users");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefix for controller names that are not fully qualified.
    pub controller_namespace: String,
    /// Prefix for middleware names that are not fully qualified.
    pub middleware_namespace: String,
    /// Naming policy for grouped routes.
    pub group_naming: GroupNaming,
    /// Handling of placeholders missing from the pattern table.
    pub unknown_placeholders: PlaceholderPolicy,
    /// Extra placeholder tokens, merged over the built-in table.
    pub patterns: BTreeMap<String, String>,
}

impl RouterConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfig`](crate::RouterError::InvalidConfig)
    /// when the document is not valid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the controller namespace.
    #[must_use]
    pub fn with_controller_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.controller_namespace = namespace.into();
        self
    }

    /// Sets the middleware namespace.
    #[must_use]
    pub fn with_middleware_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.middleware_namespace = namespace.into();
        self
    }

    /// Sets the group naming policy.
    #[must_use]
    pub fn with_group_naming(mut self, naming: GroupNaming) -> Self {
        self.group_naming = naming;
        self
    }

    /// Sets the unknown placeholder policy.
    #[must_use]
    pub fn with_unknown_placeholders(mut self, policy: PlaceholderPolicy) -> Self {
        self.unknown_placeholders = policy;
        self
    }

    /// Adds a placeholder token.
    #[must_use]
    pub fn with_pattern(mut self, token: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.patterns.insert(token.into(), fragment.into());
        self
    }

    /// Resolves a controller name to the key it is registered under.
    #[must_use]
    pub fn controller_path(&self, name: &str) -> String {
        qualify(&self.controller_namespace, name)
    }

    /// Resolves a middleware name to the key it is registered under.
    #[must_use]
    pub fn middleware_path(&self, name: &str) -> String {
        qualify(&self.middleware_namespace, name)
    }
}

/// Translates `/` separators and prefixes unqualified names with `namespace`.
fn qualify(namespace: &str, name: &str) -> String {
    let name = name.replace('/', NAMESPACE_SEPARATOR);
    if name.contains(NAMESPACE_SEPARATOR) || namespace.is_empty() {
        return name;
    }
    let namespace = namespace.trim_end_matches(NAMESPACE_SEPARATOR);
    format!("{namespace}{NAMESPACE_SEPARATOR}{name}")
}

/// Translates `/` separators without applying any namespace.
pub(crate) fn normalize(name: &str) -> String {
    name.replace('/', NAMESPACE_SEPARATOR)
}
