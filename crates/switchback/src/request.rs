//! HTTP request type and positional path parameters.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::RouterError;

/// HTTP request methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Matches every request method.
    Any,
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// DELETE method
    Delete,
    /// PATCH method
    Patch,
}

impl Method {
    /// Returns the method as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Returns whether a route registered with this method serves `request`.
    #[must_use]
    pub fn accepts(self, request: Self) -> bool {
        self == Self::Any || self == request
    }
}

impl FromStr for Method {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ANY" => Ok(Self::Any),
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            _ => Err(RouterError::UnknownMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values captured from the request path, in capture-group order.
///
/// The error fallback additionally receives the failure that triggered it
/// through [`Params::error`].
#[derive(Debug, Default)]
pub struct Params {
    values: Vec<String>,
    error: Option<RouterError>,
}

impl Params {
    /// Creates params from captured values.
    #[must_use]
    pub const fn new(values: Vec<String>) -> Self {
        Self {
            values,
            error: None,
        }
    }

    pub(crate) const fn from_error(error: RouterError) -> Self {
        Self {
            values: Vec::new(),
            error: Some(error),
        }
    }

    /// Gets the value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Gets the value at `index` or returns a handler error.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Handler`] when fewer values were captured.
    pub fn require(&self, index: usize) -> crate::Result<&str> {
        self.get(index)
            .ok_or_else(|| RouterError::handler(format!("missing path parameter #{index}")))
    }

    /// Parses the value at `index` as a specific type.
    #[must_use]
    pub fn parse<T: FromStr>(&self, index: usize) -> Option<T> {
        self.get(index).and_then(|v| v.parse().ok())
    }

    /// Returns an iterator over the captured values.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The failure being handled, set only for the error fallback.
    #[must_use]
    pub const fn error(&self) -> Option<&RouterError> {
        self.error.as_ref()
    }
}

/// An HTTP request as seen by the router.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path, leading slash, no query string.
    pub path: String,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
}

impl Request {
    /// Creates a new request. An empty path is treated as `/`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if path.is_empty() {
            path.push('/');
        }
        Self {
            method,
            path,
            query: HashMap::new(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a request from a raw request target such as `/search?q=rust`.
    ///
    /// The query string is split off the path into [`Request::query`].
    #[must_use]
    pub fn from_target(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let mut request = Self::new(method, path);
        request.query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_string(), value.to_string())
            })
            .collect();
        request
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Gets a header value, ignoring case.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter.
    #[must_use]
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!("any".parse::<Method>().unwrap(), Method::Any);
        assert!(matches!(
            "OPTIONS".parse::<Method>(),
            Err(RouterError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_method_accepts() {
        assert!(Method::Any.accepts(Method::Delete));
        assert!(Method::Get.accepts(Method::Get));
        assert!(!Method::Get.accepts(Method::Post));
    }

    #[test]
    fn test_params() {
        let params = Params::new(vec!["42".into(), "hello".into()]);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get(1), Some("hello"));
        assert_eq!(params.parse::<u32>(0), Some(42));
        assert_eq!(params.parse::<u32>(1), None);
        assert!(params.require(2).is_err());
        assert!(params.error().is_none());
    }

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(Request::get("").path, "/");
    }

    #[test]
    fn test_from_target() {
        let req = Request::from_target(Method::Get, "/search?q=rust&page=2&flag");
        assert_eq!(req.path, "/search");
        assert_eq!(req.get_query("q"), Some("rust"));
        assert_eq!(req.get_query("page"), Some("2"));
        assert_eq!(req.get_query("flag"), Some(""));
    }

    #[test]
    fn test_header_lookup() {
        let req = Request::get("/").header("Content-Type", "text/plain");
        assert_eq!(req.get_header("content-type"), Some("text/plain"));
    }
}
