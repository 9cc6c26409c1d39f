//! Placeholder pattern table and path matching.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PlaceholderPolicy;
use crate::error::{Result, RouterError};

/// A whole placeholder token: a colon followed by an identifier.
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":[A-Za-z_][A-Za-z0-9_]*").expect("token regex is valid"));

/// An exact token name, as accepted by [`PatternTable::insert`].
static TOKEN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:[A-Za-z_][A-Za-z0-9_]*$").expect("token name regex is valid"));

/// Text ending in the opening of a group with flags, such as `(?:` or `(?i:`.
static GROUP_FLAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\?[A-Za-z-]*$").expect("group flags regex is valid"));

const SEGMENT: &str = "([^/]+)";

const BUILTIN: &[(&str, &str)] = &[
    (":all", "(.*)"),
    (":any", SEGMENT),
    (":id", r"(\d+)"),
    (":int", r"(\d+)"),
    (":number", r"([+-]?(?:[0-9]*[.])?[0-9]+)"),
    (":float", r"([+-]?(?:[0-9]*[.])?[0-9]+)"),
    (":bool", "(true|false|1|0)"),
    (":string", r"([\w\-_]+)"),
    (":slug", r"([\w\-_]+)"),
    (
        ":uuid",
        "([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})",
    ),
    (
        ":date",
        "([0-9]{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[1-2][0-9]|3[0-1]))",
    ),
];

/// Mapping from placeholder tokens to regex fragments.
///
/// Each built-in fragment has exactly one capturing group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTable {
    patterns: BTreeMap<String, String>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternTable {
    /// Creates a table with the built-in tokens.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: BUILTIN
                .iter()
                .map(|(token, fragment)| ((*token).to_string(), (*fragment).to_string()))
                .collect(),
        }
    }

    /// Creates a table with no tokens at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            patterns: BTreeMap::new(),
        }
    }

    /// Adds or replaces a token. A missing leading colon is added.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidToken`] unless the token is a colon
    /// followed by an identifier; templates are scanned for exactly that shape.
    pub fn insert(&mut self, token: &str, fragment: impl Into<String>) -> Result<()> {
        let token = if token.starts_with(':') {
            token.to_string()
        } else {
            format!(":{token}")
        };
        if !TOKEN_NAME.is_match(&token) {
            return Err(RouterError::InvalidToken(token));
        }
        self.patterns.insert(token, fragment.into());
        Ok(())
    }

    /// Returns the fragment for a token, including its colon.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.patterns.get(token).map(String::as_str)
    }

    /// Compiles a route template into an anchored pattern.
    ///
    /// Tokens are found by scanning for whole identifiers, so `:ident` is
    /// never rewritten through a shorter `:id`. Text outside tokens is used
    /// as regex source unchanged. Unknown tokens compiled under
    /// [`PlaceholderPolicy::Capture`] are listed by
    /// [`CompiledPath::unknown_tokens`].
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnknownPlaceholder`] for an unknown token under
    /// [`PlaceholderPolicy::Reject`], and [`RouterError::InvalidPattern`] when
    /// the result is not a valid regex.
    ///
    /// # Example
    ///
    /// ```
    /// use switchback::{PatternTable, PlaceholderPolicy};
    ///
    /// let table = PatternTable::new();
    /// let pattern = table.compile("/posts/:id/:slug", PlaceholderPolicy::Reject).unwrap();
    /// let params = pattern.match_path("/posts/7/hello-world").unwrap();
    /// assert_eq!(params, vec!["7", "hello-world"]);
    /// ```
    pub fn compile(&self, template: &str, policy: PlaceholderPolicy) -> Result<CompiledPath> {
        let mut source = String::from("^");
        let mut unknown = Vec::new();
        let mut last = 0;

        for token in placeholders(template) {
            source.push_str(&template[last..token.start()]);
            last = token.end();

            if let Some(fragment) = self.get(token.as_str()) {
                source.push_str(fragment);
                continue;
            }
            match policy {
                PlaceholderPolicy::Capture => {
                    unknown.push(token.as_str().to_string());
                    source.push_str(SEGMENT);
                }
                PlaceholderPolicy::Literal => source.push_str(&regex::escape(token.as_str())),
                PlaceholderPolicy::Reject => {
                    return Err(RouterError::UnknownPlaceholder {
                        template: template.to_string(),
                        token: token.as_str().to_string(),
                    });
                }
            }
        }

        source.push_str(&template[last..]);
        source.push_str("/?$");

        let regex = Regex::new(&source).map_err(|source| RouterError::InvalidPattern {
            template: template.to_string(),
            source,
        })?;

        Ok(CompiledPath {
            template: template.to_string(),
            regex,
            unknown,
        })
    }
}

/// A route template compiled against a [`PatternTable`].
#[derive(Debug, Clone)]
pub struct CompiledPath {
    template: String,
    regex: Regex,
    unknown: Vec<String>,
}

impl CompiledPath {
    /// Attempts to match a request path.
    ///
    /// Returns one value per capturing group, in order, without the whole
    /// match. Groups that did not take part in the match yield `""`.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Returns the original template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the anchored regex source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Tokens missing from the table that were compiled as segment captures.
    #[must_use]
    pub fn unknown_tokens(&self) -> &[String] {
        &self.unknown
    }
}

/// Yields the placeholder tokens of a template, left to right.
///
/// A colon that closes a group opening such as `(?:` or `(?i:` is regex
/// syntax, not a token.
pub(crate) fn placeholders(template: &str) -> impl Iterator<Item = regex::Match<'_>> {
    TOKEN
        .find_iter(template)
        .filter(move |m| !GROUP_FLAGS.is_match(&template[..m.start()]))
}

/// Substitutes `values` positionally for the placeholders in `template`.
///
/// Returns `None` when the template has no placeholders or their number
/// differs from `values.len()`.
pub(crate) fn fill(template: &str, values: &[&str]) -> Option<String> {
    let tokens: Vec<_> = placeholders(template).collect();
    if tokens.is_empty() || tokens.len() != values.len() {
        return None;
    }

    let mut path = String::with_capacity(template.len());
    let mut last = 0;
    for (token, value) in tokens.iter().zip(values) {
        path.push_str(&template[last..token.start()]);
        path.push_str(value);
        last = token.end();
    }
    path.push_str(&template[last..]);
    Some(path)
}
