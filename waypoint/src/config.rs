//! Compile-time options shared by patterns, path parsing, caches and resolvers.
//!
//! Every option here is fixed when a `Pattern` is compiled. Matching never takes options of its
//! own, so the same `Pattern` always behaves the same way.
use serde::Deserialize;

/// Options which control how pattern text is compiled and how candidate paths are parsed.
///
/// `PatternOptions::default()` gives a case sensitive, strict-trailing-separator configuration
/// using `/` as separator and percent-decoding path segments.
///
/// ```rust
/// # use waypoint::config::PatternOptions;
/// let options = PatternOptions::default()
///     .with_case_sensitive(false)
///     .with_optional_trailing_separator(true);
///
/// assert_eq!(options.separator, '/');
/// assert!(!options.case_sensitive);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternOptions {
    /// Character separating segments, in both patterns and paths.
    pub separator: char,

    /// Whether literal text and constraints compare case sensitively.
    pub case_sensitive: bool,

    /// Accept a single trailing separator on the path which the pattern does not have.
    pub match_optional_trailing_separator: bool,

    /// Percent-decode path segments (and matrix parameters) before matching.
    pub decode: bool,

    /// Allow `**` in the middle of a pattern. Such patterns are matched segment by segment with
    /// a windowed search instead of the single pass element matcher.
    pub inner_double_wildcard: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        PatternOptions {
            separator: '/',
            case_sensitive: true,
            match_optional_trailing_separator: false,
            decode: true,
            inner_double_wildcard: false,
        }
    }
}

impl PatternOptions {
    /// Options for glob style matching, where `**` may appear anywhere in a pattern.
    pub fn glob() -> Self {
        PatternOptions::default().with_inner_double_wildcard(true)
    }

    /// Sets the segment separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Sets case sensitivity.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Sets trailing separator leniency.
    pub fn with_optional_trailing_separator(mut self, lenient: bool) -> Self {
        self.match_optional_trailing_separator = lenient;
        self
    }

    /// Sets whether path segments are percent-decoded.
    pub fn with_decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    /// Sets whether `**` is allowed before the final segment.
    pub fn with_inner_double_wildcard(mut self, allow: bool) -> Self {
        self.inner_double_wildcard = allow;
        self
    }
}

/// Sizing for a `PatternCache`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheOptions {
    /// Maximum number of compiled patterns kept before the least recently used is evicted.
    pub capacity: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        CacheOptions { capacity: 256 }
    }
}
