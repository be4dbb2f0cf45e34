//! Defines `PathMatcher`, a string level facade which compiles patterns on demand through a
//! shared `PatternCache`.
use std::cmp::Ordering;

use linked_hash_map::LinkedHashMap;
use log::trace;

use crate::cache::PatternCache;
use crate::config::{CacheOptions, PatternOptions};
use crate::error::Result;
use crate::pattern::matcher::PrefixMatch;
use crate::pattern::specificity;

/// Matches pattern text against path text without the caller holding on to compiled patterns.
///
/// By default patterns compile in glob mode, so `**` may appear anywhere. Compiled patterns
/// are kept in a bounded cache which clones of the matcher share.
///
/// ```rust
/// # use waypoint::matcher::PathMatcher;
/// # fn main() -> waypoint::error::Result<()> {
/// let matcher = PathMatcher::new();
///
/// assert!(matcher.matches("/static/**/*.css", "/static/css/site/main.css")?);
///
/// let vars = matcher
///     .extract_variables("/hotels/{hotel}/bookings/{booking}", "/hotels/1/bookings/42")?
///     .unwrap();
/// assert_eq!(vars["hotel"], "1");
/// assert_eq!(vars["booking"], "42");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PathMatcher {
    cache: PatternCache,
}

impl PathMatcher {
    /// A glob mode matcher with the default cache size.
    pub fn new() -> Self {
        PathMatcher::with_options(PatternOptions::glob(), CacheOptions::default())
    }

    /// A matcher compiling with `options` into a cache sized by `cache`.
    pub fn with_options(options: PatternOptions, cache: CacheOptions) -> Self {
        PathMatcher {
            cache: PatternCache::new(options, cache),
        }
    }

    /// Options patterns are compiled with.
    pub fn options(&self) -> &PatternOptions {
        self.cache.options()
    }

    /// The cache backing this matcher.
    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// True if `text` contains any pattern syntax, and so is not a plain literal path.
    pub fn is_pattern(&self, text: &str) -> bool {
        text.contains(|c| c == '*' || c == '?' || c == '{')
    }

    /// True if `path` matches `pattern` in full.
    pub fn matches(&self, pattern: &str, path: &str) -> Result<bool> {
        let matched = self.cache.get_or_compile(pattern)?.matches(path)?;
        trace!(" `{}` against `{}`: {}", pattern, path, matched);
        Ok(matched)
    }

    /// Matches `pattern` against the start of `path`.
    pub fn match_start(&self, pattern: &str, path: &str) -> Result<Option<PrefixMatch>> {
        self.cache.get_or_compile(pattern)?.match_prefix(path)
    }

    /// Variables captured by matching `path` against `pattern`, or `None` when the path does
    /// not match.
    pub fn extract_variables(
        &self,
        pattern: &str,
        path: &str,
    ) -> Result<Option<LinkedHashMap<String, String>>> {
        let info = self.cache.get_or_compile(pattern)?.match_and_extract(path)?;
        Ok(info.map(|info| info.into_variables()))
    }

    /// The part of `path` matched by the wildcard portion of `pattern`.
    pub fn extract_path_within_pattern(&self, pattern: &str, path: &str) -> Result<String> {
        Ok(self
            .cache
            .get_or_compile(pattern)?
            .extract_path_within_pattern(path))
    }

    /// Specificity order of two patterns against `path`; `Ordering::Less` means `a` is
    /// the better match.
    pub fn compare(&self, a: &str, b: &str, path: &str) -> Result<Ordering> {
        let a = self.cache.get_or_compile(a)?;
        let b = self.cache.get_or_compile(b)?;
        Ok(specificity::compare(Some(&a), Some(&b), path))
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        PathMatcher::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn glob_matching() {
        let m = PathMatcher::new();
        assert!(m.matches("/a/**/b", "/a/b").unwrap());
        assert!(m.matches("/a/**/b", "/a/x/y/b").unwrap());
        assert!(!m.matches("/a/**/b", "/a/x/y/c").unwrap());
        assert!(m.matches("/a/?.txt", "/a/1.txt").unwrap());
        assert!(!m.matches("/a/?.txt", "/a/12.txt").unwrap());
    }

    #[test]
    fn extract_variables_none_on_mismatch() {
        let m = PathMatcher::new();
        assert!(m.extract_variables("/a/{x}", "/b/1").unwrap().is_none());

        let vars = m.extract_variables("/a/{x}.{ext}", "/a/file.txt").unwrap().unwrap();
        assert_eq!(vars["x"], "file");
        assert_eq!(vars["ext"], "txt");
    }

    #[test]
    fn match_start_reports_remaining() {
        let m = PathMatcher::with_options(PatternOptions::default(), CacheOptions::default());
        let prefix = m.match_start("/api/{version}", "/api/v1/users/7").unwrap().unwrap();
        assert_eq!(prefix.info().variables()["version"], "v1");
        assert_eq!(prefix.remaining(), "/users/7");
        assert!(m.match_start("/api/{version}", "/web/v1").unwrap().is_none());
    }

    #[test]
    fn path_within_pattern() {
        let m = PathMatcher::new();
        assert_eq!(
            m.extract_path_within_pattern("/docs/cvs/commit.html", "/docs/cvs/commit.html").unwrap(),
            ""
        );
        assert_eq!(
            m.extract_path_within_pattern("/docs/**", "/docs/cvs/commit").unwrap(),
            "cvs/commit"
        );
        assert_eq!(
            m.extract_path_within_pattern("/*.html", "/commit.html").unwrap(),
            "commit.html"
        );
    }

    #[test]
    fn compare_and_caching() {
        let m = PathMatcher::new();
        assert_eq!(
            m.compare("/hotels/new", "/hotels/{hotel}", "/hotels/new").unwrap(),
            Ordering::Less
        );
        assert_eq!(m.cache().len(), 2);
        assert!(m.is_pattern("/hotels/{hotel}"));
        assert!(!m.is_pattern("/hotels/new"));
    }

    #[test]
    fn syntax_errors_propagate() {
        let m = PathMatcher::new();
        match m.matches("/a/{x", "/a/1") {
            Err(Error::Syntax(e)) => assert_eq!(e.pattern, "/a/{x"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn decode_errors_propagate() {
        let m = PathMatcher::new();
        assert!(matches!(m.matches("/a/{x}", "/a/%zz"), Err(Error::Decode(_))));
    }
}
