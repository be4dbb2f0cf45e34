//! Matches a `PathContainer` against a compiled `Pattern`.
//!
//! Patterns without an inner `**` are matched by walking the element arena and the path
//! elements in lock-step. Every element consumes a fixed amount of the path, so the walk never
//! needs to backtrack. Patterns with an inner `**` are handed to `pattern::glob`.

use linked_hash_map::LinkedHashMap;
use log::trace;

use crate::error::Result;
use crate::path::{tokenize, MatrixParams, PathContainer, PathElement, PathSegment};
use crate::pattern::element::PatternElement;
use crate::pattern::glob;
use crate::pattern::segment::SegmentDescriptor;
use crate::pattern::Pattern;

/// Variables extracted by a successful match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathMatchInfo {
    variables: LinkedHashMap<String, String>,
    matrix_variables: LinkedHashMap<String, MatrixParams>,
}

impl PathMatchInfo {
    /// Captured variables, in declaration order.
    pub fn variables(&self) -> &LinkedHashMap<String, String> {
        &self.variables
    }

    /// Matrix parameters of the segments bound to each variable. Variables whose segments
    /// carried none are absent.
    pub fn matrix_variables(&self) -> &LinkedHashMap<String, MatrixParams> {
        &self.matrix_variables
    }

    /// Consumes the info, returning the captured variables.
    pub fn into_variables(self) -> LinkedHashMap<String, String> {
        self.variables
    }
}

/// Result of a successful prefix match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixMatch {
    info: PathMatchInfo,
    consumed: String,
    remaining: String,
}

impl PrefixMatch {
    /// Variables captured from the consumed prefix.
    pub fn info(&self) -> &PathMatchInfo {
        &self.info
    }

    /// Raw text of the part of the path matched by the pattern.
    pub fn consumed(&self) -> &str {
        &self.consumed
    }

    /// Raw text of the unmatched suffix, empty if the whole path was consumed.
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    /// Consumes the match, returning the captured variables.
    pub fn into_info(self) -> PathMatchInfo {
        self.info
    }
}

/// Per call matching state. Never shared between calls.
pub(crate) struct MatchingContext<'p> {
    pub(crate) path: &'p PathContainer,
    pub(crate) extract: bool,
    pub(crate) prefix: bool,
    pub(crate) variables: LinkedHashMap<String, String>,
    pub(crate) matrix_variables: LinkedHashMap<String, MatrixParams>,
    consumed: usize,
}

impl<'p> MatchingContext<'p> {
    pub(crate) fn new(path: &'p PathContainer, extract: bool, prefix: bool) -> Self {
        MatchingContext {
            path,
            extract,
            prefix,
            variables: LinkedHashMap::new(),
            matrix_variables: LinkedHashMap::new(),
            consumed: 0,
        }
    }

    pub(crate) fn bind(&mut self, name: &str, value: &str, matrix: &MatrixParams) {
        if self.extract {
            self.variables.insert(name.to_owned(), value.to_owned());
            self.bind_matrix(name, matrix);
        }
    }

    pub(crate) fn bind_matrix(&mut self, name: &str, matrix: &MatrixParams) {
        if self.extract && !matrix.is_empty() {
            self.matrix_variables
                .insert(name.to_owned(), matrix.clone());
        }
    }

    /// Marks the whole path as consumed.
    pub(crate) fn consume_all(&mut self) -> bool {
        self.consumed = self.path.len();
        true
    }

    // Decides whether stopping at path element `pos` is a successful match.
    fn finish(&mut self, pos: usize, empty_pattern: bool, optional_trailing: bool) -> bool {
        let container = self.path;
        let path = container.elements();

        let accepted = if pos == path.len() {
            true
        } else if self.prefix {
            path[pos].is_separator() || (pos > 0 && path[pos - 1].is_separator())
        } else {
            optional_trailing && !empty_pattern && pos + 1 == path.len() && path[pos].is_separator()
        };

        if accepted {
            self.consumed = if self.prefix { pos } else { path.len() };
        }
        accepted
    }

    fn into_info(self) -> PathMatchInfo {
        PathMatchInfo {
            variables: self.variables,
            matrix_variables: self.matrix_variables,
        }
    }
}

pub(crate) fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || (!case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
}

/// Compares a literal segment with a path segment, character by character.
pub(crate) fn literal_eq(text: &str, value: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        return text == value;
    }
    text.chars().count() == value.chars().count()
        && text
            .chars()
            .zip(value.chars())
            .all(|(t, v)| chars_eq(t, v, false))
}

fn wildcard_eq(text: &str, value: &str, case_sensitive: bool) -> bool {
    text.chars().count() == value.chars().count()
        && text
            .chars()
            .zip(value.chars())
            .all(|(t, v)| t == '?' || chars_eq(t, v, case_sensitive))
}

fn segment_at(path: &[PathElement], pos: usize) -> Option<&PathSegment> {
    path.get(pos).and_then(PathElement::as_segment)
}

// What remains of a path may only be swallowed by a trailing catch-all if it is empty or
// begins with the separator.
fn rest_is_bounded(path: &[PathElement], pos: usize) -> bool {
    path.get(pos).map_or(true, PathElement::is_separator)
}

fn walk(pattern: &Pattern, ctx: &mut MatchingContext<'_>) -> bool {
    let elements = pattern.elements();
    let container = ctx.path;
    let path = container.elements();
    let case_sensitive = pattern.options().case_sensitive;
    let separator = container.separator();
    let mut pos = 0;

    for (i, element) in elements.iter().enumerate() {
        let last = i + 1 == elements.len();

        match element {
            PatternElement::Separator => match path.get(pos) {
                Some(PathElement::Separator) => pos += 1,
                _ => return false,
            },

            PatternElement::Literal { text } => match segment_at(path, pos) {
                Some(seg) if literal_eq(text, seg.value(), case_sensitive) => pos += 1,
                _ => return false,
            },

            PatternElement::SingleCharWildcard { text, .. } => match segment_at(path, pos) {
                Some(seg) if wildcard_eq(text, seg.value(), case_sensitive) => pos += 1,
                _ => return false,
            },

            PatternElement::Wildcard => match path.get(pos) {
                Some(PathElement::Segment(_)) => pos += 1,
                // a final `*` also matches the empty segment after a trailing separator
                None if last && pos > 0 && path[pos - 1].is_separator() => {}
                _ => return false,
            },

            PatternElement::Capture { name, constraint } => {
                let seg = match segment_at(path, pos) {
                    Some(seg) if !seg.value().is_empty() => seg,
                    _ => return false,
                };
                if let Some(regex) = constraint {
                    if !regex.is_match(seg.value()) {
                        return false;
                    }
                }
                ctx.bind(name, seg.value(), seg.matrix());
                pos += 1;
            }

            PatternElement::Regex { regex, .. } => {
                let seg = match segment_at(path, pos) {
                    Some(seg) => seg,
                    None => return false,
                };
                let captures = match regex.captures(seg.value()) {
                    Some(captures) => captures,
                    None => return false,
                };
                if ctx.extract {
                    for (name, value) in &captures {
                        ctx.variables.insert((*name).to_owned(), (*value).to_owned());
                    }
                    if let Some((name, _)) = captures.last() {
                        ctx.bind_matrix(name, seg.matrix());
                    }
                }
                pos += 1;
            }

            PatternElement::CaptureTheRest { name } => {
                if !rest_is_bounded(path, pos) {
                    return false;
                }
                if ctx.extract {
                    let mut value = String::new();
                    let mut matrix = MatrixParams::new();
                    for e in &path[pos..] {
                        match e {
                            PathElement::Separator => value.push(separator),
                            PathElement::Segment(seg) => {
                                value.push_str(seg.value());
                                for (k, vs) in seg.matrix() {
                                    matrix
                                        .entry(k.clone())
                                        .or_insert_with(Vec::new)
                                        .extend(vs.iter().cloned());
                                }
                            }
                        }
                    }
                    ctx.bind(name, &value, &matrix);
                }
                pos = path.len();
            }

            PatternElement::WildcardTheRest { leading_separator } => {
                if *leading_separator && !rest_is_bounded(path, pos) {
                    return false;
                }
                pos = path.len();
            }

            PatternElement::WildcardSegments => return false,
        }
    }

    ctx.finish(
        pos,
        elements.is_empty(),
        pattern.options().match_optional_trailing_separator,
    )
}

impl Pattern {
    fn run(&self, ctx: &mut MatchingContext<'_>) -> bool {
        let matched = if self.has_inner_double_wildcard() {
            glob::match_segments(self, ctx)
        } else {
            walk(self, ctx)
        };

        trace!(
            " pattern `{}` {} path `{}`",
            self.source(),
            if matched { "matched" } else { "did not match" },
            ctx.path.value()
        );

        matched
    }

    fn parse_path(&self, path: &str) -> Result<PathContainer> {
        Ok(PathContainer::parse(path, self.options())?)
    }

    /// True if `path` matches this pattern in full.
    pub fn matches(&self, path: &str) -> Result<bool> {
        Ok(self.matches_container(&self.parse_path(path)?))
    }

    /// True if `path` matches this pattern in full. The container must have been parsed with
    /// this pattern's options.
    pub fn matches_container(&self, path: &PathContainer) -> bool {
        self.run(&mut MatchingContext::new(path, false, false))
    }

    /// Matches `path` in full, extracting captured variables.
    pub fn match_and_extract(&self, path: &str) -> Result<Option<PathMatchInfo>> {
        Ok(self.match_and_extract_container(&self.parse_path(path)?))
    }

    /// Container form of `match_and_extract`.
    pub fn match_and_extract_container(&self, path: &PathContainer) -> Option<PathMatchInfo> {
        let mut ctx = MatchingContext::new(path, true, false);
        if self.run(&mut ctx) {
            Some(ctx.into_info())
        } else {
            None
        }
    }

    /// Matches the start of `path`, leaving any unconsumed suffix in `PrefixMatch::remaining`.
    ///
    /// The boundary always falls on a separator. Patterns with an inner `**` report success
    /// as soon as the path is exhausted against a pattern that could still match it, and then
    /// count the whole path as consumed.
    pub fn match_prefix(&self, path: &str) -> Result<Option<PrefixMatch>> {
        Ok(self.match_prefix_container(&self.parse_path(path)?))
    }

    /// Container form of `match_prefix`.
    pub fn match_prefix_container(&self, path: &PathContainer) -> Option<PrefixMatch> {
        let mut ctx = MatchingContext::new(path, true, true);
        if !self.run(&mut ctx) {
            return None;
        }

        let consumed = ctx.consumed;
        Some(PrefixMatch {
            consumed: path.sub_path(0, consumed),
            remaining: path.sub_path(consumed, path.len()),
            info: ctx.into_info(),
        })
    }

    /// Returns the part of `path` matched by the first pattern segment containing `*` or `?`
    /// and everything after it, without a leading separator. A pattern without wildcards
    /// yields whatever trails past its last segment.
    ///
    /// ```rust
    /// # use waypoint::pattern::compile;
    /// let pattern = compile("/docs/*.html", true).unwrap();
    /// assert_eq!(pattern.extract_path_within_pattern("/docs/cvs/commit.html"), "cvs/commit.html");
    /// ```
    pub fn extract_path_within_pattern(&self, path: &str) -> String {
        let separator = self.options().separator;
        let tokens = tokenize(path, separator, false);
        let joiner = separator.to_string();
        let start = self
            .segments()
            .iter()
            .position(SegmentDescriptor::has_wildcard)
            .unwrap_or_else(|| self.segments().len());

        tokens
            .get(start..)
            .map_or_else(String::new, |t| t.join(joiner.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternOptions;
    use crate::pattern::compile;

    fn p(text: &str) -> Pattern {
        compile(text, true).unwrap()
    }

    fn vars(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
        p(pattern)
            .match_and_extract(path)
            .unwrap()
            .map(|info| info.into_variables().into_iter().collect())
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn literal_patterns() {
        assert!(p("/hotels/new").matches("/hotels/new").unwrap());
        assert!(!p("/hotels/new").matches("/hotels/newer").unwrap());
        assert!(!p("/hotels/new").matches("/hotels").unwrap());
        assert!(!p("/hotels").matches("hotels").unwrap());
        assert!(!p("a/b").matches("a//b").unwrap());
    }

    #[test]
    fn captures_single_segment() {
        assert_eq!(
            vars("/hotels/{hotel}", "/hotels/42"),
            Some(pairs(&[("hotel", "42")]))
        );
        assert_eq!(vars("/hotels/{hotel}", "/hotels/"), None);
        assert_eq!(vars("/hotels/{hotel}", "/hotels/42/rooms"), None);
    }

    #[test]
    fn captures_are_bound_in_declaration_order() {
        assert_eq!(
            vars("{one}/{two}/three/{four}", "one/two/three/five"),
            Some(pairs(&[("one", "one"), ("two", "two"), ("four", "five")]))
        );
        assert_eq!(vars("one/two/{three}/four", "one/two/three/five"), None);
    }

    #[test]
    fn constrained_captures() {
        let pattern = p("/orders/{id:[0-9]+}");
        assert!(pattern.matches("/orders/5001").unwrap());
        assert!(!pattern.matches("/orders/abc").unwrap());
        assert_eq!(
            vars("/orders/{id:[0-9]+}", "/orders/5001"),
            Some(pairs(&[("id", "5001")]))
        );
    }

    #[test]
    fn mixed_segments_bind_positionally() {
        assert_eq!(
            vars("/files/{name}.{ext}", "/files/report.tar.gz"),
            Some(pairs(&[("name", "report.tar"), ("ext", "gz")]))
        );
        assert!(p("/docs/*.html").matches("/docs/index.html").unwrap());
        assert!(!p("/docs/*.html").matches("/docs/index.htm").unwrap());
    }

    #[test]
    fn single_char_wildcards() {
        let pattern = p("/t?st");
        assert!(pattern.matches("/test").unwrap());
        assert!(pattern.matches("/tast").unwrap());
        assert!(!pattern.matches("/tst").unwrap());
        assert!(!pattern.matches("/teest").unwrap());
    }

    #[test]
    fn trailing_wildcard_matches_empty_remainder() {
        let pattern = p("/resource/*");
        assert!(pattern.matches("/resource/").unwrap());
        assert!(pattern.matches("/resource/x").unwrap());
        assert!(!pattern.matches("/resource").unwrap());
        assert!(!pattern.matches("/resource/x/y").unwrap());
        assert!(!p("/a/*/b").matches("/a//b").unwrap());
    }

    #[test]
    fn final_wildcard_needs_a_segment_or_trailing_separator() {
        assert!(!p("*").matches("").unwrap());
        assert!(p("*").matches("x").unwrap());
        assert!(!p("*").matches("/").unwrap());
        assert!(p("/*").matches("/").unwrap());
        assert!(!p("/*").matches("").unwrap());
        assert!(!p("a/*").matches("a").unwrap());
    }

    #[test]
    fn captures_reject_matrix_only_segments() {
        assert_eq!(vars("/x/{id}", "/x/;a=1"), None);
        assert_eq!(vars("/x/{id:.*}", "/x/;a=1"), None);
        assert_eq!(vars("/x/{id}", "/x/7;a=1"), Some(pairs(&[("id", "7")])));
        assert!(p("/x/*").matches("/x/;a=1").unwrap());
    }

    #[test]
    fn double_wildcard_alone_matches_everything() {
        for path in &["", "/", "/x/y/z", "x", "x/y"] {
            assert!(p("**").matches(path).unwrap(), "{}", path);
        }
        let info = p("/**").match_and_extract("/x/y/z").unwrap().unwrap();
        assert!(info.variables().is_empty());
        assert!(p("/**").matches("").unwrap());
        assert!(!p("/**").matches("x").unwrap());
    }

    #[test]
    fn trailing_double_wildcard() {
        let pattern = p("/hotels/**");
        assert!(pattern.matches("/hotels").unwrap());
        assert!(pattern.matches("/hotels/").unwrap());
        assert!(pattern.matches("/hotels/1/rooms").unwrap());
        assert!(!pattern.matches("/hotelsx").unwrap());
    }

    #[test]
    fn capture_the_rest() {
        assert_eq!(
            vars("/files/{*path}", "/files/a/b%20c"),
            Some(pairs(&[("path", "/a/b c")]))
        );
        assert_eq!(
            vars("/files/{*path}", "/files"),
            Some(pairs(&[("path", "")]))
        );
        assert_eq!(
            vars("/files/{*path}", "/files/"),
            Some(pairs(&[("path", "/")]))
        );
        assert_eq!(vars("/files/{*path}", "/filesx"), None);
    }

    #[test]
    fn capture_the_rest_aggregates_matrix_parameters() {
        let info = p("/cars/{*rest}")
            .match_and_extract("/cars/vw;color=red/golf;color=blue;year=2012")
            .unwrap()
            .unwrap();
        assert_eq!(info.variables().get("rest").unwrap(), "/vw/golf");
        let matrix = info.matrix_variables().get("rest").unwrap();
        assert_eq!(matrix.get("color").unwrap(), &vec!["red", "blue"]);
        assert_eq!(matrix.get("year").unwrap(), &vec!["2012"]);
    }

    #[test]
    fn captures_record_matrix_parameters() {
        let info = p("/cars/{car}/{model}")
            .match_and_extract("/cars/vw;color=red,green/golf")
            .unwrap()
            .unwrap();
        assert_eq!(info.variables().get("car").unwrap(), "vw");
        assert_eq!(
            info.matrix_variables()
                .get("car")
                .unwrap()
                .get("color")
                .unwrap(),
            &vec!["red", "green"]
        );
        assert!(info.matrix_variables().get("model").is_none());
    }

    #[test]
    fn trailing_separator_is_strict_by_default() {
        assert!(!p("a/b").matches("a/b/").unwrap());
        assert!(!p("a/b/").matches("a/b").unwrap());

        let lenient = PatternOptions::default().with_optional_trailing_separator(true);
        let pattern = Pattern::compile("a/b", &lenient).unwrap();
        assert!(pattern.matches("a/b/").unwrap());
        assert!(!pattern.matches("a/b//").unwrap());
    }

    #[test]
    fn empty_pattern_matches_only_empty_path() {
        assert!(p("").matches("").unwrap());
        assert!(!p("").matches("/").unwrap());

        let lenient = PatternOptions::default().with_optional_trailing_separator(true);
        assert!(!Pattern::compile("", &lenient).unwrap().matches("/").unwrap());
    }

    #[test]
    fn case_sensitivity_is_fixed_at_compile_time() {
        assert!(!p("/Hotels/t?st").matches("/hotels/TEST").unwrap());

        let pattern = compile("/Hotels/t?st/{id:[a-z]+}", false).unwrap();
        assert!(pattern.matches("/hotels/TEST/ABC").unwrap());
    }

    #[test]
    fn decode_errors_are_surfaced() {
        match p("/{x}").matches("/%zz") {
            Err(crate::error::Error::Decode(e)) => assert_eq!(e.segment, "%zz"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn prefix_match_reports_boundary() {
        let m = p("/api/{version}")
            .match_prefix("/api/v1/users/7")
            .unwrap()
            .unwrap();
        assert_eq!(m.consumed(), "/api/v1");
        assert_eq!(m.remaining(), "/users/7");
        assert_eq!(m.info().variables().get("version").unwrap(), "v1");

        let m = p("/api").match_prefix("/api").unwrap().unwrap();
        assert_eq!(m.remaining(), "");

        assert!(p("/api").match_prefix("/apix/y").unwrap().is_none());
    }

    #[test]
    fn prefix_match_with_trailing_catch_all_consumes_everything() {
        let m = p("/static/**").match_prefix("/static/css/site.css").unwrap().unwrap();
        assert_eq!(m.consumed(), "/static/css/site.css");
        assert_eq!(m.remaining(), "");
    }

    #[test]
    fn path_within_pattern() {
        let cases = [
            ("/docs/cvs/commit.html", "/docs/cvs/commit.html", ""),
            ("/docs/*", "/docs/cvs/commit", "cvs/commit"),
            ("/docs/cvs/*.html", "/docs/cvs/commit.html", "commit.html"),
            ("/docs/**", "/docs/cvs/commit", "cvs/commit"),
            ("/docs/**/*.html", "/docs/cvs/commit.html", "cvs/commit.html"),
            ("/*.html", "/docs/commit.html", "docs/commit.html"),
            ("/d?cs/**", "/docs/cvs/commit", "docs/cvs/commit"),
        ];
        for (pattern, path, expected) in &cases {
            let compiled = Pattern::compile(pattern, &PatternOptions::glob()).unwrap();
            assert_eq!(
                compiled.extract_path_within_pattern(path),
                *expected,
                "{} {}",
                pattern,
                path
            );
        }
    }

    #[test]
    fn custom_separator() {
        let options = PatternOptions::default().with_separator('.');
        let pattern = Pattern::compile("com.{vendor}.**", &options).unwrap();
        let info = pattern.match_and_extract("com.acme.tools.x").unwrap().unwrap();
        assert_eq!(info.variables().get("vendor").unwrap(), "acme");
    }
}
