//! Defines `SegmentDescriptor`, the per-segment view of a compiled `Pattern`.
use linked_hash_map::LinkedHashMap;

use crate::pattern::matcher::literal_eq;
use crate::pattern::regex::SegmentRegex;

/// Indicates how a pattern segment is matched, from the point of view of a trie.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SegmentKind {
    /// Is matched exactly (string equality) to a single path segment.
    Literal,

    /// Matches a single path segment by wildcard, capture or regex.
    Bounded,

    /// Matches any number of trailing path segments (`**`, `{*name}`).
    CatchAll,

    /// Matches any number of path segments in the middle of a pattern (inner `**`).
    InnerCatchAll,
}

/// One separator-delimited segment of a pattern.
///
/// Descriptors are derived from the same parse as the element arena; `element()` points back
/// at the element that matches the segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentDescriptor {
    raw: String,
    regex: Option<SegmentRegex>,
    capture_names: Vec<String>,
    kind: SegmentKind,
    element: usize,
}

impl SegmentDescriptor {
    pub(crate) fn new(
        raw: String,
        regex: Option<SegmentRegex>,
        capture_names: Vec<String>,
        kind: SegmentKind,
        element: usize,
    ) -> Self {
        SegmentDescriptor {
            raw,
            regex,
            capture_names,
            kind,
            element,
        }
    }

    /// The segment text as written in the pattern.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Compiled regex, present when the segment contains `?`, `*` or a capture.
    pub fn regex(&self) -> Option<&SegmentRegex> {
        self.regex.as_ref()
    }

    /// Variables captured by this segment, left to right.
    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    /// How the segment is matched.
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Index of the matching element in `Pattern::elements`.
    pub fn element(&self) -> usize {
        self.element
    }

    /// True for `**` and `{*name}`.
    pub fn is_catch_all(&self) -> bool {
        self.kind == SegmentKind::CatchAll || self.kind == SegmentKind::InnerCatchAll
    }

    /// True for a segment which is exactly `**`.
    pub fn is_double_wildcard(&self) -> bool {
        self.raw == "**"
    }

    /// True for a segment which is exactly `*`.
    pub fn is_single_wildcard(&self) -> bool {
        self.raw == "*"
    }

    /// True if the segment text contains `*` or `?`.
    pub fn has_wildcard(&self) -> bool {
        self.raw.contains('*') || self.raw.contains('?')
    }

    /// Matches one path token against this segment, binding captures into `variables` when
    /// given. Catch-all segments are handled by their callers and never match here.
    pub(crate) fn match_token(
        &self,
        token: &str,
        case_sensitive: bool,
        variables: Option<&mut LinkedHashMap<String, String>>,
    ) -> bool {
        match (&self.regex, self.kind) {
            (_, SegmentKind::CatchAll) | (_, SegmentKind::InnerCatchAll) => false,
            (Some(regex), _) => match regex.captures(token) {
                Some(caps) => {
                    if let Some(vars) = variables {
                        for (name, value) in caps {
                            vars.insert(name.to_owned(), value.to_owned());
                        }
                    }
                    true
                }
                None => false,
            },
            (None, _) => literal_eq(&self.raw, token, case_sensitive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    #[test]
    fn kinds_and_flags() {
        let pattern = compile("/docs/*.html/{id}/**", true).unwrap();
        let segments = pattern.segments();
        assert_eq!(segments.len(), 4);

        assert_eq!(segments[0].kind(), SegmentKind::Literal);
        assert!(segments[0].regex().is_none());
        assert!(!segments[0].has_wildcard());

        assert_eq!(segments[1].kind(), SegmentKind::Bounded);
        assert!(segments[1].has_wildcard());
        assert!(!segments[1].is_single_wildcard());

        assert_eq!(segments[2].capture_names(), &["id".to_owned()]);
        assert!(segments[3].is_catch_all());
        assert!(segments[3].is_double_wildcard());
    }

    #[test]
    fn match_token_binds_captures() {
        let pattern = compile("/{name}.{ext}", true).unwrap();
        let segment = &pattern.segments()[0];

        let mut vars = LinkedHashMap::new();
        assert!(segment.match_token("report.pdf", true, Some(&mut vars)));
        assert_eq!(vars["name"], "report");
        assert_eq!(vars["ext"], "pdf");
        assert!(!segment.match_token("report", true, None));
    }

    #[test]
    fn literal_tokens_honour_case() {
        let pattern = compile("/Hotels", false).unwrap();
        let segment = &pattern.segments()[0];
        assert!(segment.match_token("hotels", false, None));
        assert!(!segment.match_token("hotels", true, None));
    }

    #[test]
    fn catch_all_never_matches_a_single_token() {
        let pattern = compile("/files/{*path}", true).unwrap();
        assert!(!pattern.segments()[1].match_token("a", true, None));
    }
}
