//! Defines the wrapping type for a segment-matching regex.

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::CaptureArityError;

/// Reasons a segment regex could not be built.
#[derive(Debug)]
pub(crate) enum SegmentRegexError {
    Invalid(String),
    Arity(CaptureArityError),
}

/// A compiled regex for a single pattern segment together with the variable names bound to its
/// capture groups, in group order.
///
/// Implements `PartialEq`, `Eq`, `PartialOrd` and `Ord` by comparing the underlying `&str`
/// representations of the regular expression and the names.
#[derive(Clone)]
pub struct SegmentRegex {
    regex: Regex,
    names: Vec<String>,
}

impl SegmentRegex {
    /// Compiles `body` anchored at both ends, so it never matches more than the whole segment.
    ///
    /// `raw` is the pattern segment the body was derived from and is only used for reporting.
    /// The compiled regex must have exactly one capture group per entry in `names`.
    pub(crate) fn new(
        raw: &str,
        body: &str,
        names: Vec<String>,
        case_sensitive: bool,
    ) -> Result<Self, SegmentRegexError> {
        let regex = RegexBuilder::new(&format!("^(?s:{})$", body))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| SegmentRegexError::Invalid(e.to_string()))?;

        let groups = regex.captures_len() - 1;
        if groups != names.len() {
            return Err(SegmentRegexError::Arity(CaptureArityError {
                segment: raw.to_owned(),
                groups,
                names: names.len(),
            }));
        }

        Ok(SegmentRegex { regex, names })
    }

    /// Returns the pattern backing this regex as a `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Variable names bound to the capture groups, left to right.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of capture groups in the compiled regex.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Wraps `regex::Regex::is_match` to return true if and only if the regex matches the
    /// whole string given.
    #[inline]
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }

    /// Matches `s` and pairs each declared name with the text of its group. A group which did
    /// not participate in the match binds the empty string.
    pub fn captures<'s>(&self, s: &'s str) -> Option<Vec<(&str, &'s str)>> {
        let caps = self.regex.captures(s)?;
        Some(
            self.names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = caps.get(i + 1).map_or("", |m| m.as_str());
                    (name.as_str(), value)
                })
                .collect(),
        )
    }
}

impl fmt::Debug for SegmentRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentRegex")
            .field("regex", &self.as_str())
            .field("names", &self.names)
            .finish()
    }
}

impl PartialEq for SegmentRegex {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.names == other.names
    }
}

impl Eq for SegmentRegex {}

impl PartialOrd for SegmentRegex {
    fn partial_cmp(&self, other: &SegmentRegex) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentRegex {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.as_str(), &self.names).cmp(&(other.as_str(), &other.names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn anchored_to_whole_segment() {
        let r = SegmentRegex::new("{id:[0-9]+}", "([0-9]+)", names(&["id"]), true).unwrap();
        assert!(r.is_match("5001"));
        assert!(!r.is_match("a5001"));
        assert!(!r.is_match("5001a"));
    }

    #[test]
    fn binds_groups_by_position() {
        let r = SegmentRegex::new("{a}-{b}", "(.*)\\-(.*)", names(&["a", "b"]), true).unwrap();
        assert_eq!(r.captures("x-y").unwrap(), vec![("a", "x"), ("b", "y")]);
        assert_eq!(r.group_count(), 2);
    }

    #[test]
    fn rejects_mismatched_group_count() {
        match SegmentRegex::new("{id:(a|b)}", "((a|b))", names(&["id"]), true) {
            Err(SegmentRegexError::Arity(e)) => {
                assert_eq!(e.groups, 2);
                assert_eq!(e.names, 1);
            }
            _ => panic!("expected capture arity failure"),
        }
    }

    #[test]
    fn case_insensitive_when_requested() {
        let r = SegmentRegex::new("ab*", "ab.*", vec![], false).unwrap();
        assert!(r.is_match("ABC"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        assert!(matches!(
            SegmentRegex::new("{x:[}", "([)", names(&["x"]), true),
            Err(SegmentRegexError::Invalid(_))
        ));
    }
}
