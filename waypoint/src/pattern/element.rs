//! Defines `PatternElement`, the nodes of a compiled pattern.
//!
//! A `Pattern` keeps its elements in one contiguous `Vec`, in document order. Matching walks
//! that vector with an index cursor, so elements never need to know their neighbours.

use crate::pattern::regex::SegmentRegex;

/// Score contributed by each captured variable.
pub const CAPTURE_SCORE: usize = 1;

/// Score contributed by each wildcard.
pub const WILDCARD_SCORE: usize = 100;

/// One node of a compiled pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternElement {
    /// A single occurrence of the separator.
    Separator,

    /// A whole segment matched by (possibly case insensitive) string equality.
    Literal {
        /// The segment text.
        text: String,
    },

    /// A whole segment of literal text with one or more `?` characters, each of which matches
    /// any single character.
    SingleCharWildcard {
        /// The segment text, `?` included.
        text: String,
        /// Number of `?` characters.
        wildcards: usize,
    },

    /// A segment which is exactly `*`: any non-empty segment, or nothing at all when it ends
    /// the pattern and the path has run out.
    Wildcard,

    /// A segment which is exactly `{name}` or `{name:regex}`.
    Capture {
        /// Variable name.
        name: String,
        /// Optional constraint, anchored to the whole segment.
        constraint: Option<SegmentRegex>,
    },

    /// A segment mixing literal text, wildcards and captures, e.g. `*.html` or `{a}-{b}`.
    Regex {
        /// Raw segment text.
        source: String,
        /// Compiled segment regex with one group per variable.
        regex: SegmentRegex,
        /// Wildcards counted towards specificity.
        wildcards: usize,
        /// Length with each variable counted as one character.
        normalized_length: usize,
    },

    /// `/{*name}`: captures the separator and everything after it. Always last.
    CaptureTheRest {
        /// Variable name.
        name: String,
    },

    /// `**` as the final segment: matches whatever remains, including nothing. When written
    /// as `/**` the separator belongs to this element.
    WildcardTheRest {
        /// Whether the preceding separator was absorbed into this element.
        leading_separator: bool,
    },

    /// `**` before the final segment. Only produced when inner double wildcards are enabled.
    WildcardSegments,
}

impl PatternElement {
    /// Length used for specificity: literal and wildcard characters count in full, every
    /// captured variable counts as one.
    pub fn normalized_length(&self) -> usize {
        match self {
            PatternElement::Separator => 1,
            PatternElement::Literal { text } | PatternElement::SingleCharWildcard { text, .. } => {
                text.chars().count()
            }
            PatternElement::Wildcard => 1,
            PatternElement::Capture { .. } => 1,
            PatternElement::Regex {
                normalized_length, ..
            } => *normalized_length,
            PatternElement::CaptureTheRest { .. } => 2,
            PatternElement::WildcardTheRest { leading_separator } => {
                if *leading_separator {
                    3
                } else {
                    2
                }
            }
            PatternElement::WildcardSegments => 2,
        }
    }

    /// Number of variables this element binds.
    pub fn capture_count(&self) -> usize {
        match self {
            PatternElement::Capture { .. } | PatternElement::CaptureTheRest { .. } => 1,
            PatternElement::Regex { regex, .. } => regex.names().len(),
            _ => 0,
        }
    }

    /// Number of single segment wildcards (`?` and `*`).
    pub fn wildcard_count(&self) -> usize {
        match self {
            PatternElement::SingleCharWildcard { wildcards, .. }
            | PatternElement::Regex { wildcards, .. } => *wildcards,
            PatternElement::Wildcard => 1,
            _ => 0,
        }
    }

    /// Number of multi segment wildcards (`**`).
    pub fn double_wildcard_count(&self) -> usize {
        match self {
            PatternElement::WildcardTheRest { .. } | PatternElement::WildcardSegments => 1,
            _ => 0,
        }
    }

    /// Contribution to `Pattern::score`: wildcards weigh far more than captures.
    pub fn score(&self) -> usize {
        self.capture_count() * CAPTURE_SCORE
            + (self.wildcard_count() + self.double_wildcard_count()) * WILDCARD_SCORE
    }

    /// True for the elements which may only end a pattern.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PatternElement::CaptureTheRest { .. } | PatternElement::WildcardTheRest { .. }
        )
    }

    /// True if this element consumes exactly one path segment.
    pub fn is_segment(&self) -> bool {
        matches!(
            self,
            PatternElement::Literal { .. }
                | PatternElement::SingleCharWildcard { .. }
                | PatternElement::Wildcard
                | PatternElement::Capture { .. }
                | PatternElement::Regex { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_counts_full_length() {
        let e = PatternElement::Literal {
            text: "hotels".to_owned(),
        };
        assert_eq!(e.normalized_length(), 6);
        assert_eq!(e.score(), 0);
        assert!(e.is_segment());
    }

    #[test]
    fn wildcards_outweigh_captures() {
        let capture = PatternElement::Capture {
            name: "id".to_owned(),
            constraint: None,
        };
        assert_eq!(capture.score(), CAPTURE_SCORE);
        assert_eq!(PatternElement::Wildcard.score(), WILDCARD_SCORE);
        assert!(PatternElement::Wildcard.score() > capture.score() * 50);
    }

    #[test]
    fn terminal_elements() {
        assert!(PatternElement::WildcardTheRest {
            leading_separator: true
        }
        .is_terminal());
        assert!(PatternElement::CaptureTheRest {
            name: "rest".to_owned()
        }
        .is_terminal());
        assert!(!PatternElement::WildcardSegments.is_terminal());
        assert_eq!(PatternElement::WildcardSegments.double_wildcard_count(), 1);
    }
}
