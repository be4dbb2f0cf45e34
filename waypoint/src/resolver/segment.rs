//! Defines `SegmentKey`, the label on the edges of the resolver trie.
use crate::pattern::element::PatternElement;
use crate::pattern::matcher::literal_eq;
use crate::pattern::segment::{SegmentDescriptor, SegmentKind};
use crate::pattern::Pattern;

/// Indicates how the child of a trie node is reached.
///
/// The derived ordering is also the order children are tried in during resolution:
///
/// 1. Literal
/// 2. Param
/// 3. CatchAll
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SegmentKey {
    /// Reached by a path segment equal to the contained text. The text is lower-cased when the
    /// resolver is case insensitive.
    Literal(String),

    /// Reached by any single path segment. Shared by every capture, wildcard and regex segment
    /// at the same depth.
    Param,

    /// Reached by all remaining path segments, including none.
    CatchAll,
}

impl SegmentKey {
    pub(crate) fn for_descriptor(descriptor: &SegmentDescriptor, case_sensitive: bool) -> Self {
        match descriptor.kind() {
            SegmentKind::Literal if case_sensitive => SegmentKey::Literal(descriptor.raw().to_owned()),
            SegmentKind::Literal => SegmentKey::Literal(descriptor.raw().to_lowercase()),
            SegmentKind::Bounded => SegmentKey::Param,
            SegmentKind::CatchAll | SegmentKind::InnerCatchAll => SegmentKey::CatchAll,
        }
    }

    /// True if a single path segment may follow this edge.
    pub fn is_match(&self, segment: &str, case_sensitive: bool) -> bool {
        match self {
            SegmentKey::Literal(text) => literal_eq(text, segment, case_sensitive),
            SegmentKey::Param => true,
            SegmentKey::CatchAll => false,
        }
    }
}

/// Separator layout and per-segment signature of a pattern, with capture names left out.
///
/// Two registrations with the same dispatch key and the same shape can never be told apart by
/// a path, which is what makes them conflict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Shape {
    // Separators before each segment, then after the last one.
    separators: Vec<usize>,
    segments: Vec<String>,
}

impl Shape {
    pub(crate) fn of(pattern: &Pattern) -> Self {
        let case_sensitive = pattern.options().case_sensitive;
        let segments = pattern
            .segments()
            .iter()
            .map(|d| match (d.kind(), &pattern.elements()[d.element()]) {
                (SegmentKind::Literal, _) if case_sensitive => d.raw().to_owned(),
                (SegmentKind::Literal, _) => d.raw().to_lowercase(),
                (_, PatternElement::CaptureTheRest { .. }) => "{*}".to_owned(),
                (_, PatternElement::WildcardTheRest { .. }) => "**".to_owned(),
                _ => d.regex().map_or_else(String::new, |r| r.as_str().to_owned()),
            })
            .collect();

        Shape {
            separators: separator_runs(pattern),
            segments,
        }
    }
}

fn separator_runs(pattern: &Pattern) -> Vec<usize> {
    let mut runs = vec![];
    let mut run = 0;
    for element in pattern.elements() {
        match element {
            PatternElement::Separator => run += 1,
            PatternElement::CaptureTheRest { .. }
            | PatternElement::WildcardTheRest {
                leading_separator: true,
            } => {
                runs.push(run + 1);
                run = 0;
            }
            _ => {
                runs.push(run);
                run = 0;
            }
        }
    }
    runs.push(run);
    runs
}

/// True if every segment of `pattern` is literal or a plain `{name}` capture and no two
/// separators are adjacent, so a trie walk can bind it by position without running the
/// pattern matcher.
pub(crate) fn is_plain(pattern: &Pattern) -> bool {
    let single_separators = !pattern
        .elements()
        .windows(2)
        .any(|w| w[0] == PatternElement::Separator && w[1] == PatternElement::Separator);

    single_separators && pattern.segments().iter().all(|d| match d.kind() {
        SegmentKind::Literal => true,
        SegmentKind::Bounded => matches!(
            pattern.elements()[d.element()],
            PatternElement::Capture {
                constraint: None,
                ..
            }
        ),
        SegmentKind::CatchAll | SegmentKind::InnerCatchAll => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    #[test]
    fn keys_sort_literal_param_catch_all() {
        let mut keys = vec![
            SegmentKey::CatchAll,
            SegmentKey::Param,
            SegmentKey::Literal("b".to_owned()),
            SegmentKey::Literal("a".to_owned()),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                SegmentKey::Literal("a".to_owned()),
                SegmentKey::Literal("b".to_owned()),
                SegmentKey::Param,
                SegmentKey::CatchAll,
            ]
        );
    }

    #[test]
    fn keys_for_each_segment_kind() {
        let pattern = compile("/Hotels/{id}/*.html/**", false).unwrap();
        let keys: Vec<SegmentKey> = pattern
            .segments()
            .iter()
            .map(|d| SegmentKey::for_descriptor(d, false))
            .collect();
        assert_eq!(
            keys,
            vec![
                SegmentKey::Literal("hotels".to_owned()),
                SegmentKey::Param,
                SegmentKey::Param,
                SegmentKey::CatchAll,
            ]
        );
        assert!(keys[0].is_match("HOTELS", false));
        assert!(!keys[3].is_match("x", false));
    }

    #[test]
    fn shape_ignores_capture_names() {
        let a = compile("/a/{x}", true).unwrap();
        let b = compile("/a/{y}", true).unwrap();
        let c = compile("/a/{y:[0-9]+}", true).unwrap();
        let d = compile("/a/{x}/", true).unwrap();
        assert_eq!(Shape::of(&a), Shape::of(&b));
        assert_ne!(Shape::of(&a), Shape::of(&c));
        assert_ne!(Shape::of(&a), Shape::of(&d));
        assert_ne!(
            Shape::of(&compile("/a/**", true).unwrap()),
            Shape::of(&compile("/a/{*rest}", true).unwrap())
        );
    }

    #[test]
    fn shape_counts_every_separator() {
        let shape = |text: &str| Shape::of(&compile(text, true).unwrap());
        assert_ne!(shape("/a/b"), shape("/a//b"));
        assert_ne!(shape("/"), shape("//"));
        assert_ne!(shape("a/b"), shape("/a/b"));
        assert_eq!(shape("/a//{x}"), shape("/a//{y}"));
        assert_eq!(separator_runs(&compile("//a/**", true).unwrap()), vec![2, 1, 0]);
        assert_eq!(separator_runs(&compile("a//", true).unwrap()), vec![0, 2]);
    }

    #[test]
    fn plain_patterns() {
        assert!(is_plain(&compile("/a/{x}/b", true).unwrap()));
        assert!(!is_plain(&compile("/a/{x:[0-9]+}", true).unwrap()));
        assert!(!is_plain(&compile("/a/*", true).unwrap()));
        assert!(!is_plain(&compile("/a/**", true).unwrap()));
        assert!(!is_plain(&compile("/a//b", true).unwrap()));
        assert!(!is_plain(&compile("//", true).unwrap()));
        assert!(is_plain(&compile("/", true).unwrap()));
    }
}
