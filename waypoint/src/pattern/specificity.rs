//! Orders patterns by how specifically they match a given path.
//!
//! `Ordering::Less` means "more specific": sorting a list of patterns with `compare` puts the
//! preferred pattern first.

use std::cmp::Ordering;

use crate::pattern::Pattern;

/// Compares two patterns for specificity against `path`.
///
/// The first rule to decide wins:
///
/// 1. A missing pattern sorts after any pattern.
/// 2. The bare catch-all (`**`, `/**`) sorts after anything else. Between two catch-alls the
///    longer one sorts first.
/// 3. A pattern whose text equals `path` sorts first.
/// 4. A prefix pattern (ending in `**`) sorts after a pattern without any `**`.
/// 5. Fewer captures plus wildcards, counting each `**` twice, sorts first.
/// 6. Longer normalized length sorts first.
/// 7. Fewer single wildcards sorts first.
/// 8. Fewer captures sorts first.
///
/// Anything else is `Ordering::Equal`, so stable sorts keep registration order.
///
/// ```rust
/// # use std::cmp::Ordering;
/// # use waypoint::pattern::{compile, specificity};
/// let literal = compile("/hotels/new", true).unwrap();
/// let capture = compile("/hotels/{hotel}", true).unwrap();
///
/// assert_eq!(
///     specificity::compare(Some(&literal), Some(&capture), "/hotels/new"),
///     Ordering::Less
/// );
/// ```
pub fn compare(a: Option<&Pattern>, b: Option<&Pattern>, path: &str) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    match (a.is_catch_all(), b.is_catch_all()) {
        (true, true) => return b.normalized_length().cmp(&a.normalized_length()),
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    match (a.source() == path, b.source() == path) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if a.is_prefix_pattern() && b.double_wildcard_count() == 0 {
        return Ordering::Greater;
    }
    if b.is_prefix_pattern() && a.double_wildcard_count() == 0 {
        return Ordering::Less;
    }

    units(a)
        .cmp(&units(b))
        .then_with(|| b.normalized_length().cmp(&a.normalized_length()))
        .then_with(|| a.single_wildcard_count().cmp(&b.single_wildcard_count()))
        .then_with(|| a.parameter_count().cmp(&b.parameter_count()))
}

fn units(pattern: &Pattern) -> usize {
    pattern.parameter_count() + pattern.single_wildcard_count() + 2 * pattern.double_wildcard_count()
}

/// Sorts `patterns` most specific first. The sort is stable.
pub fn sort_by_specificity(patterns: &mut [&Pattern], path: &str) {
    patterns.sort_by(|a, b| compare(Some(*a), Some(*b), path));
}
