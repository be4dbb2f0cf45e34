//! Defines the compiled `Pattern` and the operations available on it.
//!
//! The grammar, per separator-delimited segment:
//!
//! | Syntax          | Meaning                                                        |
//! |-----------------|----------------------------------------------------------------|
//! | `text`          | literal segment                                                |
//! | `?`             | exactly one character                                          |
//! | `*`             | zero or more characters within the segment                     |
//! | `**`            | zero or more trailing segments (final segment only)            |
//! | `{name}`        | captures the segment                                           |
//! | `{name:regex}`  | captures the segment if it matches `regex`                     |
//! | `{*name}`       | captures the separator and all remaining segments (final only) |

pub mod element;
pub mod glob;
pub mod matcher;
mod parser;
pub mod regex;
pub mod segment;
pub mod specificity;

use std::fmt;

use crate::config::PatternOptions;
use crate::error::Result;
use crate::pattern::element::PatternElement;
use crate::pattern::segment::SegmentDescriptor;

/// A compiled, immutable path pattern.
///
/// Built once by `Pattern::compile` and never mutated afterwards. `Pattern` is `Send + Sync`
/// and can be matched from many threads at once.
///
/// # Examples
///
/// ```rust
/// # use waypoint::config::PatternOptions;
/// # use waypoint::pattern::Pattern;
/// # fn main() -> waypoint::error::Result<()> {
/// let pattern = Pattern::compile("/hotels/{hotel}", &PatternOptions::default())?;
/// let info = pattern.match_and_extract("/hotels/42")?.unwrap();
///
/// assert_eq!(info.variables().get("hotel").map(String::as_str), Some("42"));
/// assert_eq!(pattern.parameter_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    options: PatternOptions,
    elements: Vec<PatternElement>,
    segments: Vec<SegmentDescriptor>,

    parameter_count: usize,
    single_wildcard_count: usize,
    double_wildcard_count: usize,
    normalized_length: usize,
    score: usize,
    catch_all: bool,
    prefix_pattern: bool,
    inner_double_wildcard: bool,
}

impl Pattern {
    /// Compiles `text` using `options`.
    pub fn compile(text: &str, options: &PatternOptions) -> Result<Pattern> {
        parser::parse(text, options)
    }

    fn from_parts(
        source: String,
        options: PatternOptions,
        elements: Vec<PatternElement>,
        segments: Vec<SegmentDescriptor>,
    ) -> Self {
        let parameter_count = elements.iter().map(PatternElement::capture_count).sum();
        let single_wildcard_count = elements.iter().map(PatternElement::wildcard_count).sum();
        let double_wildcard_count = elements
            .iter()
            .map(PatternElement::double_wildcard_count)
            .sum();
        let normalized_length = elements.iter().map(PatternElement::normalized_length).sum();
        let score = elements.iter().map(PatternElement::score).sum();

        let catch_all = matches!(
            elements.as_slice(),
            [PatternElement::WildcardTheRest { .. }]
        );
        let prefix_pattern = !catch_all
            && matches!(elements.last(), Some(PatternElement::WildcardTheRest { .. }));
        let inner_double_wildcard = elements
            .iter()
            .any(|e| *e == PatternElement::WildcardSegments);

        Pattern {
            source,
            options,
            elements,
            segments,
            parameter_count,
            single_wildcard_count,
            double_wildcard_count,
            normalized_length,
            score,
            catch_all,
            prefix_pattern,
            inner_double_wildcard,
        }
    }

    /// The pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Options this pattern was compiled with.
    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    /// Elements in document order.
    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    /// Separator-delimited segments in document order.
    pub fn segments(&self) -> &[SegmentDescriptor] {
        &self.segments
    }

    /// Number of captured variables.
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Number of `?` and in-segment `*` wildcards.
    pub fn single_wildcard_count(&self) -> usize {
        self.single_wildcard_count
    }

    /// Number of `**` wildcards.
    pub fn double_wildcard_count(&self) -> usize {
        self.double_wildcard_count
    }

    /// Length with every captured variable counted as one character.
    pub fn normalized_length(&self) -> usize {
        self.normalized_length
    }

    /// Sum of element scores; lower is more specific.
    pub fn score(&self) -> usize {
        self.score
    }

    /// True if the pattern is nothing but `**` (or `/**`).
    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    /// True if the pattern ends with `**` but is not the bare catch-all.
    pub fn is_prefix_pattern(&self) -> bool {
        self.prefix_pattern
    }

    /// True if the pattern has a `**` before its final segment.
    pub fn has_inner_double_wildcard(&self) -> bool {
        self.inner_double_wildcard
    }

    /// True if the pattern begins with the separator, including one absorbed by a trailing
    /// `/**` or `/{*name}`.
    pub fn has_leading_separator(&self) -> bool {
        match self.elements.first() {
            Some(PatternElement::Separator) | Some(PatternElement::CaptureTheRest { .. }) => true,
            Some(PatternElement::WildcardTheRest { leading_separator }) => *leading_separator,
            _ => false,
        }
    }

    /// True if the pattern ends with the separator.
    pub fn has_trailing_separator(&self) -> bool {
        matches!(self.elements.last(), Some(PatternElement::Separator))
    }

    /// Names of all captured variables in declaration order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flat_map(|s| s.capture_names().iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compiles `text` with default options apart from case sensitivity.
pub fn compile(text: &str, case_sensitive: bool) -> Result<Pattern> {
    Pattern::compile(
        text,
        &PatternOptions::default().with_case_sensitive(case_sensitive),
    )
}
