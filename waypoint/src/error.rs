//! Error types raised while compiling patterns, decoding paths and building or querying a
//! `Resolver`.
//!
//! Compile time problems (`PatternSyntaxError`, `CaptureArityError`) abort the registration of
//! the offending pattern. Match time problems (`DecodeError`, `Error::InvalidArgument`) abort
//! only the call that raised them; nothing in this crate retries.
use std::fmt;

use thiserror::Error;

/// An implementation of the single-parameter Result pattern, using our `Error`.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Umbrella error for every fallible operation exposed by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The pattern text is malformed.
    #[error(transparent)]
    Syntax(#[from] PatternSyntaxError),

    /// A segment regex declares a different number of capture groups than capture names.
    #[error(transparent)]
    CaptureArity(#[from] CaptureArityError),

    /// A path segment contains an invalid percent-escape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A strict `ResolverBuilder` was handed two registrations of the same shape.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// A required argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Categorised reason for a `PatternSyntaxError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A `{` was never closed.
    MissingCloseCapture,
    /// A `}` appeared without a preceding `{`.
    MissingOpenCapture,
    /// A `{` appeared inside a capture name.
    IllegalNestedCapture,
    /// Two captures follow each other in a segment with nothing in between.
    IllegalDoubleCapture,
    /// A `{}` or `{:regex}` without a name.
    MissingCaptureName,
    /// A capture name contains a character that is not allowed in a name.
    IllegalCharacterInCaptureName(char),
    /// The same capture name is used twice in one pattern.
    DuplicateCaptureName(String),
    /// Something follows a `**` or `{*name}` element.
    CatchAllNotLast,
    /// A `{*name}` element is not preceded by the separator.
    CaptureTheRestWithoutSeparator,
    /// A `{*name}` element follows an inner `**`, which leaves its value ambiguous.
    CaptureTheRestAfterInnerWildcard,
    /// A `{name:regex}` constraint failed to compile.
    InvalidRegex(String),
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::MissingCloseCapture => write!(f, "expected close capture character after variable name"),
            SyntaxErrorKind::MissingOpenCapture => write!(f, "missing preceding open capture character before variable name"),
            SyntaxErrorKind::IllegalNestedCapture => write!(f, "not allowed to nest variable captures"),
            SyntaxErrorKind::IllegalDoubleCapture => write!(f, "not allowed to capture twice in the same segment without a separating literal"),
            SyntaxErrorKind::MissingCaptureName => write!(f, "missing variable name in capture"),
            SyntaxErrorKind::IllegalCharacterInCaptureName(c) => {
                write!(f, "character `{}` is not allowed in a captured variable name", c)
            }
            SyntaxErrorKind::DuplicateCaptureName(name) => {
                write!(f, "not allowed to capture `{}` twice in the same pattern", name)
            }
            SyntaxErrorKind::CatchAllNotLast => write!(f, "no data allowed after catch-all"),
            SyntaxErrorKind::CaptureTheRestWithoutSeparator => {
                write!(f, "a capture-the-rest variable must be preceded by a separator")
            }
            SyntaxErrorKind::CaptureTheRestAfterInnerWildcard => {
                write!(f, "a capture-the-rest variable cannot follow an inner double wildcard")
            }
            SyntaxErrorKind::InvalidRegex(reason) => write!(f, "invalid capture constraint: {}", reason),
        }
    }
}

/// Malformed pattern text, carrying the offending character position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (position {position} of pattern `{pattern}`)")]
pub struct PatternSyntaxError {
    /// The pattern text being compiled.
    pub pattern: String,
    /// Character offset at which the problem was detected.
    pub position: usize,
    /// What went wrong.
    pub kind: SyntaxErrorKind,
}

impl PatternSyntaxError {
    pub(crate) fn new(pattern: &str, position: usize, kind: SyntaxErrorKind) -> Self {
        PatternSyntaxError {
            pattern: pattern.to_owned(),
            position,
            kind,
        }
    }
}

/// A segment regex whose capture group count disagrees with its declared capture names.
///
/// Usually caused by a capturing group inside a `{name:regex}` constraint; use non-capturing
/// groups (`(?:...)`) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "segment `{segment}` compiles to {groups} capture group(s) but declares {names} variable(s); \
     use non-capturing groups in constraints"
)]
pub struct CaptureArityError {
    /// Raw text of the pattern segment.
    pub segment: String,
    /// Capture groups in the compiled regex.
    pub groups: usize,
    /// Variable names declared by the segment.
    pub names: usize,
}

/// A path segment which could not be percent-decoded into valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to percent-decode path segment `{segment}`")]
pub struct DecodeError {
    /// The raw, undecoded segment.
    pub segment: String,
}

/// Two registrations with the same dispatch key and an equivalent pattern shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{dispatch_key} {pattern}` conflicts with previously registered `{dispatch_key} {existing}`")]
pub struct ConflictError {
    /// Dispatch key shared by both registrations.
    pub dispatch_key: String,
    /// The pattern being inserted.
    pub pattern: String,
    /// The pattern already present.
    pub existing: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_reports_position_and_reason() {
        let e = PatternSyntaxError::new("/a/**/b", 3, SyntaxErrorKind::CatchAllNotLast);
        assert_eq!(
            e.to_string(),
            "no data allowed after catch-all (position 3 of pattern `/a/**/b`)"
        );
    }

    #[test]
    fn umbrella_error_is_transparent() {
        let e: Error = DecodeError {
            segment: "%zz".to_owned(),
        }
        .into();
        assert_eq!(e.to_string(), "unable to percent-decode path segment `%zz`");
    }
}
