//! Splits candidate paths (and pattern text) into segments.
//!
//! Two forms are provided. `tokenize` is the plain splitter used for pattern text and glob
//! matching, and drops empty tokens. `PathContainer` is the decoded, structural view of a
//! request path used by the matchers and the resolver: it keeps every separator as its own
//! element so sub-paths can be rebuilt from an index range.

use linked_hash_map::LinkedHashMap;
use log::trace;

use crate::config::PatternOptions;
use crate::error::DecodeError;
use crate::helpers::PercentDecoded;

/// Matrix parameters of a single segment, `;name=value1,value2` in the raw path.
pub type MatrixParams = LinkedHashMap<String, Vec<String>>;

/// Splits `text` on every `separator`, optionally trimming whitespace from each token. Empty
/// tokens are never returned.
///
/// ```rust
/// # use waypoint::path::tokenize;
/// assert_eq!(tokenize("/some/path/to//my/handler", '/', false),
///            vec!["some", "path", "to", "my", "handler"]);
/// assert_eq!(tokenize(" a / b ", '/', true), vec!["a", "b"]);
/// assert!(tokenize("", '/', false).is_empty());
/// ```
pub fn tokenize(text: &str, separator: char, trim_each: bool) -> Vec<String> {
    text.split(separator)
        .map(|t| if trim_each { t.trim() } else { t })
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// One element of a `PathContainer`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathElement {
    /// A single occurrence of the separator.
    Separator,
    /// Text between two separators.
    Segment(PathSegment),
}

impl PathElement {
    /// True for `PathElement::Separator`.
    pub fn is_separator(&self) -> bool {
        matches!(self, PathElement::Separator)
    }

    /// Borrow the segment held by this element, if any.
    pub fn as_segment(&self) -> Option<&PathSegment> {
        match self {
            PathElement::Segment(s) => Some(s),
            PathElement::Separator => None,
        }
    }
}

/// A path segment in raw and decoded form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    raw: String,
    value: String,
    matrix: MatrixParams,
}

impl PathSegment {
    fn parse(raw: &str, decode: bool) -> Result<Self, DecodeError> {
        let (value, params) = match raw.find(';') {
            Some(n) => (&raw[..n], Some(&raw[n + 1..])),
            None => (raw, None),
        };

        let value = decode_part(value, decode)?;
        let mut matrix = MatrixParams::new();

        if let Some(params) = params {
            for pair in params.split(';').filter(|p| !p.is_empty()) {
                let (name, values) = match pair.find('=') {
                    Some(n) => (&pair[..n], Some(&pair[n + 1..])),
                    None => (pair, None),
                };
                let name = decode_part(name, decode)?;
                let entry = matrix.entry(name).or_insert_with(Vec::new);
                if let Some(values) = values {
                    for v in values.split(',') {
                        entry.push(decode_part(v, decode)?);
                    }
                }
            }
        }

        Ok(PathSegment {
            raw: raw.to_owned(),
            value,
            matrix,
        })
    }

    /// The segment exactly as it appeared in the path, including matrix parameters.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The value patterns are matched against: decoded (when enabled) and without matrix
    /// parameters.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Matrix parameters attached to this segment.
    pub fn matrix(&self) -> &MatrixParams {
        &self.matrix
    }
}

fn decode_part(raw: &str, decode: bool) -> Result<String, DecodeError> {
    if decode {
        PercentDecoded::new(raw).map(PercentDecoded::into_string)
    } else {
        Ok(raw.to_owned())
    }
}

/// Structural view of a candidate path: separators and segments in order.
///
/// Consecutive separators are kept as consecutive `PathElement::Separator` values, so
/// `a//b` never matches a pattern written as `a/b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathContainer {
    value: String,
    separator: char,
    elements: Vec<PathElement>,
}

impl PathContainer {
    /// Parses `path` using the separator and decoding rules of `options`.
    pub fn parse(path: &str, options: &PatternOptions) -> Result<Self, DecodeError> {
        let separator = options.separator;
        let mut elements = Vec::new();
        let mut start = 0;

        for (i, c) in path.char_indices() {
            if c == separator {
                if i > start {
                    elements.push(PathElement::Segment(PathSegment::parse(
                        &path[start..i],
                        options.decode,
                    )?));
                }
                elements.push(PathElement::Separator);
                start = i + c.len_utf8();
            }
        }

        if start < path.len() {
            elements.push(PathElement::Segment(PathSegment::parse(
                &path[start..],
                options.decode,
            )?));
        }

        trace!(" parsed path `{}` into {} elements", path, elements.len());

        Ok(PathContainer {
            value: path.to_owned(),
            separator,
            elements,
        })
    }

    /// The full raw path.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Separator this path was split with.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// All elements in order.
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// Number of elements (separators and segments).
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True for the empty path.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if the path starts with the separator.
    pub fn has_leading_separator(&self) -> bool {
        self.elements.first().map_or(false, PathElement::is_separator)
    }

    /// True if the path ends with the separator.
    pub fn has_trailing_separator(&self) -> bool {
        self.elements.last().map_or(false, PathElement::is_separator)
    }

    /// Segments only, in order.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.elements.iter().filter_map(PathElement::as_segment)
    }

    /// Values of all segments, in order.
    pub fn segment_values(&self) -> Vec<&str> {
        self.segments().map(PathSegment::value).collect()
    }

    /// Rebuilds the raw text of the elements in `from..to`.
    pub fn sub_path(&self, from: usize, to: usize) -> String {
        let to = to.min(self.elements.len());
        let mut s = String::new();
        for e in &self.elements[from.min(to)..to] {
            match e {
                PathElement::Separator => s.push(self.separator),
                PathElement::Segment(seg) => s.push_str(seg.raw()),
            }
        }
        s
    }
}
