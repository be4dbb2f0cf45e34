//! Compiles pattern text into the element arena and segment descriptors of a `Pattern`.
//!
//! The text is scanned once, left to right. Each separator-delimited segment is first checked
//! for balanced captures, then broken into parts (literal text, `?`, `*`, captures) and finally
//! classified into the most specific `PatternElement` able to match it.

use std::collections::HashSet;

use log::trace;

use crate::config::PatternOptions;
use crate::error::{Error, PatternSyntaxError, SyntaxErrorKind};
use crate::pattern::element::PatternElement;
use crate::pattern::regex::{SegmentRegex, SegmentRegexError};
use crate::pattern::segment::{SegmentDescriptor, SegmentKind};
use crate::pattern::Pattern;

#[derive(Debug)]
enum Part {
    Text(String),
    AnyChar,
    AnyChars {
        counted: bool,
    },
    Capture {
        name: String,
        rest: bool,
        constraint: Option<String>,
        position: usize,
    },
}

pub(crate) fn parse(text: &str, options: &PatternOptions) -> Result<Pattern, Error> {
    trace!(" compiling pattern `{}`", text);

    let parser = PatternParser {
        text,
        chars: text.chars().collect(),
        options,
        elements: Vec::new(),
        segments: Vec::new(),
        names: HashSet::new(),
    };

    parser.parse()
}

struct PatternParser<'a> {
    text: &'a str,
    chars: Vec<char>,
    options: &'a PatternOptions,
    elements: Vec<PatternElement>,
    segments: Vec<SegmentDescriptor>,
    names: HashSet<String>,
}

impl<'a> PatternParser<'a> {
    fn error(&self, position: usize, kind: SyntaxErrorKind) -> Error {
        PatternSyntaxError::new(self.text, position, kind).into()
    }

    fn parse(mut self) -> Result<Pattern, Error> {
        let separator = self.options.separator;
        let len = self.chars.len();
        let mut pos = 0;
        let mut pending_separator = false;

        while pos < len {
            if self.elements.last().map_or(false, PatternElement::is_terminal) {
                return Err(self.error(pos, SyntaxErrorKind::CatchAllNotLast));
            }

            if self.chars[pos] == separator {
                if pending_separator {
                    self.elements.push(PatternElement::Separator);
                }
                pending_separator = true;
                pos += 1;
                continue;
            }

            let end = self.segment_end(pos)?;
            self.push_segment(pos, end, pending_separator)?;
            pending_separator = false;
            pos = end;
        }

        if pending_separator {
            self.elements.push(PatternElement::Separator);
        }

        trace!(
            " compiled pattern `{}` into {} elements, {} segments",
            self.text,
            self.elements.len(),
            self.segments.len()
        );

        Ok(Pattern::from_parts(
            self.text.to_owned(),
            self.options.clone(),
            self.elements,
            self.segments,
        ))
    }

    // Finds the end of the segment starting at `start`, checking that captures are balanced.
    fn segment_end(&self, start: usize) -> Result<usize, Error> {
        let separator = self.options.separator;
        let mut i = start;
        let mut open: Option<usize> = None;

        while i < self.chars.len() {
            let c = self.chars[i];
            match open {
                None => {
                    if c == separator {
                        return Ok(i);
                    }
                    match c {
                        '{' => open = Some(i),
                        '}' => return Err(self.error(i, SyntaxErrorKind::MissingOpenCapture)),
                        _ => {}
                    }
                    i += 1;
                }
                Some(o) => {
                    if c == separator {
                        return Err(self.error(o, SyntaxErrorKind::MissingCloseCapture));
                    }
                    match c {
                        '{' => return Err(self.error(i, SyntaxErrorKind::IllegalNestedCapture)),
                        '}' => {
                            open = None;
                            i += 1;
                        }
                        ':' => {
                            i = self.skip_constraint(o, i + 1)?;
                            open = None;
                        }
                        _ => i += 1,
                    }
                }
            }
        }

        match open {
            Some(o) => Err(self.error(o, SyntaxErrorKind::MissingCloseCapture)),
            None => Ok(self.chars.len()),
        }
    }

    // Skips a capture constraint starting at `i`, honouring nested braces and `\` escapes.
    // Returns the index just past the closing `}` of the capture opened at `open`.
    fn skip_constraint(&self, open: usize, mut i: usize) -> Result<usize, Error> {
        let mut depth = 0usize;

        while i < self.chars.len() {
            match self.chars[i] {
                c if c == self.options.separator => break,
                '\\' => {
                    i += 2;
                    continue;
                }
                '{' => depth += 1,
                '}' if depth == 0 => return Ok(i + 1),
                '}' => depth -= 1,
                _ => {}
            }
            i += 1;
        }

        Err(self.error(open, SyntaxErrorKind::MissingCloseCapture))
    }

    fn push_segment(&mut self, start: usize, end: usize, separator_before: bool) -> Result<(), Error> {
        let raw: String = self.chars[start..end].iter().collect();
        let is_last = end == self.chars.len();

        if raw == "**" {
            return self.push_double_wildcard(raw, start, separator_before, is_last);
        }

        let parts = self.parse_parts(start, end)?;

        if let [Part::Capture {
            name,
            rest: true,
            constraint,
            position,
        }] = parts.as_slice()
        {
            if !separator_before {
                return Err(self.error(start, SyntaxErrorKind::CaptureTheRestWithoutSeparator));
            }
            if !is_last {
                return Err(self.error(end, SyntaxErrorKind::CatchAllNotLast));
            }
            if constraint.is_some() {
                return Err(self.error(
                    *position,
                    SyntaxErrorKind::InvalidRegex(
                        "constraints are not supported on capture-the-rest variables".to_owned(),
                    ),
                ));
            }
            if self
                .elements
                .iter()
                .any(|e| *e == PatternElement::WildcardSegments)
            {
                return Err(self.error(start, SyntaxErrorKind::CaptureTheRestAfterInnerWildcard));
            }

            let element = self.elements.len();
            self.segments.push(SegmentDescriptor::new(
                raw,
                None,
                vec![name.clone()],
                SegmentKind::CatchAll,
                element,
            ));
            self.elements.push(PatternElement::CaptureTheRest { name: name.clone() });
            return Ok(());
        }

        for part in &parts {
            if let Part::Capture {
                rest: true,
                position,
                ..
            } = part
            {
                return Err(self.error(
                    position + 1,
                    SyntaxErrorKind::IllegalCharacterInCaptureName('*'),
                ));
            }
        }

        if separator_before {
            self.elements.push(PatternElement::Separator);
        }
        let element = self.elements.len();

        if parts.iter().all(|p| matches!(p, Part::Text(_))) {
            self.segments.push(SegmentDescriptor::new(
                raw.clone(),
                None,
                vec![],
                SegmentKind::Literal,
                element,
            ));
            self.elements.push(PatternElement::Literal { text: raw });
            return Ok(());
        }

        let (body, names) = regex_body(&parts);
        let regex = self.segment_regex(start, &raw, &body, names.clone())?;

        let pattern_element = match parts.as_slice() {
            [Part::AnyChars { .. }] => PatternElement::Wildcard,
            [Part::Capture {
                name, constraint, ..
            }] => PatternElement::Capture {
                name: name.clone(),
                constraint: constraint.as_ref().map(|_| regex.clone()),
            },
            _ if parts
                .iter()
                .all(|p| matches!(p, Part::Text(_) | Part::AnyChar)) =>
            {
                PatternElement::SingleCharWildcard {
                    text: raw.clone(),
                    wildcards: parts.iter().filter(|p| matches!(p, Part::AnyChar)).count(),
                }
            }
            _ => PatternElement::Regex {
                source: raw.clone(),
                regex: regex.clone(),
                wildcards: parts
                    .iter()
                    .filter(|p| matches!(p, Part::AnyChar | Part::AnyChars { counted: true }))
                    .count(),
                normalized_length: parts
                    .iter()
                    .map(|p| match p {
                        Part::Text(t) => t.chars().count(),
                        _ => 1,
                    })
                    .sum(),
            },
        };

        self.segments.push(SegmentDescriptor::new(
            raw,
            Some(regex),
            names,
            SegmentKind::Bounded,
            element,
        ));
        self.elements.push(pattern_element);
        Ok(())
    }

    fn push_double_wildcard(
        &mut self,
        raw: String,
        start: usize,
        separator_before: bool,
        is_last: bool,
    ) -> Result<(), Error> {
        if is_last {
            let element = self.elements.len();
            self.segments.push(SegmentDescriptor::new(
                raw,
                None,
                vec![],
                SegmentKind::CatchAll,
                element,
            ));
            self.elements.push(PatternElement::WildcardTheRest {
                leading_separator: separator_before,
            });
            return Ok(());
        }

        if !self.options.inner_double_wildcard {
            return Err(self.error(start, SyntaxErrorKind::CatchAllNotLast));
        }

        if separator_before {
            self.elements.push(PatternElement::Separator);
        }
        let element = self.elements.len();
        self.segments.push(SegmentDescriptor::new(
            raw,
            None,
            vec![],
            SegmentKind::InnerCatchAll,
            element,
        ));
        self.elements.push(PatternElement::WildcardSegments);
        Ok(())
    }

    fn parse_parts(&mut self, start: usize, end: usize) -> Result<Vec<Part>, Error> {
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut i = start;

        while i < end {
            let c = self.chars[i];
            match c {
                '?' | '*' | '{' if !text.is_empty() => {
                    parts.push(Part::Text(std::mem::take(&mut text)));
                    continue;
                }
                '?' => {
                    parts.push(Part::AnyChar);
                    i += 1;
                }
                '*' => {
                    // A trailing `.*` is an extension glob and does not count towards
                    // specificity.
                    let extension = i + 1 == self.chars.len() && i > 0 && self.chars[i - 1] == '.';
                    parts.push(Part::AnyChars { counted: !extension });
                    i += 1;
                }
                '{' => {
                    if let Some(Part::Capture { .. }) = parts.last() {
                        return Err(self.error(i, SyntaxErrorKind::IllegalDoubleCapture));
                    }
                    let (part, next) = self.parse_capture(i, end)?;
                    parts.push(part);
                    i = next;
                }
                _ => {
                    text.push(c);
                    i += 1;
                }
            }
        }

        if !text.is_empty() {
            parts.push(Part::Text(text));
        }

        Ok(parts)
    }

    // Parses the capture opened at `open`, returning it and the index just past its `}`.
    fn parse_capture(&mut self, open: usize, end: usize) -> Result<(Part, usize), Error> {
        let mut j = open + 1;
        let mut name = String::new();

        while j < end && self.chars[j] != ':' && self.chars[j] != '}' {
            name.push(self.chars[j]);
            j += 1;
        }

        if j >= end {
            return Err(self.error(open, SyntaxErrorKind::MissingCloseCapture));
        }

        let (constraint, next) = if self.chars[j] == ':' {
            let close = self.skip_constraint(open, j + 1)?;
            let constraint: String = self.chars[j + 1..close - 1].iter().collect();
            (Some(constraint), close)
        } else {
            (None, j + 1)
        };

        let rest = name.starts_with('*');
        let bare = if rest { name[1..].to_owned() } else { name };
        self.validate_name(&bare, open + 1 + rest as usize)?;

        if !self.names.insert(bare.clone()) {
            return Err(self.error(open, SyntaxErrorKind::DuplicateCaptureName(bare)));
        }

        Ok((
            Part::Capture {
                name: bare,
                rest,
                constraint,
                position: open,
            },
            next,
        ))
    }

    fn validate_name(&self, name: &str, position: usize) -> Result<(), Error> {
        let mut chars = name.chars();
        match chars.next() {
            None => Err(self.error(position, SyntaxErrorKind::MissingCaptureName)),
            Some(c) if !(c.is_alphabetic() || c == '_') => Err(self.error(
                position,
                SyntaxErrorKind::IllegalCharacterInCaptureName(c),
            )),
            Some(_) => match chars
                .enumerate()
                .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.'))
            {
                Some((n, c)) => Err(self.error(
                    position + n + 1,
                    SyntaxErrorKind::IllegalCharacterInCaptureName(c),
                )),
                None => Ok(()),
            },
        }
    }

    fn segment_regex(
        &self,
        start: usize,
        raw: &str,
        body: &str,
        names: Vec<String>,
    ) -> Result<SegmentRegex, Error> {
        SegmentRegex::new(raw, body, names, self.options.case_sensitive).map_err(|e| match e {
            SegmentRegexError::Invalid(reason) => {
                self.error(start, SyntaxErrorKind::InvalidRegex(reason))
            }
            SegmentRegexError::Arity(e) => e.into(),
        })
    }
}

fn regex_body(parts: &[Part]) -> (String, Vec<String>) {
    let mut body = String::new();
    let mut names = Vec::new();

    for part in parts {
        match part {
            Part::Text(t) => body.push_str(&regex::escape(t)),
            Part::AnyChar => body.push('.'),
            Part::AnyChars { .. } => body.push_str(".*"),
            Part::Capture {
                name, constraint, ..
            } => {
                match constraint {
                    Some(c) => {
                        body.push('(');
                        body.push_str(c);
                        body.push(')');
                    }
                    None => body.push_str("(.*)"),
                }
                names.push(name.clone());
            }
        }
    }

    (body, names)
}
