use std::{fmt, str::FromStr};

use crate::error::{JnrrdError, Result};

/// Largest array index a path may address; merging pads arrays up to it.
pub const MAX_INDEX: usize = 1 << 20;

/// One step of a [`Path`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// A dotted/bracketed address into a value tree, e.g. `channels[1].name`.
///
/// Always holds at least one segment and always starts with a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Parses `a.b[0][1].c` into `[a, b, 0, 1, c]`.
    ///
    /// A `.` after a bracket group is optional, so `a[0]b` reads as `a[0].b`.
    pub fn parse(input: &str) -> Result<Self> {
        let bytes = input.as_bytes();
        let len = bytes.len();
        if len == 0 {
            return Err(syntax_error(input, 0, "empty path"));
        }

        let mut segments = Vec::new();
        let mut pos = 0usize;

        loop {
            let start = pos;
            while pos < len && !matches!(bytes[pos], b'.' | b'[' | b']') {
                pos += 1;
            }
            if pos == start {
                let reason = if segments.is_empty() && pos < len && bytes[pos] == b'[' {
                    "index without a preceding field name"
                } else {
                    "empty field name"
                };
                return Err(syntax_error(input, pos, reason));
            }
            segments.push(PathSegment::Field(input[start..pos].to_string()));

            while pos < len && bytes[pos] == b'[' {
                pos += 1;
                let digits = pos;
                while pos < len && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos == digits {
                    return Err(syntax_error(input, pos, "expected digits after '['"));
                }
                if pos >= len || bytes[pos] != b']' {
                    return Err(syntax_error(input, pos, "unclosed '['"));
                }
                let index = input[digits..pos]
                    .parse::<usize>()
                    .ok()
                    .filter(|index| *index <= MAX_INDEX)
                    .ok_or_else(|| syntax_error(input, digits, "index out of range"))?;
                segments.push(PathSegment::Index(index));
                pos += 1;
            }

            if pos == len {
                break;
            }
            match bytes[pos] {
                b'.' => {
                    pos += 1;
                    if pos == len {
                        return Err(syntax_error(input, pos, "trailing '.'"));
                    }
                }
                b']' => return Err(syntax_error(input, pos, "unexpected ']'")),
                _ => {}
            }
        }

        Ok(Self { segments })
    }

    /// A single-field path. Used for unprefixed header keys, which are never
    /// split on `.` or `[`.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The leading field name and the segments after it.
    pub fn split_first(&self) -> (&str, &[PathSegment]) {
        match self.segments.split_first() {
            Some((PathSegment::Field(name), rest)) => (name.as_str(), rest),
            _ => unreachable!("a path always starts with a field"),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        if self.segments.len() > 1 {
            self.segments.pop();
        }
    }
}

impl FromStr for Path {
    type Err = JnrrdError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[inline]
fn syntax_error(path: &str, position: usize, reason: &'static str) -> JnrrdError {
    JnrrdError::PathSyntax {
        path: path.to_string(),
        position,
        reason,
    }
}
