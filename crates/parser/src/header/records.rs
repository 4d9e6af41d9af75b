//! The line-delimited header: one `{"key": value}` object per line, closed by
//! a blank line.

use std::io::{BufRead, Write};

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    error::{JnrrdError, Result},
    extension::ValueNode,
};

/// Key of the format/version record written on the first line.
pub const MAGIC_KEY: &str = "jnrrd";

/// One decoded header line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRecord {
    pub key: String,
    pub value: ValueNode,
}

impl HeaderRecord {
    pub fn new(key: impl Into<String>, value: impl Into<ValueNode>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Strict decode of one non-blank line. `line` is 1-based and only used
    /// for error context.
    pub fn parse_line(bytes: &[u8], line: usize) -> Result<Self> {
        let map: Map<String, Value> =
            serde_json::from_slice(bytes).map_err(|e| JnrrdError::MalformedHeaderLine {
                line,
                reason: e.to_string(),
            })?;
        if map.len() != 1 {
            return Err(JnrrdError::MalformedHeaderLine {
                line,
                reason: format!("expected exactly one key, found {}", map.len()),
            });
        }
        match map.into_iter().next() {
            Some((key, value)) => Ok(Self::new(key, value)),
            None => Err(JnrrdError::MalformedHeaderLine {
                line,
                reason: "empty object".to_string(),
            }),
        }
    }

    /// Compact single-line JSON, without the trailing newline.
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for HeaderRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

/// Why header scanning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEnd {
    /// A blank line; data starts right after it.
    BlankLine,
    /// A line that is not a single-key JSON object; data starts at its first
    /// byte. A broken header record cannot be told apart from this.
    UndecodableLine,
    /// The input ended inside the header.
    EndOfFile,
}

#[derive(Debug, Clone)]
pub struct HeaderScan {
    pub records: Vec<HeaderRecord>,
    /// Byte offset of the first payload byte in the scanned input.
    pub data_offset: u64,
    pub end: HeaderEnd,
    /// 1-based number of the line that ended the header.
    pub end_line: usize,
}

/// Reads records from the start of `reader` until the header ends.
pub fn read_records<R: BufRead>(reader: &mut R) -> Result<HeaderScan> {
    let mut records = Vec::new();
    let mut buf = Vec::with_capacity(256);
    let mut offset = 0u64;
    let mut line = 0usize;

    loop {
        buf.clear();
        let line_start = offset;
        let n = reader.read_until(b'\n', &mut buf)?;
        line += 1;
        if n == 0 {
            debug!(records = records.len(), offset, "header ended at end of input");
            return Ok(HeaderScan {
                records,
                data_offset: offset,
                end: HeaderEnd::EndOfFile,
                end_line: line,
            });
        }
        offset += n as u64;

        let trimmed = buf.trim_ascii();
        if trimmed.is_empty() {
            debug!(records = records.len(), data_offset = offset, "header ended at blank line");
            return Ok(HeaderScan {
                records,
                data_offset: offset,
                end: HeaderEnd::BlankLine,
                end_line: line,
            });
        }

        match HeaderRecord::parse_line(trimmed, line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    line,
                    data_offset = line_start,
                    error = %e,
                    "header ended at a line that is not a JSON record; treating it as payload"
                );
                return Ok(HeaderScan {
                    records,
                    data_offset: line_start,
                    end: HeaderEnd::UndecodableLine,
                    end_line: line,
                });
            }
        }
    }
}

/// Writes the magic record first (when present), the remaining records in
/// order, then the blank separator line. Returns the number of bytes
/// written, which is the inline data offset.
pub fn write_records<W: Write>(writer: &mut W, records: &[HeaderRecord]) -> Result<u64> {
    let mut written = 0u64;
    let magic = records.iter().filter(|r| r.key == MAGIC_KEY);
    let rest = records.iter().filter(|r| r.key != MAGIC_KEY);

    for record in magic.take(1).chain(rest) {
        let mut line = record.to_line()?;
        line.push('\n');
        writer.write_all(line.as_bytes())?;
        written += line.len() as u64;
    }
    writer.write_all(b"\n")?;
    Ok(written + 1)
}
