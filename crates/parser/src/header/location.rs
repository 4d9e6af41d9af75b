//! Where the payload lives and where in that file it starts.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{JnrrdError, Result},
    header::{Header, fields},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    /// In the header file, `offset` bytes from its start (`byte_skip`
    /// already applied).
    Inline { offset: u64 },
    /// In a separate file named by `data_file`.
    Detached {
        path: PathBuf,
        line_skip: u64,
        byte_skip: u64,
    },
}

impl DataLocation {
    /// `inline_offset` is the data offset found by the header scan. A
    /// relative `data_file` resolves against the directory of `header_path`.
    /// `line_skip` only applies to detached files.
    pub fn from_header(
        header: &Header,
        header_path: Option<&Path>,
        inline_offset: u64,
    ) -> Result<Self> {
        let byte_skip = header.byte_skip()?;
        let location = match header.data_file()? {
            None => DataLocation::Inline {
                offset: skip_bytes(inline_offset, byte_skip)?,
            },
            Some(data_file) => {
                let data_file = Path::new(data_file);
                let path = match header_path.and_then(Path::parent) {
                    Some(dir) if data_file.is_relative() => dir.join(data_file),
                    _ => data_file.to_path_buf(),
                };
                DataLocation::Detached {
                    path,
                    line_skip: header.line_skip()?,
                    byte_skip,
                }
            }
        };
        debug!(?location, "resolved data location");
        Ok(location)
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, DataLocation::Detached { .. })
    }

    /// Byte offset of the first payload byte in the file holding it. For a
    /// detached file this reads past `line_skip` lines first.
    pub fn start_offset(&self) -> Result<u64> {
        match self {
            DataLocation::Inline { offset } => Ok(*offset),
            DataLocation::Detached {
                path,
                line_skip,
                byte_skip,
            } => {
                let skipped = if *line_skip > 0 {
                    skip_lines(BufReader::new(File::open(path)?), *line_skip)?
                } else {
                    0
                };
                debug!(path = %path.display(), line_skip, skipped, byte_skip, "detached data offset");
                skip_bytes(skipped, *byte_skip)
            }
        }
    }
}

#[inline]
fn skip_bytes(offset: u64, byte_skip: u64) -> Result<u64> {
    offset
        .checked_add(byte_skip)
        .ok_or_else(|| JnrrdError::InvalidField {
            field: fields::BYTE_SKIP,
            reason: format!("{byte_skip} past offset {offset} overflows the file offset"),
        })
}

/// Consumes up to `lines` lines and returns the bytes consumed. Stops early
/// at end of input.
pub(crate) fn skip_lines<R: BufRead>(mut reader: R, lines: u64) -> Result<u64> {
    let mut consumed = 0u64;
    let mut buf = Vec::new();
    for _ in 0..lines {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        consumed += n as u64;
    }
    Ok(consumed)
}
