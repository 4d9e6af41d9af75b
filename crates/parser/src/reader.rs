//! Reading JNRRD files from disk or memory.

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use tracing::debug;

use crate::{
    data::{DataArray, Encoding, decode_payload},
    error::{JnrrdError, Result},
    header::{DataLocation, Header, HeaderEnd, HeaderRecord, MAGIC_KEY, read_records},
};

/// A header together with where its scan stopped.
#[derive(Debug, Clone)]
pub struct ParsedHeader {
    pub header: Header,
    /// Offset of the first byte after the header in the scanned input.
    pub data_offset: u64,
    pub end: HeaderEnd,
}

/// Scans header records from the start of `reader` and builds the
/// namespaced header.
pub fn parse_header<R: BufRead>(reader: &mut R) -> Result<ParsedHeader> {
    let scan = read_records(reader)?;
    let header = Header::from_records(&scan.records)?;
    Ok(ParsedHeader {
        header,
        data_offset: scan.data_offset,
        end: scan.end,
    })
}

/// Reads only the header; the payload is never touched.
pub fn read_header(path: impl AsRef<Path>) -> Result<Header> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    Ok(parse_header(&mut reader)?.header)
}

/// Reads the header and decodes the payload, inline or detached.
pub fn read(path: impl AsRef<Path>) -> Result<(Header, DataArray)> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let ParsedHeader {
        header,
        data_offset,
        end,
    } = parse_header(&mut reader)?;
    debug!(path = %path.display(), data_offset, ?end, "read header");

    let descriptor = header.descriptor()?;
    let encoding = header.encoding()?;
    let limit = payload_limit(encoding, descriptor.byte_len());

    let location = DataLocation::from_header(&header, Some(path), data_offset)?;
    let offset = location.start_offset()?;
    let payload = match &location {
        DataLocation::Inline { .. } => read_payload(&mut reader, offset, limit)?,
        DataLocation::Detached { path, .. } => {
            read_payload(&mut BufReader::new(File::open(path)?), offset, limit)?
        }
    };

    let buffer = decode_payload(&payload, &descriptor, encoding)?;
    let array = DataArray::new(descriptor.sizes, buffer)?;
    Ok((header, array))
}

/// Decodes an in-memory file. Only inline payloads can be read this way.
pub fn read_from_bytes(bytes: &[u8]) -> Result<(Header, DataArray)> {
    let mut cursor = Cursor::new(bytes);
    let ParsedHeader {
        header,
        data_offset,
        ..
    } = parse_header(&mut cursor)?;

    let location = DataLocation::from_header(&header, None, data_offset)?;
    let DataLocation::Inline { offset } = location else {
        return Err(JnrrdError::DetachedDataUnavailable);
    };

    let descriptor = header.descriptor()?;
    let encoding = header.encoding()?;
    let payload = usize::try_from(offset)
        .ok()
        .and_then(|start| bytes.get(start..))
        .unwrap_or_default();
    let buffer = decode_payload(payload, &descriptor, encoding)?;
    let array = DataArray::new(descriptor.sizes, buffer)?;
    Ok((header, array))
}

/// Longest first line [`can_read_file`] looks at.
const MAGIC_SNIFF_LIMIT: u64 = 4096;

/// Whether the first line of `path` is a header record carrying the format
/// magic key. Never fails; unreadable files are simply not JNRRD.
pub fn can_read_file(path: impl AsRef<Path>) -> bool {
    let Ok(file) = File::open(path.as_ref()) else {
        return false;
    };
    let mut first = Vec::new();
    let mut reader = BufReader::new(file).take(MAGIC_SNIFF_LIMIT);
    if reader.read_until(b'\n', &mut first).is_err() {
        return false;
    }
    HeaderRecord::parse_line(first.trim_ascii(), 1).is_ok_and(|record| record.key == MAGIC_KEY)
}

/// Raw payloads are read up to the bytes they need; every other encoding
/// reads to the end of the file.
#[inline]
fn payload_limit(encoding: Encoding, byte_len: usize) -> Option<u64> {
    (encoding == Encoding::Raw).then_some(byte_len as u64)
}

fn read_payload<R: Read + Seek>(reader: &mut R, offset: u64, limit: Option<u64>) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut payload = Vec::new();
    match limit {
        Some(limit) => reader.by_ref().take(limit).read_to_end(&mut payload)?,
        None => reader.read_to_end(&mut payload)?,
    };
    Ok(payload)
}
