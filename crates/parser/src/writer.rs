//! Writing JNRRD files, inline or with a detached payload.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::debug;

use crate::{
    data::{ByteOrder, DataArray, Encoding, encode_payload},
    error::{JnrrdError, Result},
    header::{FORMAT_VERSION, Header, fields, write_records},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub encoding: Encoding,
    /// `None` picks the codec's default level.
    pub compression_level: Option<u32>,
    pub byte_order: ByteOrder,
}

impl WriteOptions {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.compression_level = Some(level);
        self
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }
}

/// Returns a copy of `header` whose core fields describe `array` as it will
/// be written with `options`.
///
/// The version is only filled in when absent. `type`, `dimension`, `sizes`,
/// `endian` and `encoding` always follow the array and the options. Location
/// fields are dropped; [`write_detached`] adds `data_file` back.
pub fn prepare_header(header: &Header, array: &DataArray, options: &WriteOptions) -> Header {
    let mut prepared = header.clone();
    if !prepared.contains(fields::MAGIC) {
        prepared.set(fields::MAGIC, FORMAT_VERSION);
    }
    prepared.set(fields::TYPE, array.element_type().name());
    prepared.set(fields::DIMENSION, array.dimension());
    prepared.set(fields::SIZES, array.sizes().to_vec());
    prepared.set(fields::ENDIAN, options.byte_order.name());
    prepared.set(fields::ENCODING, options.encoding.name());
    for field in [fields::DATA_FILE, fields::LINE_SKIP, fields::BYTE_SKIP] {
        prepared.remove(field);
    }
    prepared
}

/// Writes header and payload to `writer`. The payload is encoded before
/// anything is written, so a codec failure leaves `writer` untouched.
pub fn write_to<W: Write>(
    writer: &mut W,
    header: &Header,
    array: &DataArray,
    options: &WriteOptions,
) -> Result<()> {
    let header = prepare_header(header, array, options);
    let payload = encode(array, options)?;
    let header_len = write_records(writer, &header.to_records())?;
    writer.write_all(&payload)?;
    debug!(
        header_len,
        payload_len = payload.len(),
        encoding = %options.encoding,
        "wrote inline file"
    );
    Ok(())
}

pub fn write(
    path: impl AsRef<Path>,
    header: &Header,
    array: &DataArray,
    options: &WriteOptions,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_to(&mut writer, header, array, options)?;
    writer.flush()?;
    Ok(())
}

pub fn write_to_vec(header: &Header, array: &DataArray, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_to(&mut out, header, array, options)?;
    Ok(out)
}

/// Writes the header to `header_path` and the encoded payload alone to
/// `data_path`.
///
/// `data_file` holds the bare file name when both paths share a directory,
/// otherwise `data_path` as given.
pub fn write_detached(
    header_path: impl AsRef<Path>,
    data_path: impl AsRef<Path>,
    header: &Header,
    array: &DataArray,
    options: &WriteOptions,
) -> Result<()> {
    let (header_path, data_path) = (header_path.as_ref(), data_path.as_ref());
    let mut header = prepare_header(header, array, options);
    header.set(fields::DATA_FILE, data_file_field(header_path, data_path)?);

    let payload = encode(array, options)?;

    let mut writer = BufWriter::new(File::create(header_path)?);
    write_records(&mut writer, &header.to_records())?;
    writer.flush()?;

    let mut writer = BufWriter::new(File::create(data_path)?);
    writer.write_all(&payload)?;
    writer.flush()?;

    debug!(
        header = %header_path.display(),
        data = %data_path.display(),
        payload_len = payload.len(),
        "wrote detached file"
    );
    Ok(())
}

fn data_file_field(header_path: &Path, data_path: &Path) -> Result<String> {
    let same_dir = header_path.parent() == data_path.parent();
    let field = match data_path.file_name() {
        Some(name) if same_dir => name.to_str(),
        _ => data_path.to_str(),
    };
    field
        .map(str::to_string)
        .ok_or_else(|| JnrrdError::InvalidField {
            field: fields::DATA_FILE,
            reason: format!("{} is not valid UTF-8", data_path.display()),
        })
}

#[inline]
fn encode(array: &DataArray, options: &WriteOptions) -> Result<Vec<u8>> {
    encode_payload(
        array.buffer(),
        options.byte_order,
        options.encoding,
        options.compression_level,
    )
}
