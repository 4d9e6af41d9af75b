//! Payload encodings and the codec registry.
//!
//! Compression codecs sit behind cargo features. Asking for one that was
//! compiled out is a `MissingOptionalDependency` error, so callers never
//! need to know which backends are linked in.

use std::{fmt, str::FromStr};

use tracing::debug;

use crate::{
    data::text::HexCodec,
    error::{JnrrdError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Raw,
    Gzip,
    Bzip2,
    Zstd,
    Lz4,
    Ascii,
    Hex,
}

impl Encoding {
    pub const ALL: [Encoding; 7] = [
        Encoding::Raw,
        Encoding::Gzip,
        Encoding::Bzip2,
        Encoding::Zstd,
        Encoding::Lz4,
        Encoding::Ascii,
        Encoding::Hex,
    ];

    /// Accepts every identifier the format allows, aliases included.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "raw" => Ok(Encoding::Raw),
            "gzip" | "gz" => Ok(Encoding::Gzip),
            "bzip2" | "bz2" => Ok(Encoding::Bzip2),
            "zstd" => Ok(Encoding::Zstd),
            "lz4" => Ok(Encoding::Lz4),
            "ascii" | "text" | "txt" => Ok(Encoding::Ascii),
            "hex" => Ok(Encoding::Hex),
            other => Err(JnrrdError::UnsupportedEncoding(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Gzip => "gzip",
            Encoding::Bzip2 => "bzip2",
            Encoding::Zstd => "zstd",
            Encoding::Lz4 => "lz4",
            Encoding::Ascii => "ascii",
            Encoding::Hex => "hex",
        }
    }

    /// Level used when the caller does not pick one.
    pub fn default_level(self) -> Option<u32> {
        match self {
            Encoding::Gzip | Encoding::Bzip2 | Encoding::Lz4 => Some(9),
            Encoding::Zstd => Some(10),
            _ => None,
        }
    }

    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            Encoding::Gzip | Encoding::Bzip2 | Encoding::Zstd | Encoding::Lz4
        )
    }
}

impl FromStr for Encoding {
    type Err = JnrrdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A whole-buffer byte transform.
pub trait ByteCodec: Sync {
    fn encoding(&self) -> Encoding;

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    fn encode(&self, input: &[u8], level: Option<u32>) -> Result<Vec<u8>>;
}

/// How an encoding turns into payload bytes.
#[derive(Clone, Copy)]
pub enum Codec {
    /// Operates on the element bytes.
    Bytes(&'static dyn ByteCodec),
    /// Operates on element values written as text.
    Text,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Bytes(codec) => write!(f, "Bytes({})", codec.encoding()),
            Codec::Text => f.write_str("Text"),
        }
    }
}

/// Looks up the codec for `encoding`.
pub fn codec_for(encoding: Encoding) -> Result<Codec> {
    let codec = match encoding {
        Encoding::Raw => Codec::Bytes(&RawCodec),
        Encoding::Ascii => Codec::Text,
        Encoding::Hex => Codec::Bytes(&HexCodec),
        #[cfg(feature = "gzip")]
        Encoding::Gzip => Codec::Bytes(&compress::GzipCodec),
        #[cfg(feature = "bzip2")]
        Encoding::Bzip2 => Codec::Bytes(&compress::Bzip2Codec),
        #[cfg(feature = "zstd")]
        Encoding::Zstd => Codec::Bytes(&compress::ZstdCodec),
        #[cfg(feature = "lz4")]
        Encoding::Lz4 => Codec::Bytes(&compress::Lz4Codec),
        #[allow(unreachable_patterns)]
        missing => {
            return Err(JnrrdError::MissingOptionalDependency {
                encoding: missing.name(),
                feature: missing.name(),
            });
        }
    };
    debug!(encoding = %encoding, ?codec, "selected codec");
    Ok(codec)
}

struct RawCodec;

impl ByteCodec for RawCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Raw
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }

    fn encode(&self, input: &[u8], _level: Option<u32>) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }
}

#[cfg(any(feature = "gzip", feature = "bzip2", feature = "zstd", feature = "lz4"))]
mod compress {
    #[cfg(any(feature = "gzip", feature = "bzip2", feature = "lz4"))]
    use std::io::{Read, Write};

    use super::{ByteCodec, Encoding};
    use crate::error::{JnrrdError, Result};

    #[inline]
    fn codec_error(encoding: Encoding, e: impl std::fmt::Display) -> JnrrdError {
        JnrrdError::Codec {
            encoding: encoding.name(),
            reason: e.to_string(),
        }
    }

    #[inline]
    fn level_or_default(encoding: Encoding, level: Option<u32>) -> u32 {
        level.or(encoding.default_level()).unwrap_or(0)
    }

    #[cfg(feature = "gzip")]
    pub(super) struct GzipCodec;

    #[cfg(feature = "gzip")]
    impl ByteCodec for GzipCodec {
        fn encoding(&self) -> Encoding {
            Encoding::Gzip
        }

        fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
            let mut out = Vec::new();
            flate2::read::MultiGzDecoder::new(input)
                .read_to_end(&mut out)
                .map_err(|e| codec_error(Encoding::Gzip, e))?;
            Ok(out)
        }

        fn encode(&self, input: &[u8], level: Option<u32>) -> Result<Vec<u8>> {
            let level = level_or_default(Encoding::Gzip, level).min(9);
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::new(level));
            encoder
                .write_all(input)
                .map_err(|e| codec_error(Encoding::Gzip, e))?;
            encoder.finish().map_err(|e| codec_error(Encoding::Gzip, e))
        }
    }

    #[cfg(feature = "bzip2")]
    pub(super) struct Bzip2Codec;

    #[cfg(feature = "bzip2")]
    impl ByteCodec for Bzip2Codec {
        fn encoding(&self) -> Encoding {
            Encoding::Bzip2
        }

        fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
            let mut out = Vec::new();
            bzip2::read::MultiBzDecoder::new(input)
                .read_to_end(&mut out)
                .map_err(|e| codec_error(Encoding::Bzip2, e))?;
            Ok(out)
        }

        fn encode(&self, input: &[u8], level: Option<u32>) -> Result<Vec<u8>> {
            let level = level_or_default(Encoding::Bzip2, level).clamp(1, 9);
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::new(level));
            encoder
                .write_all(input)
                .map_err(|e| codec_error(Encoding::Bzip2, e))?;
            encoder.finish().map_err(|e| codec_error(Encoding::Bzip2, e))
        }
    }

    #[cfg(feature = "zstd")]
    pub(super) struct ZstdCodec;

    #[cfg(feature = "zstd")]
    impl ByteCodec for ZstdCodec {
        fn encoding(&self) -> Encoding {
            Encoding::Zstd
        }

        fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
            zstd::stream::decode_all(input).map_err(|e| codec_error(Encoding::Zstd, e))
        }

        fn encode(&self, input: &[u8], level: Option<u32>) -> Result<Vec<u8>> {
            let level = level_or_default(Encoding::Zstd, level).clamp(1, 22) as i32;
            zstd::bulk::compress(input, level).map_err(|e| codec_error(Encoding::Zstd, e))
        }
    }

    /// LZ4 frame format. `lz4_flex` has a single compression speed, so the
    /// level is accepted and ignored.
    #[cfg(feature = "lz4")]
    pub(super) struct Lz4Codec;

    #[cfg(feature = "lz4")]
    impl ByteCodec for Lz4Codec {
        fn encoding(&self) -> Encoding {
            Encoding::Lz4
        }

        fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
            let mut out = Vec::new();
            lz4_flex::frame::FrameDecoder::new(input)
                .read_to_end(&mut out)
                .map_err(|e| codec_error(Encoding::Lz4, e))?;
            Ok(out)
        }

        fn encode(&self, input: &[u8], _level: Option<u32>) -> Result<Vec<u8>> {
            let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
            encoder
                .write_all(input)
                .map_err(|e| codec_error(Encoding::Lz4, e))?;
            encoder.finish().map_err(|e| codec_error(Encoding::Lz4, e))
        }
    }
}
