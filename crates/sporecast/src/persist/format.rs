//! Binary artifact encoding.
//!
//! A binary artifact is a 16-byte header followed by a Postcard-encoded
//! payload.
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic ("SPRC")
//! 4       1     Version major
//! 5       1     Version minor
//! 6       1     Artifact kind
//! 7       1     Reserved
//! 8       4     Payload size (bytes, LE)
//! 12      4     CRC32 checksum of payload (LE)
//! ```

use std::fmt;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a binary artifact.
pub const MAGIC: &[u8; 4] = b"SPRC";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 16;

// ============================================================================
// Artifact Kind
// ============================================================================

/// Which artifact a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArtifactKind {
    Classifier = 0,
    Scaler = 1,
    FeatureColumns = 2,
}

impl ArtifactKind {
    /// Convert from u8, returning None for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Classifier),
            1 => Some(Self::Scaler),
            2 => Some(Self::FeatureColumns),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classifier => "classifier",
            Self::Scaler => "scaler",
            Self::FeatureColumns => "feature columns",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Header
// ============================================================================

/// Binary artifact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub kind: ArtifactKind,
    pub payload_size: u32,
    pub checksum: u32,
}

impl FormatHeader {
    /// Create a header with the current version.
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            kind,
            payload_size: 0,
            checksum: 0,
        }
    }

    /// Serialize header to 16 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[6] = self.kind as u8;
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Parse header from 16 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DecodeError> {
        if &buf[0..4] != MAGIC {
            return Err(DecodeError::NotAnArtifact);
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DecodeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let kind = ArtifactKind::from_u8(buf[6]).ok_or_else(|| {
            DecodeError::CorruptPayload(format!("invalid artifact kind {}", buf[6]))
        })?;

        let payload_size = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        let checksum = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);

        Ok(Self {
            version_major,
            version_minor,
            kind,
            payload_size,
            checksum,
        })
    }
}

/// Returns true if `bytes` starts with the binary artifact magic.
#[inline]
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while encoding a binary artifact.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Errors that can occur while decoding a binary artifact.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Wrong magic.
    #[error("not a sporecast artifact file")]
    NotAnArtifact,

    /// Written by a newer format version.
    #[error("artifact requires format {major}.{minor} or later")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

// ============================================================================
// Read / Write
// ============================================================================

/// Compute CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Encode `payload` with a header for `kind` and write it.
pub fn write_binary<W: Write, T: Serialize>(
    writer: &mut W,
    kind: ArtifactKind,
    payload: &T,
) -> Result<(), EncodeError> {
    let bytes = postcard::to_allocvec(payload)?;

    let mut header = FormatHeader::new(kind);
    header.payload_size = bytes.len() as u32;
    header.checksum = compute_checksum(&bytes);

    writer.write_all(&header.to_bytes())?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Read the header and checksum-verified payload bytes.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<(FormatHeader, Vec<u8>), DecodeError> {
    let mut header_buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            DecodeError::Truncated {
                expected: HEADER_SIZE,
                actual: 0,
            }
        } else {
            DecodeError::Io(e)
        }
    })?;

    let header = FormatHeader::from_bytes(&header_buf)?;

    let expected = header.payload_size as usize;
    let mut payload = Vec::with_capacity(expected.min(1 << 20));
    reader.by_ref().take(expected as u64).read_to_end(&mut payload)?;
    if payload.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: payload.len(),
        });
    }

    let actual_checksum = compute_checksum(&payload);
    if actual_checksum != header.checksum {
        return Err(DecodeError::ChecksumMismatch {
            expected: header.checksum,
            actual: actual_checksum,
        });
    }

    Ok((header, payload))
}

/// Decode a binary artifact from a byte slice.
pub fn read_binary<T: DeserializeOwned>(bytes: &[u8]) -> Result<(FormatHeader, T), DecodeError> {
    let mut cursor = std::io::Cursor::new(bytes);
    let (header, payload) = read_frame(&mut cursor)?;
    let value = postcard::from_bytes(&payload)?;
    Ok((header, value))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = FormatHeader {
            version_major: 1,
            version_minor: 2,
            kind: ArtifactKind::Scaler,
            payload_size: 12345,
            checksum: 0xDEADBEEF,
        };

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(FormatHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn header_wrong_magic() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(b"XXXX");
        assert!(matches!(
            FormatHeader::from_bytes(&buf),
            Err(DecodeError::NotAnArtifact)
        ));
    }

    #[test]
    fn header_unsupported_version() {
        let mut header = FormatHeader::new(ArtifactKind::Classifier);
        header.version_major = 99;
        assert!(matches!(
            FormatHeader::from_bytes(&header.to_bytes()),
            Err(DecodeError::UnsupportedVersion { major: 99, .. })
        ));
    }

    #[test]
    fn header_invalid_kind() {
        let mut bytes = FormatHeader::new(ArtifactKind::Classifier).to_bytes();
        bytes[6] = 42;
        assert!(matches!(
            FormatHeader::from_bytes(&bytes),
            Err(DecodeError::CorruptPayload(_))
        ));
    }

    #[test]
    fn frame_roundtrip() {
        let columns = vec!["odor_f".to_string(), "odor_n".to_string()];
        let mut buf = Vec::new();
        write_binary(&mut buf, ArtifactKind::FeatureColumns, &columns).unwrap();
        assert!(is_binary(&buf));

        let (header, decoded): (_, Vec<String>) = read_binary(&buf).unwrap();
        assert_eq!(header.kind, ArtifactKind::FeatureColumns);
        assert_eq!(decoded, columns);
    }

    #[test]
    fn detects_checksum_mismatch() {
        let mut buf = Vec::new();
        write_binary(&mut buf, ArtifactKind::FeatureColumns, &vec!["a_b".to_string()]).unwrap();
        let last = buf.len() - 1;
        buf[last] ^= 0xFF;
        assert!(matches!(
            read_binary::<Vec<String>>(&buf),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn detects_truncation() {
        let mut buf = Vec::new();
        write_binary(&mut buf, ArtifactKind::FeatureColumns, &vec!["a_b".to_string()]).unwrap();
        buf.truncate(buf.len() - 2);
        assert!(matches!(
            read_binary::<Vec<String>>(&buf),
            Err(DecodeError::Truncated { .. })
        ));

        assert!(matches!(
            read_binary::<Vec<String>>(&buf[..4]),
            Err(DecodeError::Truncated { actual: 0, .. })
        ));
    }
}
