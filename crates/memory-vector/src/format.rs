//! Serialized index layout.
//!
//! # Structure
//!
//! ```text
//! Offset   Size          Type        Description
//! ─────────────────────────────────────────────────────
//! 0x00     8             [u8; 8]     Magic: "MVIDX001"
//! 0x08     4             u32 LE      D: Dimensions
//! 0x0C     8             u64 LE      N: Number of records
//! 0x14     N*(8+D*4)     records     id (i64 LE) followed by D f32 LE
//! ```
//!
//! Records are written in ascending ID order.

use crate::error::VectorError;

/// Magic bytes identifying a serialized index: "MVIDX001"
pub const MAGIC: [u8; 8] = *b"MVIDX001";

/// Header size in bytes: 8 (magic) + 4 (dims) + 8 (count) = 20
pub const HEADER_SIZE: usize = 20;

/// Parsed index header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub dimensions: u32,
    pub count: u64,
}

impl IndexHeader {
    /// Parse header from the first 20 bytes of a payload
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VectorError> {
        if bytes.len() < HEADER_SIZE {
            return Err(VectorError::CorruptIndex(format!(
                "payload too small for header: {} bytes",
                bytes.len()
            )));
        }
        if bytes[0..8] != MAGIC {
            return Err(VectorError::CorruptIndex("invalid magic bytes".to_string()));
        }

        let dimensions = u32::from_le_bytes(read_array(&bytes[8..12]));
        let count = u64::from_le_bytes(read_array(&bytes[12..20]));
        if dimensions == 0 {
            return Err(VectorError::CorruptIndex("zero dimension".to_string()));
        }

        Ok(Self { dimensions, count })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&MAGIC);
        buf[8..12].copy_from_slice(&self.dimensions.to_le_bytes());
        buf[12..20].copy_from_slice(&self.count.to_le_bytes());
        buf
    }

    /// Bytes occupied by one record
    pub fn record_size(&self) -> usize {
        8 + self.dimensions as usize * std::mem::size_of::<f32>()
    }

    /// Expected total payload size, `None` on overflow
    pub fn payload_size(&self) -> Option<usize> {
        usize::try_from(self.count)
            .ok()?
            .checked_mul(self.record_size())?
            .checked_add(HEADER_SIZE)
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Encode records into a payload.
pub fn encode<'a, I>(dimensions: usize, count: usize, records: I) -> Vec<u8>
where
    I: IntoIterator<Item = (i64, &'a [f32])>,
{
    let header = IndexHeader {
        dimensions: dimensions as u32,
        count: count as u64,
    };
    let mut buf = Vec::with_capacity(HEADER_SIZE + count * header.record_size());
    buf.extend_from_slice(&header.to_bytes());
    for (id, values) in records {
        buf.extend_from_slice(&id.to_le_bytes());
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    buf
}

/// Decode a payload into its header and records.
///
/// Rejects truncated or oversized payloads and non-finite components.
/// Duplicate IDs are left to the caller.
pub fn decode(bytes: &[u8]) -> Result<(IndexHeader, Vec<(i64, Vec<f32>)>), VectorError> {
    let header = IndexHeader::from_bytes(bytes)?;
    let expected = header
        .payload_size()
        .ok_or_else(|| VectorError::CorruptIndex("record count overflows".to_string()))?;
    if bytes.len() != expected {
        return Err(VectorError::CorruptIndex(format!(
            "expected {} bytes for {} records, found {}",
            expected,
            header.count,
            bytes.len()
        )));
    }

    let dims = header.dimensions as usize;
    let mut records = Vec::with_capacity(header.count as usize);
    for chunk in bytes[HEADER_SIZE..].chunks_exact(header.record_size()) {
        let id = i64::from_le_bytes(read_array(&chunk[..8]));
        let values: Vec<f32> = chunk[8..]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(read_array(b)))
            .collect();
        debug_assert_eq!(values.len(), dims);
        if values.iter().any(|v| !v.is_finite()) {
            return Err(VectorError::CorruptIndex(format!(
                "non-finite component in vector {}",
                id
            )));
        }
        records.push((id, values));
    }

    Ok((header, records))
}
