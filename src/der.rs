//! A minimal DER codec for the single ASN.1 profile this crate needs:
//! `SEQUENCE` of `INTEGER` and `OCTET STRING`.

use crate::error::{Error, ErrorKind, Result};
use alloc::vec::Vec;

const TAG_INTEGER: u8 = 0x02;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_SEQUENCE: u8 = 0x30;

/// A byte range `(start, len)` into a parsed buffer.
pub type Range = (usize, usize);

/// Ordered builder for a DER `SEQUENCE` of `INTEGER`/`OCTET STRING` items.
#[derive(Debug, Default)]
pub struct DerEncoder {
    items: Vec<(u8, Vec<u8>)>,
}

impl DerEncoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an `OCTET STRING` item. `None` is silently ignored, matching
    /// the source library's defensive null-tolerance.
    pub fn append_octet_string(&mut self, bytes: Option<&[u8]>) {
        if let Some(bytes) = bytes {
            self.items.push((TAG_OCTET_STRING, bytes.to_vec()));
        }
    }

    /// Append an `INTEGER` item, two's-complement big-endian minimal
    /// encoding with at most one sign-preserving pad byte.
    pub fn append_int(&mut self, value: i32) {
        self.items.push((TAG_INTEGER, encode_integer(value)));
    }

    /// Encode the accumulated items as a DER `SEQUENCE`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut inner = Vec::new();
        for (tag, payload) in &self.items {
            inner.push(*tag);
            push_length(&mut inner, payload.len())?;
            inner.extend_from_slice(payload);
        }

        let mut out = Vec::with_capacity(inner.len() + 4);
        out.push(TAG_SEQUENCE);
        push_length(&mut out, inner.len())?;
        out.extend_from_slice(&inner);
        Ok(out)
    }
}

/// Two's-complement big-endian minimal encoding of a signed 32-bit integer.
fn encode_integer(value: i32) -> Vec<u8> {
    if value == 0 {
        return alloc::vec![0x00];
    }
    if value == -1 {
        return alloc::vec![0xFF];
    }

    let bytes = value.to_be_bytes();
    let mut start = 0;
    if value > 0 {
        while start < 3 && bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0 {
            start += 1;
        }
        let mut out = bytes[start..].to_vec();
        if out[0] & 0x80 != 0 {
            out.insert(0, 0x00);
        }
        out
    } else {
        while start < 3 && bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0 {
            start += 1;
        }
        let mut out = bytes[start..].to_vec();
        if out[0] & 0x80 == 0 {
            out.insert(0, 0xFF);
        }
        out
    }
}

/// DER length-of-length encoding: short form for `len <= 127`, otherwise a
/// `0x80 | k` leading byte followed by `len` as a `k`-byte big-endian
/// unsigned integer. Never emits a non-minimal form.
fn push_length(out: &mut Vec<u8>, len: usize) -> Result<()> {
    if len <= 0x7f {
        out.push(len as u8);
        return Ok(());
    }

    let be = len.to_be_bytes();
    let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
    let minimal = &be[first_nonzero..];
    if minimal.len() > 4 {
        return Err(Error::new(ErrorKind::MalformedDer));
    }

    out.push(0x80 | minimal.len() as u8);
    out.extend_from_slice(minimal);
    Ok(())
}

/// Cursor-based DER decoder over a borrowed buffer. `parse_*` operations
/// return `(start, len)` ranges into the original buffer rather than
/// copies; call [`to_byte_array`](DerDecoder::to_byte_array) to materialize
/// a payload.
#[derive(Debug)]
pub struct DerDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerDecoder<'a> {
    /// Construct a decoder with the cursor at position 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// `true` iff the cursor is strictly before the end of the buffer.
    pub fn more_data(&self) -> bool {
        Self::more_data_at(self.data, self.pos)
    }

    /// `true` iff `pos` is strictly before the end of the buffer.
    pub fn more_data_at(data: &[u8], pos: usize) -> bool {
        pos < data.len()
    }

    /// Parse a `SEQUENCE` header, advancing the cursor to the start of its
    /// payload (not past it — nested items are parsed from there).
    pub fn parse_sequence(&mut self) -> Result<Range> {
        self.parse_header(TAG_SEQUENCE, false)
    }

    /// Parse an `INTEGER` header, advancing the cursor past its payload.
    pub fn parse_integer(&mut self) -> Result<Range> {
        self.parse_header(TAG_INTEGER, true)
    }

    /// Parse an `OCTET STRING` header, advancing the cursor past its
    /// payload.
    pub fn parse_octet_string(&mut self) -> Result<Range> {
        self.parse_header(TAG_OCTET_STRING, true)
    }

    fn parse_header(&mut self, expected_tag: u8, advance_past_payload: bool) -> Result<Range> {
        let tag = self.byte()?;
        if tag != expected_tag {
            return Err(Error::new(ErrorKind::MalformedDer));
        }

        let len = self.read_length()?;
        let start = self.pos;
        let end = start
            .checked_add(len)
            .ok_or_else(|| Error::new(ErrorKind::MalformedDer))?;
        if end > self.data.len() {
            return Err(Error::new(ErrorKind::MalformedDer));
        }

        if advance_past_payload {
            self.pos = end;
        }
        Ok((start, len))
    }

    fn byte(&mut self) -> Result<u8> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::new(ErrorKind::MalformedDer))?;
        self.pos += 1;
        Ok(b)
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = self.byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }

        let k = (first & 0x7f) as usize;
        // 0x80 itself (k == 0) is the indefinite-length form, invalid in DER.
        if k == 0 || k > 4 {
            return Err(Error::new(ErrorKind::MalformedDer));
        }
        if self.pos + k > self.data.len() {
            return Err(Error::new(ErrorKind::MalformedDer));
        }

        let mut len: usize = 0;
        for _ in 0..k {
            len = (len << 8) | self.byte()? as usize;
        }
        Ok(len)
    }

    /// Interpret `range` as a two's-complement big-endian signed integer.
    /// Rejects payloads longer than 4 bytes (this profile's constraint).
    /// Fails with [`ErrorKind::MalformedDer`], rather than panicking, if
    /// `range` does not lie within this decoder's buffer — `Range` is a
    /// bare tuple, so a caller can hand back a range obtained from a
    /// different decoder or buffer.
    pub fn to_int(&self, range: Range) -> Result<i32> {
        let bytes = self.range_bytes(range)?;
        if bytes.is_empty() || bytes.len() > 4 {
            return Err(Error::new(ErrorKind::MalformedDer));
        }

        let mut value: i32 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &b in bytes {
            value = (value << 8) | i32::from(b);
        }
        Ok(value)
    }

    /// Copy out the bytes of `range`. Fails with
    /// [`ErrorKind::MalformedDer`], rather than panicking, if `range` does
    /// not lie within this decoder's buffer.
    pub fn to_byte_array(&self, range: Range) -> Result<Vec<u8>> {
        Ok(self.range_bytes(range)?.to_vec())
    }

    /// Validate that `range` lies within `self.data` and return the slice
    /// it describes.
    fn range_bytes(&self, range: Range) -> Result<&[u8]> {
        let (start, len) = range;
        let end = start
            .checked_add(len)
            .ok_or_else(|| Error::new(ErrorKind::MalformedDer))?;
        self.data
            .get(start..end)
            .ok_or_else(|| Error::new(ErrorKind::MalformedDer))
    }
}
