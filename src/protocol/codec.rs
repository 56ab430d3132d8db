//! PostgreSQL wire protocol decoding primitives.
//!
//! PostgreSQL uses big-endian (network byte order) for all integers.

use zerocopy::byteorder::big_endian::{I16 as I16BE, I32 as I32BE};
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::error::{Error, Result};

/// Sequential cursor over one message body.
///
/// Each read consumes bytes from the front; the position only moves
/// forward. Reading past the end of the buffer is an error, never a
/// panic.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Create a reader over a message body.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is fully consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read 1-byte unsigned integer.
    pub fn read_u8(&mut self) -> Result<u8> {
        let (value, rest) = self
            .data
            .split_first()
            .ok_or_else(|| Error::Packet("read_u8: empty buffer".into()))?;
        self.data = rest;
        Ok(*value)
    }

    /// Read 2-byte big-endian signed integer.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_ref::<I16BE>()?.get())
    }

    /// Read 4-byte big-endian signed integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_ref::<I32BE>()?.get())
    }

    /// Read exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.data.len() < len {
            return Err(Error::Packet(format!(
                "read_bytes: buffer too short: {} < {}",
                self.data.len(),
                len
            )));
        }
        let (value, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(value)
    }

    /// Consume and return all remaining bytes.
    pub fn rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.data)
    }

    /// Read null-terminated string (PostgreSQL String type).
    ///
    /// The terminator is consumed but not part of the value. Fails when
    /// no terminator exists before end-of-buffer or the value is not
    /// valid UTF-8.
    pub fn read_cstr(&mut self) -> Result<&'a str> {
        let pos = memchr::memchr(0, self.data)
            .ok_or_else(|| Error::Packet("read_cstr: no null terminator found".into()))?;
        let bytes = &self.data[..pos];
        self.data = &self.data[pos + 1..];
        simdutf8::compat::from_utf8(bytes)
            .map_err(|e| Error::Packet(format!("read_cstr: invalid UTF-8: {e}")))
    }

    /// Read a fixed-layout value by reference.
    pub fn read_ref<T: FromBytes + KnownLayout + Immutable>(&mut self) -> Result<&'a T> {
        let (value, rest) = T::ref_from_prefix(self.data).map_err(|_| {
            Error::Packet(format!(
                "read_ref: buffer too short: {} < {}",
                self.data.len(),
                size_of::<T>()
            ))
        })?;
        self.data = rest;
        Ok(value)
    }
}
