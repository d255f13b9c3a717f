//! Packet buffer implementation
//!
//! Provides a byte buffer with Bedrock-specific read/write operations including:
//! - Little-endian fixed width integers and floats
//! - Variable-length integers (varuint32/64 and zig-zag varint32/64)
//! - Length-prefixed strings and byte slices
//! - UUIDs and vectors
//!
//! Reads never panic: running out of data or reading an overlong varint
//! yields a [`PacketDecodeError`] so a single malformed packet can be dropped.

use bytes::{BufMut, BytesMut};
use uuid::Uuid;

use crate::protocol::packets::PacketDecodeError;
use crate::protocol::types::Vec3;

/// Maximum packet size accepted from a client (2MB)
pub const MAX_PACKET_SIZE: usize = 2 * 1024 * 1024;

/// Result of a buffer read
pub type ReadResult<T> = Result<T, PacketDecodeError>;

/// Packet buffer for reading and writing game protocol data
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    /// Internal byte buffer
    data: BytesMut,
    /// Current read position
    read_pos: usize,
}

impl PacketBuffer {
    /// Create a new empty packet buffer
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
            read_pos: 0,
        }
    }

    /// Create a packet buffer with a specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Create a packet buffer from existing bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            read_pos: 0,
        }
    }

    // ============ Properties ============

    /// Get the current read position
    #[inline]
    pub fn read_position(&self) -> usize {
        self.read_pos
    }

    /// Get the total length of the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of bytes remaining to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.read_pos)
    }

    /// Check if there are bytes remaining to read
    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Get a reference to the underlying bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the written bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Reset read position to start
    pub fn reset(&mut self) {
        self.read_pos = 0;
    }

    fn take(&mut self, count: usize) -> ReadResult<&[u8]> {
        if self.remaining() < count {
            return Err(PacketDecodeError::InsufficientData {
                expected: count,
                actual: self.remaining(),
            });
        }
        let start = self.read_pos;
        self.read_pos += count;
        Ok(&self.data[start..start + count])
    }

    fn take_array<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    // ============ Reading Methods ============

    /// Read an unsigned byte
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a boolean (any non-zero byte is true)
    pub fn read_bool(&mut self) -> ReadResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read an unsigned little-endian short
    pub fn read_u16_le(&mut self) -> ReadResult<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// Read a signed little-endian short
    pub fn read_i16_le(&mut self) -> ReadResult<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    /// Read an unsigned little-endian int
    pub fn read_u32_le(&mut self) -> ReadResult<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Read a signed little-endian int
    pub fn read_i32_le(&mut self) -> ReadResult<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Read a signed little-endian long
    pub fn read_i64_le(&mut self) -> ReadResult<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// Read an unsigned little-endian long
    pub fn read_u64_le(&mut self) -> ReadResult<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// Read a little-endian 32-bit float
    pub fn read_f32_le(&mut self) -> ReadResult<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Read an unsigned variable-length int (at most 5 bytes)
    pub fn read_varuint32(&mut self) -> ReadResult<u32> {
        let mut value: u32 = 0;
        for i in 0..5 {
            let b = self.read_u8()?;
            value |= ((b & 0x7f) as u32) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(PacketDecodeError::Malformed(
            "varuint32 did not terminate after 5 bytes".to_string(),
        ))
    }

    /// Read a zig-zag encoded variable-length int
    pub fn read_varint32(&mut self) -> ReadResult<i32> {
        let raw = self.read_varuint32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    /// Read an unsigned variable-length long (at most 10 bytes)
    pub fn read_varuint64(&mut self) -> ReadResult<u64> {
        let mut value: u64 = 0;
        for i in 0..10 {
            let b = self.read_u8()?;
            value |= ((b & 0x7f) as u64) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(PacketDecodeError::Malformed(
            "varuint64 did not terminate after 10 bytes".to_string(),
        ))
    }

    /// Read a zig-zag encoded variable-length long
    pub fn read_varint64(&mut self) -> ReadResult<i64> {
        let raw = self.read_varuint64()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    /// Read a varuint32 length-prefixed byte slice
    pub fn read_byte_slice(&mut self) -> ReadResult<Vec<u8>> {
        let len = self.read_varuint32()? as usize;
        if len > MAX_PACKET_SIZE {
            return Err(PacketDecodeError::InvalidValue {
                field: "length".to_string(),
                value: len.to_string(),
            });
        }
        Ok(self.take(len)?.to_vec())
    }

    /// Read a varuint32 length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> ReadResult<String> {
        let bytes = self.read_byte_slice()?;
        String::from_utf8(bytes)
            .map_err(|e| PacketDecodeError::Malformed(format!("invalid UTF-8 string: {}", e)))
    }

    /// Read a UUID (two little-endian halves, most significant first)
    pub fn read_uuid(&mut self) -> ReadResult<Uuid> {
        let high = self.read_u64_le()?;
        let low = self.read_u64_le()?;
        Ok(Uuid::from_u64_pair(high, low))
    }

    /// Read three little-endian floats
    pub fn read_vec3(&mut self) -> ReadResult<Vec3> {
        Ok(Vec3::new(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    // ============ Writing Methods ============

    /// Write an unsigned byte
    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    /// Write a boolean as a single byte
    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(value as u8);
    }

    /// Write an unsigned little-endian short
    pub fn write_u16_le(&mut self, value: u16) {
        self.data.put_u16_le(value);
    }

    /// Write a signed little-endian short
    pub fn write_i16_le(&mut self, value: i16) {
        self.data.put_i16_le(value);
    }

    /// Write an unsigned little-endian int
    pub fn write_u32_le(&mut self, value: u32) {
        self.data.put_u32_le(value);
    }

    /// Write a signed little-endian int
    pub fn write_i32_le(&mut self, value: i32) {
        self.data.put_i32_le(value);
    }

    /// Write a signed little-endian long
    pub fn write_i64_le(&mut self, value: i64) {
        self.data.put_i64_le(value);
    }

    /// Write an unsigned little-endian long
    pub fn write_u64_le(&mut self, value: u64) {
        self.data.put_u64_le(value);
    }

    /// Write a little-endian 32-bit float
    pub fn write_f32_le(&mut self, value: f32) {
        self.data.put_f32_le(value);
    }

    /// Write an unsigned variable-length int
    pub fn write_varuint32(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.data.put_u8((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.data.put_u8(value as u8);
    }

    /// Write a zig-zag encoded variable-length int
    pub fn write_varint32(&mut self, value: i32) {
        self.write_varuint32(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Write an unsigned variable-length long
    pub fn write_varuint64(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.data.put_u8((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.data.put_u8(value as u8);
    }

    /// Write a zig-zag encoded variable-length long
    pub fn write_varint64(&mut self, value: i64) {
        self.write_varuint64(((value << 1) ^ (value >> 63)) as u64);
    }

    /// Write a varuint32 length-prefixed byte slice
    pub fn write_byte_slice(&mut self, bytes: &[u8]) {
        self.write_varuint32(bytes.len() as u32);
        self.data.extend_from_slice(bytes);
    }

    /// Write a varuint32 length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) {
        self.write_byte_slice(value.as_bytes());
    }

    /// Write a UUID (two little-endian halves, most significant first)
    pub fn write_uuid(&mut self, value: &Uuid) {
        let (high, low) = value.as_u64_pair();
        self.write_u64_le(high);
        self.write_u64_le(low);
    }

    /// Write three little-endian floats
    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32_le(value.x);
        self.write_f32_le(value.y);
        self.write_f32_le(value.z);
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for PacketBuffer {
    fn from(vec: Vec<u8>) -> Self {
        Self::from_bytes(&vec)
    }
}

impl From<&[u8]> for PacketBuffer {
    fn from(slice: &[u8]) -> Self {
        Self::from_bytes(slice)
    }
}

impl AsRef<[u8]> for PacketBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
