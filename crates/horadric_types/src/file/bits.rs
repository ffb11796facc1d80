//! Bit-level cursor for the packed DCC streams.
//!
//! Bits are consumed least-significant first: bit `n` of the stream is
//! bit `n % 8` of byte `n / 8`, and multi-bit fields are assembled with
//! the first bit read as the lowest bit of the result.
//!
//! ```text
//! byte 0: b7 b6 b5 b4 b3 b2 b1 b0   byte 1: b15 ... b8
//!         <---------------- read order starts at b0
//! ```

use crate::file::{FileType, FormatError};

/// Reads variable-width fields from a byte slice at an arbitrary bit offset.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
	data: &'a [u8],
	offset: usize,
	bits_read: usize,
	file_type: FileType,
}

impl<'a> BitReader<'a> {
	/// Creates a reader starting at absolute bit `offset`.
	pub fn new(data: &'a [u8], offset: usize, file_type: FileType) -> Self {
		Self {
			data,
			offset,
			bits_read: 0,
			file_type,
		}
	}

	/// Absolute bit offset of the cursor.
	#[inline]
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Bits consumed since this reader was created or forked.
	#[inline]
	pub fn bits_read(&self) -> usize {
		self.bits_read
	}

	/// Bits left before the end of the underlying slice.
	#[inline]
	pub fn remaining(&self) -> usize {
		(self.data.len() * 8).saturating_sub(self.offset)
	}

	/// Returns a new reader at the current offset with its own bit count.
	///
	/// The packed DCC sub-streams start at bit offsets that are not byte
	/// aligned, so each one is carved out with `fork` followed by a skip
	/// on the parent.
	pub fn fork(&self) -> Self {
		Self {
			data: self.data,
			offset: self.offset,
			bits_read: 0,
			file_type: self.file_type,
		}
	}

	/// Advances the cursor without decoding.
	pub fn skip_bits(&mut self, count: usize) -> Result<(), FormatError> {
		self.ensure(count)?;
		self.offset += count;
		self.bits_read += count;
		Ok(())
	}

	fn ensure(&self, count: usize) -> Result<(), FormatError> {
		let available = self.remaining();
		if count > available {
			return Err(FormatError::bitstream_underrun(self.file_type, count, available));
		}
		Ok(())
	}

	/// Reads an unsigned field of `count` bits (0 to 32).
	pub fn get_bits(&mut self, count: usize) -> Result<u32, FormatError> {
		if count == 0 {
			return Ok(0);
		}
		if count > 32 {
			return Err(FormatError::corrupt(self.file_type, format!("bit field of {count} bits")));
		}
		self.ensure(count)?;

		let mut result = 0u32;
		let mut produced = 0;
		while produced < count {
			let byte = self.data[self.offset / 8];
			let shift = self.offset % 8;
			let take = (8 - shift).min(count - produced);
			let mask = ((1u16 << take) - 1) as u8;
			let chunk = (byte >> shift) & mask;
			result |= u32::from(chunk) << produced;
			produced += take;
			self.offset += take;
		}
		self.bits_read += count;

		Ok(result)
	}

	/// Reads a single bit.
	#[inline]
	pub fn get_bit(&mut self) -> Result<u32, FormatError> {
		self.get_bits(1)
	}

	/// Reads eight bits.
	pub fn get_byte(&mut self) -> Result<u8, FormatError> {
		Ok(self.get_bits(8)? as u8)
	}

	/// Reads 32 bits.
	pub fn get_u32(&mut self) -> Result<u32, FormatError> {
		self.get_bits(32)
	}

	/// Reads a two's complement field of `count` bits.
	///
	/// A one-bit field reads as `0` or `-1`.
	pub fn get_signed_bits(&mut self, count: usize) -> Result<i32, FormatError> {
		let value = self.get_bits(count)?;
		Ok(sign_extend(value, count))
	}
}

/// Sign-extends the low `bits` of `value`.
pub fn sign_extend(value: u32, bits: usize) -> i32 {
	match bits {
		0 => 0,
		32.. => value as i32,
		_ => {
			let shift = 32 - bits as u32;
			((value << shift) as i32) >> shift
		}
	}
}

/// Accumulates bit fields in the same order [`BitReader`] consumes them.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
	data: Vec<u8>,
	bit_len: usize,
}

impl BitWriter {
	/// Creates an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of bits written so far.
	#[inline]
	pub fn bit_len(&self) -> usize {
		self.bit_len
	}

	/// Appends the low `count` bits of `value`.
	pub fn put_bits(&mut self, value: u32, count: usize) {
		for i in 0..count.min(32) {
			let bit = ((value >> i) & 1) as u8;
			let byte_index = self.bit_len / 8;
			if byte_index == self.data.len() {
				self.data.push(0);
			}
			self.data[byte_index] |= bit << (self.bit_len % 8);
			self.bit_len += 1;
		}
	}

	/// Appends a signed field of `count` bits.
	pub fn put_signed_bits(&mut self, value: i32, count: usize) {
		self.put_bits(value as u32, count);
	}

	/// Appends a single bit.
	pub fn put_bit(&mut self, bit: bool) {
		self.put_bits(u32::from(bit), 1);
	}

	/// Appends every bit written to `other`.
	pub fn append(&mut self, other: &BitWriter) {
		for i in 0..other.bit_len {
			let bit = (other.data[i / 8] >> (i % 8)) & 1;
			self.put_bits(u32::from(bit), 1);
		}
	}

	/// Pads with zero bits up to the next byte boundary.
	pub fn align(&mut self) {
		let pad = (8 - self.bit_len % 8) % 8;
		self.put_bits(0, pad);
	}

	/// Returns the written bytes; the last byte is zero padded.
	pub fn into_bytes(self) -> Vec<u8> {
		self.data
	}
}
