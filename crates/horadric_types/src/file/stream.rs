//! Little-endian byte cursor shared by the byte-aligned formats.

use crate::file::{FileType, FormatError};

/// Forward-only little-endian reader over a borrowed byte slice.
///
/// Every read is bounds checked and reports [`FormatError::UnexpectedEof`]
/// tagged with the format being parsed.
#[derive(Debug, Clone)]
pub struct StreamReader<'a> {
	data: &'a [u8],
	position: usize,
	file_type: FileType,
}

impl<'a> StreamReader<'a> {
	/// Creates a reader positioned at the start of `data`.
	pub fn new(data: &'a [u8], file_type: FileType) -> Self {
		Self {
			data,
			position: 0,
			file_type,
		}
	}

	/// Current byte position.
	#[inline]
	pub fn position(&self) -> usize {
		self.position
	}

	/// Moves the cursor to an absolute position.
	pub fn seek(&mut self, position: usize) -> Result<(), FormatError> {
		if position > self.data.len() {
			return Err(FormatError::unexpected_eof(self.file_type, position, self.data.len()));
		}
		self.position = position;
		Ok(())
	}

	/// Number of bytes left after the cursor.
	#[inline]
	pub fn remaining(&self) -> usize {
		self.data.len() - self.position
	}

	/// Returns `true` once every byte has been consumed.
	#[inline]
	pub fn is_eof(&self) -> bool {
		self.position >= self.data.len()
	}

	/// Reads `count` bytes as a borrowed slice.
	pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], FormatError> {
		let end = self.position.checked_add(count).filter(|end| *end <= self.data.len()).ok_or_else(
			|| {
				FormatError::unexpected_eof(
					self.file_type,
					self.position.saturating_add(count),
					self.data.len(),
				)
			},
		)?;
		let slice = &self.data[self.position..end];
		self.position = end;
		Ok(slice)
	}

	/// Reads a fixed-size array.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
		let mut out = [0u8; N];
		out.copy_from_slice(self.read_bytes(N)?);
		Ok(out)
	}

	/// Skips `count` bytes.
	pub fn skip(&mut self, count: usize) -> Result<(), FormatError> {
		self.read_bytes(count).map(|_| ())
	}

	/// Reads a byte.
	pub fn read_u8(&mut self) -> Result<u8, FormatError> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Reads a little-endian `u16`.
	pub fn read_u16(&mut self) -> Result<u16, FormatError> {
		Ok(u16::from_le_bytes(self.read_array()?))
	}

	/// Reads a little-endian `u32`.
	pub fn read_u32(&mut self) -> Result<u32, FormatError> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Reads a little-endian `i32`.
	pub fn read_i32(&mut self) -> Result<i32, FormatError> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_read_primitives() {
		let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
		let mut reader = StreamReader::new(&data, FileType::Dc6);

		assert_eq!(reader.read_u8().unwrap(), 0x01);
		assert_eq!(reader.read_u16().unwrap(), 0x1234);
		assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
		assert_eq!(reader.read_i32().unwrap(), -1);
		assert!(reader.is_eof());
	}

	#[test]
	fn test_read_past_end() {
		let data = [0x01, 0x02];
		let mut reader = StreamReader::new(&data, FileType::Cof);

		let err = reader.read_u32().unwrap_err();
		assert!(matches!(
			err,
			FormatError::UnexpectedEof {
				file_type: FileType::Cof,
				expected: 4,
				actual: 2,
			}
		));
		// A failed read does not move the cursor
		assert_eq!(reader.position(), 0);
	}

	#[test]
	fn test_seek_and_skip() {
		let data = [0u8, 1, 2, 3, 4, 5];
		let mut reader = StreamReader::new(&data, FileType::Dc6);

		reader.skip(2).unwrap();
		assert_eq!(reader.read_u8().unwrap(), 2);
		reader.seek(5).unwrap();
		assert_eq!(reader.remaining(), 1);
		assert!(reader.seek(7).is_err());
	}
}
