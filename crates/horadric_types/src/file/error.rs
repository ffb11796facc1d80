//! Error types for file format parsing.

use std::fmt;

use thiserror::Error;

/// File format a [`FormatError`] was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// 768-byte `.dat` palette
	Palette,
	/// `.pl2` palette transform tables
	Pl2,
	/// `.dc6` frame strip
	Dc6,
	/// `.dcc` direction-compressed sprite
	Dcc,
	/// `.cof` layer/priority descriptor
	Cof,
	/// `AnimData.d2` animation registry
	AnimData,
	/// `.tbl` font glyph table
	FontTable,
}

impl fmt::Display for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			FileType::Palette => "Palette",
			FileType::Pl2 => "PL2",
			FileType::Dc6 => "DC6",
			FileType::Dcc => "DCC",
			FileType::Cof => "COF",
			FileType::AnimData => "AnimData",
			FileType::FontTable => "FontTable",
		};
		f.write_str(name)
	}
}

/// Unified error type for every binary format in this crate.
#[derive(Debug, Error)]
pub enum FormatError {
	/// A header field holds a value the format does not allow
	#[error("{file_type}: corrupt header ({reason})")]
	CorruptHeader {
		/// Format being parsed
		file_type: FileType,
		/// What was wrong
		reason: String,
	},

	/// The input ended before a complete structure could be read
	#[error("{file_type}: unexpected end of data, expected {expected} bytes, got {actual} bytes")]
	UnexpectedEof {
		/// Format being parsed
		file_type: FileType,
		/// Number of bytes required
		expected: usize,
		/// Number of bytes available
		actual: usize,
	},

	/// Frame or table dimensions are out of the supported range
	#[error("{file_type}: invalid dimensions {width}x{height}")]
	InvalidDimensions {
		/// Format being parsed
		file_type: FileType,
		/// Width (or first count) that was rejected
		width: u64,
		/// Height (or second count) that was rejected
		height: u64,
	},

	/// A bit-packed stream is shorter than its header claims
	#[error("{file_type}: bitstream underrun, requested {requested} bits with {available} remaining")]
	BitstreamUnderrun {
		/// Format being parsed
		file_type: FileType,
		/// Bits the decoder tried to read
		requested: usize,
		/// Bits left in the stream
		available: usize,
	},

	/// Magic bytes did not match
	#[error("{file_type}: invalid signature {found:02X?}")]
	InvalidSignature {
		/// Format being parsed
		file_type: FileType,
		/// Bytes found where the signature was expected
		found: Vec<u8>,
	},

	/// A direction index beyond the sprite's direction count
	#[error("{file_type}: direction {direction} out of range (directions: {count})")]
	InvalidDirection {
		/// Format being parsed
		file_type: FileType,
		/// Requested direction
		direction: usize,
		/// Directions available
		count: usize,
	},

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl FormatError {
	/// Creates a [`FormatError::UnexpectedEof`] error.
	pub fn unexpected_eof(file_type: FileType, expected: usize, actual: usize) -> Self {
		Self::UnexpectedEof {
			file_type,
			expected,
			actual,
		}
	}

	/// Creates a [`FormatError::CorruptHeader`] error.
	pub fn corrupt(file_type: FileType, reason: impl Into<String>) -> Self {
		Self::CorruptHeader {
			file_type,
			reason: reason.into(),
		}
	}

	/// Creates a [`FormatError::InvalidDimensions`] error.
	pub fn invalid_dimensions(file_type: FileType, width: u64, height: u64) -> Self {
		Self::InvalidDimensions {
			file_type,
			width,
			height,
		}
	}

	/// Creates a [`FormatError::BitstreamUnderrun`] error.
	pub fn bitstream_underrun(file_type: FileType, requested: usize, available: usize) -> Self {
		Self::BitstreamUnderrun {
			file_type,
			requested,
			available,
		}
	}

	/// Creates a [`FormatError::InvalidSignature`] error.
	pub fn invalid_signature(file_type: FileType, found: &[u8]) -> Self {
		Self::InvalidSignature {
			file_type,
			found: found.to_vec(),
		}
	}

	/// Returns the format the error was raised for, if any.
	pub fn file_type(&self) -> Option<FileType> {
		match self {
			Self::CorruptHeader {
				file_type,
				..
			}
			| Self::UnexpectedEof {
				file_type,
				..
			}
			| Self::InvalidDimensions {
				file_type,
				..
			}
			| Self::BitstreamUnderrun {
				file_type,
				..
			}
			| Self::InvalidSignature {
				file_type,
				..
			}
			| Self::InvalidDirection {
				file_type,
				..
			} => Some(*file_type),
			Self::Io(_) => None,
		}
	}
}
