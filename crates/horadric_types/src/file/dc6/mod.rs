//! `.dc6` file format support.
//!
//! DC6 is the frame-strip sprite container used for UI elements, fonts,
//! inventory graphics and a handful of objects. Frames are stored one
//! after another, each as a scanline run-length block decoded bottom-up.
//!
//! # File Structure
//!
//! | Offset | Size                  | Field                  |
//! |--------|-----------------------|------------------------|
//! | 0x00   | 4                     | `version` (i32, 6)     |
//! | 0x04   | 4                     | `flags`                |
//! | 0x08   | 4                     | `encoding`             |
//! | 0x0C   | 4                     | `termination` bytes    |
//! | 0x10   | 4                     | `directions`           |
//! | 0x14   | 4                     | `frames_per_direction` |
//! | 0x18   | 4 * directions * fpd  | frame pointers         |
//!
//! Each frame pointer is an absolute offset to a 32-byte [`FrameHeader`]
//! followed by `length` bytes of RLE data and three terminator bytes.
//!
//! # Example
//!
//! ```no_run
//! use horadric_types::file::dc6::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dc6 = File::open("invchar6.dc6")?;
//! for (index, frame) in dc6.direction(0).iter().enumerate() {
//!     println!("frame {index}: {frame}");
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use crate::file::frame::DecodedFrame;
use crate::file::stream::StreamReader;
use crate::file::{FileType, FormatError};

mod builder;
pub mod frame;

pub use builder::FileBuilder;
pub use frame::{Frame, FrameHeader, decode_rle, encode_rle};

/// DC6 file constants.
pub mod constants {
	/// Size of the fixed file header
	pub const HEADER_SIZE: usize = 24;

	/// Size of a frame header
	pub const FRAME_HEADER_SIZE: usize = 32;

	/// Bytes after each frame's RLE data
	pub const FRAME_TERMINATOR_SIZE: usize = 3;

	/// Version written by the stock tools
	pub const VERSION: i32 = 6;

	/// Termination marker in the file header
	pub const TERMINATION: [u8; 4] = [0xEE, 0xEE, 0xEE, 0xEE];

	/// Scanline terminator control byte
	pub const END_OF_LINE: u8 = 0x80;

	/// High bit marking a transparent run
	pub const TRANSPARENT_RUN: u8 = 0x80;

	/// Longest run a single control byte can describe
	pub const MAX_RUN: usize = 0x7F;

	/// Largest frame edge accepted
	pub const MAX_DIMENSION: u32 = 4096;

	/// Largest `directions * frames_per_direction` accepted
	pub const MAX_FRAMES: u64 = 1 << 16;
}

/// DC6 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	/// Format version
	pub version: i32,
	/// Flags
	pub flags: u32,
	/// Encoding
	pub encoding: u32,
	/// Termination bytes
	pub termination: [u8; 4],
	/// Number of directions
	pub directions: u32,
	/// Frames stored per direction
	pub frames_per_direction: u32,
}

impl Header {
	fn read(reader: &mut StreamReader<'_>) -> Result<Self, FormatError> {
		Ok(Self {
			version: reader.read_i32()?,
			flags: reader.read_u32()?,
			encoding: reader.read_u32()?,
			termination: reader.read_array()?,
			directions: reader.read_u32()?,
			frames_per_direction: reader.read_u32()?,
		})
	}

	/// Total number of frames described by the header.
	pub fn total_frames(&self) -> u64 {
		u64::from(self.directions) * u64::from(self.frames_per_direction)
	}
}

impl Default for Header {
	fn default() -> Self {
		Self {
			version: constants::VERSION,
			flags: 1,
			encoding: 0,
			termination: constants::TERMINATION,
			directions: 0,
			frames_per_direction: 0,
		}
	}
}

/// A fully decoded DC6 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	header: Header,
	frames: Vec<Frame>,
}

impl File {
	/// Opens and decodes a DC6 file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Decodes every frame of a DC6 byte stream.
	///
	/// # Errors
	///
	/// - [`FormatError::UnexpectedEof`] if the header, frame table or a frame
	///   block is truncated
	/// - [`FormatError::CorruptHeader`] if a frame pointer lies outside the data
	/// - [`FormatError::InvalidDimensions`] if the frame counts or a frame's
	///   size are out of range
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		let mut reader = StreamReader::new(data, FileType::Dc6);
		let header = Header::read(&mut reader)?;

		let total = header.total_frames();
		if total > constants::MAX_FRAMES {
			return Err(FormatError::invalid_dimensions(
				FileType::Dc6,
				u64::from(header.directions),
				u64::from(header.frames_per_direction),
			));
		}
		let total = total as usize;

		let mut pointers = Vec::with_capacity(total);
		for _ in 0..total {
			pointers.push(reader.read_u32()? as usize);
		}

		let mut frames = Vec::with_capacity(total);
		for (index, &pointer) in pointers.iter().enumerate() {
			if pointer + constants::FRAME_HEADER_SIZE > data.len() {
				return Err(FormatError::corrupt(
					FileType::Dc6,
					format!("frame {index} pointer {pointer:#x} outside {} bytes", data.len()),
				));
			}
			reader.seek(pointer)?;
			let frame_header = FrameHeader::read(&mut reader)?;
			if frame_header.width > constants::MAX_DIMENSION
				|| frame_header.height > constants::MAX_DIMENSION
			{
				return Err(FormatError::invalid_dimensions(
					FileType::Dc6,
					u64::from(frame_header.width),
					u64::from(frame_header.height),
				));
			}

			let rle = reader.read_bytes(frame_header.length as usize)?;
			let pixels = decode_rle(&frame_header, rle)?;
			frames.push(Frame::new(frame_header, pixels));
		}

		Ok(Self {
			header,
			frames,
		})
	}

	/// File header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Number of directions.
	pub fn direction_count(&self) -> usize {
		self.header.directions as usize
	}

	/// Frames per direction.
	pub fn frames_per_direction(&self) -> usize {
		self.header.frames_per_direction as usize
	}

	/// Every frame, direction-major.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Frames of one direction; empty if `direction` is out of range.
	pub fn direction(&self, direction: usize) -> &[Frame] {
		let per = self.frames_per_direction();
		let start = direction * per;
		self.frames.get(start..start + per).unwrap_or(&[])
	}

	/// Returns a single frame.
	pub fn frame(&self, direction: usize, frame: usize) -> Option<&Frame> {
		self.direction(direction).get(frame)
	}

	/// Splits the file into per-direction decoded frames.
	pub fn into_directions(self) -> Vec<Vec<DecodedFrame>> {
		let per = self.frames_per_direction().max(1);
		let mut directions: Vec<Vec<DecodedFrame>> = Vec::with_capacity(self.direction_count());
		let mut iter = self.frames.into_iter().map(Frame::into_decoded).peekable();
		while iter.peek().is_some() {
			directions.push(iter.by_ref().take(per).collect());
		}
		directions
	}
}

impl TryFrom<&[u8]> for File {
	type Error = FormatError;

	fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
		Self::from_bytes(value)
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"DC6 v{}: {} directions x {} frames",
			self.header.version, self.header.directions, self.header.frames_per_direction
		)
	}
}

/// Decodes a DC6 byte stream.
pub fn decode(data: &[u8]) -> Result<File, FormatError> {
	File::from_bytes(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn solid(width: u32, height: u32, index: u8) -> DecodedFrame {
		DecodedFrame {
			width,
			height,
			offset_x: 0,
			offset_y: 0,
			index_pixels: vec![index; (width * height) as usize],
		}
	}

	#[test]
	fn test_decode_built_file() {
		let data = FileBuilder::new(1, 2)
			.frame(0, solid(4, 3, 5))
			.frame(0, solid(4, 3, 0))
			.to_bytes()
			.unwrap();

		let dc6 = File::from_bytes(&data).unwrap();
		assert_eq!(dc6.direction_count(), 1);
		assert_eq!(dc6.frames_per_direction(), 2);
		assert_eq!(dc6.frame(0, 0).unwrap().decoded().index_pixels, vec![5; 12]);
		assert!(dc6.frame(0, 1).unwrap().decoded().is_empty());
		assert!(dc6.frame(0, 2).is_none());
		assert!(dc6.direction(3).is_empty());
	}

	#[test]
	fn test_into_directions() {
		let data = FileBuilder::new(2, 1)
			.frame(0, solid(1, 1, 1))
			.frame(1, solid(1, 1, 2))
			.to_bytes()
			.unwrap();

		let directions = decode(&data).unwrap().into_directions();
		assert_eq!(directions.len(), 2);
		assert_eq!(directions[1][0].index_pixels, vec![2]);
	}

	#[test]
	fn test_truncated_header() {
		let err = File::from_bytes(&[6, 0, 0, 0, 1]).unwrap_err();
		assert!(matches!(err, FormatError::UnexpectedEof { .. }));
	}

	#[test]
	fn test_frame_pointer_out_of_range() {
		let mut data = FileBuilder::new(1, 1).frame(0, solid(2, 2, 3)).to_bytes().unwrap();
		// First frame pointer lives right after the header
		let bad = (data.len() as u32 + 10).to_le_bytes();
		data[constants::HEADER_SIZE..constants::HEADER_SIZE + 4].copy_from_slice(&bad);

		let err = File::from_bytes(&data).unwrap_err();
		assert!(matches!(err, FormatError::CorruptHeader { .. }));
	}

	#[test]
	fn test_frame_table_overflow() {
		let mut data = Vec::new();
		data.extend_from_slice(&6i32.to_le_bytes());
		data.extend_from_slice(&[0u8; 12]);
		data.extend_from_slice(&u32::MAX.to_le_bytes());
		data.extend_from_slice(&u32::MAX.to_le_bytes());

		let err = File::from_bytes(&data).unwrap_err();
		assert!(matches!(err, FormatError::InvalidDimensions { .. }));
	}

	#[test]
	fn test_truncated_frame_block() {
		let data = FileBuilder::new(1, 1).frame(0, solid(8, 8, 9)).to_bytes().unwrap();
		let err = File::from_bytes(&data[..data.len() - 20]).unwrap_err();
		assert!(matches!(err, FormatError::UnexpectedEof { .. }));
	}
}
