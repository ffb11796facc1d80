//! `.dcc` file format support.
//!
//! DCC is the compressed sprite format used for characters, monsters,
//! missiles and most world objects. Each direction is an independent bit
//! stream, so a file can be opened cheaply and its directions decoded one
//! at a time on demand.
//!
//! # File Structure
//!
//! | Offset | Size           | Field                         |
//! |--------|----------------|-------------------------------|
//! | 0x00   | 1              | signature (`0x74`)            |
//! | 0x01   | 1              | version                       |
//! | 0x02   | 1              | number of directions          |
//! | 0x03   | 4              | frames per direction          |
//! | 0x07   | 4              | tag                           |
//! | 0x0B   | 4              | total size of the frame data  |
//! | 0x0F   | 4 * directions | byte offset of each direction |
//!
//! Direction contents are described in [`direction`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::file::frame::DecodedFrame;
use crate::file::stream::StreamReader;
use crate::file::{FileType, FormatError};

mod builder;
pub mod direction;

pub use builder::FileBuilder;
pub use direction::{DirectionHeader, FrameHeader, Rect, decode_direction};

/// DCC file constants.
pub mod constants {
	/// First byte of every DCC file
	pub const SIGNATURE: u8 = 0x74;

	/// Version written by the stock tools
	pub const VERSION: u8 = 6;

	/// Size of the header before the direction offsets
	pub const HEADER_SIZE: usize = 15;

	/// Edge of a pixel cell
	pub const CELL_SIZE: i32 = 4;

	/// Largest frame or direction edge accepted
	pub const MAX_DIMENSION: u32 = 4096;

	/// Largest absolute frame offset accepted
	pub const MAX_OFFSET: u32 = 1 << 20;

	/// Largest frame count per direction accepted
	pub const MAX_FRAMES_PER_DIRECTION: u32 = 1024;

	/// Field widths selected by the 4-bit codes of a direction header
	pub const BIT_WIDTHS: [u8; 16] = [0, 1, 2, 4, 6, 8, 10, 12, 14, 16, 20, 24, 26, 28, 30, 32];

	/// Number of set bits in a 4-bit pixel mask
	pub const PIXEL_MASK_LOOKUP: [usize; 16] = [0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4];
}

/// DCC file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
	/// Signature byte
	pub signature: u8,
	/// Format version
	pub version: u8,
	/// Number of directions
	pub directions: u8,
	/// Frames in every direction
	pub frames_per_direction: u32,
	/// Tag, 1 in stock files
	pub tag: u32,
	/// Size of the frame data
	pub total_size: u32,
	/// Byte offset of each direction
	pub direction_offsets: Vec<u32>,
}

/// Undecoded bytes of one direction.
///
/// Holds a shared handle on the file data so the direction can be decoded
/// later without keeping the [`File`] alive.
#[derive(Debug, Clone)]
pub struct RawDirection {
	data: Arc<[u8]>,
	start: usize,
	end: usize,
	frames_per_direction: usize,
}

impl RawDirection {
	/// Bytes of the direction.
	pub fn bytes(&self) -> &[u8] {
		&self.data[self.start..self.end]
	}

	/// Frames stored in the direction.
	pub fn frames_per_direction(&self) -> usize {
		self.frames_per_direction
	}

	/// Decodes every frame of the direction.
	///
	/// # Errors
	///
	/// - [`FormatError::BitstreamUnderrun`] when the stream is shorter than
	///   its header claims
	/// - [`FormatError::CorruptHeader`] for unsupported or inconsistent data
	/// - [`FormatError::InvalidDimensions`] for out of range frame sizes
	pub fn decode(&self) -> Result<Vec<DecodedFrame>, FormatError> {
		let (header, frames) = decode_direction(self.bytes(), self.frames_per_direction)?;
		log::trace!(
			"Decoded DCC direction: {} frames, box {}x{}",
			frames.len(),
			header.bounds.width,
			header.bounds.height
		);
		Ok(frames)
	}
}

/// An opened DCC file with its directions still compressed.
#[derive(Debug, Clone)]
pub struct File {
	header: Header,
	data: Arc<[u8]>,
}

impl File {
	/// Opens a DCC file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_shared(Arc::from(data))
	}

	/// Parses the header of a DCC byte stream, copying the data.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		Self::from_shared(Arc::from(data))
	}

	/// Parses the header of shared DCC data without copying it.
	///
	/// # Errors
	///
	/// - [`FormatError::InvalidSignature`] if the first byte is not `0x74`
	/// - [`FormatError::UnexpectedEof`] if the header is truncated
	/// - [`FormatError::CorruptHeader`] if a direction offset lies outside the data
	/// - [`FormatError::InvalidDimensions`] if the frame count is out of range
	pub fn from_shared(data: Arc<[u8]>) -> Result<Self, FormatError> {
		let mut reader = StreamReader::new(&data, FileType::Dcc);
		let signature = reader.read_u8()?;
		if signature != constants::SIGNATURE {
			return Err(FormatError::invalid_signature(FileType::Dcc, &[signature]));
		}
		let version = reader.read_u8()?;
		let directions = reader.read_u8()?;
		let frames_per_direction = reader.read_u32()?;
		let tag = reader.read_u32()?;
		let total_size = reader.read_u32()?;

		if frames_per_direction > constants::MAX_FRAMES_PER_DIRECTION {
			return Err(FormatError::invalid_dimensions(
				FileType::Dcc,
				u64::from(directions),
				u64::from(frames_per_direction),
			));
		}

		let mut direction_offsets = Vec::with_capacity(directions as usize);
		for index in 0..directions {
			let offset = reader.read_u32()?;
			if offset as usize >= data.len() {
				return Err(FormatError::corrupt(
					FileType::Dcc,
					format!("direction {index} offset {offset:#x} outside {} bytes", data.len()),
				));
			}
			direction_offsets.push(offset);
		}

		let header = Header {
			signature,
			version,
			directions,
			frames_per_direction,
			tag,
			total_size,
			direction_offsets,
		};

		Ok(Self {
			header,
			data,
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

	/// Returns the compressed bytes of one direction.
	///
	/// A direction ends where the next one in file order begins.
	pub fn raw_direction(&self, direction: usize) -> Result<RawDirection, FormatError> {
		let Some(&start) = self.header.direction_offsets.get(direction) else {
			return Err(FormatError::InvalidDirection {
				file_type: FileType::Dcc,
				direction,
				count: self.direction_count(),
			});
		};
		let end = self
			.header
			.direction_offsets
			.iter()
			.copied()
			.filter(|&offset| offset > start)
			.min()
			.map_or(self.data.len(), |offset| offset as usize);

		Ok(RawDirection {
			data: Arc::clone(&self.data),
			start: start as usize,
			end,
			frames_per_direction: self.frames_per_direction(),
		})
	}

	/// Splits the file into its compressed directions.
	pub fn raw_directions(&self) -> Result<Vec<RawDirection>, FormatError> {
		(0..self.direction_count()).map(|d| self.raw_direction(d)).collect()
	}

	/// Decodes the frames of one direction.
	pub fn decode_direction(&self, direction: usize) -> Result<Vec<DecodedFrame>, FormatError> {
		self.raw_direction(direction)?.decode()
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
			"DCC v{}: {} directions x {} frames, {} bytes",
			self.header.version,
			self.header.directions,
			self.header.frames_per_direction,
			self.data.len()
		)
	}
}

/// Parses the header of a DCC byte stream.
pub fn decode(data: &[u8]) -> Result<File, FormatError> {
	File::from_bytes(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frame(width: u32, height: u32, offset_x: i32, offset_y: i32, pixels: Vec<u8>) -> DecodedFrame {
		DecodedFrame {
			width,
			height,
			offset_x,
			offset_y,
			index_pixels: pixels,
		}
	}

	fn patterned(width: u32, height: u32, seed: u8) -> Vec<u8> {
		// At most three colours per 4x4 cell, with transparent gaps
		(0..width * height)
			.map(|i| {
				let x = i % width;
				let y = i / width;
				match (x + y + u32::from(seed)) % 5 {
					0 => 0,
					1 | 2 => 40 + seed,
					_ => 90,
				}
			})
			.collect()
	}

	#[test]
	fn test_decode_single_direction() {
		let pixels = patterned(9, 7, 1);
		let data = FileBuilder::new(1)
			.direction(vec![frame(9, 7, -4, -6, pixels.clone())])
			.to_bytes()
			.unwrap();

		let dcc = File::from_bytes(&data).unwrap();
		assert_eq!(dcc.direction_count(), 1);
		assert_eq!(dcc.frames_per_direction(), 1);

		let frames = dcc.decode_direction(0).unwrap();
		assert_eq!(frames.len(), 1);
		assert_eq!(frames[0].width, 9);
		assert_eq!(frames[0].height, 7);
		assert_eq!(frames[0].offset_x, -4);
		assert_eq!(frames[0].offset_y, -6);
		assert_eq!(frames[0].index_pixels, pixels);
	}

	#[test]
	fn test_equal_cells_reproduce_previous_frame() {
		let pixels = patterned(12, 8, 3);
		let data = FileBuilder::new(2)
			.direction(vec![frame(12, 8, 0, -7, pixels.clone()), frame(12, 8, 0, -7, pixels.clone())])
			.to_bytes()
			.unwrap();

		let raw = File::from_bytes(&data).unwrap().raw_direction(0).unwrap();
		let (header, frames) = decode_direction(raw.bytes(), 2).unwrap();

		// Every cell of the second frame comes from the equal-cell stream
		assert_eq!(header.equal_cells_size, 6);
		assert_eq!(header.pixel_mask_size, 0);
		assert_eq!(frames[0].index_pixels, pixels);
		assert_eq!(frames[1].index_pixels, frames[0].index_pixels);
	}

	#[test]
	fn test_partially_changed_frame() {
		let first = patterned(8, 8, 2);
		let mut second = first.clone();
		second[0] = 7;
		second[1] = 7;

		let data = FileBuilder::new(2)
			.direction(vec![frame(8, 8, 0, -7, first.clone()), frame(8, 8, 0, -7, second.clone())])
			.to_bytes()
			.unwrap();

		let frames = File::from_bytes(&data).unwrap().decode_direction(0).unwrap();
		assert_eq!(frames[0].index_pixels, first);
		assert_eq!(frames[1].index_pixels, second);
	}

	#[test]
	fn test_directions_decode_independently() {
		let data = FileBuilder::new(1)
			.direction(vec![frame(4, 4, 0, -3, vec![5; 16])])
			.direction(vec![frame(5, 2, 1, 0, patterned(5, 2, 4))])
			.to_bytes()
			.unwrap();

		let dcc = File::from_bytes(&data).unwrap();
		assert_eq!(dcc.direction_count(), 2);
		let second = dcc.decode_direction(1).unwrap();
		assert_eq!(second[0].index_pixels, patterned(5, 2, 4));
		let first = dcc.decode_direction(0).unwrap();
		assert_eq!(first[0].index_pixels, vec![5; 16]);
	}

	#[test]
	fn test_corrupted_directions_never_panic() {
		use rand::rngs::SmallRng;
		use rand::{Rng, SeedableRng};

		let data = FileBuilder::new(2)
			.direction(vec![
				frame(12, 9, -6, -8, patterned(12, 9, 1)),
				frame(12, 9, -6, -8, patterned(12, 9, 2)),
			])
			.to_bytes()
			.unwrap();
		let body = constants::HEADER_SIZE + 4;

		let mut rng = SmallRng::seed_from_u64(0x74);
		for _ in 0..500 {
			let mut corrupted = data.clone();
			for _ in 0..rng.random_range(1..8) {
				let index = rng.random_range(body..corrupted.len());
				corrupted[index] = rng.random();
			}
			// Either outcome is fine as long as decoding returns
			let _ = File::from_bytes(&corrupted).and_then(|dcc| dcc.decode_direction(0));
		}
	}

	#[test]
	fn test_bad_signature() {
		let err = File::from_bytes(&[0x75, 6, 1, 0, 0, 0, 0]).unwrap_err();
		assert!(matches!(err, FormatError::InvalidSignature { .. }));
	}

	#[test]
	fn test_truncated_header() {
		let err = File::from_bytes(&[0x74, 6, 1]).unwrap_err();
		assert!(matches!(err, FormatError::UnexpectedEof { .. }));
	}

	#[test]
	fn test_direction_out_of_range() {
		let data = FileBuilder::new(1).direction(vec![frame(1, 1, 0, 0, vec![3])]).to_bytes().unwrap();
		let err = File::from_bytes(&data).unwrap().raw_direction(4).unwrap_err();
		assert!(matches!(err, FormatError::InvalidDirection { .. }));
	}

	#[test]
	fn test_truncated_direction_underruns() {
		let data = FileBuilder::new(1)
			.direction(vec![frame(16, 16, 0, -15, patterned(16, 16, 0))])
			.to_bytes()
			.unwrap();
		let truncated = &data[..data.len() - 12];

		let err = File::from_bytes(truncated).unwrap().decode_direction(0).unwrap_err();
		assert!(matches!(err, FormatError::BitstreamUnderrun { .. }));
	}
}
