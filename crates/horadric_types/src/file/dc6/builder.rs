//! Builder for writing DC6 files.

use crate::file::frame::DecodedFrame;
use crate::file::{FileType, FormatError};

use super::frame::{FrameHeader, encode_rle};
use super::{Header, constants};

/// Assembles decoded frames into a DC6 byte stream.
///
/// # Examples
///
/// ```
/// use horadric_types::file::DecodedFrame;
/// use horadric_types::file::dc6::{File, FileBuilder};
///
/// let frame = DecodedFrame {
///     width: 2,
///     height: 1,
///     offset_x: 0,
///     offset_y: 0,
///     index_pixels: vec![7, 0],
/// };
/// let bytes = FileBuilder::new(1, 1).frame(0, frame).to_bytes().unwrap();
/// let dc6 = File::from_bytes(&bytes).unwrap();
/// assert_eq!(dc6.frame(0, 0).unwrap().decoded().index_pixels, vec![7, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct FileBuilder {
	header: Header,
	directions: Vec<Vec<DecodedFrame>>,
}

impl FileBuilder {
	/// Creates a builder for `directions` directions of `frames_per_direction` frames.
	pub fn new(directions: u32, frames_per_direction: u32) -> Self {
		Self {
			header: Header {
				directions,
				frames_per_direction,
				..Header::default()
			},
			directions: vec![Vec::new(); directions as usize],
		}
	}

	/// Appends a frame to `direction`.
	pub fn frame(mut self, direction: usize, frame: DecodedFrame) -> Self {
		if let Some(frames) = self.directions.get_mut(direction) {
			frames.push(frame);
		}
		self
	}

	/// Encodes the file.
	///
	/// # Errors
	///
	/// Returns [`FormatError::CorruptHeader`] when a direction does not hold
	/// exactly `frames_per_direction` frames or a frame's pixel buffer does
	/// not match its size.
	pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
		let per = self.header.frames_per_direction as usize;
		for (index, frames) in self.directions.iter().enumerate() {
			if frames.len() != per {
				return Err(FormatError::corrupt(
					FileType::Dc6,
					format!("direction {index} has {} frames, expected {per}", frames.len()),
				));
			}
		}

		let total = self.directions.len() * per;
		let mut blocks = Vec::with_capacity(total);
		for frame in self.directions.iter().flatten() {
			if frame.index_pixels.len() != frame.width as usize * frame.height as usize {
				return Err(FormatError::invalid_dimensions(
					FileType::Dc6,
					u64::from(frame.width),
					u64::from(frame.height),
				));
			}
			blocks.push(encode_rle(frame.width, frame.height, &frame.index_pixels));
		}

		let mut out = Vec::new();
		out.extend_from_slice(&self.header.version.to_le_bytes());
		out.extend_from_slice(&self.header.flags.to_le_bytes());
		out.extend_from_slice(&self.header.encoding.to_le_bytes());
		out.extend_from_slice(&self.header.termination);
		out.extend_from_slice(&self.header.directions.to_le_bytes());
		out.extend_from_slice(&self.header.frames_per_direction.to_le_bytes());

		let mut pointer = constants::HEADER_SIZE + total * 4;
		for block in &blocks {
			out.extend_from_slice(&(pointer as u32).to_le_bytes());
			pointer += constants::FRAME_HEADER_SIZE + block.len() + constants::FRAME_TERMINATOR_SIZE;
		}

		for (frame, block) in self.directions.iter().flatten().zip(&blocks) {
			let next_block = out.len() + constants::FRAME_HEADER_SIZE + block.len()
				+ constants::FRAME_TERMINATOR_SIZE;
			let header = FrameHeader {
				flipped: 0,
				width: frame.width,
				height: frame.height,
				offset_x: frame.offset_x,
				offset_y: frame.offset_y,
				unknown: 0,
				next_block: next_block as u32,
				length: block.len() as u32,
			};
			header.write(&mut out);
			out.extend_from_slice(block);
			out.extend_from_slice(&[0xEE; constants::FRAME_TERMINATOR_SIZE]);
		}

		Ok(out)
	}
}
