//! Builder for writing DCC files.
//!
//! The encoder covers the subset of the format needed to author sprites
//! from decoded frames: every frame of a direction shares one box, cells
//! hold at most four palette codes, and unchanged cells are written to
//! the equal-cell stream. Raw pixel codes are never emitted.

use std::collections::BTreeSet;

use crate::file::bits::BitWriter;
use crate::file::frame::DecodedFrame;
use crate::file::{FileType, FormatError};

use super::constants;
use super::direction::{Rect, frame_cells};

/// Assembles per-direction frames into a DCC byte stream.
#[derive(Debug, Clone)]
pub struct FileBuilder {
	frames_per_direction: u32,
	directions: Vec<Vec<DecodedFrame>>,
}

impl FileBuilder {
	/// Creates a builder for directions of `frames_per_direction` frames.
	pub fn new(frames_per_direction: u32) -> Self {
		Self {
			frames_per_direction,
			directions: Vec::new(),
		}
	}

	/// Appends a direction.
	///
	/// Frame offsets are the top-left corner of the frame, as returned by
	/// the decoder.
	pub fn direction(mut self, frames: Vec<DecodedFrame>) -> Self {
		self.directions.push(frames);
		self
	}

	/// Encodes the file.
	///
	/// # Errors
	///
	/// - [`FormatError::CorruptHeader`] when a direction has the wrong frame
	///   count, frames disagree on their box, or a cell needs more than four
	///   palette codes
	/// - [`FormatError::InvalidDimensions`] for empty or oversized frames
	pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
		if self.directions.len() > u8::MAX as usize {
			return Err(FormatError::corrupt(FileType::Dcc, "more than 255 directions"));
		}

		let mut encoded = Vec::with_capacity(self.directions.len());
		for (index, frames) in self.directions.iter().enumerate() {
			if frames.len() != self.frames_per_direction as usize {
				return Err(FormatError::corrupt(
					FileType::Dcc,
					format!(
						"direction {index} has {} frames, expected {}",
						frames.len(),
						self.frames_per_direction
					),
				));
			}
			encoded.push(encode_direction(frames)?);
		}

		let header_size = constants::HEADER_SIZE + 4 * encoded.len();
		let body: usize = encoded.iter().map(Vec::len).sum();

		let mut out = Vec::with_capacity(header_size + body);
		out.push(constants::SIGNATURE);
		out.push(constants::VERSION);
		out.push(encoded.len() as u8);
		out.extend_from_slice(&self.frames_per_direction.to_le_bytes());
		out.extend_from_slice(&1u32.to_le_bytes());
		out.extend_from_slice(&(body as u32).to_le_bytes());

		let mut offset = header_size;
		for direction in &encoded {
			out.extend_from_slice(&(offset as u32).to_le_bytes());
			offset += direction.len();
		}
		for direction in encoded {
			out.extend_from_slice(&direction);
		}

		Ok(out)
	}
}

/// Smallest width-table code able to hold `bits` bits.
fn width_code(bits: u32) -> u32 {
	constants::BIT_WIDTHS
		.iter()
		.position(|&width| u32::from(width) >= bits)
		.map_or(15, |code| code as u32)
}

fn unsigned_bits(value: u32) -> u32 {
	32 - value.leading_zeros()
}

fn signed_bits(value: i32) -> u32 {
	if value == 0 {
		0
	} else if value > 0 {
		unsigned_bits(value as u32) + 1
	} else {
		unsigned_bits(!value as u32) + 1
	}
}

fn encode_direction(frames: &[DecodedFrame]) -> Result<Vec<u8>, FormatError> {
	let Some(first) = frames.first() else {
		return Err(FormatError::corrupt(FileType::Dcc, "direction without frames"));
	};
	if first.width == 0
		|| first.height == 0
		|| first.width > constants::MAX_DIMENSION
		|| first.height > constants::MAX_DIMENSION
	{
		return Err(FormatError::invalid_dimensions(
			FileType::Dcc,
			u64::from(first.width),
			u64::from(first.height),
		));
	}
	for frame in frames {
		if (frame.width, frame.height, frame.offset_x, frame.offset_y)
			!= (first.width, first.height, first.offset_x, first.offset_y)
		{
			return Err(FormatError::corrupt(FileType::Dcc, "frames of a direction must share one box"));
		}
		if frame.index_pixels.len() != (frame.width * frame.height) as usize {
			return Err(FormatError::invalid_dimensions(
				FileType::Dcc,
				u64::from(frame.width),
				u64::from(frame.height),
			));
		}
	}

	let bounds = Rect {
		left: first.offset_x,
		top: first.offset_y,
		width: first.width as i32,
		height: first.height as i32,
	};
	let bottom = bounds.top + bounds.height - 1;

	// Code 0 always maps to the transparent index
	let mut used: BTreeSet<u8> = frames.iter().flat_map(|f| f.index_pixels.iter().copied()).collect();
	used.insert(0);
	let entries: Vec<u8> = used.into_iter().collect();
	let mut codes = [0u8; 256];
	for (code, &index) in entries.iter().enumerate() {
		codes[index as usize] = code as u8;
	}

	let cells = frame_cells(&bounds, &bounds);
	let width = first.width as usize;
	let mut equal_cells = BitWriter::new();
	let mut pixel_mask = BitWriter::new();
	let mut displacements = BitWriter::new();
	let mut pixel_indices = BitWriter::new();

	for (frame_index, frame) in frames.iter().enumerate() {
		for cell in &cells.cells {
			let block: Vec<u8> = (0..cell.height)
				.flat_map(|y| {
					let start = (cell.y + y) * width + cell.x;
					frame.index_pixels[start..start + cell.width].iter().map(|&p| codes[p as usize])
				})
				.collect();

			if frame_index > 0 {
				let previous = &frames[frame_index - 1].index_pixels;
				let unchanged = (0..cell.height).all(|y| {
					let start = (cell.y + y) * width + cell.x;
					previous[start..start + cell.width] == frame.index_pixels[start..start + cell.width]
				});
				equal_cells.put_bit(unchanged);
				if unchanged {
					continue;
				}
				pixel_mask.put_bits(0x0F, 4);
			}

			let nonzero: Vec<u8> = block
				.iter()
				.copied()
				.filter(|&c| c != 0)
				.collect::<BTreeSet<u8>>()
				.into_iter()
				.collect();
			let has_zero = block.contains(&0);
			if nonzero.len() > 4 || (nonzero.len() == 4 && has_zero) {
				return Err(FormatError::corrupt(
					FileType::Dcc,
					format!("cell at ({}, {}) uses more than four colours", cell.x, cell.y),
				));
			}

			let mut last = 0u32;
			for &code in &nonzero {
				let mut delta = u32::from(code) - last;
				while delta >= 15 {
					displacements.put_bits(15, 4);
					delta -= 15;
				}
				displacements.put_bits(delta, 4);
				last = u32::from(code);
			}
			if nonzero.len() < 4 {
				displacements.put_bits(0, 4);
			}

			let mut values = [0u8; 4];
			for (slot, &code) in values.iter_mut().zip(nonzero.iter().rev()) {
				*slot = code;
			}
			if values[0] == values[1] {
				continue;
			}
			let bits = if values[1] == values[2] { 1 } else { 2 };
			for code in block {
				let pick = values.iter().position(|&v| v == code).unwrap_or(0);
				pixel_indices.put_bits(pick as u32, bits);
			}
		}
	}

	let width_bits = width_code(unsigned_bits(first.width));
	let height_bits = width_code(unsigned_bits(first.height));
	let x_bits = width_code(signed_bits(bounds.left));
	let y_bits = width_code(signed_bits(bottom));

	let mut out = BitWriter::new();
	// Size placeholder, unused by the decoder
	out.put_bits(0, 32);
	out.put_bits(0x2, 2);
	for code in [0, width_bits, height_bits, x_bits, y_bits, 0, 0] {
		out.put_bits(code, 4);
	}
	for _ in frames {
		out.put_bits(first.width, constants::BIT_WIDTHS[width_bits as usize] as usize);
		out.put_bits(first.height, constants::BIT_WIDTHS[height_bits as usize] as usize);
		out.put_signed_bits(bounds.left, constants::BIT_WIDTHS[x_bits as usize] as usize);
		out.put_signed_bits(bottom, constants::BIT_WIDTHS[y_bits as usize] as usize);
		out.put_bit(false);
	}

	out.put_bits(equal_cells.bit_len() as u32, 20);
	out.put_bits(pixel_mask.bit_len() as u32, 20);
	for index in 0..=255u8 {
		out.put_bit(entries.binary_search(&index).is_ok());
	}
	out.append(&equal_cells);
	out.append(&pixel_mask);
	out.append(&displacements);
	out.append(&pixel_indices);

	Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::dcc::File;

	#[test]
	fn test_width_codes() {
		assert_eq!(width_code(0), 0);
		assert_eq!(width_code(1), 1);
		assert_eq!(width_code(3), 3);
		assert_eq!(width_code(17), 10);
		assert_eq!(width_code(32), 15);
	}

	#[test]
	fn test_signed_bits() {
		assert_eq!(signed_bits(0), 0);
		assert_eq!(signed_bits(1), 2);
		assert_eq!(signed_bits(-1), 1);
		assert_eq!(signed_bits(-5), 4);
		assert_eq!(signed_bits(7), 4);
	}

	#[test]
	fn test_rejects_five_colour_cell() {
		let frame = DecodedFrame {
			width: 4,
			height: 1,
			offset_x: 0,
			offset_y: 0,
			index_pixels: vec![0, 1, 2, 3],
		};
		let mut busy = frame.clone();
		busy.index_pixels = vec![1, 2, 3, 4];
		// Four opaque codes are fine on their own
		assert!(FileBuilder::new(1).direction(vec![busy.clone()]).to_bytes().is_ok());

		let mut tall = busy;
		tall.height = 2;
		tall.index_pixels = vec![1, 2, 3, 4, 0, 0, 0, 0];
		let err = FileBuilder::new(1).direction(vec![tall]).to_bytes().unwrap_err();
		assert!(matches!(err, FormatError::CorruptHeader { .. }));
		assert!(FileBuilder::new(1).direction(vec![frame]).to_bytes().is_ok());
	}

	#[test]
	fn test_large_palette_codes() {
		// Codes above 15 need chained displacements
		let mut index_pixels = vec![0u8; 128];
		for (i, pixel) in index_pixels.iter_mut().enumerate() {
			let x = i % 32;
			let cell = x / 4;
			if x % 4 != 0 {
				*pixel = 180 - (cell as u8) * 20 + (x % 4) as u8;
			}
		}
		let frame = DecodedFrame {
			width: 32,
			height: 4,
			offset_x: 3,
			offset_y: -3,
			index_pixels,
		};

		let data = FileBuilder::new(1).direction(vec![frame.clone()]).to_bytes().unwrap();
		let decoded = File::from_bytes(&data).unwrap().decode_direction(0).unwrap();
		assert_eq!(decoded[0], frame);
	}
}
