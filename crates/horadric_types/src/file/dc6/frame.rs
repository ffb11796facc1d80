//! DC6 frame header and scanline run-length codec.

use std::fmt;

use crate::file::frame::DecodedFrame;
use crate::file::stream::StreamReader;
use crate::file::{FileType, FormatError};

use super::constants;

/// Per-frame header preceding the RLE block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
	/// Non-zero when the frame is stored top-down
	pub flipped: u32,
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
	/// Horizontal anchor offset
	pub offset_x: i32,
	/// Vertical anchor offset (bottom edge of the frame)
	pub offset_y: i32,
	/// Unused by the engine
	pub unknown: u32,
	/// Offset of the next frame block
	pub next_block: u32,
	/// Length of the RLE data in bytes
	pub length: u32,
}

impl FrameHeader {
	pub(super) fn read(reader: &mut StreamReader<'_>) -> Result<Self, FormatError> {
		Ok(Self {
			flipped: reader.read_u32()?,
			width: reader.read_u32()?,
			height: reader.read_u32()?,
			offset_x: reader.read_i32()?,
			offset_y: reader.read_i32()?,
			unknown: reader.read_u32()?,
			next_block: reader.read_u32()?,
			length: reader.read_u32()?,
		})
	}

	pub(super) fn write(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&self.flipped.to_le_bytes());
		out.extend_from_slice(&self.width.to_le_bytes());
		out.extend_from_slice(&self.height.to_le_bytes());
		out.extend_from_slice(&self.offset_x.to_le_bytes());
		out.extend_from_slice(&self.offset_y.to_le_bytes());
		out.extend_from_slice(&self.unknown.to_le_bytes());
		out.extend_from_slice(&self.next_block.to_le_bytes());
		out.extend_from_slice(&self.length.to_le_bytes());
	}
}

/// A DC6 frame with its pixels already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	header: FrameHeader,
	pixels: DecodedFrame,
}

impl Frame {
	pub(super) fn new(header: FrameHeader, pixels: DecodedFrame) -> Self {
		Self {
			header,
			pixels,
		}
	}

	/// Raw frame header.
	pub fn header(&self) -> &FrameHeader {
		&self.header
	}

	/// Width in pixels.
	pub fn width(&self) -> u32 {
		self.header.width
	}

	/// Height in pixels.
	pub fn height(&self) -> u32 {
		self.header.height
	}

	/// Decoded palette indices.
	pub fn decoded(&self) -> &DecodedFrame {
		&self.pixels
	}

	/// Consumes the frame, returning its decoded pixels.
	pub fn into_decoded(self) -> DecodedFrame {
		self.pixels
	}
}

impl fmt::Display for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}x{} offset ({}, {}) {} bytes",
			self.header.width,
			self.header.height,
			self.header.offset_x,
			self.header.offset_y,
			self.header.length
		)
	}
}

/// Expands the scanline RLE of one frame.
///
/// The image is written bottom-up. Control bytes:
///
/// | Byte            | Meaning                                  |
/// |-----------------|------------------------------------------|
/// | `0x80`          | end of scanline, stop when on row 0      |
/// | `0x81..=0xFF`   | skip `b & 0x7F` transparent pixels       |
/// | `0x00..=0x7F`   | copy the next `b` bytes as palette indices |
///
/// Skipped pixels stay at index 0, the transparent index.
pub fn decode_rle(header: &FrameHeader, data: &[u8]) -> Result<DecodedFrame, FormatError> {
	let width = header.width as usize;
	let height = header.height as usize;
	let mut frame = DecodedFrame::blank(header.width, header.height, header.offset_x, header.offset_y);
	if width == 0 || height == 0 {
		return Ok(frame);
	}

	let mut x = 0usize;
	let mut y = height - 1;
	let mut cursor = 0usize;

	loop {
		let Some(&control) = data.get(cursor) else {
			return Err(FormatError::unexpected_eof(FileType::Dc6, cursor + 1, data.len()));
		};
		cursor += 1;

		if control == constants::END_OF_LINE {
			if y == 0 {
				break;
			}
			y -= 1;
			x = 0;
		} else if control & constants::TRANSPARENT_RUN != 0 {
			x += (control & !constants::TRANSPARENT_RUN) as usize;
		} else {
			let run = control as usize;
			let Some(literal) = data.get(cursor..cursor + run) else {
				return Err(FormatError::unexpected_eof(FileType::Dc6, cursor + run, data.len()));
			};
			if x + run > width {
				return Err(FormatError::corrupt(
					FileType::Dc6,
					format!("scanline run ends at x={} past width {width}", x + run),
				));
			}
			let start = y * width + x;
			frame.index_pixels[start..start + run].copy_from_slice(literal);
			x += run;
			cursor += run;
		}
	}

	Ok(frame)
}

/// Encodes palette indices with the scanline RLE read by [`decode_rle`].
///
/// Index 0 is emitted as transparent runs.
pub fn encode_rle(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
	let width = width as usize;
	let mut out = Vec::new();
	if width == 0 || height == 0 {
		return out;
	}

	for y in (0..height as usize).rev() {
		let row = &pixels[y * width..(y + 1) * width];
		// Trailing transparency is implied by the end-of-line marker
		let used = row.iter().rposition(|&p| p != 0).map_or(0, |p| p + 1);
		let mut x = 0;
		while x < used {
			if row[x] == 0 {
				let run = row[x..used].iter().take_while(|&&p| p == 0).count().min(constants::MAX_RUN);
				out.push(constants::TRANSPARENT_RUN | run as u8);
				x += run;
			} else {
				let run = row[x..used].iter().take_while(|&&p| p != 0).count().min(constants::MAX_RUN);
				out.push(run as u8);
				out.extend_from_slice(&row[x..x + run]);
				x += run;
			}
		}
		out.push(constants::END_OF_LINE);
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn header(width: u32, height: u32) -> FrameHeader {
		FrameHeader {
			width,
			height,
			..Default::default()
		}
	}

	#[test]
	fn test_decode_bottom_up() {
		// Row 1 (bottom) first: [1, 2], then row 0: skip 1, [3]
		let data = [0x02, 1, 2, 0x80, 0x81, 0x01, 3, 0x80];
		let frame = decode_rle(&header(2, 2), &data).unwrap();
		assert_eq!(frame.index_pixels, vec![0, 3, 1, 2]);
	}

	#[test]
	fn test_decode_truncated() {
		let data = [0x02, 1];
		let err = decode_rle(&header(2, 1), &data).unwrap_err();
		assert!(matches!(err, FormatError::UnexpectedEof { .. }));

		// Missing final end-of-line
		let data = [0x01, 7];
		assert!(decode_rle(&header(1, 1), &data).is_err());
	}

	#[test]
	fn test_decode_run_past_width() {
		let data = [0x03, 1, 2, 3, 0x80];
		let err = decode_rle(&header(2, 1), &data).unwrap_err();
		assert!(matches!(err, FormatError::CorruptHeader { .. }));
	}

	#[test]
	fn test_empty_frame() {
		let frame = decode_rle(&header(0, 0), &[]).unwrap();
		assert!(frame.index_pixels.is_empty());
	}

	#[test]
	fn test_encode_matches_decoder() {
		let pixels: Vec<u8> = vec![
			0, 0, 4, 4, 0, //
			9, 0, 0, 0, 0, //
			0, 0, 0, 0, 0, //
			1, 2, 3, 4, 5, //
		];
		let data = encode_rle(5, 4, &pixels);
		let frame = decode_rle(&header(5, 4), &data).unwrap();
		assert_eq!(frame.index_pixels, pixels);
	}

	#[test]
	fn test_encode_long_runs() {
		let mut pixels = vec![6u8; 300];
		pixels[150..290].fill(0);
		let data = encode_rle(300, 1, &pixels);
		let frame = decode_rle(&header(300, 1), &data).unwrap();
		assert_eq!(frame.index_pixels, pixels);
	}
}
