//! DCC direction decoding.
//!
//! A direction is a single bit stream holding a header, the frame
//! headers and five packed sub-streams. Decoding runs in two passes over
//! a grid of 4x4 cells covering the direction's bounding box:
//!
//! 1. **Pixel buffer pass**: for every frame cell, either reuse the cell
//!    of the previous frame (equal-cell bit set) or read up to four
//!    palette codes for it.
//! 2. **Frame pass**: walk the cells again and paint them, copying reused
//!    cells forward from the shared canvas, filling solid cells, or reading
//!    one or two bits per pixel to pick one of the cell's four codes.

use crate::file::bits::BitReader;
use crate::file::frame::DecodedFrame;
use crate::file::{FileType, FormatError};

use super::constants;

/// Axis-aligned rectangle in sprite space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
	/// Left edge
	pub left: i32,
	/// Top edge
	pub top: i32,
	/// Width
	pub width: i32,
	/// Height
	pub height: i32,
}

impl Rect {
	/// Exclusive right edge.
	pub fn right(&self) -> i32 {
		self.left + self.width
	}

	/// Exclusive bottom edge.
	pub fn bottom(&self) -> i32 {
		self.top + self.height
	}

	/// Smallest rectangle containing both.
	pub fn union(&self, other: &Rect) -> Rect {
		let left = self.left.min(other.left);
		let top = self.top.min(other.top);
		Rect {
			left,
			top,
			width: self.right().max(other.right()) - left,
			height: self.bottom().max(other.bottom()) - top,
		}
	}
}

/// Header of one frame inside a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
	/// Unused field
	pub variable0: u32,
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
	/// Left edge
	pub offset_x: i32,
	/// Bottom edge
	pub offset_y: i32,
	/// Optional bytes stored after the frame headers
	pub optional_bytes: u32,
	/// Coded byte count
	pub coded_bytes: u32,
	/// Frame is stored bottom-up
	pub bottom_up: bool,
	/// Frame box with a top-left origin
	pub bounds: Rect,
}

/// Field widths and stream sizes read from a direction header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionHeader {
	/// Encoded size of the direction in bytes
	pub out_size_coded: u32,
	/// Bit 1: equal-cell stream present, bit 0: raw pixel streams present
	pub compression_flags: u8,
	/// Bits of `variable0`
	pub variable0_bits: usize,
	/// Bits of frame widths
	pub width_bits: usize,
	/// Bits of frame heights
	pub height_bits: usize,
	/// Bits of x offsets
	pub x_offset_bits: usize,
	/// Bits of y offsets
	pub y_offset_bits: usize,
	/// Bits of the optional byte counts
	pub optional_data_bits: usize,
	/// Bits of the coded byte counts
	pub coded_bytes_bits: usize,
	/// Frame headers
	pub frames: Vec<FrameHeader>,
	/// Union of every frame box
	pub bounds: Rect,
	/// Size of the equal-cell stream in bits
	pub equal_cells_size: usize,
	/// Size of the pixel-mask stream in bits
	pub pixel_mask_size: usize,
	/// Size of the encoding-type stream in bits
	pub encoding_type_size: usize,
	/// Size of the raw pixel code stream in bits
	pub raw_pixel_codes_size: usize,
	/// Palette indices used by the direction, in code order
	pub palette_entries: Vec<u8>,
}

/// Position and size of a cell relative to the direction box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Cell {
	pub(super) x: usize,
	pub(super) y: usize,
	pub(super) width: usize,
	pub(super) height: usize,
}

/// Cell grid of a frame, aligned to the direction's 4-pixel grid.
#[derive(Debug, Clone)]
pub(super) struct FrameCells {
	pub(super) columns: usize,
	pub(super) rows: usize,
	pub(super) cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy)]
struct PixelBufferEntry {
	value: [u8; 4],
	frame: usize,
	frame_cell: usize,
}

#[derive(Debug, Clone, Copy)]
struct LastCell {
	width: isize,
	height: isize,
	x: usize,
	y: usize,
}

fn bit_width(code: u32) -> usize {
	constants::BIT_WIDTHS[(code & 0x0F) as usize] as usize
}

/// Splits `length` pixels into cells whose first cell ends on the 4-pixel grid.
///
/// `first` is the width of the first cell before clipping. A remainder of
/// a single pixel is folded into the previous cell, so cells can be five
/// pixels wide.
fn split_cells(length: i32, first: i32) -> Vec<usize> {
	let count = if length - first <= 1 {
		1
	} else {
		let tmp = length - first - 1;
		let mut count = 2 + tmp / constants::CELL_SIZE;
		if tmp % constants::CELL_SIZE == 0 {
			count -= 1;
		}
		count
	};

	if count == 1 {
		return vec![length.max(0) as usize];
	}
	let mut sizes = Vec::with_capacity(count as usize);
	sizes.push(first as usize);
	for _ in 1..count - 1 {
		sizes.push(constants::CELL_SIZE as usize);
	}
	sizes.push((length - first - constants::CELL_SIZE * (count - 2)) as usize);
	sizes
}

/// Number of 4-pixel cells covering `length` pixels.
pub(super) fn cell_count(length: i32) -> usize {
	(1 + (length - 1) / constants::CELL_SIZE) as usize
}

/// Computes the cells of a frame inside the direction box.
pub(super) fn frame_cells(frame: &Rect, direction: &Rect) -> FrameCells {
	let dx = frame.left - direction.left;
	let dy = frame.top - direction.top;
	let widths = split_cells(frame.width, constants::CELL_SIZE - dx % constants::CELL_SIZE);
	let heights = split_cells(frame.height, constants::CELL_SIZE - dy % constants::CELL_SIZE);

	let mut cells = Vec::with_capacity(widths.len() * heights.len());
	let mut y = dy as usize;
	for &height in &heights {
		let mut x = dx as usize;
		for &width in &widths {
			cells.push(Cell {
				x,
				y,
				width,
				height,
			});
			x += width;
		}
		y += height;
	}

	FrameCells {
		columns: widths.len(),
		rows: heights.len(),
		cells,
	}
}

impl DirectionHeader {
	/// Reads the direction header, frame headers and stream sizes.
	///
	/// Leaves `reader` positioned at the first sub-stream.
	pub fn read(reader: &mut BitReader<'_>, frames_per_direction: usize) -> Result<Self, FormatError> {
		let out_size_coded = reader.get_u32()?;
		let compression_flags = reader.get_bits(2)? as u8;
		let variable0_bits = bit_width(reader.get_bits(4)?);
		let width_bits = bit_width(reader.get_bits(4)?);
		let height_bits = bit_width(reader.get_bits(4)?);
		let x_offset_bits = bit_width(reader.get_bits(4)?);
		let y_offset_bits = bit_width(reader.get_bits(4)?);
		let optional_data_bits = bit_width(reader.get_bits(4)?);
		let coded_bytes_bits = bit_width(reader.get_bits(4)?);

		let mut frames = Vec::with_capacity(frames_per_direction);
		let mut bounds: Option<Rect> = None;
		for _ in 0..frames_per_direction {
			let variable0 = reader.get_bits(variable0_bits)?;
			let width = reader.get_bits(width_bits)?;
			let height = reader.get_bits(height_bits)?;
			let offset_x = reader.get_signed_bits(x_offset_bits)?;
			let offset_y = reader.get_signed_bits(y_offset_bits)?;
			let optional_bytes = reader.get_bits(optional_data_bits)?;
			let coded_bytes = reader.get_bits(coded_bytes_bits)?;
			let bottom_up = reader.get_bit()? == 1;

			if bottom_up {
				return Err(FormatError::corrupt(FileType::Dcc, "bottom-up frames are not supported"));
			}
			if offset_x.unsigned_abs() > constants::MAX_OFFSET
				|| offset_y.unsigned_abs() > constants::MAX_OFFSET
			{
				return Err(FormatError::corrupt(
					FileType::Dcc,
					format!("frame offset ({offset_x}, {offset_y}) out of range"),
				));
			}
			if width > constants::MAX_DIMENSION || height > constants::MAX_DIMENSION {
				return Err(FormatError::invalid_dimensions(
					FileType::Dcc,
					u64::from(width),
					u64::from(height),
				));
			}

			let frame_bounds = Rect {
				left: offset_x,
				top: offset_y - height as i32 + 1,
				width: width as i32,
				height: height as i32,
			};
			bounds = Some(match bounds {
				Some(current) => current.union(&frame_bounds),
				None => frame_bounds,
			});
			frames.push(FrameHeader {
				variable0,
				width,
				height,
				offset_x,
				offset_y,
				optional_bytes,
				coded_bytes,
				bottom_up,
				bounds: frame_bounds,
			});
		}

		let bounds = bounds.unwrap_or_default();
		if bounds.width <= 0
			|| bounds.height <= 0
			|| bounds.width as u32 > constants::MAX_DIMENSION
			|| bounds.height as u32 > constants::MAX_DIMENSION
		{
			return Err(FormatError::invalid_dimensions(
				FileType::Dcc,
				bounds.width.max(0) as u64,
				bounds.height.max(0) as u64,
			));
		}

		let optional_total: usize = frames.iter().map(|f| f.optional_bytes as usize).sum();
		if optional_total > 0 {
			// Optional data starts on the next byte boundary
			let misalignment = reader.offset() % 8;
			if misalignment != 0 {
				reader.skip_bits(8 - misalignment)?;
			}
			reader.skip_bits(optional_total * 8)?;
		}

		let equal_cells_size = if compression_flags & 0x2 != 0 {
			reader.get_bits(20)? as usize
		} else {
			0
		};
		let pixel_mask_size = reader.get_bits(20)? as usize;
		let (encoding_type_size, raw_pixel_codes_size) = if compression_flags & 0x1 != 0 {
			(reader.get_bits(20)? as usize, reader.get_bits(20)? as usize)
		} else {
			(0, 0)
		};

		let mut palette_entries = Vec::with_capacity(256);
		for index in 0..=255u8 {
			if reader.get_bit()? != 0 {
				palette_entries.push(index);
			}
		}

		Ok(Self {
			out_size_coded,
			compression_flags,
			variable0_bits,
			width_bits,
			height_bits,
			x_offset_bits,
			y_offset_bits,
			optional_data_bits,
			coded_bytes_bits,
			frames,
			bounds,
			equal_cells_size,
			pixel_mask_size,
			encoding_type_size,
			raw_pixel_codes_size,
			palette_entries,
		})
	}

	fn palette_entry(&self, code: u8) -> u8 {
		// Codes beyond the entry list fall back to transparent
		self.palette_entries.get(code as usize).copied().unwrap_or(0)
	}
}

struct Streams<'a> {
	equal_cells: BitReader<'a>,
	pixel_mask: BitReader<'a>,
	encoding_type: BitReader<'a>,
	raw_pixel_codes: BitReader<'a>,
	pixel_codes: BitReader<'a>,
}

impl<'a> Streams<'a> {
	fn split(reader: &mut BitReader<'a>, header: &DirectionHeader) -> Result<Self, FormatError> {
		let equal_cells = reader.fork();
		reader.skip_bits(header.equal_cells_size)?;
		let pixel_mask = reader.fork();
		reader.skip_bits(header.pixel_mask_size)?;
		let encoding_type = reader.fork();
		reader.skip_bits(header.encoding_type_size)?;
		let raw_pixel_codes = reader.fork();
		reader.skip_bits(header.raw_pixel_codes_size)?;
		let pixel_codes = reader.fork();

		Ok(Self {
			equal_cells,
			pixel_mask,
			encoding_type,
			raw_pixel_codes,
			pixel_codes,
		})
	}

	fn verify(&self, header: &DirectionHeader) -> Result<(), FormatError> {
		let checks = [
			("equal cell", self.equal_cells.bits_read(), header.equal_cells_size),
			("pixel mask", self.pixel_mask.bits_read(), header.pixel_mask_size),
			("encoding type", self.encoding_type.bits_read(), header.encoding_type_size),
			("raw pixel", self.raw_pixel_codes.bits_read(), header.raw_pixel_codes_size),
		];
		for (name, read, expected) in checks {
			if read != expected {
				return Err(FormatError::corrupt(
					FileType::Dcc,
					format!("{name} stream consumed {read} bits, header declares {expected}"),
				));
			}
		}
		Ok(())
	}
}

/// Decodes every frame of one direction.
///
/// `data` must start at the direction's first byte. All frames are
/// returned at the size of the direction's bounding box with offsets set
/// to its top-left corner.
pub fn decode_direction(
	data: &[u8],
	frames_per_direction: usize,
) -> Result<(DirectionHeader, Vec<DecodedFrame>), FormatError> {
	let mut reader = BitReader::new(data, 0, FileType::Dcc);
	let header = DirectionHeader::read(&mut reader, frames_per_direction)?;
	let mut streams = Streams::split(&mut reader, &header)?;

	let columns = cell_count(header.bounds.width);
	let rows = cell_count(header.bounds.height);
	let frame_cells: Vec<FrameCells> =
		header.frames.iter().map(|frame| frame_cells(&frame.bounds, &header.bounds)).collect();

	let pixel_buffer = fill_pixel_buffer(&header, &frame_cells, columns, rows, &mut streams)?;
	let frames = generate_frames(&header, &frame_cells, columns, rows, &pixel_buffer, &mut streams)?;
	streams.verify(&header)?;

	Ok((header, frames))
}

fn fill_pixel_buffer(
	header: &DirectionHeader,
	frame_cells: &[FrameCells],
	columns: usize,
	rows: usize,
	streams: &mut Streams<'_>,
) -> Result<Vec<PixelBufferEntry>, FormatError> {
	let mut cell_buffer: Vec<Option<usize>> = vec![None; columns * rows];
	let mut pixel_buffer: Vec<PixelBufferEntry> = Vec::new();

	for (frame_index, (frame, cells)) in header.frames.iter().zip(frame_cells).enumerate() {
		let origin_x = ((frame.bounds.left - header.bounds.left) / constants::CELL_SIZE) as usize;
		let origin_y = ((frame.bounds.top - header.bounds.top) / constants::CELL_SIZE) as usize;

		for cell_y in 0..cells.rows {
			for cell_x in 0..cells.columns {
				let current = origin_x + cell_x + (origin_y + cell_y) * columns;
				let Some(slot) = cell_buffer.get(current).copied() else {
					return Err(FormatError::corrupt(FileType::Dcc, "frame cell outside direction box"));
				};

				let pixel_mask = match slot {
					Some(_) => {
						let equal = if header.equal_cells_size > 0 {
							streams.equal_cells.get_bit()?
						} else {
							0
						};
						if equal != 0 {
							continue;
						}
						streams.pixel_mask.get_bits(4)?
					}
					None => 0x0F,
				};

				let pixel_count = constants::PIXEL_MASK_LOOKUP[pixel_mask as usize];
				let raw = pixel_count != 0
					&& header.encoding_type_size > 0
					&& streams.encoding_type.get_bit()? != 0;

				let mut stack = [0u32; 4];
				let mut last = 0u32;
				let mut decoded = 0usize;
				for entry in stack.iter_mut().take(pixel_count) {
					if raw {
						*entry = streams.raw_pixel_codes.get_bits(8)?;
					} else {
						*entry = last;
						loop {
							let displacement = streams.pixel_codes.get_bits(4)?;
							*entry += displacement;
							if displacement != 15 {
								break;
							}
						}
					}

					if *entry == last {
						*entry = 0;
						break;
					}
					last = *entry;
					decoded += 1;
				}

				let old = slot.map_or([0u8; 4], |index| pixel_buffer[index].value);
				let mut value = [0u8; 4];
				let mut remaining = decoded;
				for (i, slot_value) in value.iter_mut().enumerate() {
					if pixel_mask & (1 << i) != 0 {
						if remaining > 0 {
							remaining -= 1;
							*slot_value = stack[remaining] as u8;
						}
					} else {
						*slot_value = old[i];
					}
				}

				pixel_buffer.push(PixelBufferEntry {
					value,
					frame: frame_index,
					frame_cell: cell_x + cell_y * cells.columns,
				});
				cell_buffer[current] = Some(pixel_buffer.len() - 1);
			}
		}
	}

	for entry in &mut pixel_buffer {
		for code in &mut entry.value {
			*code = header.palette_entry(*code);
		}
	}

	Ok(pixel_buffer)
}

fn generate_frames(
	header: &DirectionHeader,
	frame_cells: &[FrameCells],
	columns: usize,
	rows: usize,
	pixel_buffer: &[PixelBufferEntry],
	streams: &mut Streams<'_>,
) -> Result<Vec<DecodedFrame>, FormatError> {
	let width = header.bounds.width as usize;
	let height = header.bounds.height as usize;
	let mut canvas = vec![0u8; width * height];
	let mut last_cells = vec![
		LastCell {
			width: -1,
			height: -1,
			x: 0,
			y: 0,
		};
		columns * rows
	];
	let mut entry_index = 0usize;
	let mut frames = Vec::with_capacity(header.frames.len());

	for (frame_index, cells) in frame_cells.iter().enumerate() {
		let mut pixels = vec![0u8; width * height];

		for (cell_index, cell) in cells.cells.iter().enumerate() {
			if cell.x + cell.width > width || cell.y + cell.height > height {
				return Err(FormatError::corrupt(FileType::Dcc, "cell exceeds direction box"));
			}
			let buffer_index =
				cell.x / constants::CELL_SIZE as usize + (cell.y / constants::CELL_SIZE as usize) * columns;
			let Some(last) = last_cells.get_mut(buffer_index) else {
				return Err(FormatError::corrupt(FileType::Dcc, "cell outside buffer grid"));
			};

			let fresh = pixel_buffer
				.get(entry_index)
				.filter(|entry| entry.frame == frame_index && entry.frame_cell == cell_index);

			match fresh {
				None => {
					if cell.width as isize != last.width || cell.height as isize != last.height {
						for y in 0..cell.height {
							let start = (cell.y + y) * width + cell.x;
							canvas[start..start + cell.width].fill(0);
						}
					} else {
						// Reused cell: move the previous contents, then copy into the frame
						for y in 0..cell.height {
							for x in 0..cell.width {
								let from = (last.y + y) * width + last.x + x;
								let to = (cell.y + y) * width + cell.x + x;
								canvas[to] = canvas[from];
							}
						}
						copy_cell(&canvas, &mut pixels, cell, width);
					}
				}
				Some(entry) => {
					let value = entry.value;
					if value[0] == value[1] {
						for y in 0..cell.height {
							let start = (cell.y + y) * width + cell.x;
							canvas[start..start + cell.width].fill(value[0]);
						}
					} else {
						let bits = if value[1] == value[2] { 1 } else { 2 };
						for y in 0..cell.height {
							for x in 0..cell.width {
								let pick = streams.pixel_codes.get_bits(bits)? as usize;
								canvas[(cell.y + y) * width + cell.x + x] = value[pick];
							}
						}
					}
					copy_cell(&canvas, &mut pixels, cell, width);
					entry_index += 1;
				}
			}

			*last = LastCell {
				width: cell.width as isize,
				height: cell.height as isize,
				x: cell.x,
				y: cell.y,
			};
		}

		frames.push(DecodedFrame {
			width: width as u32,
			height: height as u32,
			offset_x: header.bounds.left,
			offset_y: header.bounds.top,
			index_pixels: pixels,
		});
	}

	Ok(frames)
}

fn copy_cell(canvas: &[u8], pixels: &mut [u8], cell: &Cell, width: usize) {
	for y in 0..cell.height {
		let start = (cell.y + y) * width + cell.x;
		pixels[start..start + cell.width].copy_from_slice(&canvas[start..start + cell.width]);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rect_union() {
		let a = Rect {
			left: 0,
			top: 0,
			width: 4,
			height: 4,
		};
		let b = Rect {
			left: -2,
			top: 3,
			width: 3,
			height: 5,
		};
		assert_eq!(
			a.union(&b),
			Rect {
				left: -2,
				top: 0,
				width: 6,
				height: 8,
			}
		);
	}

	#[test]
	fn test_split_cells() {
		assert_eq!(split_cells(3, 4), vec![3]);
		assert_eq!(split_cells(5, 4), vec![5]);
		assert_eq!(split_cells(8, 4), vec![4, 4]);
		assert_eq!(split_cells(9, 4), vec![4, 5]);
		assert_eq!(split_cells(10, 4), vec![4, 4, 2]);
		assert_eq!(split_cells(7, 1), vec![1, 4, 2]);
	}

	#[test]
	fn test_frame_cells_offset_into_box() {
		let direction = Rect {
			left: 0,
			top: 0,
			width: 12,
			height: 4,
		};
		let frame = Rect {
			left: 2,
			top: 0,
			width: 8,
			height: 4,
		};
		let cells = frame_cells(&frame, &direction);
		assert_eq!(cells.columns, 3);
		assert_eq!(cells.rows, 1);
		let widths: Vec<usize> = cells.cells.iter().map(|c| c.width).collect();
		assert_eq!(widths, vec![2, 4, 2]);
		assert_eq!(cells.cells[1].x, 4);
	}

	#[test]
	fn test_cell_count() {
		assert_eq!(cell_count(1), 1);
		assert_eq!(cell_count(4), 1);
		assert_eq!(cell_count(5), 2);
		assert_eq!(cell_count(9), 3);
	}
}
