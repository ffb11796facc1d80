//! Palette-indexed frame shared by the DC6 and DCC decoders.

use std::fmt;

/// One decoded sprite frame, still in palette indices.
///
/// Pixels are row-major with a top-left origin. Index `0` is transparent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedFrame {
	/// Frame width in pixels
	pub width: u32,
	/// Frame height in pixels
	pub height: u32,
	/// Horizontal draw offset relative to the sprite origin
	pub offset_x: i32,
	/// Vertical draw offset relative to the sprite origin
	pub offset_y: i32,
	/// `width * height` palette indices
	pub index_pixels: Vec<u8>,
}

impl DecodedFrame {
	/// Creates a fully transparent frame.
	pub fn blank(width: u32, height: u32, offset_x: i32, offset_y: i32) -> Self {
		Self {
			width,
			height,
			offset_x,
			offset_y,
			index_pixels: vec![0; width as usize * height as usize],
		}
	}

	/// Returns the palette index at `(x, y)`, or `None` outside the frame.
	#[inline]
	pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
		if x >= self.width || y >= self.height {
			return None;
		}
		self.index_pixels.get((y * self.width + x) as usize).copied()
	}

	/// Returns one row of palette indices.
	pub fn row(&self, y: u32) -> Option<&[u8]> {
		if y >= self.height {
			return None;
		}
		let start = (y * self.width) as usize;
		self.index_pixels.get(start..start + self.width as usize)
	}

	/// Returns `true` when every pixel is transparent.
	pub fn is_empty(&self) -> bool {
		self.index_pixels.iter().all(|&index| index == 0)
	}
}

impl fmt::Display for DecodedFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{} @ ({}, {})", self.width, self.height, self.offset_x, self.offset_y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_blank_frame() {
		let frame = DecodedFrame::blank(3, 2, -1, 4);
		assert_eq!(frame.index_pixels.len(), 6);
		assert!(frame.is_empty());
		assert_eq!(frame.to_string(), "3x2 @ (-1, 4)");
	}

	#[test]
	fn test_pixel_access() {
		let mut frame = DecodedFrame::blank(2, 2, 0, 0);
		frame.index_pixels = vec![1, 2, 3, 4];

		assert_eq!(frame.pixel(1, 1), Some(4));
		assert_eq!(frame.pixel(2, 0), None);
		assert_eq!(frame.row(1), Some(&[3u8, 4][..]));
		assert_eq!(frame.row(2), None);
		assert!(!frame.is_empty());
	}
}
