//! Palette support.
//!
//! Diablo II palettes (`pal.dat`) are 768 bytes: 256 entries of three
//! bytes stored in **B, G, R** order. Index 0 is reserved as the
//! transparent color by every consumer in this crate, whatever RGB value
//! the file stores for it.

use std::fmt;
use std::path::Path;

use crate::file::{FileType, FormatError};

/// Palette file constants.
pub mod constants {
	/// Number of palette entries
	pub const PALETTE_SIZE: usize = 256;

	/// Bytes per entry in a `.dat` palette
	pub const BYTES_PER_ENTRY: usize = 3;

	/// Size of a `.dat` palette file
	pub const FILE_SIZE: usize = PALETTE_SIZE * BYTES_PER_ENTRY;

	/// Index reserved as transparent
	pub const TRANSPARENT_INDEX: u8 = 0;
}

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
	/// Alpha component (0-255)
	pub a: u8,
}

impl Color {
	/// Opaque white, the neutral color modulation.
	pub const WHITE: Color = Color::rgb(255, 255, 255);

	/// Creates a new RGBA color.
	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self {
			r,
			g,
			b,
			a,
		}
	}

	/// Creates a new RGB color with full opacity.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::new(r, g, b, 255)
	}

	/// Creates a transparent black color.
	pub const fn transparent() -> Self {
		Self::new(0, 0, 0, 0)
	}

	/// Returns the same color with a different alpha.
	pub const fn with_alpha(self, a: u8) -> Self {
		Self::new(self.r, self.g, self.b, a)
	}

	/// Returns the color as `[r, g, b, a]`.
	pub const fn to_array(self) -> [u8; 4] {
		[self.r, self.g, self.b, self.a]
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::transparent()
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RGBA({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// 256-color palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
	colors: [Color; 256],
}

impl Palette {
	/// Creates a palette with every entry set to opaque black.
	pub fn new() -> Self {
		Self {
			colors: [Color::rgb(0, 0, 0); constants::PALETTE_SIZE],
		}
	}

	/// Loads a `.dat` palette from disk.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses 256 B,G,R triplets.
	///
	/// # Errors
	///
	/// Returns [`FormatError::UnexpectedEof`] when fewer than 768 bytes are
	/// given. Trailing bytes are ignored.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		if data.len() < constants::FILE_SIZE {
			return Err(FormatError::unexpected_eof(
				FileType::Palette,
				constants::FILE_SIZE,
				data.len(),
			));
		}

		let mut palette = Self::new();
		for (color, bgr) in
			palette.colors.iter_mut().zip(data.chunks_exact(constants::BYTES_PER_ENTRY))
		{
			*color = Color::rgb(bgr[2], bgr[1], bgr[0]);
		}

		Ok(palette)
	}

	/// Builds a palette from an explicit color table.
	pub fn from_colors(colors: [Color; 256]) -> Self {
		Self {
			colors,
		}
	}

	/// Creates a grayscale palette where every index maps to its own level.
	pub fn grayscale() -> Self {
		let mut palette = Self::new();
		for (i, color) in palette.colors.iter_mut().enumerate() {
			*color = Color::rgb(i as u8, i as u8, i as u8);
		}
		palette
	}

	/// Serializes back to the 768-byte B,G,R layout.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(constants::FILE_SIZE);
		for color in &self.colors {
			data.extend_from_slice(&[color.b, color.g, color.r]);
		}
		data
	}

	/// Gets a color by index.
	#[inline]
	pub fn get(&self, index: u8) -> Color {
		self.colors[index as usize]
	}

	/// Sets a color at the specified index.
	#[inline]
	pub fn set(&mut self, index: u8, color: Color) {
		self.colors[index as usize] = color;
	}

	/// Returns a reference to the color array.
	#[inline]
	pub fn colors(&self) -> &[Color; 256] {
		&self.colors
	}

	/// Returns an iterator over palette colors with indices.
	pub fn iter_indexed(&self) -> impl Iterator<Item = (u8, &Color)> {
		self.colors.iter().enumerate().map(|(i, c)| (i as u8, c))
	}
}

impl Default for Palette {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for Palette {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Palette: {} colors", constants::PALETTE_SIZE)
	}
}

impl std::ops::Index<u8> for Palette {
	type Output = Color;

	fn index(&self, index: u8) -> &Self::Output {
		&self.colors[index as usize]
	}
}

impl TryFrom<&[u8]> for Palette {
	type Error = FormatError;

	fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
		Self::from_bytes(value)
	}
}

/// Index remap applied before the palette lookup.
pub type RemapTable = [u8; 256];

/// Converts palette indices to RGBA bytes.
///
/// Holds the palette, an optional remap table and the alpha written for
/// opaque pixels so the same conversion can be applied to many frames.
#[derive(Debug, Clone, Copy)]
pub struct RgbaConverter<'a> {
	palette: &'a Palette,
	remap: Option<&'a RemapTable>,
	alpha: u8,
}

impl<'a> RgbaConverter<'a> {
	/// Creates a converter writing fully opaque pixels.
	pub fn new(palette: &'a Palette) -> Self {
		Self {
			palette,
			remap: None,
			alpha: 255,
		}
	}

	/// Remaps every non-transparent index through `table` first.
	pub fn with_remap(mut self, table: Option<&'a RemapTable>) -> Self {
		self.remap = table;
		self
	}

	/// Alpha written for every non-transparent pixel.
	pub fn with_alpha(mut self, alpha: u8) -> Self {
		self.alpha = alpha;
		self
	}

	/// Appends `indices.len() * 4` bytes to `out`.
	pub fn convert_into(&self, indices: &[u8], out: &mut Vec<u8>) {
		out.reserve(indices.len() * 4);
		for &index in indices {
			if index == constants::TRANSPARENT_INDEX {
				out.extend_from_slice(&[0, 0, 0, 0]);
				continue;
			}
			let index = match self.remap {
				Some(table) => table[index as usize],
				None => index,
			};
			let color = self.palette.get(index);
			out.extend_from_slice(&[color.r, color.g, color.b, self.alpha]);
		}
	}

	/// Returns a freshly allocated RGBA buffer.
	pub fn convert(&self, indices: &[u8]) -> Vec<u8> {
		let mut out = Vec::with_capacity(indices.len() * 4);
		self.convert_into(indices, &mut out);
		out
	}
}

/// Converts palette indices to RGBA; index 0 becomes `(0, 0, 0, 0)`.
pub fn index_to_rgba(indices: &[u8], palette: &Palette) -> Vec<u8> {
	RgbaConverter::new(palette).convert(indices)
}

/// Like [`index_to_rgba`], remapping non-zero indices through `transform` first.
pub fn index_to_rgba_transformed(
	indices: &[u8],
	palette: &Palette,
	transform: Option<&RemapTable>,
) -> Vec<u8> {
	RgbaConverter::new(palette).with_remap(transform).convert(indices)
}
