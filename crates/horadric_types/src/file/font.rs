//! Font glyph tables (`.tbl`).
//!
//! A font is a DC6 sheet holding one frame per glyph plus a table mapping
//! character codes to frames and advance sizes.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::file::stream::StreamReader;
use crate::file::{FileType, FormatError};

/// Font table constants.
pub mod constants {
	/// Magic at the start of every table
	pub const SIGNATURE: &[u8; 5] = b"Woo!\x01";

	/// Unknown header bytes after the signature
	pub const HEADER_UNKNOWN_SIZE: usize = 7;

	/// Size of a glyph record
	pub const GLYPH_SIZE: usize = 14;
}

/// Metrics of one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
	/// Frame of the glyph in the sheet
	pub frame_index: u16,
	/// Advance width
	pub width: u8,
	/// Line height
	pub height: u8,
}

/// A parsed font table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
	header: [u8; constants::HEADER_UNKNOWN_SIZE],
	glyphs: HashMap<char, Glyph>,
}

impl File {
	/// Opens and parses a font table from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses a font table.
	///
	/// Trailing bytes shorter than a glyph record are ignored.
	///
	/// # Errors
	///
	/// - [`FormatError::InvalidSignature`] if the table does not start with `Woo!\x01`
	/// - [`FormatError::UnexpectedEof`] if the header is truncated
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		let mut reader = StreamReader::new(data, FileType::FontTable);
		let signature = reader.read_array::<5>()?;
		if &signature != constants::SIGNATURE {
			return Err(FormatError::invalid_signature(FileType::FontTable, &signature));
		}
		let header = reader.read_array::<{ constants::HEADER_UNKNOWN_SIZE }>()?;

		let mut glyphs = HashMap::new();
		while reader.remaining() >= constants::GLYPH_SIZE {
			let code = reader.read_u16()?;
			reader.skip(1)?;
			let width = reader.read_u8()?;
			let height = reader.read_u8()?;
			reader.skip(3)?;
			let frame_index = reader.read_u16()?;
			reader.skip(4)?;

			if let Some(character) = char::from_u32(u32::from(code)) {
				glyphs.insert(
					character,
					Glyph {
						frame_index,
						width,
						height,
					},
				);
			}
		}

		Ok(Self {
			header,
			glyphs,
		})
	}

	/// Glyph for a character.
	pub fn glyph(&self, character: char) -> Option<&Glyph> {
		self.glyphs.get(&character)
	}

	/// Number of glyphs.
	pub fn len(&self) -> usize {
		self.glyphs.len()
	}

	/// Whether the table has no glyphs.
	pub fn is_empty(&self) -> bool {
		self.glyphs.is_empty()
	}

	/// Adds or replaces a glyph.
	pub fn insert(&mut self, character: char, glyph: Glyph) {
		self.glyphs.insert(character, glyph);
	}

	/// Size of `text` in pixels using the table's glyph heights.
	///
	/// Lines are split on `\n`; characters without a glyph take no space.
	pub fn text_size(&self, text: &str) -> (u32, u32) {
		self.text_size_with(text, |glyph| u32::from(glyph.height))
	}

	/// Size of `text` in pixels with a custom line height per glyph.
	pub fn text_size_with(&self, text: &str, height: impl Fn(&Glyph) -> u32) -> (u32, u32) {
		let mut width = 0u32;
		let mut total_height = 0u32;
		for line in text.split('\n') {
			let mut line_width = 0u32;
			let mut line_height = 0u32;
			for glyph in line.chars().filter_map(|c| self.glyph(c)) {
				line_width += u32::from(glyph.width);
				line_height = line_height.max(height(glyph));
			}
			width = width.max(line_width);
			total_height += line_height;
		}
		(width, total_height)
	}

	/// Encodes the table with glyphs sorted by character.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut characters: Vec<&char> = self.glyphs.keys().collect();
		characters.sort();

		let mut out = Vec::with_capacity(12 + characters.len() * constants::GLYPH_SIZE);
		out.extend_from_slice(constants::SIGNATURE);
		out.extend_from_slice(&self.header);
		for character in characters {
			let glyph = &self.glyphs[character];
			out.extend_from_slice(&(*character as u32 as u16).to_le_bytes());
			out.push(0);
			out.push(glyph.width);
			out.push(glyph.height);
			out.extend_from_slice(&[1, 0, 0]);
			out.extend_from_slice(&glyph.frame_index.to_le_bytes());
			out.extend_from_slice(&[0; 4]);
		}
		out
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
		write!(f, "Font table: {} glyphs", self.glyphs.len())
	}
}
