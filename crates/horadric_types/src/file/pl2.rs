//! `.pl2` palette transform support.
//!
//! A PL2 file pairs a base palette with a long run of 256-byte index
//! remap tables used for lighting, blending and tinting. Every table
//! maps a palette index to another index of the same base palette.
//!
//! # File Layout
//!
//! ```text
//! +------------------------------+  offset 0
//! | base palette  256 x RGBA     |  1024 bytes
//! +------------------------------+
//! | light levels        32 x 256 |
//! | inverse colors      16 x 256 |
//! | selected unit        1 x 256 |
//! | alpha blend    3 x 256 x 256 |
//! | additive blend     256 x 256 |
//! | multiplicative     256 x 256 |
//! | hue variations     111 x 256 |
//! | red / green / blue  3 x 256  |
//! | unknown             14 x 256 |
//! | max component      256 x 256 |
//! | darkened shift       1 x 256 |
//! +------------------------------+
//! | text colors     13 x RGB     |  39 bytes
//! | text shifts     13 x 256     |
//! +------------------------------+  443175 bytes total
//! ```

use std::fmt;

use crate::file::palette::{Color, Palette, RemapTable};
use crate::file::stream::StreamReader;
use crate::file::{FileType, FormatError};

/// PL2 file constants.
pub mod constants {
	/// Bytes in one remap table
	pub const TABLE_SIZE: usize = 256;

	/// Size of the RGBA base palette
	pub const BASE_PALETTE_SIZE: usize = 256 * 4;

	/// Number of text colors
	pub const TEXT_COLOR_COUNT: usize = 13;

	/// Total size of a PL2 file
	pub const FILE_SIZE: usize = 443_175;
}

/// Families of remap tables stored in a PL2 file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
	/// Light level ramp, 0 = brightest
	LightLevel,
	/// Inverted colors
	InverseColor,
	/// Highlight for the hovered unit
	SelectedUnit,
	/// 25/50/75 percent alpha blends, `variation = level * 256 + background`
	AlphaBlend,
	/// Additive blend against a background index
	Additive,
	/// Multiplicative blend against a background index
	Multiplicative,
	/// Hue variations used by item and monster color shifts
	Hue,
	/// Red tone
	RedTone,
	/// Green tone
	GreenTone,
	/// Blue tone
	BlueTone,
	/// Unidentified tables
	Unknown,
	/// Max-component blend against a background index
	MaxComponent,
	/// Darkened shift
	Darkened,
	/// Font color shifts, one per text color
	TextColorShift,
}

impl TransformKind {
	/// Byte-level tables in file order, ending before the text colors.
	const LEADING: [TransformKind; 13] = [
		TransformKind::LightLevel,
		TransformKind::InverseColor,
		TransformKind::SelectedUnit,
		TransformKind::AlphaBlend,
		TransformKind::Additive,
		TransformKind::Multiplicative,
		TransformKind::Hue,
		TransformKind::RedTone,
		TransformKind::GreenTone,
		TransformKind::BlueTone,
		TransformKind::Unknown,
		TransformKind::MaxComponent,
		TransformKind::Darkened,
	];

	/// Number of tables of this kind.
	pub const fn count(self) -> usize {
		match self {
			TransformKind::LightLevel => 32,
			TransformKind::InverseColor => 16,
			TransformKind::SelectedUnit
			| TransformKind::RedTone
			| TransformKind::GreenTone
			| TransformKind::BlueTone
			| TransformKind::Darkened => 1,
			TransformKind::AlphaBlend => 3 * 256,
			TransformKind::Additive | TransformKind::Multiplicative | TransformKind::MaxComponent => {
				256
			}
			TransformKind::Hue => 111,
			TransformKind::Unknown => 14,
			TransformKind::TextColorShift => constants::TEXT_COLOR_COUNT,
		}
	}

	fn slot(self) -> usize {
		match self {
			TransformKind::TextColorShift => TransformKind::LEADING.len(),
			other => TransformKind::LEADING.iter().position(|kind| *kind == other).unwrap_or(0),
		}
	}
}

/// A parsed PL2 palette transform.
#[derive(Clone, PartialEq, Eq)]
pub struct File {
	base_palette: Palette,
	tables: Vec<RemapTable>,
	/// First table index of each kind, indexed by [`TransformKind::slot`]
	starts: [usize; 14],
	text_colors: [Color; constants::TEXT_COLOR_COUNT],
}

impl File {
	/// Parses a PL2 file.
	///
	/// # Errors
	///
	/// Returns [`FormatError::UnexpectedEof`] if `data` is shorter than a
	/// complete PL2 file.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		if data.len() < constants::FILE_SIZE {
			return Err(FormatError::unexpected_eof(FileType::Pl2, constants::FILE_SIZE, data.len()));
		}
		let mut reader = StreamReader::new(data, FileType::Pl2);

		let mut colors = [Color::transparent(); 256];
		for color in &mut colors {
			let [r, g, b, _] = reader.read_array::<4>()?;
			*color = Color::rgb(r, g, b);
		}

		let total: usize = TransformKind::LEADING.iter().map(|kind| kind.count()).sum::<usize>()
			+ TransformKind::TextColorShift.count();
		let mut tables = Vec::with_capacity(total);
		let mut starts = [0usize; 14];

		for (slot, kind) in TransformKind::LEADING.iter().enumerate() {
			starts[slot] = tables.len();
			for _ in 0..kind.count() {
				tables.push(reader.read_array::<{ constants::TABLE_SIZE }>()?);
			}
		}

		let mut text_colors = [Color::transparent(); constants::TEXT_COLOR_COUNT];
		for color in &mut text_colors {
			let [r, g, b] = reader.read_array::<3>()?;
			*color = Color::rgb(r, g, b);
		}

		starts[TransformKind::TextColorShift.slot()] = tables.len();
		for _ in 0..TransformKind::TextColorShift.count() {
			tables.push(reader.read_array::<{ constants::TABLE_SIZE }>()?);
		}

		Ok(Self {
			base_palette: Palette::from_colors(colors),
			tables,
			starts,
			text_colors,
		})
	}

	/// Creates a transform where every table is the identity mapping.
	pub fn identity(base_palette: Palette) -> Self {
		let mut identity = [0u8; constants::TABLE_SIZE];
		for (i, entry) in identity.iter_mut().enumerate() {
			*entry = i as u8;
		}

		let mut tables = Vec::new();
		let mut starts = [0usize; 14];
		for (slot, kind) in TransformKind::LEADING.iter().enumerate() {
			starts[slot] = tables.len();
			tables.extend(std::iter::repeat_n(identity, kind.count()));
		}
		starts[TransformKind::TextColorShift.slot()] = tables.len();
		tables.extend(std::iter::repeat_n(identity, TransformKind::TextColorShift.count()));

		Self {
			base_palette,
			tables,
			starts,
			text_colors: [Color::WHITE; constants::TEXT_COLOR_COUNT],
		}
	}

	/// Serializes the transform back to the PL2 layout.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(constants::FILE_SIZE);
		for color in self.base_palette.colors() {
			data.extend_from_slice(&[color.r, color.g, color.b, 0]);
		}
		let text_shift_start = self.starts[TransformKind::TextColorShift.slot()];
		for table in &self.tables[..text_shift_start] {
			data.extend_from_slice(table);
		}
		for color in &self.text_colors {
			data.extend_from_slice(&[color.r, color.g, color.b]);
		}
		for table in &self.tables[text_shift_start..] {
			data.extend_from_slice(table);
		}
		data
	}

	/// Base palette stored in the file.
	pub fn base_palette(&self) -> &Palette {
		&self.base_palette
	}

	/// Returns table `variation` of `kind`.
	pub fn table(&self, kind: TransformKind, variation: usize) -> Option<&RemapTable> {
		if variation >= kind.count() {
			return None;
		}
		self.tables.get(self.starts[kind.slot()] + variation)
	}

	/// Returns a mutable table, for building transforms in tooling.
	pub fn table_mut(&mut self, kind: TransformKind, variation: usize) -> Option<&mut RemapTable> {
		if variation >= kind.count() {
			return None;
		}
		let index = self.starts[kind.slot()] + variation;
		self.tables.get_mut(index)
	}

	/// Remaps a single index, or returns it unchanged if the table does not exist.
	pub fn remap(&self, kind: TransformKind, variation: usize, index: u8) -> u8 {
		self.table(kind, variation).map_or(index, |table| table[index as usize])
	}

	/// Color used for text color `index`.
	pub fn text_color(&self, index: usize) -> Option<Color> {
		self.text_colors.get(index).copied()
	}
}

impl fmt::Debug for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pl2File").field("tables", &self.tables.len()).finish()
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PL2: {} remap tables, {} text colors", self.tables.len(), self.text_colors.len())
	}
}
