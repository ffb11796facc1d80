//! `.cof` file format support.
//!
//! A COF describes how a composite entity is assembled for one animation
//! mode and weapon class: which body-part layers exist, how each one is
//! blended, and in which order the layers are drawn for every frame of
//! every direction.
//!
//! # File Structure
//!
//! | Offset | Size                      | Field                      |
//! |--------|---------------------------|----------------------------|
//! | 0x00   | 1                         | number of layers           |
//! | 0x01   | 1                         | frames per direction       |
//! | 0x02   | 1                         | number of directions       |
//! | 0x03   | 25                        | unknown                    |
//! | 0x1C   | 9 * layers                | layer records              |
//! | ...    | frames                    | frame events               |
//! | ...    | directions*frames*layers  | draw priority              |

use std::fmt;
use std::path::Path;

use crate::file::stream::StreamReader;
use crate::file::{FileType, FormatError};

/// COF file constants.
pub mod constants {
	/// Size of the fixed header
	pub const HEADER_SIZE: usize = 28;

	/// Unknown bytes after the counts
	pub const HEADER_UNKNOWN_SIZE: usize = 25;

	/// Size of a layer record
	pub const LAYER_SIZE: usize = 9;

	/// Length of the weapon class field
	pub const WEAPON_CLASS_SIZE: usize = 4;

	/// Number of composite layer slots
	pub const MAX_LAYER_TYPES: usize = 16;
}

/// Body-part slot of a composite layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CompositeType {
	/// Head
	Head = 0,
	/// Torso
	Torso = 1,
	/// Legs
	Legs = 2,
	/// Right arm
	RightArm = 3,
	/// Left arm
	LeftArm = 4,
	/// Right hand
	RightHand = 5,
	/// Left hand
	LeftHand = 6,
	/// Shield
	Shield = 7,
	/// Special slot 1
	Special1 = 8,
	/// Special slot 2
	Special2 = 9,
	/// Special slot 3
	Special3 = 10,
	/// Special slot 4
	Special4 = 11,
	/// Special slot 5
	Special5 = 12,
	/// Special slot 6
	Special6 = 13,
	/// Special slot 7
	Special7 = 14,
	/// Special slot 8
	Special8 = 15,
}

impl CompositeType {
	/// Every slot in index order.
	pub const ALL: [CompositeType; constants::MAX_LAYER_TYPES] = [
		CompositeType::Head,
		CompositeType::Torso,
		CompositeType::Legs,
		CompositeType::RightArm,
		CompositeType::LeftArm,
		CompositeType::RightHand,
		CompositeType::LeftHand,
		CompositeType::Shield,
		CompositeType::Special1,
		CompositeType::Special2,
		CompositeType::Special3,
		CompositeType::Special4,
		CompositeType::Special5,
		CompositeType::Special6,
		CompositeType::Special7,
		CompositeType::Special8,
	];

	/// Converts a raw slot number.
	pub fn from_u8(value: u8) -> Option<Self> {
		Self::ALL.get(value as usize).copied()
	}

	/// Slot index, usable as an array index.
	pub fn index(self) -> usize {
		self as usize
	}

	/// Two-letter code used in sprite paths.
	pub fn code(self) -> &'static str {
		match self {
			CompositeType::Head => "hd",
			CompositeType::Torso => "tr",
			CompositeType::Legs => "lg",
			CompositeType::RightArm => "ra",
			CompositeType::LeftArm => "la",
			CompositeType::RightHand => "rh",
			CompositeType::LeftHand => "lh",
			CompositeType::Shield => "sh",
			CompositeType::Special1 => "s1",
			CompositeType::Special2 => "s2",
			CompositeType::Special3 => "s3",
			CompositeType::Special4 => "s4",
			CompositeType::Special5 => "s5",
			CompositeType::Special6 => "s6",
			CompositeType::Special7 => "s7",
			CompositeType::Special8 => "s8",
		}
	}

	/// Parses a two-letter code, case-insensitively.
	pub fn from_code(code: &str) -> Option<Self> {
		Self::ALL.iter().copied().find(|t| t.code().eq_ignore_ascii_case(code))
	}
}

impl fmt::Display for CompositeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

/// Blend applied to a transparent layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawEffect {
	/// 75% transparent
	Transparency75,
	/// 50% transparent
	Transparency50,
	/// 25% transparent
	Transparency25,
	/// Screen blend
	Screen,
	/// Luminance blend
	Luminance,
	/// Bright alpha blend
	BrightAlpha,
	/// Additive blend
	Modulate,
	/// Opaque
	#[default]
	None,
}

impl DrawEffect {
	/// Converts a raw effect byte; unknown values are opaque.
	pub fn from_u8(value: u8) -> Self {
		match value {
			0 => DrawEffect::Transparency75,
			1 => DrawEffect::Transparency50,
			2 => DrawEffect::Transparency25,
			3 => DrawEffect::Screen,
			4 => DrawEffect::Luminance,
			5 => DrawEffect::BrightAlpha,
			6 => DrawEffect::Modulate,
			_ => DrawEffect::None,
		}
	}

	/// Raw effect byte.
	pub fn to_u8(self) -> u8 {
		match self {
			DrawEffect::Transparency75 => 0,
			DrawEffect::Transparency50 => 1,
			DrawEffect::Transparency25 => 2,
			DrawEffect::Screen => 3,
			DrawEffect::Luminance => 4,
			DrawEffect::BrightAlpha => 5,
			DrawEffect::Modulate => 6,
			DrawEffect::None => 7,
		}
	}

	/// Alpha applied to pixels drawn with this effect.
	///
	/// Follows the engine's table, where the percentage names the
	/// remaining opacity band rather than the transparency.
	pub fn alpha(self) -> u8 {
		match self {
			DrawEffect::Transparency25 => 64,
			DrawEffect::Transparency50 => 128,
			DrawEffect::Transparency75 => 192,
			_ => 255,
		}
	}

	/// Whether the effect draws additively.
	pub fn is_additive(self) -> bool {
		self == DrawEffect::Modulate
	}
}

/// One layer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
	/// Body-part slot
	pub kind: CompositeType,
	/// Non-zero when the layer casts a shadow
	pub shadow: u8,
	/// Layer reacts to mouse selection
	pub selectable: bool,
	/// Layer uses `draw_effect`
	pub transparent: bool,
	/// Blend for transparent layers
	pub draw_effect: DrawEffect,
	/// Weapon class override, lower-case, empty when unset
	pub weapon_class: String,
}

impl Layer {
	/// Effect to draw with, or [`DrawEffect::None`] for opaque layers.
	pub fn effective_draw_effect(&self) -> DrawEffect {
		if self.transparent { self.draw_effect } else { DrawEffect::None }
	}

	/// Whether the layer casts a shadow.
	pub fn casts_shadow(&self) -> bool {
		self.shadow != 0
	}
}

/// A parsed COF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	directions: usize,
	frames_per_direction: usize,
	layers: Vec<Layer>,
	frame_events: Vec<u8>,
	priority: Vec<CompositeType>,
}

impl File {
	/// Opens and parses a COF file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses a COF byte stream.
	///
	/// # Errors
	///
	/// - [`FormatError::UnexpectedEof`] if any section is truncated
	/// - [`FormatError::CorruptHeader`] if a layer or priority entry names an
	///   unknown slot
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		let mut reader = StreamReader::new(data, FileType::Cof);
		let layer_count = reader.read_u8()? as usize;
		let frames_per_direction = reader.read_u8()? as usize;
		let directions = reader.read_u8()? as usize;
		reader.skip(constants::HEADER_UNKNOWN_SIZE)?;

		let mut layers = Vec::with_capacity(layer_count);
		for _ in 0..layer_count {
			let raw_kind = reader.read_u8()?;
			let Some(kind) = CompositeType::from_u8(raw_kind) else {
				return Err(FormatError::corrupt(FileType::Cof, format!("unknown layer type {raw_kind}")));
			};
			let shadow = reader.read_u8()?;
			let selectable = reader.read_u8()? != 0;
			let transparent = reader.read_u8()? != 0;
			let draw_effect = DrawEffect::from_u8(reader.read_u8()?);
			let raw_class = reader.read_array::<{ constants::WEAPON_CLASS_SIZE }>()?;
			let weapon_class = String::from_utf8_lossy(&raw_class)
				.trim_matches(char::from(0))
				.trim()
				.to_ascii_lowercase();

			layers.push(Layer {
				kind,
				shadow,
				selectable,
				transparent,
				draw_effect,
				weapon_class,
			});
		}

		let frame_events = reader.read_bytes(frames_per_direction)?.to_vec();

		let priority_len = directions * frames_per_direction * layer_count;
		let mut priority = Vec::with_capacity(priority_len);
		for &raw in reader.read_bytes(priority_len)? {
			let Some(kind) = CompositeType::from_u8(raw) else {
				return Err(FormatError::corrupt(FileType::Cof, format!("unknown priority entry {raw}")));
			};
			priority.push(kind);
		}

		Ok(Self {
			directions,
			frames_per_direction,
			layers,
			frame_events,
			priority,
		})
	}

	/// Number of directions.
	pub fn direction_count(&self) -> usize {
		self.directions
	}

	/// Frames per direction.
	pub fn frames_per_direction(&self) -> usize {
		self.frames_per_direction
	}

	/// Layer records in file order.
	pub fn layers(&self) -> &[Layer] {
		&self.layers
	}

	/// Layer record for a slot.
	pub fn layer(&self, kind: CompositeType) -> Option<&Layer> {
		self.layers.iter().find(|layer| layer.kind == kind)
	}

	/// Per-frame event bytes (attack, missile, sound, skill).
	pub fn frame_events(&self) -> &[u8] {
		&self.frame_events
	}

	/// Back-to-front draw order for one frame of one direction.
	///
	/// Empty when either index is out of range.
	pub fn priority(&self, direction: usize, frame: usize) -> &[CompositeType] {
		let layers = self.layers.len();
		if direction >= self.directions || frame >= self.frames_per_direction {
			return &[];
		}
		let start = (direction * self.frames_per_direction + frame) * layers;
		self.priority.get(start..start + layers).unwrap_or(&[])
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
		let codes: Vec<&str> = self.layers.iter().map(|l| l.kind.code()).collect();
		write!(
			f,
			"COF: {} directions x {} frames, layers [{}]",
			self.directions,
			self.frames_per_direction,
			codes.join(" ")
		)
	}
}

/// Builds COF byte streams.
#[derive(Debug, Clone)]
pub struct FileBuilder {
	directions: usize,
	frames_per_direction: usize,
	layers: Vec<Layer>,
	frame_events: Vec<u8>,
	priority: Option<Vec<CompositeType>>,
}

impl FileBuilder {
	/// Creates a builder with no layers.
	pub fn new(directions: u8, frames_per_direction: u8) -> Self {
		Self {
			directions: directions as usize,
			frames_per_direction: frames_per_direction as usize,
			layers: Vec::new(),
			frame_events: vec![0; frames_per_direction as usize],
			priority: None,
		}
	}

	/// Adds an opaque layer.
	pub fn layer(self, kind: CompositeType) -> Self {
		self.layer_record(Layer {
			kind,
			shadow: 0,
			selectable: true,
			transparent: false,
			draw_effect: DrawEffect::None,
			weapon_class: String::new(),
		})
	}

	/// Adds a fully specified layer.
	pub fn layer_record(mut self, layer: Layer) -> Self {
		self.layers.push(layer);
		self
	}

	/// Sets the draw order used for every frame of every direction.
	///
	/// Defaults to the layer declaration order.
	pub fn uniform_priority(mut self, order: &[CompositeType]) -> Self {
		let per_frame = self.directions * self.frames_per_direction;
		self.priority = Some(order.iter().copied().cycle().take(per_frame * order.len()).collect());
		self
	}

	/// Sets the full `direction * frame * layer` priority table.
	pub fn priority(mut self, table: Vec<CompositeType>) -> Self {
		self.priority = Some(table);
		self
	}

	/// Encodes the file.
	///
	/// # Errors
	///
	/// Returns [`FormatError::CorruptHeader`] when the priority table size
	/// disagrees with the counts or a count exceeds 255.
	pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
		if self.layers.len() > u8::MAX as usize {
			return Err(FormatError::corrupt(FileType::Cof, "more than 255 layers"));
		}
		let expected = self.directions * self.frames_per_direction * self.layers.len();
		let priority = match &self.priority {
			Some(table) => table.clone(),
			None => {
				let order: Vec<CompositeType> = self.layers.iter().map(|l| l.kind).collect();
				order.iter().copied().cycle().take(expected).collect()
			}
		};
		if priority.len() != expected {
			return Err(FormatError::corrupt(
				FileType::Cof,
				format!("priority table holds {} entries, expected {expected}", priority.len()),
			));
		}

		let mut out = Vec::with_capacity(constants::HEADER_SIZE + expected);
		out.push(self.layers.len() as u8);
		out.push(self.frames_per_direction as u8);
		out.push(self.directions as u8);
		out.extend_from_slice(&[0; constants::HEADER_UNKNOWN_SIZE]);
		for layer in &self.layers {
			out.push(layer.kind as u8);
			out.push(layer.shadow);
			out.push(u8::from(layer.selectable));
			out.push(u8::from(layer.transparent));
			out.push(layer.draw_effect.to_u8());
			let mut class = [0u8; constants::WEAPON_CLASS_SIZE];
			for (slot, byte) in class.iter_mut().zip(layer.weapon_class.bytes()) {
				*slot = byte;
			}
			out.extend_from_slice(&class);
		}
		out.extend_from_slice(&self.frame_events);
		out.extend(priority.iter().map(|&kind| kind as u8));
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_built_file() {
		let data = FileBuilder::new(8, 2)
			.layer(CompositeType::Torso)
			.layer_record(Layer {
				kind: CompositeType::RightHand,
				shadow: 1,
				selectable: false,
				transparent: true,
				draw_effect: DrawEffect::Transparency50,
				weapon_class: "1HS".to_string(),
			})
			.to_bytes()
			.unwrap();
		assert_eq!(data.len(), constants::HEADER_SIZE + 2 * constants::LAYER_SIZE + 2 + 8 * 2 * 2);

		let cof = File::from_bytes(&data).unwrap();
		assert_eq!(cof.direction_count(), 8);
		assert_eq!(cof.frames_per_direction(), 2);
		assert_eq!(cof.layers().len(), 2);

		let hand = cof.layer(CompositeType::RightHand).unwrap();
		assert!(hand.casts_shadow());
		assert_eq!(hand.weapon_class, "1hs");
		assert_eq!(hand.effective_draw_effect(), DrawEffect::Transparency50);
		assert_eq!(cof.layer(CompositeType::Torso).unwrap().effective_draw_effect(), DrawEffect::None);
		assert_eq!(cof.priority(7, 1), &[CompositeType::Torso, CompositeType::RightHand]);
	}

	#[test]
	fn test_priority_per_direction() {
		use CompositeType::*;
		let table = vec![Legs, Torso, Torso, Legs];
		let data = FileBuilder::new(2, 1).layer(Torso).layer(Legs).priority(table).to_bytes().unwrap();

		let cof = File::from_bytes(&data).unwrap();
		assert_eq!(cof.priority(0, 0), &[Legs, Torso]);
		assert_eq!(cof.priority(1, 0), &[Torso, Legs]);
		assert!(cof.priority(2, 0).is_empty());
		assert!(cof.priority(0, 1).is_empty());
	}

	#[test]
	fn test_unknown_layer_type() {
		let mut data = FileBuilder::new(1, 1).layer(CompositeType::Head).to_bytes().unwrap();
		data[constants::HEADER_SIZE] = 16;
		let err = File::from_bytes(&data).unwrap_err();
		assert!(matches!(err, FormatError::CorruptHeader { .. }));
	}

	#[test]
	fn test_truncated_priority() {
		let data = FileBuilder::new(4, 4).layer(CompositeType::Head).to_bytes().unwrap();
		let err = File::from_bytes(&data[..data.len() - 1]).unwrap_err();
		assert!(matches!(err, FormatError::UnexpectedEof { .. }));
	}

	#[test]
	fn test_draw_effect_alpha() {
		assert_eq!(DrawEffect::from_u8(2).alpha(), 64);
		assert_eq!(DrawEffect::from_u8(1).alpha(), 128);
		assert_eq!(DrawEffect::from_u8(0).alpha(), 192);
		assert_eq!(DrawEffect::None.alpha(), 255);
		assert!(DrawEffect::from_u8(6).is_additive());
		assert_eq!(DrawEffect::from_u8(200), DrawEffect::None);
	}

	#[test]
	fn test_composite_codes() {
		assert_eq!(CompositeType::from_code("RH"), Some(CompositeType::RightHand));
		assert_eq!(CompositeType::Special8.code(), "s8");
		assert_eq!(CompositeType::from_u8(16), None);
	}
}
