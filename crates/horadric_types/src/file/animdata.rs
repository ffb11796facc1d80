//! `AnimData.d2` animation registry.
//!
//! The registry stores the frame count and playback speed of every
//! composite animation, keyed by the COF name (`token + mode + weapon`).
//! Records are grouped in 256 hash blocks, each a `u32` count followed by
//! fixed 160-byte records.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::file::stream::StreamReader;
use crate::file::{FileType, FormatError};

/// AnimData constants.
pub mod constants {
	/// Number of hash blocks
	pub const BLOCK_COUNT: usize = 256;

	/// Size of a record
	pub const RECORD_SIZE: usize = 160;

	/// Bytes of the COF name field
	pub const NAME_SIZE: usize = 8;

	/// Number of frame event bytes
	pub const EVENT_COUNT: usize = 144;

	/// Engine ticks per second
	pub const TICKS_PER_SECOND: f64 = 25.0;

	/// Speed value meaning one frame per tick
	pub const SPEED_BASE: f64 = 256.0;
}

/// One animation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
	/// COF name, lower-case
	pub name: String,
	/// Frames per direction
	pub frames_per_direction: u32,
	/// Speed in 1/256 frames per tick
	pub speed: u32,
	/// Event byte per frame
	pub events: [u8; constants::EVENT_COUNT],
}

impl Record {
	/// Creates a record without frame events.
	pub fn new(name: &str, frames_per_direction: u32, speed: u32) -> Self {
		Self {
			name: name.to_ascii_lowercase(),
			frames_per_direction,
			speed,
			events: [0; constants::EVENT_COUNT],
		}
	}

	/// Frames per second.
	pub fn fps(&self) -> f64 {
		constants::TICKS_PER_SECOND * f64::from(self.speed) / constants::SPEED_BASE
	}

	/// Seconds each frame is shown; zero for a stopped animation.
	pub fn frame_duration(&self) -> f64 {
		let fps = self.fps();
		if fps > 0.0 { 1.0 / fps } else { 0.0 }
	}
}

/// Hash block a name is stored in.
pub fn block_hash(name: &str) -> usize {
	name.bytes().fold(0usize, |hash, byte| hash + byte.to_ascii_uppercase() as usize)
		% constants::BLOCK_COUNT
}

/// A parsed animation registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
	records: HashMap<String, Vec<Record>>,
}

impl File {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens and parses a registry from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses a registry.
	///
	/// # Errors
	///
	/// Returns [`FormatError::UnexpectedEof`] if a block is truncated.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		let mut reader = StreamReader::new(data, FileType::AnimData);
		let mut file = Self::new();

		for _ in 0..constants::BLOCK_COUNT {
			let count = reader.read_u32()? as usize;
			if count * constants::RECORD_SIZE > reader.remaining() {
				return Err(FormatError::unexpected_eof(
					FileType::AnimData,
					count * constants::RECORD_SIZE,
					reader.remaining(),
				));
			}
			for _ in 0..count {
				let raw_name = reader.read_array::<{ constants::NAME_SIZE }>()?;
				let end = raw_name.iter().position(|&b| b == 0).unwrap_or(constants::NAME_SIZE);
				let name = String::from_utf8_lossy(&raw_name[..end]).to_ascii_lowercase();
				let frames_per_direction = reader.read_u32()?;
				let speed = reader.read_u32()?;
				let events = reader.read_array::<{ constants::EVENT_COUNT }>()?;
				file.insert(Record {
					name,
					frames_per_direction,
					speed,
					events,
				});
			}
		}

		log::debug!("Loaded {} animation data entries", file.records.len());
		Ok(file)
	}

	/// Adds a record; later records with the same name are kept behind earlier ones.
	pub fn insert(&mut self, record: Record) {
		self.records.entry(record.name.clone()).or_default().push(record);
	}

	/// First record for `name`, case-insensitive.
	pub fn record(&self, name: &str) -> Option<&Record> {
		self.records(name).first()
	}

	/// Every record for `name`, case-insensitive.
	pub fn records(&self, name: &str) -> &[Record] {
		self.records.get(&name.to_ascii_lowercase()).map_or(&[], Vec::as_slice)
	}

	/// Number of distinct names.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Whether the registry is empty.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Encodes the registry, placing each record in its hash block.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut blocks: Vec<Vec<&Record>> = vec![Vec::new(); constants::BLOCK_COUNT];
		let mut names: Vec<&String> = self.records.keys().collect();
		names.sort();
		for name in names {
			for record in &self.records[name] {
				blocks[block_hash(&record.name)].push(record);
			}
		}

		let mut out = Vec::new();
		for block in blocks {
			out.extend_from_slice(&(block.len() as u32).to_le_bytes());
			for record in block {
				let mut name = [0u8; constants::NAME_SIZE];
				for (slot, byte) in name.iter_mut().zip(record.name.to_ascii_uppercase().bytes()) {
					*slot = byte;
				}
				out.extend_from_slice(&name);
				out.extend_from_slice(&record.frames_per_direction.to_le_bytes());
				out.extend_from_slice(&record.speed.to_le_bytes());
				out.extend_from_slice(&record.events);
			}
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
		write!(f, "AnimData: {} entries", self.records.len())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_encoded_registry() {
		let mut registry = File::new();
		registry.insert(Record::new("PAA1HTH", 16, 256));
		let mut second = Record::new("paa1hth", 8, 128);
		second.events[3] = 1;
		registry.insert(second);
		registry.insert(Record::new("ZMNUHTH", 12, 128));

		let data = registry.to_bytes();
		let parsed = File::from_bytes(&data).unwrap();
		assert_eq!(parsed.len(), 2);

		let record = parsed.record("PaA1hTh").unwrap();
		assert_eq!(record.frames_per_direction, 16);
		assert_eq!(parsed.records("paa1hth").len(), 2);
		assert_eq!(parsed.records("paa1hth")[1].events[3], 1);
		assert!(parsed.record("missing").is_none());
	}

	#[test]
	fn test_fps() {
		let record = Record::new("x", 10, 256);
		assert_eq!(record.fps(), 25.0);
		assert!((record.frame_duration() - 0.04).abs() < 1e-9);
		assert_eq!(Record::new("x", 1, 0).frame_duration(), 0.0);
	}

	#[test]
	fn test_truncated_block() {
		let mut data = File::new().to_bytes();
		data[0] = 3;
		let err = File::from_bytes(&data).unwrap_err();
		assert!(matches!(err, FormatError::UnexpectedEof { .. }));
	}

	#[test]
	fn test_empty_registry_layout() {
		let data = File::new().to_bytes();
		assert_eq!(data.len(), constants::BLOCK_COUNT * 4);
		assert!(File::from_bytes(&data).unwrap().is_empty());
	}
}
