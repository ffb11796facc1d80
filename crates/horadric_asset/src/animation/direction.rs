//! Frame storage shared by every clone of an animation.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use horadric_types::file::{
	DccRawDirection, DecodedFrame, DrawEffect, FileType, FormatError, Palette, RemapTable, RgbaConverter,
};

use crate::error::AssetError;
use crate::surface::RgbaFrame;

/// Container format an animation was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
	/// Every direction decoded at load time
	Dc6,
	/// Directions decoded on first use
	Dcc,
}

/// Palette, optional remap table and effect used to turn palette indices
/// into RGBA.
#[derive(Debug, Clone)]
pub struct Shading {
	palette: Arc<Palette>,
	remap: Option<RemapTable>,
	effect: DrawEffect,
}

impl Shading {
	/// Opaque shading through `palette`.
	pub fn new(palette: Arc<Palette>) -> Self {
		Self {
			palette,
			remap: None,
			effect: DrawEffect::None,
		}
	}

	/// Remaps indices through `table` before the palette lookup.
	pub fn with_remap(mut self, table: RemapTable) -> Self {
		self.remap = Some(table);
		self
	}

	/// Bakes the effect's alpha into every opaque pixel.
	pub fn with_effect(mut self, effect: DrawEffect) -> Self {
		self.effect = effect;
		self
	}

	/// Palette in use.
	pub fn palette(&self) -> &Arc<Palette> {
		&self.palette
	}

	/// Effect whose alpha is baked into the frames.
	pub fn effect(&self) -> DrawEffect {
		self.effect
	}

	pub(crate) fn convert(&self, frames: &[DecodedFrame]) -> DecodedDirection {
		let converter =
			RgbaConverter::new(&self.palette).with_remap(self.remap.as_ref()).with_alpha(self.effect.alpha());
		DecodedDirection::new(frames.iter().map(|frame| RgbaFrame::from_indexed(frame, &converter)).collect())
	}
}

/// Frames of one direction, converted to RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDirection {
	frames: Vec<RgbaFrame>,
	bounds: (u32, u32),
}

impl DecodedDirection {
	/// Wraps converted frames.
	pub fn new(frames: Vec<RgbaFrame>) -> Self {
		let bounds = frames
			.iter()
			.fold((0, 0), |(width, height), frame| (width.max(frame.width), height.max(frame.height)));
		Self {
			frames,
			bounds,
		}
	}

	/// All frames.
	pub fn frames(&self) -> &[RgbaFrame] {
		&self.frames
	}

	/// One frame.
	pub fn frame(&self, index: usize) -> Option<&RgbaFrame> {
		self.frames.get(index)
	}

	/// Number of frames.
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Whether the direction has no frames.
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Largest frame width and height.
	pub fn bounds(&self) -> (u32, u32) {
		self.bounds
	}
}

/// A direction in one of its two states.
#[derive(Debug, Clone)]
pub enum Direction {
	/// Compressed bytes, not yet decoded
	Undecoded(DccRawDirection),
	/// Decoded and converted frames
	Decoded(Arc<DecodedDirection>),
}

impl Direction {
	/// Whether the direction has been decoded.
	pub fn is_decoded(&self) -> bool {
		matches!(self, Direction::Decoded(_))
	}
}

enum Source {
	Dc6(Vec<Arc<DecodedDirection>>),
	Dcc {
		directions: Mutex<Vec<Direction>>,
		shading: Shading,
	},
}

/// Decoded and pending directions of one sprite.
pub(crate) struct Sprite {
	source: Source,
	frames_per_direction: usize,
}

impl Sprite {
	pub(crate) fn eager(directions: Vec<DecodedDirection>, frames_per_direction: usize) -> Self {
		Self {
			source: Source::Dc6(directions.into_iter().map(Arc::new).collect()),
			frames_per_direction,
		}
	}

	pub(crate) fn lazy(directions: Vec<DccRawDirection>, frames_per_direction: usize, shading: Shading) -> Self {
		Self {
			source: Source::Dcc {
				directions: Mutex::new(directions.into_iter().map(Direction::Undecoded).collect()),
				shading,
			},
			frames_per_direction,
		}
	}

	pub(crate) fn format(&self) -> SourceFormat {
		match self.source {
			Source::Dc6(_) => SourceFormat::Dc6,
			Source::Dcc {
				..
			} => SourceFormat::Dcc,
		}
	}

	pub(crate) fn frames_per_direction(&self) -> usize {
		self.frames_per_direction
	}

	pub(crate) fn direction_count(&self) -> usize {
		match &self.source {
			Source::Dc6(directions) => directions.len(),
			Source::Dcc {
				directions,
				..
			} => directions.lock().unwrap_or_else(PoisonError::into_inner).len(),
		}
	}

	pub(crate) fn decoded_count(&self) -> usize {
		match &self.source {
			Source::Dc6(directions) => directions.len(),
			Source::Dcc {
				directions,
				..
			} => directions.lock().unwrap_or_else(PoisonError::into_inner).iter().filter(|d| d.is_decoded()).count(),
		}
	}

	/// Frames of `index`, decoding the direction on first use.
	pub(crate) fn direction(&self, index: usize) -> Result<Arc<DecodedDirection>, AssetError> {
		match &self.source {
			Source::Dc6(directions) => directions.get(index).cloned().ok_or_else(|| {
				FormatError::InvalidDirection {
					file_type: FileType::Dc6,
					direction: index,
					count: directions.len(),
				}
				.into()
			}),
			Source::Dcc {
				directions,
				shading,
			} => {
				let mut directions = directions.lock().unwrap_or_else(PoisonError::into_inner);
				let count = directions.len();
				let Some(slot) = directions.get_mut(index) else {
					return Err(FormatError::InvalidDirection {
						file_type: FileType::Dcc,
						direction: index,
						count,
					}
					.into());
				};
				match &*slot {
					Direction::Decoded(decoded) => Ok(Arc::clone(decoded)),
					Direction::Undecoded(raw) => {
						let frames = raw.decode()?;
						let decoded = Arc::new(shading.convert(&frames));
						log::debug!("decoded DCC direction {index} ({} frames)", decoded.len());
						*slot = Direction::Decoded(Arc::clone(&decoded));
						Ok(decoded)
					}
				}
			}
		}
	}
}

impl fmt::Debug for Sprite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Sprite")
			.field("format", &self.format())
			.field("directions", &self.direction_count())
			.field("decoded", &self.decoded_count())
			.field("frames_per_direction", &self.frames_per_direction)
			.finish()
	}
}
