//! Error types for asset loading, composition and rendering.

use horadric_types::cache::CacheError;
use horadric_types::file::FormatError;
use horadric_vfs::VfsError;
use thiserror::Error;

/// Errors raised while assembling a composite entity.
#[derive(Debug, Error)]
pub enum CompositionError {
	/// No COF exists for the requested mode and weapon class
	#[error("composite not found: {path}")]
	MissingCof {
		/// COF path that was looked up
		path: String,
	},

	/// The animation registry has no record for the requested combination
	#[error("no animation data for {key}")]
	MissingAnimationData {
		/// Lower-cased `token + mode + weapon class` key
		key: String,
	},

	/// Facing outside `0..64`
	#[error("invalid direction index {direction}")]
	InvalidDirection {
		/// Requested facing
		direction: usize,
	},
}

/// Errors reported by a [`Surface`](crate::surface::Surface).
#[derive(Debug, Error)]
pub enum RenderError {
	/// Pixel buffer does not match the frame size
	#[error("frame {width}x{height} carries {len} bytes of pixels")]
	InvalidFrame {
		/// Frame width
		width: u32,
		/// Frame height
		height: u32,
		/// Length of the RGBA buffer
		len: usize,
	},

	/// Failure inside the host renderer
	#[error("render backend error: {reason}")]
	Backend {
		/// Backend description of the failure
		reason: String,
	},
}

/// Errors returned by the asset layer.
#[derive(Debug, Error)]
pub enum AssetError {
	/// Malformed asset data
	#[error(transparent)]
	Format(#[from] FormatError),

	/// Missing file or unreadable archive
	#[error(transparent)]
	Io(#[from] VfsError),

	/// Cache rejected an entry
	#[error(transparent)]
	Cache(#[from] CacheError),

	/// Composite could not be assembled
	#[error(transparent)]
	Composition(#[from] CompositionError),

	/// Surface failed to draw
	#[error(transparent)]
	Render(#[from] RenderError),

	/// Frame index past the end of the direction
	#[error("frame {frame} out of range (direction has {count} frames)")]
	FrameOutOfRange {
		/// Requested frame
		frame: usize,
		/// Frames in the direction
		count: usize,
	},

	/// Sub-loop range empty or past the end of the direction
	#[error("invalid sub-loop {start}..{end} (direction has {count} frames)")]
	InvalidSubLoop {
		/// First frame of the loop
		start: usize,
		/// One past the last frame of the loop
		end: usize,
		/// Frames in the direction
		count: usize,
	},

	/// Sprite path is neither a DC6 nor a DCC file
	#[error("unknown sprite format: {path}")]
	UnknownFormat {
		/// Path that was requested
		path: String,
	},

	/// Configuration could not be loaded
	#[error(transparent)]
	Config(#[from] config::ConfigError),
}

impl AssetError {
	/// Whether the error means the requested file does not exist.
	pub fn is_not_found(&self) -> bool {
		matches!(self, AssetError::Io(err) if err.is_not_found())
	}
}
