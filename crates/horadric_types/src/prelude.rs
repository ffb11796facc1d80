//! Prelude module for `horadric_types`.
//!
//! ```no_run
//! use horadric_types::prelude::*;
//!
//! let mut cache: Cache<Palette> = Cache::new(64);
//! cache.insert("/data/global/palette/act1/pal.dat", Palette::grayscale(), 1).unwrap();
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	AnimDataFile,
	AnimDataRecord,
	// COF types
	CofFile,
	CofLayer,
	Color,
	CompositeType,
	// Directions
	DIRECTION_COUNT,
	// Sprite types
	Dc6File,
	DccFile,
	DccRawDirection,
	DecodedFrame,
	DrawEffect,
	FileType,
	FontGlyph,
	FontTable,
	FormatError,
	// Palette types
	Palette,
	Pl2File,
	RemapTable,
	RgbaConverter,
	TransformKind,
	dir64_to_cof,
	dir64_to_dcc,
	index_to_rgba,
	index_to_rgba_transformed,
};

// Cache types
#[doc(inline)]
pub use crate::cache::{Cache, CacheError, CacheStats, CacheSummary};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
