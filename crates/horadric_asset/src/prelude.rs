//! Prelude module for `horadric_asset`.
//!
//! ```
//! use horadric_asset::prelude::*;
//!
//! let config = Configuration::default();
//! assert_eq!(config.language, "ENG");
//! let zombie = Composite::new(ObjectType::Monster, "zm", "/data/global/palette/act1/pal.dat");
//! assert_eq!(zombie.frame_count(), 0);
//! ```

#[doc(inline)]
pub use crate::{
	Animation,
	AssetError,
	AssetManager,
	Canvas,
	Composite,
	CompositeMode,
	CompositionError,
	Configuration,
	DrawParams,
	Equipment,
	Font,
	ObjectType,
	PlayMode,
	RecordingSurface,
	RenderError,
	RgbaFrame,
	Shading,
	SourceFormat,
	Surface,
};

// Format types and the pixel conversion the asset layer builds on
#[doc(inline)]
pub use horadric_types::prelude::*;

#[doc(inline)]
pub use horadric_vfs::{Archive, ArchiveManager, DirectoryArchive, FileManager, MemoryArchive, VfsError};
