//! This module is separated into its own crate to enable simple dynamic linking for `horadric-rs`, and should not be used directly.

/// `use horadric_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export the member crates for convenience
pub use horadric_asset;
pub use horadric_types;
pub use horadric_vfs;

// Re-export commonly used types at crate root
pub use horadric_asset::{
	Animation, AssetError, AssetManager, Composite, Configuration, Font, ObjectType, Surface,
};
pub use horadric_types::file::{FormatError, index_to_rgba};
pub use horadric_vfs::VfsError;
