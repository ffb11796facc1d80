//! Animation, composition and asset management for `horadric-rs`.
//!
//! This crate turns decoded sprite data into something a renderer can
//! draw:
//!
//! - [`Animation`]: a DC6 or DCC sprite with its own playback cursor
//! - [`Composite`]: a layered entity animation driven by a COF file
//! - [`Font`]: a glyph table paired with a DC6 sheet
//! - [`AssetManager`]: the owner of every cache, constructed explicitly
//!
//! Drawing goes through the [`Surface`] trait, so no rendering backend is
//! assumed. [`Canvas`] is a small software implementation.
//!
//! # Examples
//!
//! ```no_run
//! use horadric_asset::prelude::*;
//!
//! # fn main() -> Result<(), AssetError> {
//! let assets = AssetManager::from_config(Configuration::load(None)?);
//! let mut zombie = assets.load_composite(ObjectType::Monster, "zm", "/data/global/palette/act1/pal.dat");
//! let body = Equipment::new().with(CompositeType::Head, "lit").with(CompositeType::Torso, "lit");
//! zombie.equip(&assets, body)?;
//! zombie.set_mode(&assets, "nu", "hth")?;
//! zombie.set_direction(16)?;
//!
//! let mut canvas = Canvas::new(256, 256).with_origin(128, 192);
//! zombie.advance(0.04);
//! zombie.render(&mut canvas)?;
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod asset_manager;
pub mod composite;
pub mod config;
mod error;
pub mod font;
pub mod surface;

#[cfg(test)]
mod fixtures;

/// `use horadric_asset::prelude::*;` to import commonly used items.
pub mod prelude;

pub use animation::{Animation, PlayMode, Shading, SourceFormat};
pub use asset_manager::AssetManager;
pub use composite::{Composite, Equipment, ObjectType};
pub use config::Configuration;
pub use error::{AssetError, CompositionError, RenderError};
pub use font::Font;
pub use surface::{Canvas, CompositeMode, DrawParams, RecordingSurface, RgbaFrame, Surface};
