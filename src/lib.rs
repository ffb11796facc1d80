#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `horadric-rs` decodes Diablo II sprites and turns them into animated,
//! layered, drawable frames.
//!
//! - DC6 and DCC decoding, palettes and PL2 transforms ([`horadric_types`])
//! - archive and file access with budgeted caches ([`horadric_vfs`])
//! - animations, COF driven composites, fonts and the [`AssetManager`]
//!   ([`horadric_asset`])
//!
//! ```no_run
//! use horadric_rs::prelude::*;
//!
//! # fn main() -> Result<(), AssetError> {
//! let assets = AssetManager::from_config(Configuration::load(Some(std::path::Path::new("horadric.toml")))?);
//! let mut cursor = assets.load_animation("/data/global/ui/cursor/ohand.dc6", "/data/global/palette/units/pal.dat")?;
//! cursor.play_forward();
//! cursor.advance(0.1);
//! # Ok(())
//! # }
//! ```
pub use horadric_internal::*;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use horadric_dylib;
