//! Prelude module for `horadric_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use horadric_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let mut palette = Palette::grayscale();
//! palette.set(5, Color::rgb(10, 20, 30));
//! assert_eq!(index_to_rgba(&[0, 5], &palette), vec![0, 0, 0, 0, 10, 20, 30, 255]);
//!
//! let mut cache: Cache<Palette> = Cache::named("palette", 4);
//! cache.insert("/data/global/palette/act1/pal.dat", palette, 1).unwrap();
//! ```

// Re-export everything from the asset prelude, which includes the format types
#[doc(inline)]
pub use horadric_asset::prelude::*;

// Re-export the member crates for advanced usage
#[doc(inline)]
pub use horadric_asset;
#[doc(inline)]
pub use horadric_types;
#[doc(inline)]
pub use horadric_vfs;
