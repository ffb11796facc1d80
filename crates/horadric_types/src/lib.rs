//! Core data types and file format support for `horadric-rs`.
//!
//! # File Formats
//!
//! - **Palette**: 256-entry BGR colour tables
//! - **PL2**: palette transform tables (light levels, blends, hues, text colours)
//! - **DC6**: run-length encoded frame strips
//! - **DCC**: direction-compressed, bit-packed sprites decoded one direction at a time
//! - **COF**: layer and draw-priority descriptors for composite entities
//! - **AnimData**: frame counts and speeds of composite animations
//! - **Font tables**: glyph metrics for DC6 font sheets
//!
//! The [`cache`] module provides the weight-budgeted LRU cache shared by
//! every asset manager.
//!
//! # Examples
//!
//! ```no_run
//! use horadric_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let palette = Palette::open("pal.dat")?;
//! let dc6 = Dc6File::open("invchar6.dc6")?;
//! let frame = dc6.frame(0, 0).ok_or("no frame")?.decoded();
//! let rgba = index_to_rgba(&frame.index_pixels, &palette);
//! assert_eq!(rgba.len(), frame.index_pixels.len() * 4);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod file;

/// `use horadric_types::prelude::*;` to import commonly used items.
pub mod prelude;
