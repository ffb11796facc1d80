//! File format support for `horadric-rs`.

mod error;

pub mod animdata;
pub mod bits;
pub mod cof;
pub mod dc6;
pub mod dcc;
pub mod direction;
pub mod font;
pub mod frame;
pub mod palette;
pub mod pl2;
pub mod stream;

// Re-export unified error type
pub use error::{FileType, FormatError};

// Re-export main file types
pub use animdata::{File as AnimDataFile, Record as AnimDataRecord};
pub use cof::{CompositeType, DrawEffect, File as CofFile, Layer as CofLayer};
pub use dc6::File as Dc6File;
pub use dcc::{File as DccFile, RawDirection as DccRawDirection};
pub use direction::{DIRECTION_COUNT, dir64_to_cof, dir64_to_dcc};
pub use font::{File as FontTable, Glyph as FontGlyph};
pub use frame::DecodedFrame;
pub use palette::{
	Color, Palette, RemapTable, RgbaConverter, index_to_rgba, index_to_rgba_transformed,
};
pub use pl2::{File as Pl2File, TransformKind};
