//! Archive and file access for `horadric-rs`.
//!
//! Game data lives in an ordered list of archives. The [`ArchiveManager`]
//! scans that list under a single mutex and the [`FileManager`] puts a
//! byte-budgeted cache in front of it. Paths are normalised at this
//! boundary (see [`path`]) so decoders and caches only ever see canonical
//! paths.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use horadric_vfs::{ArchiveManager, FileManager, MemoryArchive};
//!
//! let archives = Arc::new(ArchiveManager::with_directories(".", Vec::new(), 1 << 20));
//! archives.mount(Arc::new(MemoryArchive::new("mem").with_file("/data/global/pal.dat", vec![0; 768])));
//!
//! let files = FileManager::new(archives, 1 << 20, "ENG");
//! assert_eq!(files.load_file(r"Data\Global\PAL.DAT").unwrap().len(), 768);
//! ```

pub mod archive;
pub mod archive_manager;
mod error;
pub mod file_manager;
pub mod path;

pub use archive::{Archive, ArchiveOpener, DirectoryArchive, DirectoryOpener, MemoryArchive};
pub use archive_manager::ArchiveManager;
pub use error::VfsError;
pub use file_manager::FileManager;
