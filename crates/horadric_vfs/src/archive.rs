//! Archive containers.
//!
//! An [`Archive`] maps canonical paths (see [`crate::path`]) to file
//! contents. Two implementations are provided: [`DirectoryArchive`] for
//! extracted game data on disk and [`MemoryArchive`] for data built at
//! runtime. MPQ support plugs in through the same trait.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::VfsError;
use crate::path::normalize_path;

/// A container of files addressed by canonical path.
pub trait Archive: Send + Sync + fmt::Debug {
	/// Location the archive was opened from.
	fn path(&self) -> &str;

	/// Whether the archive holds `path`.
	fn contains(&self, path: &str) -> bool;

	/// Reads the whole file at `path`.
	///
	/// # Errors
	///
	/// Returns [`VfsError::NotFound`] if the archive does not hold `path`.
	fn read(&self, path: &str) -> Result<Vec<u8>, VfsError>;

	/// Size of the archive in bytes, used as its cache weight.
	fn size(&self) -> usize;
}

/// Opens archives named by the load order.
///
/// Implemented for closures so tests and hosts can supply their own
/// container formats.
pub trait ArchiveOpener: Send + Sync {
	/// Opens the archive at `path`.
	fn open(&self, path: &str) -> Result<Arc<dyn Archive>, VfsError>;
}

impl<F> ArchiveOpener for F
where
	F: Fn(&str) -> Result<Arc<dyn Archive>, VfsError> + Send + Sync,
{
	fn open(&self, path: &str) -> Result<Arc<dyn Archive>, VfsError> {
		self(path)
	}
}

/// Opens every load-order entry as a [`DirectoryArchive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryOpener;

impl ArchiveOpener for DirectoryOpener {
	fn open(&self, path: &str) -> Result<Arc<dyn Archive>, VfsError> {
		Ok(Arc::new(DirectoryArchive::open(path)?))
	}
}

/// A directory tree used as an archive.
///
/// File names are matched case-insensitively: the tree is indexed once at
/// open time under canonical paths relative to the root.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
	path: String,
	entries: HashMap<String, PathBuf>,
	size: usize,
}

impl DirectoryArchive {
	/// Indexes the tree rooted at `root`.
	///
	/// # Errors
	///
	/// Returns [`VfsError::ArchiveOpen`] if `root` is not a readable directory.
	pub fn open(root: impl AsRef<Path>) -> Result<Self, VfsError> {
		let root = root.as_ref();
		let display = root.display().to_string();
		if !root.is_dir() {
			return Err(VfsError::ArchiveOpen {
				path: display,
				source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
			});
		}

		let mut entries = HashMap::new();
		let mut size = 0usize;
		for entry in WalkDir::new(root).follow_links(false) {
			let entry = entry.map_err(|err| VfsError::ArchiveOpen {
				path: display.clone(),
				source: err.into(),
			})?;
			if !entry.file_type().is_file() {
				continue;
			}
			let Ok(relative) = entry.path().strip_prefix(root) else {
				continue;
			};
			let key = normalize_path(&relative.to_string_lossy());
			size += entry.metadata().map(|m| m.len() as usize).unwrap_or(0);
			entries.insert(key, entry.path().to_path_buf());
		}

		log::debug!("Indexed {} files under {}", entries.len(), display);
		Ok(Self {
			path: display,
			entries,
			size,
		})
	}

	/// Number of files in the tree.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the tree holds no files.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Archive for DirectoryArchive {
	fn path(&self) -> &str {
		&self.path
	}

	fn contains(&self, path: &str) -> bool {
		self.entries.contains_key(&normalize_path(path))
	}

	fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
		let key = normalize_path(path);
		let Some(location) = self.entries.get(&key) else {
			return Err(VfsError::not_found(key));
		};
		Ok(std::fs::read(location)?)
	}

	fn size(&self) -> usize {
		self.size
	}
}

/// An in-memory archive.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
	path: String,
	files: HashMap<String, Arc<[u8]>>,
	size: usize,
}

impl MemoryArchive {
	/// Creates an empty archive identified by `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	/// Adds or replaces a file.
	pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
		let data: Vec<u8> = data.into();
		self.size += data.len();
		if let Some(old) = self.files.insert(normalize_path(path), Arc::from(data)) {
			self.size -= old.len();
		}
	}

	/// Builder form of [`MemoryArchive::insert`].
	pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
		self.insert(path, data);
		self
	}

	/// Number of files.
	pub fn len(&self) -> usize {
		self.files.len()
	}

	/// Whether the archive holds no files.
	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}
}

impl Archive for MemoryArchive {
	fn path(&self) -> &str {
		&self.path
	}

	fn contains(&self, path: &str) -> bool {
		self.files.contains_key(&normalize_path(path))
	}

	fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
		let key = normalize_path(path);
		self.files.get(&key).map(|data| data.to_vec()).ok_or_else(|| VfsError::not_found(key))
	}

	fn size(&self) -> usize {
		self.size
	}
}
