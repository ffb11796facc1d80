//! Cached file access on top of [`ArchiveManager`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use horadric_types::cache::{Cache, CacheSummary};

use crate::archive_manager::ArchiveManager;
use crate::error::VfsError;
use crate::path::resolve_path;

/// Loads files by logical path.
///
/// Paths are resolved (locale tokens, case, separators) before they reach
/// the cache or the archives, so `Data\Global\{LANG}\x.tbl` and
/// `/data/global/eng/x.tbl` share one cache entry.
#[derive(Debug)]
pub struct FileManager {
	archives: Arc<ArchiveManager>,
	cache: Mutex<Cache<Arc<[u8]>>>,
	language: String,
}

impl FileManager {
	/// Creates a file manager with a byte budget for cached contents.
	pub fn new(archives: Arc<ArchiveManager>, budget: usize, language: impl Into<String>) -> Self {
		Self {
			archives,
			cache: Mutex::new(Cache::named("file", budget)),
			language: language.into(),
		}
	}

	fn cache(&self) -> MutexGuard<'_, Cache<Arc<[u8]>>> {
		self.cache.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// The archive manager files are read from.
	pub fn archive_manager(&self) -> &Arc<ArchiveManager> {
		&self.archives
	}

	/// Language code substituted for `{LANG}`.
	pub fn language(&self) -> &str {
		&self.language
	}

	/// Canonical form of `path` used as the cache key.
	pub fn resolve(&self, path: &str) -> String {
		resolve_path(path, &self.language)
	}

	/// Loads the contents of `path`.
	///
	/// Files heavier than the whole cache budget are returned without
	/// being cached.
	///
	/// # Errors
	///
	/// Returns [`VfsError::NotFound`] if no archive holds the file, or the
	/// archive's read error.
	pub fn load_file(&self, path: &str) -> Result<Arc<[u8]>, VfsError> {
		let key = self.resolve(path);
		if let Some(data) = self.cache().retrieve(&key) {
			return Ok(data);
		}

		let data: Arc<[u8]> = Arc::from(self.archives.load_file(&key)?);
		if let Err(err) = self.cache().insert(key.as_str(), Arc::clone(&data), data.len()) {
			log::warn!("file {key} not cached: {err}");
		}
		Ok(data)
	}

	/// Whether `path` can be loaded.
	pub fn file_exists(&self, path: &str) -> bool {
		let key = self.resolve(path);
		self.cache().contains(&key) || self.archives.file_exists(&key)
	}

	/// Drops cached file contents.
	pub fn clear_cache(&self) {
		self.cache().clear();
	}

	/// Enables debug logging of cache activity.
	pub fn set_verbose(&self, verbose: bool) {
		self.cache().set_verbose(verbose);
	}

	/// Occupancy of the file cache.
	pub fn summary(&self) -> CacheSummary {
		self.cache().summary()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::archive::{Archive, MemoryArchive};

	fn manager(budget: usize) -> FileManager {
		let archives = Arc::new(ArchiveManager::new(
			"",
			Vec::new(),
			|path: &str| -> Result<Arc<dyn Archive>, VfsError> { Err(VfsError::not_found(path)) },
			0,
		));
		archives.mount(Arc::new(
			MemoryArchive::new("mem")
				.with_file("/data/local/font/latin/font8.tbl", vec![1; 8])
				.with_file("/data/local/lng/eng/strings.tbl", vec![2; 32]),
		));
		FileManager::new(archives, budget, "ENG")
	}

	#[test_log::test]
	fn test_load_and_cache() {
		let files = manager(16);
		let first = files.load_file("/data/local/font/{LANG_FONT}/font8.tbl").unwrap();
		let second = files.load_file("DATA\\LOCAL\\FONT\\LATIN\\FONT8.TBL").unwrap();
		assert!(Arc::ptr_eq(&first, &second));

		let summary = files.summary();
		assert_eq!(summary.entries, 1);
		assert_eq!(summary.weight, 8);
		assert_eq!(summary.stats.hits, 1);
	}

	#[test]
	fn test_oversized_file_is_returned_uncached() {
		let files = manager(16);
		let data = files.load_file("/data/local/lng/{LANG}/strings.tbl").unwrap();
		assert_eq!(data.len(), 32);
		assert_eq!(files.summary().entries, 0);
	}

	#[test]
	fn test_exists_and_missing() {
		let files = manager(16);
		assert!(files.file_exists("/data/local/lng/{LANG}/strings.tbl"));
		assert!(!files.file_exists("/data/global/missing.dc6"));
		assert!(files.load_file("/data/global/missing.dc6").unwrap_err().is_not_found());
		assert_eq!(files.resolve("/a/{LANG}/b"), "/a/eng/b");
	}

	#[test]
	fn test_clear_cache() {
		let files = manager(64);
		files.load_file("/data/local/lng/eng/strings.tbl").unwrap();
		files.clear_cache();
		assert_eq!(files.summary().weight, 0);
	}
}
