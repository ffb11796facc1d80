//! Ordered archive lookup.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use horadric_types::cache::{Cache, CacheSummary};

use crate::archive::{Archive, ArchiveOpener, DirectoryOpener};
use crate::error::VfsError;
use crate::path::normalize_path;

struct State {
	base_path: PathBuf,
	load_order: Vec<String>,
	opener: Box<dyn ArchiveOpener>,
	mounted: Vec<Arc<dyn Archive>>,
	archives: Vec<Arc<dyn Archive>>,
	built: bool,
	cache: Cache<Arc<dyn Archive>>,
}

impl State {
	fn archive_path(&self, name: &str) -> String {
		self.base_path.join(name).to_string_lossy().into_owned()
	}

	fn load_archive(&mut self, path: &str) -> Result<Arc<dyn Archive>, VfsError> {
		if let Some(archive) = self.cache.retrieve(path) {
			return Ok(archive);
		}

		let archive = self.opener.open(path)?;
		if let Err(err) = self.cache.insert(path, Arc::clone(&archive), archive.size()) {
			log::warn!("archive {path} not cached: {err}");
		}
		Ok(archive)
	}

	fn ensure_built(&mut self) {
		if self.built {
			return;
		}

		let paths: Vec<String> = self.load_order.iter().map(|name| self.archive_path(name)).collect();
		let mut archives = Vec::with_capacity(paths.len());
		for path in paths {
			match self.load_archive(&path) {
				Ok(archive) => archives.push(archive),
				Err(err) => log::warn!("skipping archive {path}: {err}"),
			}
		}
		log::debug!("archive list built: {} of {} opened", archives.len(), self.load_order.len());
		self.archives = archives;
		self.built = true;
	}

	fn find(&mut self, path: &str) -> Option<Arc<dyn Archive>> {
		self.ensure_built();
		self.mounted.iter().chain(self.archives.iter()).find(|archive| archive.contains(path)).cloned()
	}
}

/// Resolves files against an ordered list of archives.
///
/// All state sits behind one mutex, held for the whole "make sure the
/// archive list is current, then scan it" sequence. Archives named by the
/// load order are opened lazily on the first lookup after the order
/// changes, and kept in a cache weighted by archive size.
pub struct ArchiveManager {
	state: Mutex<State>,
}

impl ArchiveManager {
	/// Creates a manager that opens `load_order` entries, relative to
	/// `base_path`, with `opener`.
	pub fn new(
		base_path: impl Into<PathBuf>,
		load_order: Vec<String>,
		opener: impl ArchiveOpener + 'static,
		budget: usize,
	) -> Self {
		Self {
			state: Mutex::new(State {
				base_path: base_path.into(),
				load_order,
				opener: Box::new(opener),
				mounted: Vec::new(),
				archives: Vec::new(),
				built: false,
				cache: Cache::named("archive", budget),
			}),
		}
	}

	/// Creates a manager whose load order names directories under `base_path`.
	pub fn with_directories(base_path: impl Into<PathBuf>, load_order: Vec<String>, budget: usize) -> Self {
		Self::new(base_path, load_order, DirectoryOpener, budget)
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Adds an already open archive. Mounted archives are searched first,
	/// most recently mounted last.
	pub fn mount(&self, archive: Arc<dyn Archive>) {
		log::debug!("mounted archive {}", archive.path());
		self.lock().mounted.push(archive);
	}

	/// Replaces the load order. The archive list is rebuilt on next lookup.
	pub fn set_load_order(&self, load_order: Vec<String>) {
		let mut state = self.lock();
		state.load_order = load_order;
		state.built = false;
	}

	/// Current load order.
	pub fn load_order(&self) -> Vec<String> {
		self.lock().load_order.clone()
	}

	/// Directory the load order is relative to.
	pub fn base_path(&self) -> PathBuf {
		self.lock().base_path.clone()
	}

	/// Opens the archive at `path`, or returns the cached handle.
	///
	/// # Errors
	///
	/// Returns the opener's error if the archive cannot be opened.
	pub fn load_archive(&self, path: impl AsRef<Path>) -> Result<Arc<dyn Archive>, VfsError> {
		let mut state = self.lock();
		let path = state.archive_path(&path.as_ref().to_string_lossy());
		state.load_archive(&path)
	}

	/// First archive, in search order, that holds `path`.
	///
	/// # Errors
	///
	/// Returns [`VfsError::NotFound`] if no archive holds the file.
	pub fn load_archive_for_file(&self, path: &str) -> Result<Arc<dyn Archive>, VfsError> {
		let path = normalize_path(path);
		self.lock().find(&path).ok_or_else(|| VfsError::not_found(path))
	}

	/// Whether any archive holds `path`.
	pub fn file_exists(&self, path: &str) -> bool {
		self.lock().find(&normalize_path(path)).is_some()
	}

	/// Reads `path` from the first archive that holds it.
	///
	/// # Errors
	///
	/// Returns [`VfsError::NotFound`] if no archive holds the file, or the
	/// archive's read error.
	pub fn load_file(&self, path: &str) -> Result<Vec<u8>, VfsError> {
		let archive = self.load_archive_for_file(path)?;
		archive.read(&normalize_path(path))
	}

	/// Drops every cached archive. Mounted archives are kept.
	pub fn clear_cache(&self) {
		let mut state = self.lock();
		state.cache.clear();
		state.archives.clear();
		state.built = false;
	}

	/// Enables debug logging of cache activity.
	pub fn set_verbose(&self, verbose: bool) {
		self.lock().cache.set_verbose(verbose);
	}

	/// Occupancy of the archive cache.
	pub fn summary(&self) -> CacheSummary {
		self.lock().cache.summary()
	}
}

impl fmt::Debug for ArchiveManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.lock();
		f.debug_struct("ArchiveManager")
			.field("base_path", &state.base_path)
			.field("load_order", &state.load_order)
			.field("mounted", &state.mounted.len())
			.field("cache", &state.cache.to_string())
			.finish()
	}
}
