//! The asset manager: one explicitly owned entry point for every asset.
//!
//! An [`AssetManager`] owns the file manager (and through it the archive
//! manager) plus one budgeted cache per derived resource. Nothing is
//! global; construct one at the application root and pass it by reference
//! to whatever needs assets.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use horadric_types::cache::{Cache, CacheSummary};
use horadric_types::file::{AnimDataFile, CofFile, Dc6File, DccFile, DrawEffect, FontTable, Palette, Pl2File};
use horadric_vfs::{ArchiveManager, FileManager};

use crate::animation::{Animation, Shading};
use crate::composite::{Composite, ObjectType};
use crate::config::Configuration;
use crate::error::AssetError;
use crate::font::Font;

fn lock<V>(cache: &Mutex<Cache<V>>) -> MutexGuard<'_, Cache<V>> {
	cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Caches `value` with weight 1; a rejection is logged and ignored.
fn store<V: Clone>(cache: &Mutex<Cache<V>>, key: &str, value: V) {
	if let Err(err) = lock(cache).insert(key, value, 1) {
		log::warn!("{key} not cached: {err}");
	}
}

/// Loads, decodes and caches game assets.
#[derive(Debug)]
pub struct AssetManager {
	config: Configuration,
	files: FileManager,
	palettes: Mutex<Cache<Arc<Palette>>>,
	palette_transforms: Mutex<Cache<Arc<Pl2File>>>,
	animations: Mutex<Cache<Animation>>,
	fonts: Mutex<Cache<Font>>,
	animation_data: Mutex<Option<Arc<AnimDataFile>>>,
}

impl AssetManager {
	/// Creates a manager reading from `archives`.
	pub fn new(config: Configuration, archives: Arc<ArchiveManager>) -> Self {
		let files = FileManager::new(archives, config.file_budget, config.language.clone());
		let manager = Self {
			files,
			palettes: Mutex::new(Cache::named("palette", config.palette_budget)),
			palette_transforms: Mutex::new(Cache::named("palette transform", config.palette_transform_budget)),
			animations: Mutex::new(Cache::named("animation", config.animation_budget)),
			fonts: Mutex::new(Cache::named("font", config.font_budget)),
			animation_data: Mutex::new(None),
			config,
		};
		if manager.config.verbose_cache {
			manager.set_verbose(true);
		}
		log::info!(
			"asset manager ready (language {}, {} archives in load order)",
			manager.config.language,
			manager.config.mpq_load_order.len()
		);
		manager
	}

	/// Creates a manager whose load order names directories under
	/// `config.mpq_path`.
	pub fn from_config(config: Configuration) -> Self {
		let archives = Arc::new(ArchiveManager::with_directories(
			config.mpq_path.clone(),
			config.mpq_load_order.clone(),
			config.archive_budget,
		));
		Self::new(config, archives)
	}

	/// Settings the manager was built with.
	pub fn configuration(&self) -> &Configuration {
		&self.config
	}

	/// File layer.
	pub fn file_manager(&self) -> &FileManager {
		&self.files
	}

	/// Archive layer.
	pub fn archive_manager(&self) -> &Arc<ArchiveManager> {
		self.files.archive_manager()
	}

	fn read(&self, path: &str) -> Result<Arc<[u8]>, AssetError> {
		Ok(self.files.load_file(path)?)
	}

	/// Loads the raw contents of `path`.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Io`] if the file cannot be found or read. The
	/// failure is logged before it is returned.
	pub fn load_file(&self, path: &str) -> Result<Arc<[u8]>, AssetError> {
		self.read(path).inspect_err(|err| log::error!("error loading file {path} ({err})"))
	}

	/// Whether `path` exists in any archive.
	pub fn file_exists(&self, path: &str) -> bool {
		self.files.file_exists(path)
	}

	/// Loads a 256-color palette.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Io`] for a missing file or
	/// [`AssetError::Format`] for a malformed one.
	pub fn load_palette(&self, path: &str) -> Result<Arc<Palette>, AssetError> {
		let key = self.files.resolve(path);
		if let Some(palette) = lock(&self.palettes).retrieve(&key) {
			return Ok(palette);
		}
		let palette = self
			.read(&key)
			.and_then(|data| Ok(Arc::new(Palette::from_bytes(&data)?)))
			.inspect_err(|err| log::error!("error loading palette {key} ({err})"))?;
		store(&self.palettes, &key, Arc::clone(&palette));
		Ok(palette)
	}

	/// Loads a PL2 palette transform.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Io`] for a missing file or
	/// [`AssetError::Format`] for a malformed one.
	pub fn load_palette_transform(&self, path: &str) -> Result<Arc<Pl2File>, AssetError> {
		let key = self.files.resolve(path);
		if let Some(transform) = lock(&self.palette_transforms).retrieve(&key) {
			return Ok(transform);
		}
		let transform = self
			.read(&key)
			.and_then(|data| Ok(Arc::new(Pl2File::from_bytes(&data)?)))
			.inspect_err(|err| log::error!("error loading palette transform {key} ({err})"))?;
		store(&self.palette_transforms, &key, Arc::clone(&transform));
		Ok(transform)
	}

	/// Loads an opaque DC6 or DCC animation.
	///
	/// # Errors
	///
	/// Same as [`AssetManager::load_animation_with_effect`].
	pub fn load_animation(&self, path: &str, palette_path: &str) -> Result<Animation, AssetError> {
		self.load_animation_with_effect(path, palette_path, DrawEffect::None)
	}

	/// Loads a DC6 or DCC animation with `effect` baked into its frames.
	///
	/// The result is a fresh playback cursor over frames shared with the
	/// cache, keyed by `"<path>;<palette>;<effect>"`.
	///
	/// # Errors
	///
	/// - [`AssetError::UnknownFormat`] if `path` is neither `.dc6` nor `.dcc`
	/// - [`AssetError::Io`] if the sprite or palette is missing
	/// - [`AssetError::Format`] if either is malformed
	pub fn load_animation_with_effect(
		&self,
		path: &str,
		palette_path: &str,
		effect: DrawEffect,
	) -> Result<Animation, AssetError> {
		let path = self.files.resolve(path);
		let palette_path = self.files.resolve(palette_path);
		let key = format!("{path};{palette_path};{}", effect.to_u8());
		if let Some(animation) = lock(&self.animations).retrieve(&key) {
			return Ok(animation);
		}

		let animation = self
			.decode_animation(&path, &palette_path, effect)
			.inspect_err(|err| log::error!("error loading animation {path} ({err})"))?;
		store(&self.animations, &key, animation.clone());
		Ok(animation)
	}

	fn decode_animation(&self, path: &str, palette_path: &str, effect: DrawEffect) -> Result<Animation, AssetError> {
		let is_dc6 = path.ends_with(".dc6");
		if !is_dc6 && !path.ends_with(".dcc") {
			return Err(AssetError::UnknownFormat {
				path: path.to_string(),
			});
		}
		let shading = Shading::new(self.load_palette(palette_path)?).with_effect(effect);
		let data = self.read(path)?;
		if is_dc6 {
			Animation::from_dc6(Dc6File::from_bytes(&data)?, &shading)
		} else {
			Animation::from_dcc(&DccFile::from_shared(data)?, &shading)
		}
	}

	/// Creates a composite for a `token` of `base_type`. No layers are
	/// loaded until a mode is set.
	pub fn load_composite(&self, base_type: ObjectType, token: &str, palette_path: &str) -> Composite {
		Composite::new(base_type, token, palette_path)
	}

	/// Loads and parses a COF file.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Io`] for a missing file or
	/// [`AssetError::Format`] for a malformed one.
	pub fn load_cof(&self, path: &str) -> Result<Arc<CofFile>, AssetError> {
		self.read(path)
			.and_then(|data| Ok(Arc::new(CofFile::from_bytes(&data)?)))
			.inspect_err(|err| log::error!("error loading cof {path} ({err})"))
	}

	/// Loads a font from its glyph table and DC6 sheet.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Io`] or [`AssetError::Format`] for the table,
	/// the sheet or the palette.
	pub fn load_font(&self, table_path: &str, sprite_path: &str, palette_path: &str) -> Result<Font, AssetError> {
		let table_path = self.files.resolve(table_path);
		let sprite_path = self.files.resolve(sprite_path);
		let palette_path = self.files.resolve(palette_path);
		let key = format!("{table_path};{sprite_path};{palette_path}");
		if let Some(font) = lock(&self.fonts).retrieve(&key) {
			return Ok(font);
		}

		let table = self
			.read(&table_path)
			.and_then(|data| Ok(Arc::new(FontTable::from_bytes(&data)?)))
			.inspect_err(|err| log::error!("error loading font table {table_path} ({err})"))?;
		let sheet = self.load_animation(&sprite_path, &palette_path)?;
		let font = Font::new(table, sheet);
		store(&self.fonts, &key, font.clone());
		Ok(font)
	}

	/// The animation registry, read from `animation_data_path` on first use.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Io`] if the registry is missing or
	/// [`AssetError::Format`] if it is malformed.
	pub fn animation_data(&self) -> Result<Arc<AnimDataFile>, AssetError> {
		let mut slot = self.animation_data.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(data) = &*slot {
			return Ok(Arc::clone(data));
		}
		let path = &self.config.animation_data_path;
		let data = self
			.read(path)
			.and_then(|bytes| Ok(Arc::new(AnimDataFile::from_bytes(&bytes)?)))
			.inspect_err(|err| log::error!("error loading animation data {path} ({err})"))?;
		log::debug!("loaded {} animation records from {path}", data.len());
		*slot = Some(Arc::clone(&data));
		Ok(data)
	}

	/// Replaces the animation registry.
	pub fn register_animation_data(&self, data: AnimDataFile) {
		*self.animation_data.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(data));
	}

	/// Occupancy of the archive, file, palette, palette transform, animation
	/// and font caches, in that order.
	pub fn cache_statistics(&self) -> Vec<CacheSummary> {
		vec![
			self.archive_manager().summary(),
			self.files.summary(),
			lock(&self.palettes).summary(),
			lock(&self.palette_transforms).summary(),
			lock(&self.animations).summary(),
			lock(&self.fonts).summary(),
		]
	}

	/// Toggles debug logging on every cache.
	pub fn set_verbose(&self, verbose: bool) {
		self.archive_manager().set_verbose(verbose);
		self.files.set_verbose(verbose);
		lock(&self.palettes).set_verbose(verbose);
		lock(&self.palette_transforms).set_verbose(verbose);
		lock(&self.animations).set_verbose(verbose);
		lock(&self.fonts).set_verbose(verbose);
		log::info!("asset cache logging {}", if verbose { "enabled" } else { "disabled" });
	}

	/// Empties every cache.
	pub fn clear_caches(&self) {
		self.archive_manager().clear_cache();
		self.files.clear_cache();
		lock(&self.palettes).clear();
		lock(&self.palette_transforms).clear();
		lock(&self.animations).clear();
		lock(&self.fonts).clear();
	}

	/// Releases every cached asset, including the animation registry.
	pub fn shutdown(&self) {
		self.clear_caches();
		*self.animation_data.lock().unwrap_or_else(PoisonError::into_inner) = None;
		log::info!("asset manager shut down");
	}
}

#[cfg(test)]
mod tests {
	use horadric_types::file::{Color, TransformKind};

	use super::*;
	use crate::fixtures::{self, PALETTE};

	#[test_log::test]
	fn test_load_animation_is_cached_and_cloned() {
		let assets = fixtures::assets();
		let mut first = assets.load_animation(fixtures::TORSO_DCC, PALETTE).unwrap();
		first.set_direction(32).unwrap();
		let second = assets.load_animation("DATA\\GLOBAL\\MONSTERS\\ZM\\TR\\ZMTRLITNUHTH.DCC", PALETTE).unwrap();

		assert_eq!(second.direction(), 0);
		assert_eq!(second.decoded_direction_count(), 2);
		let summary = &assets.cache_statistics()[4];
		assert_eq!(summary.name, "animation");
		assert_eq!(summary.entries, 1);
		assert_eq!(summary.stats.hits, 1);
	}

	#[test]
	fn test_effect_is_part_of_the_key() {
		let assets = fixtures::assets();
		let opaque = assets.load_animation(fixtures::AXE_DC6, PALETTE).unwrap();
		let faded = assets.load_animation_with_effect(fixtures::AXE_DC6, PALETTE, DrawEffect::Transparency25).unwrap();
		assert_eq!(opaque.current_image().unwrap().pixel(0, 0), Some([10, 20, 30, 255]));
		assert_eq!(faded.current_image().unwrap().pixel(0, 0), Some([10, 20, 30, 64]));
		assert_eq!(assets.cache_statistics()[4].entries, 2);
	}

	#[test]
	fn test_load_failures() {
		let assets = fixtures::assets();
		let err = assets.load_animation("/data/global/missing.dcc", PALETTE).unwrap_err();
		assert!(err.is_not_found());
		assert!(matches!(
			assets.load_animation("/data/global/readme.txt", PALETTE),
			Err(AssetError::UnknownFormat { .. })
		));
		assert!(matches!(assets.load_animation(fixtures::TORSO_DCC, fixtures::COF_NU), Err(AssetError::Format(_))));
		assert!(assets.load_file("/nowhere").is_err());
		assert_eq!(assets.cache_statistics()[4].entries, 0);
	}

	#[test]
	fn test_palette_and_transform() {
		let assets = fixtures::assets();
		let palette = assets.load_palette(PALETTE).unwrap();
		assert_eq!(palette.get(5), Color::rgb(10, 20, 30));
		assert!(Arc::ptr_eq(&palette, &assets.load_palette("/DATA/GLOBAL/PALETTE/ACT1/PAL.DAT").unwrap()));

		let transform = assets.load_palette_transform(fixtures::PL2).unwrap();
		assert_eq!(transform.table(TransformKind::LightLevel, 0).map(|table| table[7]), Some(7));
		assert_eq!(assets.cache_statistics()[2].entries, 1);
		assert_eq!(assets.cache_statistics()[3].entries, 1);
	}

	#[test]
	fn test_load_font() {
		let assets = fixtures::assets();
		let font = assets.load_font(fixtures::FONT_TABLE, fixtures::FONT_SHEET, PALETTE).unwrap();
		assert_eq!(font.text_size("ab"), (8, 6));
		assets.load_font(fixtures::FONT_TABLE, fixtures::FONT_SHEET, PALETTE).unwrap();
		assert_eq!(assets.cache_statistics()[5].stats.hits, 1);
	}

	#[test]
	fn test_animation_data_is_loaded_once() {
		let assets = fixtures::assets();
		let first = assets.animation_data().unwrap();
		let second = assets.animation_data().unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		assert!(first.record("zmnuhth").is_some());

		assets.register_animation_data(AnimDataFile::new());
		assert!(assets.animation_data().unwrap().is_empty());
	}

	#[test]
	fn test_clear_and_shutdown() {
		let assets = fixtures::assets();
		assets.set_verbose(true);
		assets.load_animation(fixtures::AXE_DC6, PALETTE).unwrap();
		assert!(assets.cache_statistics().iter().any(|summary| summary.entries > 0));

		assets.clear_caches();
		assert!(assets.cache_statistics().iter().all(|summary| summary.entries == 0));

		assets.animation_data().unwrap();
		assets.shutdown();
		assert!(assets.animation_data().is_ok());
		assert_eq!(assets.cache_statistics().len(), 6);
	}
}
