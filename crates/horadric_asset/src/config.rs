//! Asset manager configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `HORADRIC_*` environment variables.
//!
//! ```toml
//! language = "DEU"
//! mpq_path = "/games/diablo2"
//! mpq_load_order = ["patch_d2.mpq", "d2exp.mpq", "d2data.mpq"]
//! animation_budget = 2048
//! ```
//!
//! `HORADRIC_MPQ_LOAD_ORDER` takes a comma separated list.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

const MIB: usize = 1024 * 1024;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "HORADRIC";

/// Archive names searched by default, highest priority first.
pub const DEFAULT_LOAD_ORDER: [&str; 11] = [
	"patch_d2.mpq",
	"d2exp.mpq",
	"d2xmusic.mpq",
	"d2xtalk.mpq",
	"d2xvideo.mpq",
	"d2data.mpq",
	"d2char.mpq",
	"d2music.mpq",
	"d2sfx.mpq",
	"d2video.mpq",
	"d2speech.mpq",
];

/// Settings for [`AssetManager`](crate::AssetManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
	/// Language code substituted for `{LANG}`
	pub language: String,
	/// Directory holding the archives
	pub mpq_path: String,
	/// Archive search order
	pub mpq_load_order: Vec<String>,
	/// Archive cache budget in bytes
	pub archive_budget: usize,
	/// File cache budget in bytes
	pub file_budget: usize,
	/// Palette cache budget in entries
	pub palette_budget: usize,
	/// PL2 cache budget in entries
	pub palette_transform_budget: usize,
	/// Animation cache budget in entries
	pub animation_budget: usize,
	/// Font cache budget in entries
	pub font_budget: usize,
	/// Location of the animation registry
	pub animation_data_path: String,
	/// Log cache activity from the start
	pub verbose_cache: bool,
}

impl Default for Configuration {
	fn default() -> Self {
		Self {
			language: "ENG".to_string(),
			mpq_path: ".".to_string(),
			mpq_load_order: DEFAULT_LOAD_ORDER.iter().map(|name| name.to_string()).collect(),
			archive_budget: 1024 * MIB,
			file_budget: 1024 * MIB,
			palette_budget: 64,
			palette_transform_budget: 64,
			animation_budget: 1024,
			font_budget: 64,
			animation_data_path: "/data/global/animdata.d2".to_string(),
			verbose_cache: false,
		}
	}
}

impl Configuration {
	/// Loads the layered configuration.
	///
	/// A missing file is not an error; its settings keep their defaults.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Config`] if the file or an environment variable
	/// cannot be parsed.
	pub fn load(path: Option<&Path>) -> Result<Self, AssetError> {
		let mut builder = config::Config::builder();
		if let Some(path) = path {
			builder = builder.add_source(config::File::from(path).required(false));
		}
		let settings = builder
			.add_source(
				config::Environment::with_prefix(ENV_PREFIX)
					.try_parsing(true)
					.list_separator(",")
					.with_list_parse_key("mpq_load_order"),
			)
			.build()?;
		let configuration: Self = settings.try_deserialize()?;
		log::debug!("loaded configuration: language {}, {} archives", configuration.language, configuration.mpq_load_order.len());
		Ok(configuration)
	}
}
