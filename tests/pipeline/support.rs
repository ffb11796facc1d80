//! Builds a small game tree in a temporary directory.

use std::fs;
use std::path::Path;

use horadric_rs::prelude::file::{cof, dc6, dcc};
use horadric_rs::prelude::*;
use tempfile::TempDir;

pub const PALETTE: &str = "data/global/palette/act1/pal.dat";
pub const AXE: &str = "data/global/items/invaxe.dc6";
pub const TORSO: &str = "data/global/monsters/sk/tr/sktrlitnuhth.dcc";
pub const COF: &str = "data/global/monsters/sk/cof/sknuhth.cof";

pub fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

pub fn filled(width: u32, height: u32, offset_x: i32, offset_y: i32, index: u8) -> DecodedFrame {
	DecodedFrame {
		width,
		height,
		offset_x,
		offset_y,
		index_pixels: vec![index; (width * height) as usize],
	}
}

fn write(root: &Path, path: &str, data: &[u8]) {
	let target = root.join(path);
	fs::create_dir_all(target.parent().unwrap()).unwrap();
	fs::write(target, data).unwrap();
}

/// Palette whose index 5 is a recognisable colour.
pub fn patched_palette() -> Palette {
	let mut palette = Palette::grayscale();
	palette.set(5, Color::rgb(200, 100, 50));
	palette
}

/// Two archives: `d2exp` patches the palette of `d2data`, which holds
/// everything else.
pub fn game_tree() -> TempDir {
	let dir = tempfile::tempdir().unwrap();
	let base = dir.path().join("d2data");
	let patch = dir.path().join("d2exp");

	write(&base, PALETTE, &Palette::grayscale().to_bytes());
	write(&patch, PALETTE, &patched_palette().to_bytes());

	let axe = dc6::FileBuilder::new(1, 1).frame(0, filled(2, 3, -1, 0, 5)).to_bytes().unwrap();
	write(&base, AXE, &axe);

	let mut torso = dcc::FileBuilder::new(2);
	for direction in 0..8u8 {
		torso = torso.direction((0..2).map(|_| filled(4, 4, -2, -4, 60 + direction)).collect());
	}
	write(&base, TORSO, &torso.to_bytes().unwrap());

	let layout = cof::FileBuilder::new(8, 2)
		.layer(CompositeType::Torso)
		.uniform_priority(&[CompositeType::Torso])
		.to_bytes()
		.unwrap();
	write(&base, COF, &layout);

	let mut animation_data = AnimDataFile::new();
	animation_data.insert(AnimDataRecord::new("sknuhth", 2, 256));
	write(&base, "data/global/animdata.d2", &animation_data.to_bytes());

	dir
}

pub fn configuration(root: &Path) -> Configuration {
	Configuration {
		mpq_path: root.to_string_lossy().into_owned(),
		mpq_load_order: vec!["d2exp".to_string(), "missing".to_string(), "d2data".to_string()],
		..Configuration::default()
	}
}
