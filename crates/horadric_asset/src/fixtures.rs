//! Synthetic game data shared by the unit tests.

use std::sync::Arc;

use horadric_types::file::{
	AnimDataFile, AnimDataRecord, Color, CofLayer, CompositeType, DecodedFrame, DrawEffect, FontGlyph, FontTable,
	Palette, Pl2File, cof, dc6, dcc,
};
use horadric_vfs::{Archive, ArchiveManager, MemoryArchive, VfsError};

use crate::asset_manager::AssetManager;
use crate::config::Configuration;

pub const PALETTE: &str = "/data/global/palette/act1/pal.dat";
pub const PL2: &str = "/data/global/palette/act1/pal.pl2";
pub const TORSO_DCC: &str = "/data/global/monsters/zm/tr/zmtrlitnuhth.dcc";
pub const AXE_DC6: &str = "/data/global/monsters/zm/rh/zmrhaxenuhth.dc6";
pub const HELM_DC6: &str = "/data/global/monsters/zm/hd/zmhdhelnuhth.dc6";
pub const BARE_HEAD_DC6: &str = "/data/global/monsters/zm/hd/zmhdlitnuhth.dc6";
pub const COF_NU: &str = "/data/global/monsters/zm/cof/zmnuhth.cof";
pub const COF_NU_1HS: &str = "/data/global/monsters/zm/cof/zmnu1hs.cof";
pub const COF_WL: &str = "/data/global/monsters/zm/cof/zmwlhth.cof";
pub const FONT_TABLE: &str = "/data/local/font/latin/font8.tbl";
pub const FONT_SHEET: &str = "/data/local/font/latin/font8.dc6";

pub fn palette() -> Palette {
	let mut palette = Palette::grayscale();
	palette.set(5, Color::rgb(10, 20, 30));
	palette
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

fn dc6_bytes(frames: &[DecodedFrame]) -> Vec<u8> {
	let mut builder = dc6::FileBuilder::new(1, frames.len() as u32);
	for frame in frames {
		builder = builder.frame(0, frame.clone());
	}
	builder.to_bytes().unwrap()
}

/// Eight directions of four 8x8 frames, direction `d` filled with `40 + d`.
fn torso_bytes() -> Vec<u8> {
	let mut builder = dcc::FileBuilder::new(4);
	for direction in 0..8u8 {
		builder = builder.direction((0..4).map(|_| filled(8, 8, -4, -8, 40 + direction)).collect());
	}
	builder.to_bytes().unwrap()
}

fn zombie_cof(layers: &[CofLayer]) -> Vec<u8> {
	let mut builder = cof::FileBuilder::new(8, 4);
	for layer in layers {
		builder = builder.layer_record(layer.clone());
	}
	let order: Vec<CompositeType> = [CompositeType::RightHand, CompositeType::Torso, CompositeType::Head]
		.into_iter()
		.filter(|kind| layers.iter().any(|layer| layer.kind == *kind))
		.collect();
	builder.uniform_priority(&order).to_bytes().unwrap()
}

fn layer(kind: CompositeType, shadow: u8, effect: Option<DrawEffect>) -> CofLayer {
	CofLayer {
		kind,
		shadow,
		selectable: true,
		transparent: effect.is_some(),
		draw_effect: effect.unwrap_or(DrawEffect::None),
		weapon_class: String::new(),
	}
}

/// Torso casting a shadow, an empty head slot and a half transparent
/// right hand, drawn right hand first.
pub fn zombie_layers() -> Vec<CofLayer> {
	vec![
		layer(CompositeType::Torso, 1, None),
		layer(CompositeType::Head, 0, None),
		layer(CompositeType::RightHand, 0, Some(DrawEffect::Transparency50)),
	]
}

fn animation_data() -> Vec<u8> {
	let mut data = AnimDataFile::new();
	data.insert(AnimDataRecord::new("zmnuhth", 4, 256));
	data.insert(AnimDataRecord::new("zmnu1hs", 4, 128));
	data.to_bytes()
}

fn font_table() -> Vec<u8> {
	let mut table = FontTable::default();
	table.insert(
		'a',
		FontGlyph {
			frame_index: 0,
			width: 3,
			height: 4,
		},
	);
	table.insert(
		'b',
		FontGlyph {
			frame_index: 1,
			width: 5,
			height: 4,
		},
	);
	table.to_bytes()
}

pub fn archive() -> MemoryArchive {
	let axe: Vec<DecodedFrame> = (0..4).map(|_| filled(2, 2, 0, 0, 5)).collect();
	let helm: Vec<DecodedFrame> = (0..4).map(|_| filled(3, 3, -1, -2, 9)).collect();
	let bare_head: Vec<DecodedFrame> = (0..4).map(|_| filled(4, 4, -2, -4, 7)).collect();
	MemoryArchive::new("fixtures")
		.with_file(PALETTE, palette().to_bytes())
		.with_file(PL2, Pl2File::identity(palette()).to_bytes())
		.with_file(TORSO_DCC, torso_bytes())
		.with_file(AXE_DC6, dc6_bytes(&axe))
		.with_file(HELM_DC6, dc6_bytes(&helm))
		.with_file(BARE_HEAD_DC6, dc6_bytes(&bare_head))
		.with_file(COF_NU, zombie_cof(&zombie_layers()))
		.with_file(COF_NU_1HS, zombie_cof(&zombie_layers()))
		.with_file(COF_WL, zombie_cof(&[layer(CompositeType::Torso, 0, None)]))
		.with_file("/data/global/animdata.d2", animation_data())
		.with_file(FONT_TABLE, font_table())
		.with_file(FONT_SHEET, dc6_bytes(&[filled(3, 5, 0, 0, 1), filled(5, 6, 0, 0, 1)]))
}

pub fn assets() -> AssetManager {
	let archives = Arc::new(ArchiveManager::new(
		"",
		Vec::new(),
		|path: &str| -> Result<Arc<dyn Archive>, VfsError> { Err(VfsError::not_found(path)) },
		1 << 20,
	));
	archives.mount(Arc::new(archive()));
	AssetManager::new(Configuration::default(), archives)
}
