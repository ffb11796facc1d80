use horadric_rs::prelude::*;

use crate::support::{self, AXE, PALETTE};

fn summary<'a>(summaries: &'a [CacheSummary], name: &str) -> &'a CacheSummary {
	summaries.iter().find(|summary| summary.name == name).unwrap()
}

#[test]
fn test_load_order_prefers_earlier_archives() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));

	// d2exp shadows d2data, the missing archive is skipped
	let palette = assets.load_palette(PALETTE).unwrap();
	assert_eq!(palette.get(5), Color::rgb(200, 100, 50));
	assert!(assets.file_exists(AXE));
	assert!(!assets.file_exists("data/global/items/invsword.dc6"));
}

#[test]
fn test_animation_renders_onto_canvas() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));

	let animation = assets.load_animation(AXE, PALETTE).unwrap();
	assert_eq!(animation.format(), SourceFormat::Dc6);
	assert_eq!(animation.frame_count(), 1);

	let mut canvas = Canvas::new(8, 8).with_origin(4, 4);
	animation.render(&mut canvas).unwrap();
	// 2x3 frame standing on (-1, 0)
	assert_eq!(canvas.pixel(3, 1), Some([200, 100, 50, 255]));
	assert_eq!(canvas.pixel(4, 3), Some([200, 100, 50, 255]));
	assert_eq!(canvas.pixel(5, 1), Some([0, 0, 0, 0]));
	assert_eq!(canvas.pixel(3, 4), Some([0, 0, 0, 0]));
}

#[test]
fn test_equivalent_paths_share_cache_entries() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));

	assets.load_animation(AXE, PALETTE).unwrap();
	assets.load_animation(r"Data\Global\Items\InvAxe.DC6", r"\data\global\palette\act1\pal.dat").unwrap();

	let summaries = assets.cache_statistics();
	assert_eq!(summaries.len(), 6);
	let animations = summary(&summaries, "animation");
	assert_eq!(animations.entries, 1);
	assert_eq!(animations.stats.hits, 1);
	assert_eq!(summary(&summaries, "palette").entries, 1);
}

#[test]
fn test_load_failures() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));

	let missing = assets.load_animation("data/global/items/invsword.dc6", PALETTE).unwrap_err();
	assert!(matches!(missing, AssetError::Io(VfsError::NotFound { .. })));

	let unknown = assets.load_animation("data/global/items/invaxe.png", PALETTE).unwrap_err();
	assert!(matches!(unknown, AssetError::UnknownFormat { .. }));

	// Failed loads leave nothing behind
	assert_eq!(summary(&assets.cache_statistics(), "animation").entries, 0);
}

#[test]
fn test_configuration_file_drives_manager() {
	support::init_logging();
	let tree = support::game_tree();
	let config_path = tree.path().join("horadric.toml");
	std::fs::write(
		&config_path,
		format!(
			"mpq_path = '{}'\nmpq_load_order = [\"d2data\"]\nanimation_budget = 1\n",
			tree.path().display()
		),
	)
	.unwrap();

	let config = Configuration::load(Some(&config_path)).unwrap();
	assert_eq!(config.mpq_load_order, vec!["d2data".to_string()]);
	assert_eq!(config.animation_budget, 1);

	let assets = AssetManager::from_config(config);
	// Only the unpatched palette is reachable
	assert_eq!(assets.load_palette(PALETTE).unwrap().get(5), Color::rgb(5, 5, 5));

	assets.load_animation(AXE, PALETTE).unwrap();
	assets.load_animation(support::TORSO, PALETTE).unwrap();
	let animations = assets.cache_statistics().into_iter().find(|s| s.name == "animation").unwrap();
	assert_eq!(animations.entries, 1);
	assert_eq!(animations.stats.evictions, 1);
}

#[test]
fn test_shutdown_releases_everything() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));

	assets.load_animation(AXE, PALETTE).unwrap();
	assert!(assets.animation_data().unwrap().record("sknuhth").is_some());
	assets.shutdown();

	for summary in assets.cache_statistics() {
		assert_eq!(summary.entries, 0, "{} cache not empty", summary.name);
		assert_eq!(summary.weight, 0);
	}
	// Everything loads again on demand
	assert!(assets.load_animation(AXE, PALETTE).is_ok());
}
