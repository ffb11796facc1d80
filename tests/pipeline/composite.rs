use horadric_rs::prelude::*;

use crate::support::{self, PALETTE};

fn skeleton(assets: &AssetManager) -> Composite {
	let mut composite = assets.load_composite(ObjectType::Monster, "SK", PALETTE);
	composite.equip(assets, Equipment::new().with(CompositeType::Torso, "LIT")).unwrap();
	composite.set_mode(assets, "NU", "HTH").unwrap();
	composite
}

#[test]
fn test_composite_renders_layers_from_disk() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));
	let composite = skeleton(&assets);

	assert_eq!(composite.frame_count(), 2);
	assert_eq!(composite.direction_count(), 8);
	assert_eq!(composite.size(), (4, 4));

	let mut canvas = Canvas::new(12, 12).with_origin(6, 10);
	composite.render(&mut canvas).unwrap();
	// Facing 0 is the fifth of eight sprite directions
	assert_eq!(canvas.pixel(4, 6), Some([64, 64, 64, 255]));
	assert_eq!(canvas.pixel(7, 9), Some([64, 64, 64, 255]));
	assert_eq!(canvas.pixel(8, 9), Some([0, 0, 0, 0]));
}

#[test]
fn test_composite_turns_and_plays() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));
	let mut composite = skeleton(&assets);

	composite.set_direction(16).unwrap();
	let mut canvas = Canvas::new(12, 12).with_origin(6, 10);
	composite.render(&mut canvas).unwrap();
	assert_eq!(canvas.pixel(5, 7), Some([65, 65, 65, 255]));

	// 25 frames per second, two frames per pass
	composite.advance(0.1);
	assert_eq!(composite.played_count(), 1);
	assert_eq!(composite.current_frame(), 0);
	assert!(composite.is_animation_finished());
}

#[test]
fn test_unknown_mode_keeps_composite_usable() {
	support::init_logging();
	let tree = support::game_tree();
	let assets = AssetManager::from_config(support::configuration(tree.path()));
	let mut composite = skeleton(&assets);

	let err = composite.set_mode(&assets, "a1", "hth").unwrap_err();
	assert!(matches!(err, AssetError::Composition(CompositionError::MissingCof { .. })));
	assert_eq!(composite.mode_name(), Some("nu"));

	let mut surface = RecordingSurface::new();
	composite.render(&mut surface).unwrap();
	assert_eq!(surface.calls().len(), 1);
}
