//! Multi-layer entity animation driven by COF files.
//!
//! A [`Composite`] stacks one [`Animation`] per body-part slot. The COF for
//! the active mode and weapon class lists the layers and, for every
//! direction and frame, the order they are drawn in. Switching mode,
//! weapon class or equipment throws the layers away and loads a fresh set.

use std::fmt;
use std::sync::Arc;

use horadric_types::file::{CofFile, CompositeType, DIRECTION_COUNT, DrawEffect, cof, dir64_to_cof};

use crate::animation::Animation;
use crate::asset_manager::AssetManager;
use crate::error::{AssetError, CompositionError, RenderError};
use crate::surface::Surface;

/// Number of body-part slots.
pub const LAYER_COUNT: usize = cof::constants::MAX_LAYER_TYPES;

/// Weapon class tried when a layer has no sprite for the requested one.
pub const FALLBACK_WEAPON_CLASS: &str = "hth";

/// Kind of entity, which decides where its sprites live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
	/// Player characters
	Player,
	/// Monsters and NPCs
	Monster,
	/// Static and interactive objects
	Object,
	/// Projectiles
	Missile,
	/// Spell and aura overlays
	Overlay,
	/// Items on the ground
	Item,
}

impl ObjectType {
	/// Directory holding the entity's tokens.
	pub fn base_path(self) -> &'static str {
		match self {
			ObjectType::Player => "/data/global/chars",
			ObjectType::Monster => "/data/global/monsters",
			ObjectType::Object => "/data/global/objects",
			ObjectType::Missile => "/data/global/missiles",
			ObjectType::Overlay => "/data/global/overlays",
			ObjectType::Item => "/data/global/items",
		}
	}
}

impl fmt::Display for ObjectType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ObjectType::Player => "player",
			ObjectType::Monster => "monster",
			ObjectType::Object => "object",
			ObjectType::Missile => "missile",
			ObjectType::Overlay => "overlay",
			ObjectType::Item => "item",
		};
		f.write_str(name)
	}
}

/// Equipment code per body-part slot. Layers of empty slots are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Equipment {
	slots: [Option<String>; LAYER_COUNT],
}

impl Equipment {
	/// Nothing equipped.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder form of [`Equipment::set`].
	pub fn with(mut self, slot: CompositeType, code: impl Into<String>) -> Self {
		self.set(slot, code);
		self
	}

	/// Equips `code` in `slot`. An empty code clears the slot.
	pub fn set(&mut self, slot: CompositeType, code: impl Into<String>) {
		let code = code.into();
		self.slots[slot.index()] = if code.is_empty() { None } else { Some(code.to_ascii_lowercase()) };
	}

	/// Empties `slot`.
	pub fn clear(&mut self, slot: CompositeType) {
		self.slots[slot.index()] = None;
	}

	/// Code equipped in `slot`.
	pub fn get(&self, slot: CompositeType) -> Option<&str> {
		self.slots[slot.index()].as_deref()
	}
}

/// Layers and playback state of one mode and weapon class.
#[derive(Debug, Clone)]
struct ModeState {
	mode: String,
	weapon_class: String,
	cof: Arc<CofFile>,
	layers: [Option<Animation>; LAYER_COUNT],
	frame_count: usize,
	frame_index: usize,
	animation_speed: f64,
	last_frame_time: f64,
	played_count: u32,
}

/// Layered animation of one game entity.
#[derive(Debug, Clone)]
pub struct Composite {
	base_type: ObjectType,
	token: String,
	palette_path: String,
	direction: usize,
	equipment: Equipment,
	mode: Option<ModeState>,
}

impl Composite {
	/// Creates a composite with no mode selected.
	pub fn new(base_type: ObjectType, token: impl Into<String>, palette_path: impl Into<String>) -> Self {
		Self {
			base_type,
			token: token.into().to_ascii_lowercase(),
			palette_path: palette_path.into(),
			direction: 0,
			equipment: Equipment::new(),
			mode: None,
		}
	}

	/// Entity kind.
	pub fn base_type(&self) -> ObjectType {
		self.base_type
	}

	/// Entity token, such as `ba` or `zm`.
	pub fn token(&self) -> &str {
		&self.token
	}

	/// Palette used by layers loaded from now on.
	pub fn palette_path(&self) -> &str {
		&self.palette_path
	}

	/// Current equipment.
	pub fn equipment(&self) -> &Equipment {
		&self.equipment
	}

	/// Switches to `mode` with `weapon_class`, loading every layer.
	///
	/// Does nothing if the combination is already active. The pass counter
	/// starts over.
	///
	/// # Errors
	///
	/// - [`CompositionError::MissingCof`] if no COF exists for the combination
	/// - [`CompositionError::MissingAnimationData`] if the registry has no record for it
	/// - [`AssetError::Format`] if the COF is malformed
	pub fn set_mode(&mut self, assets: &AssetManager, mode: &str, weapon_class: &str) -> Result<(), AssetError> {
		let mode = mode.to_ascii_lowercase();
		let weapon_class = weapon_class.to_ascii_lowercase();
		if let Some(current) = &self.mode
			&& current.mode == mode
			&& current.weapon_class == weapon_class
		{
			return Ok(());
		}
		self.mode = Some(self.create_mode(assets, mode, weapon_class)?);
		Ok(())
	}

	/// Replaces the equipment, reloading the layers of the active mode.
	///
	/// # Errors
	///
	/// Same as [`Composite::set_mode`].
	pub fn equip(&mut self, assets: &AssetManager, equipment: Equipment) -> Result<(), AssetError> {
		self.equipment = equipment;
		let Some(current) = &self.mode else {
			return Ok(());
		};
		let (mode, weapon_class) = (current.mode.clone(), current.weapon_class.clone());
		self.mode = Some(self.create_mode(assets, mode, weapon_class)?);
		Ok(())
	}

	fn cof_path(&self, mode: &str, weapon_class: &str) -> String {
		format!(
			"{base}/{token}/cof/{token}{mode}{weapon_class}.cof",
			base = self.base_type.base_path(),
			token = self.token
		)
	}

	fn create_mode(&self, assets: &AssetManager, mode: String, weapon_class: String) -> Result<ModeState, AssetError> {
		let cof_path = self.cof_path(&mode, &weapon_class);
		if !assets.file_exists(&cof_path) {
			return Err(CompositionError::MissingCof {
				path: cof_path,
			}
			.into());
		}
		let cof = assets.load_cof(&cof_path)?;

		let key = format!("{}{mode}{weapon_class}", self.token);
		let animation_data = assets.animation_data()?;
		let Some(record) = animation_data.record(&key) else {
			return Err(CompositionError::MissingAnimationData {
				key,
			}
			.into());
		};
		let animation_speed = record.frame_duration();

		let mut layers: [Option<Animation>; LAYER_COUNT] = Default::default();
		for cof_layer in cof.layers() {
			let layer_weapon: &str = if cof_layer.weapon_class.is_empty() { weapon_class.as_str() } else { &cof_layer.weapon_class };
			let Some(mut layer) =
				self.load_layer(assets, cof_layer.kind, &mode, layer_weapon, cof_layer.effective_draw_effect())
			else {
				continue;
			};
			layer.set_play_speed(animation_speed);
			layer.play_forward();
			layer.set_shadow(cof_layer.casts_shadow());
			layer.set_direction(self.direction)?;
			layers[cof_layer.kind.index()] = Some(layer);
		}

		log::debug!(
			"composite {} {mode} {weapon_class}: {} of {} layers loaded",
			self.token,
			layers.iter().flatten().count(),
			cof.layers().len()
		);

		Ok(ModeState {
			mode,
			weapon_class,
			cof,
			layers,
			frame_count: record.frames_per_direction as usize,
			frame_index: 0,
			animation_speed,
			last_frame_time: 0.0,
			played_count: 0,
		})
	}

	/// Loads the sprite of one layer, or `None` if its slot is empty or no
	/// candidate path loads.
	fn load_layer(
		&self,
		assets: &AssetManager,
		kind: CompositeType,
		mode: &str,
		weapon_class: &str,
		effect: DrawEffect,
	) -> Option<Animation> {
		let base = self.base_type.base_path();
		let token = &self.token;
		let layer = kind.code();
		let Some(equipment) = self.equipment.get(kind) else {
			log::debug!("layer {layer} of {token} left empty: nothing equipped");
			return None;
		};

		let candidates = ["dcc", "dc6"].into_iter().flat_map(|extension| {
			[weapon_class, FALLBACK_WEAPON_CLASS].into_iter().map(move |weapon| {
				format!("{base}/{token}/{layer}/{token}{layer}{equipment}{mode}{weapon}.{extension}")
			})
		});
		for path in candidates {
			if !assets.file_exists(&path) {
				continue;
			}
			match assets.load_animation_with_effect(&path, &self.palette_path, effect) {
				Ok(animation) => return Some(animation),
				Err(err) => log::debug!("layer {path} skipped: {err}"),
			}
		}
		log::debug!("no sprite for layer {layer} of {token} {mode} {weapon_class}");
		None
	}

	/// Faces `direction` (`0..64`), turning every loaded layer.
	///
	/// # Errors
	///
	/// Returns [`CompositionError::InvalidDirection`] for `direction >= 64`.
	pub fn set_direction(&mut self, direction: usize) -> Result<(), AssetError> {
		if direction >= DIRECTION_COUNT {
			return Err(CompositionError::InvalidDirection {
				direction,
			}
			.into());
		}
		self.direction = direction;
		if let Some(mode) = &mut self.mode {
			for layer in mode.layers.iter_mut().flatten() {
				layer.set_direction(direction)?;
			}
		}
		Ok(())
	}

	/// Current 64-way facing.
	pub fn direction(&self) -> usize {
		self.direction
	}

	/// Moves the composite and every layer forward by `elapsed` seconds.
	pub fn advance(&mut self, elapsed: f64) {
		let Some(mode) = &mut self.mode else {
			return;
		};
		if mode.frame_count > 0 && mode.animation_speed > 0.0 {
			mode.last_frame_time += elapsed;
			let frames = (mode.last_frame_time / mode.animation_speed) as usize;
			mode.last_frame_time -= frames as f64 * mode.animation_speed;
			mode.frame_index += frames;
			mode.played_count = mode.played_count.saturating_add((mode.frame_index / mode.frame_count) as u32);
			mode.frame_index %= mode.frame_count;
		}
		for layer in mode.layers.iter_mut().flatten() {
			layer.advance(elapsed);
		}
	}

	/// Draws the composite in two passes over the current priority order:
	/// shadows of opaque shadow-casting layers first, then every layer.
	///
	/// Slots without a loaded layer are skipped.
	///
	/// # Errors
	///
	/// Returns the surface's [`RenderError`].
	pub fn render(&self, surface: &mut dyn Surface) -> Result<(), RenderError> {
		let Some(mode) = &self.mode else {
			return Ok(());
		};
		let direction = dir64_to_cof(self.direction, mode.cof.direction_count());
		let priority = mode.cof.priority(direction, mode.frame_index);

		for kind in priority {
			if let Some(layer) = &mode.layers[kind.index()] {
				layer.render_shadow(surface)?;
			}
		}
		for kind in priority {
			if let Some(layer) = &mode.layers[kind.index()] {
				layer.render(surface)?;
			}
		}
		Ok(())
	}

	/// Sets the duration of one frame in seconds for the composite and its layers.
	pub fn set_speed(&mut self, seconds_per_frame: f64) {
		let Some(mode) = &mut self.mode else {
			return;
		};
		mode.animation_speed = seconds_per_frame;
		for layer in mode.layers.iter_mut().flatten() {
			layer.set_play_speed(seconds_per_frame);
		}
	}

	/// Seconds per frame of the active mode.
	pub fn speed(&self) -> Option<f64> {
		self.mode.as_ref().map(|mode| mode.animation_speed)
	}

	/// Palette for layers loaded by the next mode or equipment change.
	pub fn set_palette(&mut self, palette_path: impl Into<String>) {
		self.palette_path = palette_path.into();
	}

	/// Overrides the pass counter.
	pub fn set_played_count(&mut self, count: u32) {
		if let Some(mode) = &mut self.mode {
			mode.played_count = count;
		}
	}

	/// Completed passes through the active mode.
	pub fn played_count(&self) -> u32 {
		self.mode.as_ref().map_or(0, |mode| mode.played_count)
	}

	/// Whether the active mode played through at least once.
	pub fn is_animation_finished(&self) -> bool {
		self.played_count() > 0
	}

	/// Frame of the active mode.
	pub fn current_frame(&self) -> usize {
		self.mode.as_ref().map_or(0, |mode| mode.frame_index)
	}

	/// Frames per direction of the active mode.
	pub fn frame_count(&self) -> usize {
		self.mode.as_ref().map_or(0, |mode| mode.frame_count)
	}

	/// Directions in the active COF.
	pub fn direction_count(&self) -> usize {
		self.mode.as_ref().map_or(0, |mode| mode.cof.direction_count())
	}

	/// Active mode, such as `nu` or `a1`.
	pub fn mode_name(&self) -> Option<&str> {
		self.mode.as_ref().map(|mode| mode.mode.as_str())
	}

	/// Active weapon class.
	pub fn weapon_class(&self) -> Option<&str> {
		self.mode.as_ref().map(|mode| mode.weapon_class.as_str())
	}

	/// Layer loaded in `slot`.
	pub fn layer(&self, slot: CompositeType) -> Option<&Animation> {
		self.mode.as_ref().and_then(|mode| mode.layers[slot.index()].as_ref())
	}

	/// Largest current frame size across the loaded layers.
	pub fn size(&self) -> (u32, u32) {
		let Some(mode) = &self.mode else {
			return (0, 0);
		};
		mode.layers.iter().flatten().fold((0, 0), |(width, height), layer| {
			let (w, h) = layer.current_frame_size();
			(width.max(w), height.max(h))
		})
	}
}
