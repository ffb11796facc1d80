//! Sprite playback.
//!
//! An [`Animation`] couples the decoded frames of a sprite with a private
//! playback cursor. Frames live behind an [`Arc`] and are shared by every
//! clone, so handing a cached animation to a new owner only copies the
//! cursor. DCC directions are decoded the first time they are selected and
//! the result is visible to every clone.

mod direction;

use std::sync::Arc;

use horadric_types::file::{Color, DIRECTION_COUNT, Dc6File, DccFile, DrawEffect, dir64_to_dcc};

pub use direction::{DecodedDirection, Direction, Shading, SourceFormat};
use direction::Sprite;

use crate::error::{AssetError, CompositionError, RenderError};
use crate::surface::{CompositeMode, DrawParams, RgbaFrame, Surface};

/// Play length, in seconds, of a freshly loaded animation.
pub const DEFAULT_PLAY_LENGTH: f64 = 1.0;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayMode {
	/// Frame does not change
	#[default]
	Paused,
	/// Frames advance
	Forward,
	/// Frames rewind
	Backward,
}

/// A sprite with its own playback cursor.
#[derive(Debug, Clone)]
pub struct Animation {
	sprite: Arc<Sprite>,
	current: Arc<DecodedDirection>,
	direction_index: usize,
	frame_index: usize,
	last_frame_time: f64,
	played_count: u32,
	finished: bool,
	play_mode: PlayMode,
	play_length: f64,
	play_loop: bool,
	sub_loop: Option<(usize, usize)>,
	color_mod: Color,
	composite_mode: CompositeMode,
	effect: DrawEffect,
	shadow: bool,
}

impl Animation {
	fn with_sprite(sprite: Sprite, effect: DrawEffect) -> Result<Self, AssetError> {
		let sprite = Arc::new(sprite);
		let current = sprite.direction(0)?;
		Ok(Self {
			sprite,
			current,
			direction_index: 0,
			frame_index: 0,
			last_frame_time: 0.0,
			played_count: 0,
			finished: false,
			play_mode: PlayMode::Paused,
			play_length: DEFAULT_PLAY_LENGTH,
			play_loop: true,
			sub_loop: None,
			color_mod: Color::WHITE,
			composite_mode: if effect.is_additive() { CompositeMode::Lighter } else { CompositeMode::SourceOver },
			effect,
			shadow: false,
		})
	}

	/// Builds an animation from a DC6 file, converting every frame up front.
	///
	/// DC6 frames hang their `offset_y` on the bottom edge; it is moved to
	/// the top edge here so DC6 and DCC frames drawn at one anchor line up.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Format`] if the file has no directions.
	pub fn from_dc6(file: Dc6File, shading: &Shading) -> Result<Self, AssetError> {
		let frames_per_direction = file.frames_per_direction();
		let directions = file
			.into_directions()
			.into_iter()
			.map(|mut frames| {
				for frame in &mut frames {
					frame.offset_y -= frame.height as i32;
				}
				shading.convert(&frames)
			})
			.collect();
		Self::with_sprite(Sprite::eager(directions, frames_per_direction), shading.effect())
	}

	/// Builds an animation from a DCC file. Only direction 0 is decoded.
	///
	/// # Errors
	///
	/// Returns [`AssetError::Format`] if the direction table is invalid or
	/// direction 0 fails to decode.
	pub fn from_dcc(file: &DccFile, shading: &Shading) -> Result<Self, AssetError> {
		let sprite = Sprite::lazy(file.raw_directions()?, file.frames_per_direction(), shading.clone());
		Self::with_sprite(sprite, shading.effect())
	}

	/// Format the frames came from.
	pub fn format(&self) -> SourceFormat {
		self.sprite.format()
	}

	/// Number of directions in the sprite.
	pub fn direction_count(&self) -> usize {
		self.sprite.direction_count()
	}

	/// Number of directions decoded so far, shared by every clone.
	pub fn decoded_direction_count(&self) -> usize {
		self.sprite.decoded_count()
	}

	/// Native index of the current direction.
	pub fn direction(&self) -> usize {
		self.direction_index
	}

	/// Selects the direction for a 64-way facing and rewinds to frame 0.
	///
	/// # Errors
	///
	/// - [`CompositionError::InvalidDirection`] if `direction >= 64`
	/// - [`AssetError::Format`] if a lazily decoded direction is corrupt
	pub fn set_direction(&mut self, direction: usize) -> Result<(), AssetError> {
		if direction >= DIRECTION_COUNT {
			return Err(CompositionError::InvalidDirection {
				direction,
			}
			.into());
		}
		let index = dir64_to_dcc(direction, self.sprite.direction_count());
		self.current = self.sprite.direction(index)?;
		self.direction_index = index;
		self.frame_index = 0;
		self.finished = false;
		Ok(())
	}

	/// Frames in the current direction.
	pub fn frame_count(&self) -> usize {
		self.current.len()
	}

	/// Frames per direction declared by the file.
	pub fn frames_per_direction(&self) -> usize {
		self.sprite.frames_per_direction()
	}

	/// Index of the frame being shown.
	pub fn current_frame(&self) -> usize {
		self.frame_index
	}

	/// Jumps to `frame`.
	///
	/// # Errors
	///
	/// Returns [`AssetError::FrameOutOfRange`] past the last frame.
	pub fn set_current_frame(&mut self, frame: usize) -> Result<(), AssetError> {
		if frame >= self.frame_count() {
			return Err(AssetError::FrameOutOfRange {
				frame,
				count: self.frame_count(),
			});
		}
		self.frame_index = frame;
		self.last_frame_time = 0.0;
		self.finished = false;
		Ok(())
	}

	/// Goes back to the first frame.
	pub fn rewind(&mut self) {
		self.frame_index = 0;
		self.last_frame_time = 0.0;
		self.finished = false;
	}

	/// Frame being shown.
	pub fn current_image(&self) -> Option<&RgbaFrame> {
		self.current.frame(self.frame_index)
	}

	/// Width and height of `frame` in the current direction.
	///
	/// # Errors
	///
	/// Returns [`AssetError::FrameOutOfRange`] past the last frame.
	pub fn frame_size(&self, frame: usize) -> Result<(u32, u32), AssetError> {
		self.current.frame(frame).map(|image| (image.width, image.height)).ok_or(AssetError::FrameOutOfRange {
			frame,
			count: self.frame_count(),
		})
	}

	/// Width and height of the frame being shown.
	pub fn current_frame_size(&self) -> (u32, u32) {
		self.current_image().map_or((0, 0), |image| (image.width, image.height))
	}

	/// Largest width and height across the current direction.
	pub fn frame_bounds(&self) -> (u32, u32) {
		self.current.bounds()
	}

	/// Whether the first frame is shown.
	pub fn is_on_first_frame(&self) -> bool {
		self.frame_index == 0
	}

	/// Whether the last frame is shown.
	pub fn is_on_last_frame(&self) -> bool {
		self.frame_index + 1 == self.frame_count()
	}

	/// Current play mode.
	pub fn play_mode(&self) -> PlayMode {
		self.play_mode
	}

	/// Starts playing forward.
	pub fn play_forward(&mut self) {
		self.play_mode = PlayMode::Forward;
		self.last_frame_time = 0.0;
		self.finished = false;
	}

	/// Starts playing backward.
	pub fn play_backward(&mut self) {
		self.play_mode = PlayMode::Backward;
		self.last_frame_time = 0.0;
		self.finished = false;
	}

	/// Stops on the current frame.
	pub fn pause(&mut self) {
		self.play_mode = PlayMode::Paused;
		self.last_frame_time = 0.0;
	}

	/// Whether playback wraps around.
	pub fn set_play_loop(&mut self, play_loop: bool) {
		self.play_loop = play_loop;
	}

	/// Whether playback wraps around.
	pub fn play_loop(&self) -> bool {
		self.play_loop
	}

	/// Sets the duration of one frame in seconds.
	pub fn set_play_speed(&mut self, seconds_per_frame: f64) {
		self.set_play_length(seconds_per_frame * self.frame_count() as f64);
	}

	/// Sets the duration of one pass through the direction in seconds.
	pub fn set_play_length(&mut self, seconds: f64) {
		self.play_length = seconds;
		self.last_frame_time = 0.0;
	}

	/// Duration of one pass in seconds.
	pub fn play_length(&self) -> f64 {
		self.play_length
	}

	/// Confines every pass after the first to `start..end`.
	///
	/// # Errors
	///
	/// Returns [`AssetError::InvalidSubLoop`] for an empty range or one
	/// that ends past the last frame.
	pub fn set_sub_loop(&mut self, start: usize, end: usize) -> Result<(), AssetError> {
		if start >= end || end > self.frame_count() {
			return Err(AssetError::InvalidSubLoop {
				start,
				end,
				count: self.frame_count(),
			});
		}
		self.sub_loop = Some((start, end));
		Ok(())
	}

	/// Removes the sub-loop.
	pub fn clear_sub_loop(&mut self) {
		self.sub_loop = None;
	}

	/// Completed passes.
	pub fn played_count(&self) -> u32 {
		self.played_count
	}

	/// Zeroes the pass counter.
	pub fn reset_played_count(&mut self) {
		self.played_count = 0;
		self.finished = false;
	}

	/// Whether a non-looping animation reached its final frame.
	pub fn is_finished(&self) -> bool {
		self.finished
	}

	/// Color multiplied into every pixel.
	pub fn set_color_mod(&mut self, color: Color) {
		self.color_mod = color;
	}

	/// Color multiplied into every pixel.
	pub fn color_mod(&self) -> Color {
		self.color_mod
	}

	/// Switches between additive and alpha blending.
	pub fn set_blend(&mut self, additive: bool) {
		self.composite_mode = if additive { CompositeMode::Lighter } else { CompositeMode::SourceOver };
	}

	/// Blend mode used when drawing.
	pub fn composite_mode(&self) -> CompositeMode {
		self.composite_mode
	}

	/// Effect reported with every draw.
	///
	/// The effect's alpha is applied when frames are converted; changing it
	/// here only changes what the surface is told.
	pub fn set_effect(&mut self, effect: DrawEffect) {
		self.effect = effect;
	}

	/// Effect reported with every draw.
	pub fn effect(&self) -> DrawEffect {
		self.effect
	}

	/// Whether [`Animation::render_shadow`] draws anything.
	pub fn set_shadow(&mut self, shadow: bool) {
		self.shadow = shadow;
	}

	/// Whether the animation casts a shadow.
	pub fn has_shadow(&self) -> bool {
		self.shadow
	}

	fn active_range(&self) -> (usize, usize) {
		match self.sub_loop {
			Some((start, end)) if self.played_count > 0 && end <= self.frame_count() => (start, end),
			_ => (0, self.frame_count()),
		}
	}

	/// Moves playback forward by `elapsed` seconds.
	///
	/// Every crossing of the active range's boundary counts one pass. A
	/// looping animation wraps to the start of the range now in effect
	/// (the sub-loop, once a pass has completed); a non-looping one stops
	/// on the range's last frame and stays there.
	pub fn advance(&mut self, elapsed: f64) {
		let frame_count = self.frame_count();
		if self.play_mode == PlayMode::Paused || self.finished || frame_count == 0 || self.play_length <= 0.0 {
			return;
		}

		let frame_length = self.play_length / frame_count as f64;
		self.last_frame_time += elapsed;
		while self.last_frame_time >= frame_length {
			self.last_frame_time -= frame_length;
			if self.step() {
				self.last_frame_time = 0.0;
				break;
			}
		}
	}

	/// Steps one frame, returning `true` once playback has stopped.
	fn step(&mut self) -> bool {
		let (start, end) = self.active_range();
		let crossed = match self.play_mode {
			PlayMode::Paused => return true,
			PlayMode::Forward => {
				self.frame_index += 1;
				self.frame_index >= end
			}
			PlayMode::Backward => {
				let underflow = self.frame_index <= start;
				self.frame_index = self.frame_index.saturating_sub(1);
				underflow
			}
		};
		if !crossed {
			return false;
		}

		self.played_count = self.played_count.saturating_add(1);
		let (start, end) = self.active_range();
		let forward = self.play_mode == PlayMode::Forward;
		if self.play_loop {
			self.frame_index = if forward { start } else { end - 1 };
			false
		} else {
			self.frame_index = if forward { end - 1 } else { start };
			self.finished = true;
			true
		}
	}

	fn draw_params(&self, frame: &RgbaFrame) -> DrawParams {
		DrawParams {
			x: frame.offset_x,
			y: frame.offset_y,
			composite_mode: self.composite_mode,
			color_mod: self.color_mod,
			effect: self.effect,
			shadow: false,
		}
	}

	/// Draws the current frame at its offset.
	///
	/// # Errors
	///
	/// Returns the surface's [`RenderError`].
	pub fn render(&self, surface: &mut dyn Surface) -> Result<(), RenderError> {
		let Some(frame) = self.current_image() else {
			return Ok(());
		};
		surface.draw(frame, &self.draw_params(frame))
	}

	/// Draws the current frame at `(x, y)` plus its offset.
	///
	/// # Errors
	///
	/// Returns the surface's [`RenderError`].
	pub fn render_at(&self, surface: &mut dyn Surface, x: i32, y: i32) -> Result<(), RenderError> {
		let Some(frame) = self.current_image() else {
			return Ok(());
		};
		let mut params = self.draw_params(frame);
		params.x += x;
		params.y += y;
		surface.draw(frame, &params)
	}

	/// Draws the shadow of the current frame.
	///
	/// Nothing is drawn unless the animation casts a shadow and is opaque.
	/// The shadow is shifted left by half the direction's height and its
	/// vertical offset halved, the host squashes and skews it.
	///
	/// # Errors
	///
	/// Returns the surface's [`RenderError`].
	pub fn render_shadow(&self, surface: &mut dyn Surface) -> Result<(), RenderError> {
		if !self.shadow || self.effect != DrawEffect::None {
			return Ok(());
		}
		let Some(frame) = self.current_image() else {
			return Ok(());
		};
		let (_, height) = self.frame_bounds();
		let params = DrawParams {
			x: frame.offset_x - height as i32 / 2,
			y: frame.offset_y / 2,
			composite_mode: CompositeMode::SourceOver,
			color_mod: self.color_mod,
			effect: DrawEffect::Transparency25,
			shadow: true,
		};
		surface.draw(frame, &params)
	}
}
