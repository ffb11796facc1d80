//! Render sink.
//!
//! The asset layer never talks to a graphics API. Animations hand each
//! visible frame to a [`Surface`] together with [`DrawParams`]; the host
//! uploads the frame's RGBA buffer to whatever texture it likes (the
//! buffer is shared through an [`Arc`], so its pointer is a stable key for
//! texture caching) and draws it with the requested translation, blend
//! and color modulation.
//!
//! [`Canvas`] is a software implementation used by tools and tests, and
//! [`RecordingSurface`] records draw calls without rasterising anything.

use std::fmt;
use std::sync::Arc;

use horadric_types::file::{Color, DecodedFrame, DrawEffect, RgbaConverter};

use crate::error::RenderError;

/// How a frame is combined with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositeMode {
	/// Alpha blending
	#[default]
	SourceOver,
	/// Additive blending
	Lighter,
}

/// A frame converted to RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
	/// Horizontal offset of the left edge from the anchor
	pub offset_x: i32,
	/// Vertical offset of the top edge from the anchor
	pub offset_y: i32,
	/// `width * height * 4` bytes
	pub pixels: Arc<[u8]>,
}

impl RgbaFrame {
	/// Converts an indexed frame.
	pub fn from_indexed(frame: &DecodedFrame, converter: &RgbaConverter<'_>) -> Self {
		Self {
			width: frame.width,
			height: frame.height,
			offset_x: frame.offset_x,
			offset_y: frame.offset_y,
			pixels: Arc::from(converter.convert(&frame.index_pixels)),
		}
	}

	/// RGBA value at `(x, y)`.
	pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
		if x >= self.width || y >= self.height {
			return None;
		}
		let start = (y as usize * self.width as usize + x as usize) * 4;
		let bytes = self.pixels.get(start..start + 4)?;
		Some([bytes[0], bytes[1], bytes[2], bytes[3]])
	}

	/// Checks the pixel buffer against the frame size.
	///
	/// # Errors
	///
	/// Returns [`RenderError::InvalidFrame`] on a length mismatch.
	pub fn validate(&self) -> Result<(), RenderError> {
		let expected = self.width as usize * self.height as usize * 4;
		if self.pixels.len() != expected {
			return Err(RenderError::InvalidFrame {
				width: self.width,
				height: self.height,
				len: self.pixels.len(),
			});
		}
		Ok(())
	}
}

impl fmt::Display for RgbaFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{} @ ({}, {})", self.width, self.height, self.offset_x, self.offset_y)
	}
}

/// Parameters of one draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawParams {
	/// Horizontal translation of the frame's top-left corner
	pub x: i32,
	/// Vertical translation of the frame's top-left corner
	pub y: i32,
	/// Blend mode
	pub composite_mode: CompositeMode,
	/// Multiplied into every pixel
	pub color_mod: Color,
	/// Layer effect, informational for hosts with their own blend stages
	pub effect: DrawEffect,
	/// Draw as a shadow: darkened, squashed and skewed by the host
	pub shadow: bool,
}

impl Default for DrawParams {
	fn default() -> Self {
		Self {
			x: 0,
			y: 0,
			composite_mode: CompositeMode::SourceOver,
			color_mod: Color::WHITE,
			effect: DrawEffect::None,
			shadow: false,
		}
	}
}

/// Receives frames to draw.
pub trait Surface {
	/// Draws `frame` with `params`.
	///
	/// # Errors
	///
	/// Returns [`RenderError`] if the backend cannot draw the frame.
	fn draw(&mut self, frame: &RgbaFrame, params: &DrawParams) -> Result<(), RenderError>;
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
	/// Frame that was drawn
	pub frame: RgbaFrame,
	/// Parameters it was drawn with
	pub params: DrawParams,
}

/// A surface that only records what it is asked to draw.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
	calls: Vec<DrawCall>,
}

impl RecordingSurface {
	/// Creates an empty recorder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Draw calls in issue order.
	pub fn calls(&self) -> &[DrawCall] {
		&self.calls
	}

	/// Forgets recorded calls.
	pub fn clear(&mut self) {
		self.calls.clear();
	}
}

impl Surface for RecordingSurface {
	fn draw(&mut self, frame: &RgbaFrame, params: &DrawParams) -> Result<(), RenderError> {
		frame.validate()?;
		self.calls.push(DrawCall {
			frame: frame.clone(),
			params: *params,
		});
		Ok(())
	}
}

/// Alpha of shadow pixels, matching a 25% transparency layer.
const SHADOW_ALPHA: u32 = 64;

/// A software RGBA surface.
///
/// Draw translations are relative to `origin`, so sprites anchored around
/// `(0, 0)` can be placed in the middle of the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
	width: u32,
	height: u32,
	origin: (i32, i32),
	pixels: Vec<u8>,
}

impl Canvas {
	/// Creates a transparent canvas.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			origin: (0, 0),
			pixels: vec![0; width as usize * height as usize * 4],
		}
	}

	/// Moves the point draw translations are relative to.
	pub fn with_origin(mut self, x: i32, y: i32) -> Self {
		self.origin = (x, y);
		self
	}

	/// Canvas width.
	pub fn width(&self) -> u32 {
		self.width
	}

	/// Canvas height.
	pub fn height(&self) -> u32 {
		self.height
	}

	/// RGBA bytes, row-major.
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Consumes the canvas, returning its RGBA bytes.
	pub fn into_pixels(self) -> Vec<u8> {
		self.pixels
	}

	/// RGBA value at `(x, y)`.
	pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
		if x >= self.width || y >= self.height {
			return None;
		}
		let start = (y as usize * self.width as usize + x as usize) * 4;
		let bytes = &self.pixels[start..start + 4];
		Some([bytes[0], bytes[1], bytes[2], bytes[3]])
	}

	/// Resets every pixel to transparent.
	pub fn clear(&mut self) {
		self.pixels.fill(0);
	}

	fn blend(&mut self, x: i32, y: i32, color: [u32; 3], alpha: u32, mode: CompositeMode) {
		if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
			return;
		}
		let start = (y as usize * self.width as usize + x as usize) * 4;
		let dst = &mut self.pixels[start..start + 4];
		match mode {
			CompositeMode::SourceOver => {
				let inverse = 255 - alpha;
				for channel in 0..3 {
					dst[channel] = ((color[channel] * alpha + dst[channel] as u32 * inverse) / 255) as u8;
				}
				dst[3] = (alpha + dst[3] as u32 * inverse / 255).min(255) as u8;
			}
			CompositeMode::Lighter => {
				for channel in 0..3 {
					dst[channel] = (dst[channel] as u32 + color[channel] * alpha / 255).min(255) as u8;
				}
				dst[3] = (dst[3] as u32 + alpha).min(255) as u8;
			}
		}
	}
}

impl Surface for Canvas {
	fn draw(&mut self, frame: &RgbaFrame, params: &DrawParams) -> Result<(), RenderError> {
		frame.validate()?;
		let modulate = params.color_mod;
		let height = frame.height as i32;
		for row in 0..frame.height {
			for column in 0..frame.width {
				let Some([r, g, b, a]) = frame.pixel(column, row) else {
					continue;
				};
				let mut alpha = a as u32 * modulate.a as u32 / 255;
				if alpha == 0 {
					continue;
				}

				let (dx, dy, color) = if params.shadow {
					alpha = alpha * SHADOW_ALPHA / 255;
					// Half height, leaning right as it rises
					let row = row as i32;
					(column as i32 + (height - row) / 2, row / 2, [0, 0, 0])
				} else {
					let color = [
						r as u32 * modulate.r as u32 / 255,
						g as u32 * modulate.g as u32 / 255,
						b as u32 * modulate.b as u32 / 255,
					];
					(column as i32, row as i32, color)
				};

				self.blend(
					self.origin.0 + params.x + dx,
					self.origin.1 + params.y + dy,
					color,
					alpha,
					params.composite_mode,
				);
			}
		}
		Ok(())
	}
}
