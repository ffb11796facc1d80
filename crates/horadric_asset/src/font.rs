//! Bitmap fonts: a glyph table paired with a DC6 glyph sheet.

use std::sync::Arc;

use horadric_types::file::{Color, FontTable};

use crate::animation::Animation;
use crate::error::RenderError;
use crate::surface::Surface;

/// A font ready to measure and draw text.
///
/// Cloning shares the glyph table and sheet frames.
#[derive(Debug, Clone)]
pub struct Font {
	table: Arc<FontTable>,
	sheet: Animation,
	color: Color,
}

impl Font {
	/// Pairs a glyph table with its sheet.
	pub fn new(table: Arc<FontTable>, sheet: Animation) -> Self {
		Self {
			table,
			sheet,
			color: Color::WHITE,
		}
	}

	/// Glyph metrics.
	pub fn table(&self) -> &FontTable {
		&self.table
	}

	/// Color multiplied into every glyph.
	pub fn set_color(&mut self, color: Color) {
		self.color = color;
	}

	/// Color multiplied into every glyph.
	pub fn color(&self) -> Color {
		self.color
	}

	fn line_height(&self) -> u32 {
		self.sheet.frame_bounds().1
	}

	/// Width and height of `text` in pixels.
	///
	/// Every line is as tall as the tallest glyph in the sheet.
	pub fn text_size(&self, text: &str) -> (u32, u32) {
		let line_height = self.line_height();
		self.table.text_size_with(text, |_| line_height)
	}

	/// Draws `text` with its top-left corner at `(x, y)`.
	///
	/// Glyphs stand on the bottom of their line. Characters without a glyph
	/// are skipped.
	///
	/// # Errors
	///
	/// Returns the surface's [`RenderError`].
	pub fn render_text(&mut self, surface: &mut dyn Surface, text: &str, x: i32, y: i32) -> Result<(), RenderError> {
		self.sheet.set_color_mod(self.color);
		let line_height = self.line_height() as i32;
		let mut pen_y = y;
		for line in text.split('\n') {
			let mut pen_x = x;
			for character in line.chars() {
				let Some(glyph) = self.table.glyph(character).copied() else {
					continue;
				};
				if self.sheet.set_current_frame(glyph.frame_index as usize).is_ok() {
					self.sheet.render_at(surface, pen_x, pen_y + line_height)?;
				}
				pen_x += i32::from(glyph.width);
			}
			pen_y += line_height;
		}
		Ok(())
	}
}
