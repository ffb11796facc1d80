//! Benchmark helper utilities for horadric-rs
//!
//! No game data ships with the repository, so every benchmark runs on
//! synthetic sprites. The generators below produce DC6 and DCC files with
//! the traits that matter to the decoders: transparent runs, a handful of
//! colors per 4x4 cell, and cells that repeat between frames.

use horadric_types::file::{Color, DecodedFrame, Palette, dc6, dcc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seed used by every generator so runs are comparable.
pub const SEED: u64 = 0x0D1A_B10D;

/// A palette with distinct colors for every index.
pub fn test_palette() -> Palette {
	let mut palette = Palette::new();
	for i in 1..=255u8 {
		palette.set(i, Color::rgb(i, i.wrapping_mul(3), i.wrapping_mul(7)));
	}
	palette
}

/// A frame of random palette indices with transparent runs on every row.
pub fn dc6_frame(rng: &mut SmallRng, width: u32, height: u32) -> DecodedFrame {
	let mut index_pixels = Vec::with_capacity((width * height) as usize);
	for _ in 0..height {
		let mut x = 0;
		while x < width {
			let run = rng.random_range(1..=24).min(width - x);
			let transparent = rng.random_bool(0.3);
			for _ in 0..run {
				index_pixels.push(if transparent { 0 } else { rng.random_range(1..=255) });
			}
			x += run;
		}
	}
	DecodedFrame {
		width,
		height,
		offset_x: -(width as i32) / 2,
		offset_y: -(height as i32),
		index_pixels,
	}
}

/// Frames for one DCC direction.
///
/// Each 4x4 cell draws from three colors plus transparency, and about half
/// of the cells keep their pixels from one frame to the next.
pub fn dcc_direction(rng: &mut SmallRng, frames: u32, width: u32, height: u32) -> Vec<DecodedFrame> {
	let pixel_count = (width * height) as usize;
	let mut previous: Option<Vec<u8>> = None;
	let mut out = Vec::with_capacity(frames as usize);
	for _ in 0..frames {
		let mut index_pixels = previous.clone().unwrap_or_else(|| vec![0; pixel_count]);
		for cell_y in 0..height.div_ceil(4) {
			for cell_x in 0..width.div_ceil(4) {
				if previous.is_some() && rng.random_bool(0.5) {
					continue;
				}
				let base = ((cell_x * 31 + cell_y * 17) % 84) as u8 * 3 + 1;
				for y in cell_y * 4..(cell_y * 4 + 4).min(height) {
					for x in cell_x * 4..(cell_x * 4 + 4).min(width) {
						let pick: u8 = rng.random_range(0..4);
						index_pixels[(y * width + x) as usize] = if pick == 0 { 0 } else { base + pick - 1 };
					}
				}
			}
		}
		previous = Some(index_pixels.clone());
		out.push(DecodedFrame {
			width,
			height,
			offset_x: -(width as i32) / 2,
			offset_y: -(height as i32),
			index_pixels,
		});
	}
	out
}

/// Encodes a DC6 file of random frames.
pub fn generate_dc6(directions: u32, frames: u32, (width, height): (u32, u32)) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut builder = dc6::FileBuilder::new(directions, frames);
	for direction in 0..directions {
		for _ in 0..frames {
			builder = builder.frame(direction as usize, dc6_frame(&mut rng, width, height));
		}
	}
	builder.to_bytes().unwrap_or_default()
}

/// Encodes a DCC file of random directions.
pub fn generate_dcc(directions: u32, frames: u32, (width, height): (u32, u32)) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut builder = dcc::FileBuilder::new(frames);
	for _ in 0..directions {
		builder = builder.direction(dcc_direction(&mut rng, frames, width, height));
	}
	builder.to_bytes().unwrap_or_default()
}

/// Common frame sizes for synthetic sprites
pub mod sizes {
	/// Inventory icon: 28x28
	pub const ICON: (u32, u32) = (28, 28);
	/// Body part layer: 64x96
	pub const LAYER: (u32, u32) = (64, 96);
	/// Large monster: 160x200
	pub const MONSTER: (u32, u32) = (160, 200);
	/// Full screen panel: 640x480
	pub const PANEL: (u32, u32) = (640, 480);
}

#[cfg(test)]
mod tests {
	use horadric_types::file::{Dc6File, DccFile};

	use super::*;

	#[test]
	fn test_generated_dc6_decodes() {
		let data = generate_dc6(2, 3, sizes::ICON);
		let file = Dc6File::from_bytes(&data).unwrap();
		assert_eq!(file.direction_count(), 2);
		assert_eq!(file.frames_per_direction(), 3);
	}

	#[test]
	fn test_generated_dcc_decodes() {
		let data = generate_dcc(2, 4, sizes::ICON);
		let file = DccFile::from_bytes(&data).unwrap();
		let frames = file.decode_direction(1).unwrap();
		assert_eq!(frames.len(), 4);
		assert_eq!((frames[0].width, frames[0].height), sizes::ICON);
	}

	#[test]
	fn test_dcc_cells_stay_within_four_codes() {
		let mut rng = SmallRng::seed_from_u64(SEED);
		let frames = dcc_direction(&mut rng, 2, 9, 6);
		for frame in &frames {
			for cell_y in 0..2 {
				for cell_x in 0..3 {
					let mut codes: Vec<u8> = (cell_y * 4..(cell_y * 4 + 4).min(6))
						.flat_map(|y| (cell_x * 4..(cell_x * 4 + 4).min(9)).map(move |x| (y, x)))
						.map(|(y, x)| frame.index_pixels[y * 9 + x])
						.collect();
					codes.sort_unstable();
					codes.dedup();
					assert!(codes.len() <= 4);
				}
			}
		}
	}
}
