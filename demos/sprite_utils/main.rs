//! DC6/DCC sprite CLI utility
//!
//! A command-line tool for inspecting Diablo II sprites and extracting their
//! frames.
//!
//! # Features
//!
//! - **info**: Display direction and frame information about a DC6 or DCC file
//! - **unpack**: Decode every frame to a PNG image with JSON metadata
//!
//! # Metadata Format
//!
//! ```json
//! {
//!   "format": "dcc",
//!   "directions": 8,
//!   "frames_per_direction": 16,
//!   "frames": [
//!     { "direction": 0, "frame": 0, "width": 64, "height": 96,
//!       "offset_x": -32, "offset_y": -90, "filename": "d00_f000.png" }
//!   ]
//! }
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Show sprite information
//! cargo run --example sprite_utils -- info zmtrlitnuhth.dcc --detailed
//!
//! # Unpack with a palette (grayscale when omitted)
//! cargo run --example sprite_utils -- unpack zmtrlitnuhth.dcc -p pal.dat -o frames/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use horadric_rs::prelude::*;
use image::RgbaImage;
use log::{info, warn};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "sprite_utils")]
#[command(author = "horadric-rs project")]
#[command(version = "1.0")]
#[command(about = "DC6/DCC sprite utility - inspect and unpack sprite files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Display information about a sprite file
	Info {
		/// Input DC6 or DCC file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Show every frame
		#[arg(short, long)]
		detailed: bool,
	},

	/// Decode every frame to PNG images
	Unpack {
		/// Input DC6 or DCC file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Output directory (defaults to `<input>_frames/`)
		#[arg(short, long, value_name = "OUTPUT_DIR")]
		output: Option<PathBuf>,

		/// Palette file (256 BGR entries)
		#[arg(short, long, value_name = "PALETTE")]
		palette: Option<PathBuf>,
	},
}

/// Metadata of one extracted frame
#[derive(Debug, Serialize)]
struct FrameMetadata {
	direction: usize,
	frame: usize,
	width: u32,
	height: u32,
	offset_x: i32,
	offset_y: i32,
	filename: String,
}

/// Metadata written next to the frames
#[derive(Debug, Serialize)]
struct SpriteMetadata {
	format: &'static str,
	directions: usize,
	frames_per_direction: usize,
	frames: Vec<FrameMetadata>,
}

/// Decoded frames of a sprite, grouped by direction
struct Sprite {
	format: &'static str,
	frames_per_direction: usize,
	directions: Vec<Vec<DecodedFrame>>,
}

fn load_sprite(path: &Path) -> Result<Sprite> {
	let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).unwrap_or_default();
	let data = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
	match extension.as_str() {
		"dc6" => {
			let file = Dc6File::from_bytes(&data)?;
			let frames_per_direction = file.frames_per_direction();
			let mut directions = file.into_directions();
			// Report the top-left corner, as DCC frames do
			for frame in directions.iter_mut().flatten() {
				frame.offset_y -= frame.height as i32;
			}
			Ok(Sprite {
				format: "dc6",
				frames_per_direction,
				directions,
			})
		}
		"dcc" => {
			let file = DccFile::from_bytes(&data)?;
			let mut directions = Vec::with_capacity(file.direction_count());
			for direction in 0..file.direction_count() {
				directions.push(file.decode_direction(direction)?);
			}
			Ok(Sprite {
				format: "dcc",
				frames_per_direction: file.frames_per_direction(),
				directions,
			})
		}
		other => bail!("unsupported sprite extension '{other}'"),
	}
}

fn handle_info(input: &Path, detailed: bool) -> Result<()> {
	let sprite = load_sprite(input)?;
	println!("File: {}", input.display());
	println!("Format: {}", sprite.format.to_uppercase());
	println!("Directions: {}", sprite.directions.len());
	println!("Frames per direction: {}", sprite.frames_per_direction);

	for (direction, frames) in sprite.directions.iter().enumerate() {
		let (width, height) =
			frames.iter().fold((0, 0), |(w, h), frame| (w.max(frame.width), h.max(frame.height)));
		println!("  Direction {direction:2}: {} frames, bounds {width}x{height}", frames.len());
		if detailed {
			for (index, frame) in frames.iter().enumerate() {
				let opaque = frame.index_pixels.iter().filter(|&&p| p != 0).count();
				println!(
					"    Frame {index:3}: {}x{} at ({}, {}), {opaque} opaque pixels",
					frame.width, frame.height, frame.offset_x, frame.offset_y
				);
			}
		}
	}
	Ok(())
}

fn handle_unpack(input: &Path, output: Option<PathBuf>, palette_path: Option<PathBuf>) -> Result<()> {
	let output_dir = output.unwrap_or_else(|| {
		let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
		input.with_file_name(format!("{stem}_frames"))
	});
	fs::create_dir_all(&output_dir)?;

	let palette = match palette_path {
		Some(path) => Palette::open(&path).with_context(|| format!("cannot load palette {}", path.display()))?,
		None => {
			warn!("no palette given, frames are written in grayscale");
			Palette::grayscale()
		}
	};

	let sprite = load_sprite(input)?;
	let mut metadata = SpriteMetadata {
		format: sprite.format,
		directions: sprite.directions.len(),
		frames_per_direction: sprite.frames_per_direction,
		frames: Vec::new(),
	};

	for (direction, frames) in sprite.directions.iter().enumerate() {
		for (index, frame) in frames.iter().enumerate() {
			let filename = format!("d{direction:02}_f{index:03}.png");
			if frame.width == 0 || frame.height == 0 {
				warn!("skipping empty frame {index} of direction {direction}");
				continue;
			}
			let rgba = index_to_rgba(&frame.index_pixels, &palette);
			let image = RgbaImage::from_raw(frame.width, frame.height, rgba)
				.context("frame size does not match its pixels")?;
			image.save(output_dir.join(&filename))?;

			metadata.frames.push(FrameMetadata {
				direction,
				frame: index,
				width: frame.width,
				height: frame.height,
				offset_x: frame.offset_x,
				offset_y: frame.offset_y,
				filename,
			});
		}
	}

	fs::write(output_dir.join("metadata.json"), serde_json::to_string_pretty(&metadata)?)?;
	info!("wrote {} frames to {}", metadata.frames.len(), output_dir.display());
	Ok(())
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Commands::Info {
			input,
			detailed,
		} => handle_info(&input, detailed),
		Commands::Unpack {
			input,
			output,
			palette,
		} => handle_unpack(&input, output, palette),
	}
}
