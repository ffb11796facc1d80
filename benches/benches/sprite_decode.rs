//! Benchmark suite for sprite decoding
//!
//! Measures DC6 and DCC decoding, palette conversion and the cost of
//! turning a cached animation toward a new direction.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use horadric_asset::{Animation, Shading};
use horadric_benches::{generate_dc6, generate_dcc, sizes, test_palette};
use horadric_types::file::{Dc6File, DccFile, RgbaConverter, index_to_rgba};

/// Benchmark DC6 parsing and RLE decoding
fn bench_dc6_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("dc6_decode");

	for (name, size) in [("icon", sizes::ICON), ("monster", sizes::MONSTER), ("panel", sizes::PANEL)] {
		let data = generate_dc6(1, 8, size);
		group.throughput(Throughput::Elements(u64::from(size.0 * size.1) * 8));
		group.bench_with_input(BenchmarkId::new("from_bytes", name), &data, |b, data| {
			b.iter(|| {
				let file = Dc6File::from_bytes(black_box(data));
				black_box(file.map(Dc6File::into_directions))
			});
		});
	}

	group.finish();
}

/// Benchmark DCC direction decoding
fn bench_dcc_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("dcc_decode");

	for (name, size) in [("icon", sizes::ICON), ("layer", sizes::LAYER), ("monster", sizes::MONSTER)] {
		let data = generate_dcc(8, 16, size);
		let Ok(file) = DccFile::from_bytes(&data) else {
			eprintln!("Warning: could not build DCC fixture for {name}");
			continue;
		};
		group.throughput(Throughput::Elements(u64::from(size.0 * size.1) * 16));
		group.bench_with_input(BenchmarkId::new("direction", name), &file, |b, file| {
			b.iter(|| black_box(file.decode_direction(black_box(3))));
		});
	}

	group.finish();
}

/// Benchmark index to RGBA conversion
fn bench_rgba_conversion(c: &mut Criterion) {
	let mut group = c.benchmark_group("rgba_convert");

	let palette = test_palette();
	let indices: Vec<u8> = (0..640 * 480).map(|i| (i % 256) as u8).collect();
	let mut remap = [0u8; 256];
	for (i, entry) in remap.iter_mut().enumerate() {
		*entry = 255 - i as u8;
	}

	group.throughput(Throughput::Elements(indices.len() as u64));
	group.bench_function("index_to_rgba", |b| {
		b.iter(|| black_box(index_to_rgba(black_box(&indices), &palette)));
	});
	group.bench_function("remapped_into_buffer", |b| {
		let converter = RgbaConverter::new(&palette).with_remap(Some(&remap)).with_alpha(128);
		let mut out = Vec::with_capacity(indices.len() * 4);
		b.iter(|| {
			out.clear();
			converter.convert_into(black_box(&indices), &mut out);
			black_box(out.len())
		});
	});

	group.finish();
}

/// Benchmark lazy direction decoding through an animation
fn bench_animation_directions(c: &mut Criterion) {
	let mut group = c.benchmark_group("animation");

	let data = generate_dcc(8, 16, sizes::LAYER);
	let Ok(file) = DccFile::from_bytes(&data) else {
		eprintln!("Warning: could not build DCC fixture for animation benchmark");
		return;
	};
	let shading = Shading::new(Arc::new(test_palette()));

	group.sample_size(50);
	group.bench_function("load_and_turn_all_directions", |b| {
		b.iter(|| {
			let Ok(mut animation) = Animation::from_dcc(&file, &shading) else {
				return;
			};
			for direction in (0..64).step_by(8) {
				let _ = animation.set_direction(direction);
			}
			black_box(animation.decoded_direction_count());
		});
	});
	group.bench_function("advance_cached", |b| {
		let Ok(mut animation) = Animation::from_dcc(&file, &shading) else {
			return;
		};
		animation.play_forward();
		b.iter(|| {
			animation.advance(black_box(0.04));
			black_box(animation.current_frame())
		});
	});

	group.finish();
}

criterion_group!(
	benches,
	bench_dc6_decode,
	bench_dcc_decode,
	bench_rgba_conversion,
	bench_animation_directions,
);

criterion_main!(benches);
