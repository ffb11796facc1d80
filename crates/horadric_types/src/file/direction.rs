//! Conversion from the engine's 64-way facing to a sprite's own directions.
//!
//! Sprites store 1, 4, 8, 16, 32 or 64 directions in an interleaved
//! order: the first entries are the four diagonals, then the cardinal
//! directions, then progressively finer angles. The logical facing
//! `0..64` is quantised to the nearest of the sprite's angular sectors,
//! and the sector is translated to the stored index through the tables
//! below.

/// Number of logical facings.
pub const DIRECTION_COUNT: usize = 64;

const SECTORS_4: [u8; 4] = [0, 1, 2, 3];

const SECTORS_8: [u8; 8] = [4, 0, 5, 1, 6, 2, 7, 3];

const SECTORS_16: [u8; 16] = [4, 8, 0, 9, 5, 10, 1, 11, 6, 12, 2, 13, 7, 14, 3, 15];

const SECTORS_32: [u8; 32] = [
	4, 16, 8, 17, 0, 18, 9, 19, 5, 20, 10, 21, 1, 22, 11, 23, 6, 24, 12, 25, 2, 26, 13, 27, 7, 28,
	14, 29, 3, 30, 15, 31,
];

fn sector(direction: usize, count: usize) -> usize {
	let step = DIRECTION_COUNT / count;
	((direction % DIRECTION_COUNT + step / 2) / step) % count
}

/// Maps a 64-way facing to a DCC (or DC6) direction index.
///
/// Always returns a value below `count`; a `count` of zero yields 0.
pub fn dir64_to_dcc(direction: usize, count: usize) -> usize {
	match count {
		0 | 1 => 0,
		4 => SECTORS_4[sector(direction, 4)] as usize,
		8 => SECTORS_8[sector(direction, 8)] as usize,
		16 => SECTORS_16[sector(direction, 16)] as usize,
		32 => SECTORS_32[sector(direction, 32)] as usize,
		DIRECTION_COUNT => direction % DIRECTION_COUNT,
		other => (direction % DIRECTION_COUNT) * other / DIRECTION_COUNT,
	}
}

/// Maps a 64-way facing to a COF direction index.
///
/// COF priority tables use the same ordering as the sprites they drive.
pub fn dir64_to_cof(direction: usize, count: usize) -> usize {
	dir64_to_dcc(direction, count)
}
