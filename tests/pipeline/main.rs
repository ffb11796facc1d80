//! End-to-end tests for `horadric-rs`: game data laid out on disk, read
//! through the archive load order and rendered onto a canvas.

mod assets;
mod composite;
mod support;
