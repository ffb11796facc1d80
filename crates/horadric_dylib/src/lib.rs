#![expect(
	clippy::single_component_path_imports,
	reason = "the import forces the dylib to link horadric_internal"
)]

//! Forces dynamic linking of `horadric-rs`.
//!
//! Enable the `dynamic_linking` feature of `horadric-rs` during development
//! to cut incremental link times. Do not depend on this crate directly.

#[allow(unused_imports)]
use horadric_internal;
