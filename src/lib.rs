//! rockbuild - stages a static RocksDB build for the Go binding package
//!
//! This crate resolves the target platform, selects the matching CMake
//! toolchain and flags, builds the pinned RocksDB release, and stages the
//! static library and headers under `dist/<os>_<arch>/`.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for rockbuild unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a recording process executor, an in-memory fetcher, and
/// archive fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    errors::DistError, layout::DestinationLayout, platform::PlatformDescriptor,
    source::PinnedSource,
};

pub use builder::toolchain::BuildConfiguration;
pub use util::context::GlobalContext;
