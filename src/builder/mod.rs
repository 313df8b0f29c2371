//! Platform detection, toolchain selection, and the CMake driver.

pub mod cmake;
pub mod detect;
pub mod toolchain;

pub use cmake::CMakeBuilder;
pub use detect::{resolve_platform, GoEnvQuery, HostQuery, PlatformQuery};
pub use toolchain::{select, BuildConfiguration, BuildDriver, SelectorInputs};
