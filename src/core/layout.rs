//! Output directory layout consumed by the Go binding package.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::platform::Platform;

/// Directory under the project root that holds every staged platform.
pub const DIST_DIR: &str = "dist";

/// Where the static library and headers for one target platform are staged.
///
/// The shape `dist/<os>_<arch>/{lib,include}` is a binary contract with the
/// downstream cgo directives and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationLayout {
    /// Project root; toolchain files are looked up here.
    pub project_root: PathBuf,
    /// `<root>/dist/<os>_<arch>`, also the CMake install prefix.
    pub dest: PathBuf,
    pub lib: PathBuf,
    pub include: PathBuf,
}

impl DestinationLayout {
    /// Derive the layout for `target` under `project_root`.
    pub fn new(project_root: &Path, target: &Platform) -> Self {
        let dest = project_root.join(DIST_DIR).join(target.dir_name());
        DestinationLayout {
            project_root: project_root.to_path_buf(),
            lib: dest.join("lib"),
            include: dest.join("include"),
            dest,
        }
    }
}
