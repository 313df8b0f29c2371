//! Toolchain and flag selection for the RocksDB CMake build.
//!
//! Platform handling is a table of [`PlatformProfile`] rows; the first row
//! matching the target wins and anything unmatched gets generic flags.
//! [`select`] is a pure function of its inputs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::layout::DestinationLayout;
use crate::core::platform::{Platform, PlatformDescriptor};
use crate::util::config::{Config, MsvcConfig};

/// Flags exported as `CFLAGS`/`CXXFLAGS` on every platform.
pub const BASE_BUILD_FLAGS: &[&str] = &["-fPIC", "-O3", "-pipe"];

/// Environment variable telling the toolchain files where to install.
pub const DIST_DIR_ENV: &str = "DIST_DIR";

/// GCC flags silencing `-Wcast-function-type` false positives in RocksDB.
const RELAXED_CXX_FLAGS: &[&str] = &["-Wno-cast-function-type"];
const RELAXED_C_FLAGS: &[&str] = &["-Wno-error=cast-function-type"];

/// Optional RocksDB features, all switched off for a minimal static library.
pub const DISABLED_FEATURES: &[&str] = &[
    "WITH_TESTS",
    "WITH_GFLAGS",
    "WITH_BENCHMARK_TOOLS",
    "WITH_TOOLS",
    "WITH_MD_LIBRARY",
    "WITH_RUNTIME_DEBUG",
    "ROCKSDB_BUILD_SHARED",
    "WITH_SNAPPY",
    "WITH_LZ4",
    "WITH_ZLIB",
    "WITH_LIBURING",
    "WITH_ZSTD",
    "WITH_BZ2",
];

/// One row of the platform policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub name: &'static str,
    /// `GOOS` this row applies to; `None` matches any.
    pub os: Option<&'static str>,
    /// `GOARCH` this row applies to; `None` matches any.
    pub arch: Option<&'static str>,
    /// CMake toolchain file, relative to the project root.
    pub toolchain_file: Option<&'static str>,
    /// Prepended to [`BASE_BUILD_FLAGS`].
    pub target_flags: &'static [&'static str],
    pub relaxed_warnings: bool,
    /// Export [`DIST_DIR_ENV`] to the external build.
    pub dist_dir_signal: bool,
    /// Visual Studio generator, MSVC compilers and `ROCKSDB_INSTALL_ON_WINDOWS`.
    pub msvc: bool,
}

const GENERIC: PlatformProfile = PlatformProfile {
    name: "generic",
    os: None,
    arch: None,
    toolchain_file: None,
    target_flags: &[],
    relaxed_warnings: false,
    dist_dir_signal: false,
    msvc: false,
};

/// The platform policy table, most specific rows first.
pub const PROFILES: &[PlatformProfile] = &[
    PlatformProfile {
        name: "linux-arm64",
        os: Some("linux"),
        arch: Some("arm64"),
        toolchain_file: Some("linux_arm64.cmake"),
        relaxed_warnings: true,
        dist_dir_signal: true,
        ..GENERIC
    },
    PlatformProfile {
        name: "linux",
        os: Some("linux"),
        relaxed_warnings: true,
        ..GENERIC
    },
    PlatformProfile {
        name: "darwin-arm64",
        os: Some("darwin"),
        arch: Some("arm64"),
        toolchain_file: Some("darwin_arm64.cmake"),
        target_flags: &["-target", "arm64-apple-macos11"],
        dist_dir_signal: true,
        ..GENERIC
    },
    PlatformProfile {
        name: "windows",
        os: Some("windows"),
        toolchain_file: Some("win64.cmake"),
        dist_dir_signal: true,
        msvc: true,
        ..GENERIC
    },
];

impl PlatformProfile {
    fn matches(&self, target: &Platform) -> bool {
        self.os.map_or(true, |os| os == target.os.as_str())
            && self.arch.map_or(true, |arch| arch == target.arch.as_str())
    }

    /// The row for `target`, or the generic profile.
    pub fn for_target(target: &Platform) -> &'static PlatformProfile {
        PROFILES
            .iter()
            .find(|p| p.matches(target))
            .unwrap_or(&GENERIC)
    }
}

/// How the configured tree is compiled and installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BuildDriver {
    /// `make -j<jobs>` then `make install/strip`.
    Make { jobs: usize },
    /// MSBuild on the Visual Studio solution; installs without stripping.
    MsBuild { msbuild: PathBuf },
}

/// Plumbing values the selector needs besides the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorInputs {
    pub jobs: usize,
    pub msvc: MsvcConfig,
}

impl SelectorInputs {
    pub fn from_config(config: &Config) -> Self {
        SelectorInputs {
            jobs: config.jobs(),
            msvc: config.msvc.clone(),
        }
    }
}

impl Default for SelectorInputs {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything handed to the external build for one run. Never mutated after
/// [`select`] returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    pub profile: &'static str,
    pub target: Platform,
    pub build_flags: Vec<String>,
    pub c_flags: Vec<String>,
    pub cxx_flags: Vec<String>,
    pub toolchain_file: Option<PathBuf>,
    /// Full CMake configure argument list, excluding source/build dirs.
    pub cmake_params: Vec<String>,
    /// Applied to every external command of the run, and nothing else.
    pub env: BTreeMap<String, String>,
    pub driver: BuildDriver,
}

/// Select the build configuration for a resolved platform.
pub fn select(
    platform: &PlatformDescriptor,
    layout: &DestinationLayout,
    inputs: &SelectorInputs,
) -> BuildConfiguration {
    let target = &platform.target;
    let profile = PlatformProfile::for_target(target);

    let build_flags: Vec<String> = profile
        .target_flags
        .iter()
        .chain(BASE_BUILD_FLAGS)
        .map(|s| s.to_string())
        .collect();

    let (c_flags, cxx_flags) = if profile.relaxed_warnings {
        (to_strings(RELAXED_C_FLAGS), to_strings(RELAXED_CXX_FLAGS))
    } else {
        (Vec::new(), Vec::new())
    };

    let toolchain_file = profile
        .toolchain_file
        .map(|f| layout.project_root.join(f));

    let prefix = layout.dest.display().to_string();

    let mut cmake_params = vec!["-DCMAKE_BUILD_TYPE=Release".to_string()];
    if profile.msvc {
        cmake_params.push("-DROCKSDB_INSTALL_ON_WINDOWS=ON".to_string());
    }
    if let Some(ref file) = toolchain_file {
        cmake_params.push(format!("-DCMAKE_TOOLCHAIN_FILE={}", file.display()));
    }
    cmake_params.extend([
        "-DCMAKE_POSITION_INDEPENDENT_CODE=ON".to_string(),
        format!("-DCMAKE_INSTALL_PREFIX={}", prefix),
        "-DPORTABLE=1".to_string(),
        "-DWITH_CORE_TOOLS=OFF".to_string(),
        format!("-DCMAKE_CXX_FLAGS={}", cxx_flags.join(" ")),
        format!("-DCMAKE_C_FLAGS={}", c_flags.join(" ")),
        format!("-DCMAKE_PREFIX_PATH={}", prefix),
    ]);
    cmake_params.extend(DISABLED_FEATURES.iter().map(|f| format!("-D{}=OFF", f)));

    let driver = if profile.msvc {
        let cl = inputs.msvc.cl.display();
        cmake_params.extend([
            format!("-DCMAKE_CXX_COMPILER={}", cl),
            format!("-DCMAKE_C_COMPILER={}", cl),
            format!("-DCMAKE_ASM_COMPILER={}", inputs.msvc.ml64.display()),
        ]);
        BuildDriver::MsBuild {
            msbuild: inputs.msvc.msbuild.clone(),
        }
    } else {
        BuildDriver::Make { jobs: inputs.jobs }
    };

    let joined = build_flags.join(" ");
    let mut env = BTreeMap::new();
    env.insert("CFLAGS".to_string(), joined.clone());
    env.insert("CXXFLAGS".to_string(), joined);
    if profile.dist_dir_signal {
        env.insert(DIST_DIR_ENV.to_string(), prefix);
    }

    BuildConfiguration {
        profile: profile.name,
        target: target.clone(),
        build_flags,
        c_flags,
        cxx_flags,
        toolchain_file,
        cmake_params,
        env,
        driver,
    }
}

fn to_strings(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::core::platform::{Arch, Os};

    fn configure(os: Os, arch: Arch) -> (BuildConfiguration, DestinationLayout) {
        let host = Platform::new(Os::Linux, Arch::Amd64);
        let target = Platform::new(os, arch);
        let layout = DestinationLayout::new(Path::new("/src/zippdb"), &target);
        let desc = PlatformDescriptor::new(host, target);
        (select(&desc, &layout, &SelectorInputs::default()), layout)
    }

    fn has(config: &BuildConfiguration, param: &str) -> bool {
        config.cmake_params.iter().any(|p| p == param)
    }

    #[test]
    fn test_linux_amd64_relaxed_warnings_no_toolchain() {
        let (config, layout) = configure(Os::Linux, Arch::Amd64);

        assert_eq!(config.profile, "linux");
        assert!(config.toolchain_file.is_none());
        assert!(has(&config, "-DCMAKE_CXX_FLAGS=-Wno-cast-function-type"));
        assert!(has(&config, "-DCMAKE_C_FLAGS=-Wno-error=cast-function-type"));
        assert_eq!(config.env.get("CFLAGS").unwrap(), "-fPIC -O3 -pipe");
        assert!(!config.env.contains_key(DIST_DIR_ENV));
        assert_eq!(config.driver, BuildDriver::Make { jobs: 16 });
        assert!(has(
            &config,
            &format!("-DCMAKE_INSTALL_PREFIX={}", layout.dest.display())
        ));
    }

    #[test]
    fn test_linux_arm64_cross_toolchain() {
        let (config, layout) = configure(Os::Linux, Arch::Arm64);

        assert_eq!(
            config.toolchain_file,
            Some(PathBuf::from("/src/zippdb/linux_arm64.cmake"))
        );
        assert!(has(&config, "-DCMAKE_CXX_FLAGS=-Wno-cast-function-type"));
        assert_eq!(
            config.env.get(DIST_DIR_ENV).map(String::as_str),
            Some(layout.dest.to_str().unwrap())
        );
    }

    #[test]
    fn test_darwin_arm64_min_os_target() {
        let (config, _) = configure(Os::Darwin, Arch::Arm64);

        assert_eq!(
            config.build_flags,
            vec!["-target", "arm64-apple-macos11", "-fPIC", "-O3", "-pipe"]
        );
        assert_eq!(
            config.env.get("CXXFLAGS").unwrap(),
            "-target arm64-apple-macos11 -fPIC -O3 -pipe"
        );
        assert!(has(
            &config,
            "-DCMAKE_TOOLCHAIN_FILE=/src/zippdb/darwin_arm64.cmake"
        ));
        assert!(has(&config, "-DCMAKE_CXX_FLAGS="));
        assert!(config.env.contains_key(DIST_DIR_ENV));
    }

    #[test]
    fn test_windows_msvc() {
        let (config, _) = configure(Os::Windows, Arch::Amd64);

        assert!(has(&config, "-DROCKSDB_INSTALL_ON_WINDOWS=ON"));
        assert!(config
            .cmake_params
            .iter()
            .any(|p| p.starts_with("-DCMAKE_CXX_COMPILER=") && p.ends_with("cl.exe")));
        assert!(config
            .cmake_params
            .iter()
            .any(|p| p.starts_with("-DCMAKE_ASM_COMPILER=") && p.ends_with("ml64.exe")));
        assert!(matches!(config.driver, BuildDriver::MsBuild { .. }));
        assert!(config.env.contains_key(DIST_DIR_ENV));
    }

    #[test]
    fn test_darwin_amd64_is_generic() {
        let (config, _) = configure(Os::Darwin, Arch::Amd64);
        assert_eq!(config.profile, "generic");
        assert!(config.toolchain_file.is_none());
        assert_eq!(config.build_flags, vec!["-fPIC", "-O3", "-pipe"]);
        assert!(config.env.get(DIST_DIR_ENV).is_none());
    }

    #[test]
    fn test_unknown_platform_falls_through() {
        let (config, _) = configure(Os::Other("freebsd".into()), Arch::Other("riscv64".into()));
        assert_eq!(config.profile, "generic");
        assert!(matches!(config.driver, BuildDriver::Make { jobs: 16 }));
    }

    #[test]
    fn test_fixed_parameters_always_present() {
        for (os, arch) in [
            (Os::Linux, Arch::Amd64),
            (Os::Linux, Arch::Arm64),
            (Os::Darwin, Arch::Arm64),
            (Os::Windows, Arch::Amd64),
            (Os::Other("plan9".into()), Arch::Amd64),
        ] {
            let (config, _) = configure(os, arch);
            assert_eq!(config.cmake_params[0], "-DCMAKE_BUILD_TYPE=Release");
            assert!(has(&config, "-DCMAKE_POSITION_INDEPENDENT_CODE=ON"));
            assert!(has(&config, "-DPORTABLE=1"));
            for feature in DISABLED_FEATURES {
                assert!(has(&config, &format!("-D{}=OFF", feature)), "{}", feature);
            }
            assert!(!config.cmake_params.iter().any(|p| p.starts_with("-WITH")));
        }
    }

    #[test]
    fn test_platform_additions_are_appended() {
        let (config, _) = configure(Os::Windows, Arch::Amd64);
        let last_feature = config
            .cmake_params
            .iter()
            .position(|p| p == "-DWITH_BZ2=OFF")
            .unwrap();
        let compiler = config
            .cmake_params
            .iter()
            .position(|p| p.starts_with("-DCMAKE_C_COMPILER="))
            .unwrap();
        assert!(compiler > last_feature);
    }

    #[test]
    fn test_select_is_pure() {
        let inputs = SelectorInputs::default();
        for (os, arch) in [
            (Os::Linux, Arch::Amd64),
            (Os::Linux, Arch::Arm64),
            (Os::Darwin, Arch::Arm64),
            (Os::Windows, Arch::Amd64),
            (Os::Other("plan9".into()), Arch::Amd64),
        ] {
            let target = Platform::new(os, arch);
            let layout = DestinationLayout::new(Path::new("/r"), &target);
            let desc = PlatformDescriptor::new(Platform::new(Os::Darwin, Arch::Amd64), target);

            let first = select(&desc, &layout, &inputs);
            assert_eq!(first, select(&desc, &layout, &inputs), "{}", desc.target);
            assert_eq!(first, select(&desc.clone(), &layout.clone(), &inputs.clone()));
        }
    }

    #[test]
    fn test_jobs_from_inputs() {
        let target = Platform::new(Os::Linux, Arch::Amd64);
        let layout = DestinationLayout::new(Path::new("/r"), &target);
        let desc = PlatformDescriptor::new(target.clone(), target);
        let inputs = SelectorInputs {
            jobs: 3,
            ..SelectorInputs::default()
        };
        assert_eq!(select(&desc, &layout, &inputs).driver, BuildDriver::Make { jobs: 3 });
    }
}
