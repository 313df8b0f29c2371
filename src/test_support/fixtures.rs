//! Test fixtures for common test scenarios.

use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};

use super::write_files;

/// Build a `.tar.gz` with every file nested under `top_dir/`, the way
/// GitHub release archives are laid out.
pub fn source_tarball(top_dir: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut tar_data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut tar_data, Compression::default());
        let mut builder = Builder::new(encoder);

        let mut header = Header::new_gnu();
        header.set_path(format!("{}/", top_dir)).unwrap();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_entry_type(EntryType::Directory);
        header.set_cksum();
        builder.append(&header, std::io::empty()).unwrap();

        for (path, content) in files {
            let mut header = Header::new_gnu();
            header.set_path(format!("{}/{}", top_dir, path)).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, content.as_bytes()).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
    tar_data
}

/// A minimal RocksDB source archive.
pub fn rocksdb_tarball() -> Vec<u8> {
    source_tarball(
        "rocksdb-7.8.3",
        &[
            ("CMakeLists.txt", "cmake_minimum_required(VERSION 3.10)\nproject(rocksdb)\n"),
            ("include/rocksdb/c.h", "/* rocksdb c api */\n"),
        ],
    )
}

/// What `make install` of RocksDB leaves under the prefix, bookkeeping included.
pub fn fake_rocksdb_install(prefix: &Path) {
    write_files(
        prefix,
        &[
            ("lib/librocksdb.a", "!<arch>\n"),
            ("lib/cmake/rocksdb/RocksDBConfig.cmake", ""),
            ("lib/pkgconfig/rocksdb.pc", "Name: rocksdb\n"),
            ("include/rocksdb/c.h", "/* rocksdb c api */\n"),
            ("include/rocksdb/db.h", "#pragma once\n"),
            ("bin/ldb", ""),
            ("share/doc/rocksdb/README", ""),
        ],
    );
}
