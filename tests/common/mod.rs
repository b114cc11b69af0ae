// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use packlist::{Environment, PackageFormat, ParseOptions, Platform};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory holding list files and their source trees.
///
/// The directory is exported to list files as `$DIR`, so includes and
/// wildcard sources can be written without depending on the working
/// directory.
pub struct ListFixture {
    dir: TempDir,
}

impl ListFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the fixture root, creating parent directories
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn mkdir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Linux/RPM options with an environment holding only `$DIR`
    pub fn options(&self) -> ParseOptions {
        self.options_for(linux(), PackageFormat::Rpm)
    }

    pub fn options_for(&self, platform: Platform, format: PackageFormat) -> ParseOptions {
        let env: Environment = [("DIR", self.dir.path().to_string_lossy().into_owned())]
            .into_iter()
            .collect();
        ParseOptions::new(platform, format).with_env(env)
    }
}

pub fn linux() -> Platform {
    Platform::new("Linux", "6.1.0", "x86_64")
}

pub fn solaris() -> Platform {
    Platform::new("SunOS", "5.10", "sun4u")
}
