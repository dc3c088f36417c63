//! Test utilities and fixtures for rom-minder tests.
//!
//! This module provides a builder for on-disk library trees so filesystem
//! tests don't repeat directory boilerplate.
//!
//! # Example
//!
//! ```ignore
//! use rom_minder::test_utils::LibraryFixture;
//!
//! #[test]
//! fn test_something() {
//!     let fx = LibraryFixture::structured().rom("snes", "Game.sfc", b"rom");
//!     let roms = fx.store().list_roms("snes").unwrap();
//!     // ... test logic
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::library::{Exclusions, LibraryLayout, LibraryStore};

/// A temporary library root, deleted when dropped.
pub struct LibraryFixture {
    dir: TempDir,
    layout: LibraryLayout,
    exclusions: Exclusions,
}

impl LibraryFixture {
    fn new(layout: LibraryLayout) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        if layout == LibraryLayout::Structured {
            fs::create_dir_all(dir.path().join("roms")).expect("Failed to create roms dir");
        }
        Self {
            dir,
            layout,
            exclusions: Exclusions::default(),
        }
    }

    /// `<root>/<platform>/roms/<file>`
    pub fn flat() -> Self {
        Self::new(LibraryLayout::Flat)
    }

    /// `<root>/roms/<platform>/<file>`
    pub fn structured() -> Self {
        Self::new(LibraryLayout::Structured)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn platform_dir(&self, platform: &str) -> PathBuf {
        match self.layout {
            LibraryLayout::Structured => self.path().join("roms").join(platform),
            LibraryLayout::Flat => self.path().join(platform),
        }
    }

    fn roms_dir(&self, platform: &str) -> PathBuf {
        match self.layout {
            LibraryLayout::Structured => self.platform_dir(platform),
            LibraryLayout::Flat => self.platform_dir(platform).join("roms"),
        }
    }

    /// Create an empty platform directory.
    pub fn platform(self, platform: &str) -> Self {
        fs::create_dir_all(self.platform_dir(platform)).expect("Failed to create platform dir");
        self
    }

    /// Create a directory relative to the root.
    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.path().join(relative)).expect("Failed to create dir");
        self
    }

    /// Create a file relative to the root.
    pub fn file(self, relative: &str, contents: &[u8]) -> Self {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write file");
        self
    }

    /// Create a ROM file where the fixture's layout expects it.
    pub fn rom(self, platform: &str, filename: &str, contents: &[u8]) -> Self {
        let dir = self.roms_dir(platform);
        fs::create_dir_all(&dir).expect("Failed to create roms dir");
        fs::write(dir.join(filename), contents).expect("Failed to write rom");
        self
    }

    /// Create a symlink relative to the root pointing at `target`.
    #[cfg(unix)]
    pub fn symlink(self, relative: &str, target: &Path) -> Self {
        let link = self.path().join(relative);
        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::os::unix::fs::symlink(target, &link).expect("Failed to create symlink");
        self
    }

    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// A store over this fixture's root.
    pub fn store(&self) -> LibraryStore {
        LibraryStore::new(self.path(), self.exclusions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_rom_location() {
        let fx = LibraryFixture::flat().rom("gb", "Tetris.gb", b"rom");
        assert!(fx.path().join("gb/roms/Tetris.gb").is_file());
    }

    #[test]
    fn test_structured_rom_location() {
        let fx = LibraryFixture::structured().rom("snes", "Game.sfc", b"rom");
        assert!(fx.path().join("roms/snes/Game.sfc").is_file());
    }
}
