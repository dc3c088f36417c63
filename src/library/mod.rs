//! Library filesystem access.
//!
//! A library is a directory tree holding one directory per platform. Two
//! layouts are supported, chosen by whether a `roms/` directory exists at the root:
//!
//! - **Structured**: `<root>/roms/<platform>/<file>`
//! - **Flat**: `<root>/<platform>/roms/<file>`
//!
//! Enumeration honours the user's [`Exclusions`]. Mutations never overwrite an
//! existing ROM.

mod exclusion;
pub mod raw;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result, ResultExt};

pub use exclusion::{Exclusions, RESERVED_FOLDERS};
pub use raw::{RawFile, resolve_raw_path};

/// How platforms are laid out under the library root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryLayout {
    /// `<root>/roms/<platform>`
    Structured,
    /// `<root>/<platform>/roms`
    Flat,
}

/// A ROM file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomFile {
    pub filename: String,
    pub size_bytes: u64,
}

impl RomFile {
    /// Size in MiB, rounded to two decimals
    pub fn size_mb(&self) -> f64 {
        (self.size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}

/// Filesystem view of a ROM library.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    root: PathBuf,
    exclusions: Exclusions,
}

impl LibraryStore {
    pub fn new(root: impl Into<PathBuf>, exclusions: Exclusions) -> Self {
        Self {
            root: root.into(),
            exclusions,
        }
    }

    /// Detect the layout from the current state of the root.
    pub fn layout(&self) -> LibraryLayout {
        if self.root.join("roms").is_dir() {
            LibraryLayout::Structured
        } else {
            LibraryLayout::Flat
        }
    }

    /// Directory whose subdirectories are platforms.
    pub fn platforms_dir(&self) -> PathBuf {
        match self.layout() {
            LibraryLayout::Structured => self.root.join("roms"),
            LibraryLayout::Flat => self.root.clone(),
        }
    }

    /// Directory holding a platform's ROM files.
    pub fn roms_dir(&self, platform: &str) -> PathBuf {
        match self.layout() {
            LibraryLayout::Structured => self.root.join("roms").join(platform),
            LibraryLayout::Flat => self.root.join(platform).join("roms"),
        }
    }

    /// Full path of a ROM file.
    pub fn rom_path(&self, platform: &str, filename: &str) -> PathBuf {
        self.roms_dir(platform).join(filename)
    }

    /// Platform slugs, sorted, minus reserved and excluded folders.
    ///
    /// Symlinked platform directories count. Fails with [`Error::NotFound`]
    /// when the root has no subdirectories at all.
    pub fn list_platforms(&self) -> Result<Vec<String>> {
        let dir = self.platforms_dir();
        let dirs: Vec<String> = WalkDir::new(&dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(readable)
            .filter(|e| e.file_type().is_dir())
            .map(|e| entry_name(&e))
            .collect();

        if dirs.is_empty() {
            return Err(Error::not_found(format!(
                "Platforms not found in {}",
                dir.display()
            )));
        }

        let platforms = self.exclusions.filter_platforms(dirs);
        tracing::info!("Filesystem platforms found: {:?}", platforms);
        Ok(platforms)
    }

    /// ROM files of a platform, sorted by name, minus excluded extensions.
    ///
    /// A missing ROM directory is a platform with zero ROMs, not an error.
    pub fn list_roms(&self, platform: &str) -> Result<Vec<RomFile>> {
        let roms: Vec<RomFile> = self
            .rom_entries(platform)
            .into_iter()
            .map(|(filename, entry)| RomFile {
                filename,
                size_bytes: entry_size(&entry),
            })
            .collect();

        tracing::info!("Filesystem roms found for {}: {}", platform, roms.len());
        Ok(roms)
    }

    /// Number of ROM files [`list_roms`](Self::list_roms) would return.
    pub fn count_roms(&self, platform: &str) -> Result<usize> {
        Ok(self.rom_entries(platform).len())
    }

    /// Non-excluded regular files (or links to them) of a platform, by name.
    fn rom_entries(&self, platform: &str) -> Vec<(String, DirEntry)> {
        let dir = self.roms_dir(platform);
        if !dir.is_dir() {
            tracing::warn!("Roms not found for {}", platform);
            return Vec::new();
        }

        WalkDir::new(&dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(readable)
            .filter(|e| e.file_type().is_file())
            .map(|e| (entry_name(&e), e))
            .filter(|(name, _)| !self.exclusions.is_excluded_file(name))
            .collect()
    }

    /// Rename a ROM within its platform directory.
    ///
    /// Same name is a no-op. An existing target is a [`Error::Conflict`] and the
    /// filesystem is left untouched. The existence check and rename are not atomic
    /// against concurrent external renames.
    pub fn rename_rom(&self, platform: &str, old_filename: &str, new_filename: &str) -> Result<()> {
        if old_filename == new_filename {
            return Ok(());
        }
        validate_filename(old_filename)?;
        validate_filename(new_filename)?;

        let from = self.rom_path(platform, old_filename);
        let to = self.rom_path(platform, new_filename);

        if to.exists() {
            return Err(Error::conflict(format!(
                "Can't rename: {} already exists",
                new_filename
            )));
        }
        if !from.exists() {
            return Err(Error::not_found(format!("{}/{}", platform, old_filename)));
        }

        fs::rename(&from, &to)
            .with_context(format!("Failed to rename {} to {}", old_filename, new_filename))?;
        tracing::info!("Renamed {}/{} to {}", platform, old_filename, new_filename);
        Ok(())
    }

    /// Delete a ROM. Deleting an absent file succeeds with a warning.
    pub fn delete_rom(&self, platform: &str, filename: &str) -> Result<()> {
        validate_filename(filename)?;
        let path = self.rom_path(platform, filename);

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Deleted {}/{}", platform, filename);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Rom not found in filesystem: {}/{}", platform, filename);
                Ok(())
            }
            Err(e) => Err(Error::Io(e).context(format!("Failed to delete {}/{}", platform, filename))),
        }
    }

    /// Resolve a library-relative path for raw download.
    pub fn raw_file(&self, relative: &str) -> Result<RawFile> {
        resolve_raw_path(&self.root, relative)
    }
}

fn readable(entry: walkdir::Result<DirEntry>) -> Option<DirEntry> {
    entry
        .map_err(|e| tracing::warn!("Skipping unreadable library entry: {}", e))
        .ok()
}

/// Entry name, with invalid UTF-8 replaced rather than dropped.
fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

fn entry_size(entry: &DirEntry) -> u64 {
    match entry.metadata() {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            tracing::warn!("Failed to read size of {}: {}", entry.path().display(), e);
            0
        }
    }
}

/// A bare file name: non-empty, no separators, not `.` or `..`.
fn validate_filename(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::invalid_path(name));
    }
    Ok(())
}
