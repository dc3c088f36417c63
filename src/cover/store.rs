//! Cover art disk store.
//!
//! Mirrors remote box art under `<resources>/<platform>/<base>_<s|l>.png` and
//! reports the externally-servable path of each size, or a placeholder.
//! Assets are written to a temp file in the target directory and renamed into
//! place, so a failed fetch or write never leaves a partial file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::download::CoverDownloader;
use super::{CoverPaths, CoverSize};
use crate::enrichment::igdb::adapter::with_image_size;
use crate::error::{Error, Result, ResultExt};

/// Platform directory holding the placeholder covers
pub const DEFAULT_COVER_PLATFORM: &str = "default";
/// Base name of the placeholder covers
pub const DEFAULT_COVER_NAME: &str = "cover";

/// Cover art disk store.
pub struct CoverStore<D> {
    resources_dir: PathBuf,
    public_prefix: String,
    downloader: D,
}

impl<D: CoverDownloader> CoverStore<D> {
    /// Create a store writing under `resources_dir`, served at `public_prefix`.
    pub fn new(resources_dir: impl Into<PathBuf>, public_prefix: impl Into<String>, downloader: D) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
            downloader,
        }
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// On-disk location of an asset.
    pub fn asset_path(&self, platform: &str, base_name: &str, size: CoverSize) -> PathBuf {
        self.resources_dir
            .join(platform)
            .join(asset_file_name(base_name, size))
    }

    /// Externally-servable path of an asset.
    pub fn public_path(&self, platform: &str, base_name: &str, size: CoverSize) -> String {
        format!(
            "{}/{}/{}",
            self.public_prefix,
            platform,
            asset_file_name(base_name, size)
        )
    }

    /// Placeholder path reported when an asset is absent.
    pub fn default_path(&self, size: CoverSize) -> String {
        self.public_path(DEFAULT_COVER_PLATFORM, DEFAULT_COVER_NAME, size)
    }

    pub fn exists(&self, platform: &str, base_name: &str, size: CoverSize) -> bool {
        self.asset_path(platform, base_name, size).is_file()
    }

    /// Fetch one size of a cover and write it.
    ///
    /// Returns `Ok(false)` when the download failed; the existing asset, if any,
    /// is left untouched. Local write failures are errors.
    pub async fn store(
        &self,
        platform: &str,
        base_name: &str,
        cover_url: &str,
        size: CoverSize,
    ) -> Result<bool> {
        let source = with_image_size(cover_url, size.image_size());

        let data = match self.downloader.download(&source).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    "{} {} cover couldn't be downloaded: {}",
                    base_name,
                    size.label(),
                    e
                );
                return Ok(false);
            }
        };

        let path = self.asset_path(platform, base_name, size);
        tokio::task::spawn_blocking(move || write_atomic(&path, &data))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        tracing::info!("{} {} cover downloaded successfully!", base_name, size.label());
        Ok(true)
    }

    /// Materialize both cover sizes and report where they can be served from.
    ///
    /// A size is fetched only when `overwrite` is set or the asset is absent,
    /// and only if a cover URL is supplied. Calling this twice without
    /// `overwrite` fetches at most once per size.
    pub async fn get_cover_paths(
        &self,
        overwrite: bool,
        platform: &str,
        base_name: &str,
        cover_url: Option<&str>,
    ) -> Result<CoverPaths> {
        let cover_url = cover_url.filter(|u| !u.is_empty());

        for size in [CoverSize::Small, CoverSize::Large] {
            if let Some(url) = cover_url
                && (overwrite || !self.exists(platform, base_name, size))
            {
                self.store(platform, base_name, url, size).await?;
            }
        }

        let resolve = |size| {
            if self.exists(platform, base_name, size) {
                self.public_path(platform, base_name, size)
            } else {
                self.default_path(size)
            }
        };

        Ok(CoverPaths {
            small: resolve(CoverSize::Small),
            large: resolve(CoverSize::Large),
            has_cover: self.exists(platform, base_name, CoverSize::Large),
        })
    }

    /// Materialize the placeholder covers.
    pub async fn store_default_resources(
        &self,
        overwrite: bool,
        small_url: &str,
        large_url: &str,
    ) -> Result<()> {
        for (size, url) in [(CoverSize::Large, large_url), (CoverSize::Small, small_url)] {
            if overwrite || !self.exists(DEFAULT_COVER_PLATFORM, DEFAULT_COVER_NAME, size) {
                self.store(DEFAULT_COVER_PLATFORM, DEFAULT_COVER_NAME, url, size)
                    .await?;
            }
        }
        Ok(())
    }
}

fn asset_file_name(base_name: &str, size: CoverSize) -> String {
    format!("{}_{}.png", base_name, size.suffix())
}

/// Write `data` to `path` via a sibling temp file, creating parent directories.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::invalid_path(path))?;
    fs::create_dir_all(dir).with_context(format!("Failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| Error::Io(e.error).context(format!("Failed to persist {}", path.display())))?;
    Ok(())
}
