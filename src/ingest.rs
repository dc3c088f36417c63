//! ROM ingestion: identify files on disk and cache their covers.
//!
//! For each ROM the coordinator asks the enrichment service for the best match,
//! then has the cover store materialize the match's cover. Platform resolution
//! always precedes ROM searches; ROMs of one platform are processed with bounded
//! concurrency.

use futures::{Stream, StreamExt};

use crate::cover::{CoverDownloader, CoverPaths, CoverStore};
use crate::enrichment::search_term::file_stem;
use crate::enrichment::{
    EnrichmentService, MatchCandidate, MetadataApi, PlatformMetadata, search_term_from_filename,
};
use crate::error::{Error, Result};
use crate::library::{LibraryStore, RomFile};

/// A ROM with everything the library view needs
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRom {
    pub platform_slug: String,
    pub filename: String,
    pub size_bytes: u64,
    /// Provider game ID, `None` when nothing matched
    pub external_id: Option<u64>,
    pub slug: String,
    /// Provider title, or the cleaned-up filename without a match
    pub name: String,
    pub summary: String,
    pub cover: CoverPaths,
    pub screenshot_urls: Vec<String>,
}

impl EnrichedRom {
    pub fn is_identified(&self) -> bool {
        self.external_id.is_some()
    }

    pub fn size_mb(&self) -> f64 {
        RomFile {
            filename: String::new(),
            size_bytes: self.size_bytes,
        }
        .size_mb()
    }
}

/// Outcome for one ROM during a platform scan
#[derive(Debug)]
pub enum IngestEvent {
    Enriched(EnrichedRom),
    Failed { filename: String, error: Error },
}

/// Result of scanning one platform
#[derive(Debug, Default)]
pub struct PlatformReport {
    pub platform: Option<PlatformMetadata>,
    pub roms: Vec<EnrichedRom>,
    pub failures: Vec<(String, String)>,
}

/// Composes the library, enrichment service and cover store.
pub struct IngestionCoordinator<A, D> {
    library: LibraryStore,
    enrichment: EnrichmentService<A>,
    covers: CoverStore<D>,
    concurrency: usize,
}

impl<A: MetadataApi, D: CoverDownloader> IngestionCoordinator<A, D> {
    pub fn new(
        library: LibraryStore,
        enrichment: EnrichmentService<A>,
        covers: CoverStore<D>,
        concurrency: usize,
    ) -> Self {
        Self {
            library,
            enrichment,
            covers,
            concurrency: concurrency.max(1),
        }
    }

    pub fn library(&self) -> &LibraryStore {
        &self.library
    }

    pub fn enrichment(&self) -> &EnrichmentService<A> {
        &self.enrichment
    }

    pub fn covers(&self) -> &CoverStore<D> {
        &self.covers
    }

    /// Identify one ROM and cache its cover.
    pub async fn enrich_rom(
        &self,
        platform: &PlatformMetadata,
        rom: &RomFile,
        overwrite: bool,
    ) -> Result<EnrichedRom> {
        let candidate = self
            .enrichment
            .search_by_filename(&rom.filename, platform.external_id)
            .await?;

        let cover_url = candidate
            .as_ref()
            .filter(|c| c.has_cover())
            .map(|c| c.cover_url.as_str());
        let cover = self
            .covers
            .get_cover_paths(overwrite, &platform.slug, file_stem(&rom.filename), cover_url)
            .await?;

        Ok(match candidate {
            Some(MatchCandidate {
                external_id,
                slug,
                name,
                summary,
                screenshot_urls,
                ..
            }) => EnrichedRom {
                platform_slug: platform.slug.clone(),
                filename: rom.filename.clone(),
                size_bytes: rom.size_bytes,
                external_id: Some(external_id),
                slug,
                name,
                summary,
                cover,
                screenshot_urls,
            },
            None => EnrichedRom {
                platform_slug: platform.slug.clone(),
                filename: rom.filename.clone(),
                size_bytes: rom.size_bytes,
                external_id: None,
                slug: String::new(),
                name: search_term_from_filename(&rom.filename),
                summary: String::new(),
                cover,
                screenshot_urls: Vec::new(),
            },
        })
    }

    /// Enrich a platform's ROMs concurrently, yielding events as they finish.
    pub fn enrich_platform<'a>(
        &'a self,
        platform: &'a PlatformMetadata,
        roms: Vec<RomFile>,
        overwrite: bool,
    ) -> impl Stream<Item = IngestEvent> + 'a {
        futures::stream::iter(roms)
            .map(move |rom| async move {
                match self.enrich_rom(platform, &rom, overwrite).await {
                    Ok(enriched) => IngestEvent::Enriched(enriched),
                    Err(error) => IngestEvent::Failed {
                        filename: rom.filename,
                        error,
                    },
                }
            })
            .buffer_unordered(self.concurrency)
    }

    /// Resolve a platform, then enrich all of its ROMs.
    ///
    /// A fatal provider error aborts the scan; other per-ROM failures are
    /// collected into the report.
    pub async fn scan_platform(&self, slug: &str, overwrite: bool) -> Result<PlatformReport> {
        let platform = self.enrichment.resolve_platform(slug).await?;
        let roms = self.library.list_roms(slug)?;

        let mut report = PlatformReport::default();
        {
            let mut events = std::pin::pin!(self.enrich_platform(&platform, roms, overwrite));

            while let Some(event) = events.next().await {
                match event {
                    IngestEvent::Enriched(rom) => report.roms.push(rom),
                    IngestEvent::Failed { error, .. } if error.is_fatal() => return Err(error),
                    IngestEvent::Failed { filename, error } => {
                        tracing::error!("Failed to enrich {}/{}: {}", slug, filename, error);
                        report.failures.push((filename, error.to_string()));
                    }
                }
            }
        }

        report.roms.sort_by(|a, b| a.filename.cmp(&b.filename));
        tracing::info!(
            "Enriched {} roms for {} ({} identified)",
            report.roms.len(),
            slug,
            report.roms.iter().filter(|r| r.is_identified()).count()
        );
        report.platform = Some(platform);
        Ok(report)
    }

    /// Scan every non-excluded platform of the library, one after another.
    pub async fn enrich_library(&self, overwrite: bool) -> Result<Vec<PlatformReport>> {
        let mut reports = Vec::new();
        for slug in self.library.list_platforms()? {
            reports.push(self.scan_platform(&slug, overwrite).await?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::mocks::MockDownloader;
    use crate::enrichment::EnrichmentConfig;
    use crate::enrichment::EnrichmentError;
    use crate::enrichment::traits::mocks::{MockMetadataApi, game};
    use crate::test_utils::LibraryFixture;

    const COVER: &str = "//images.igdb.com/igdb/image/upload/t_thumb/co1.jpg";

    fn coordinator(
        fx: &LibraryFixture,
        api: MockMetadataApi,
    ) -> IngestionCoordinator<MockMetadataApi, MockDownloader> {
        IngestionCoordinator::new(
            fx.store(),
            EnrichmentService::new(api, EnrichmentConfig::default()),
            CoverStore::new(
                fx.path().join("resources"),
                "/assets/library/resources",
                MockDownloader::default(),
            ),
            2,
        )
    }

    fn snes_api() -> MockMetadataApi {
        MockMetadataApi::with_platform(19, "snes", "Super Nintendo")
            .search_result(Some(0), vec![game(1, "super-game", "Super Game")])
            .cover(1, COVER)
            .screenshots(1, &["//images.igdb.com/igdb/image/upload/t_thumb/sc1.jpg"])
    }

    #[tokio::test]
    async fn test_enrich_rom_with_match() {
        let fx = LibraryFixture::flat().rom("snes", "Super Game (USA).sfc", b"rom");
        let coordinator = coordinator(&fx, snes_api());
        let platform = coordinator.enrichment().resolve_platform("snes").await.unwrap();
        let rom = &coordinator.library().list_roms("snes").unwrap()[0];

        let enriched = coordinator.enrich_rom(&platform, rom, false).await.unwrap();

        assert_eq!(enriched.external_id, Some(1));
        assert_eq!(enriched.name, "Super Game");
        assert_eq!(
            enriched.cover.large,
            "/assets/library/resources/snes/Super Game (USA)_l.png"
        );
        assert!(enriched.cover.has_cover);
        assert_eq!(enriched.screenshot_urls.len(), 1);
        assert!(enriched.screenshot_urls[0].contains("t_original"));
    }

    #[tokio::test]
    async fn test_enrich_rom_without_match_uses_search_term() {
        let fx = LibraryFixture::flat().rom("snes", "Unknown Thing [b1].sfc", b"rom");
        let coordinator = coordinator(&fx, MockMetadataApi::with_platform(19, "snes", "SNES"));
        let platform = coordinator.enrichment().resolve_platform("snes").await.unwrap();
        let rom = &coordinator.library().list_roms("snes").unwrap()[0];

        let enriched = coordinator.enrich_rom(&platform, rom, false).await.unwrap();

        assert!(!enriched.is_identified());
        assert_eq!(enriched.name, "Unknown Thing");
        assert!(!enriched.cover.has_cover);
        assert_eq!(
            enriched.cover.small,
            "/assets/library/resources/default/cover_s.png"
        );
        assert_eq!(coordinator.covers().downloader().request_count(), 0);
    }

    #[tokio::test]
    async fn test_unresolved_platform_skips_search() {
        let fx = LibraryFixture::flat().rom("weird", "Game.bin", b"rom");
        let coordinator = coordinator(&fx, MockMetadataApi::default());

        let report = coordinator.scan_platform("weird", false).await.unwrap();

        assert_eq!(report.platform, Some(PlatformMetadata::unresolved("weird")));
        assert_eq!(report.roms.len(), 1);
        assert!(coordinator.enrichment().api().searches.lock().is_empty());
    }

    #[tokio::test]
    async fn test_scan_platform_enriches_all_roms() {
        let fx = LibraryFixture::structured()
            .rom("snes", "Super Game (USA).sfc", b"a")
            .rom("snes", "Super Game (EUR).sfc", b"b")
            .rom("snes", "Super Game (JPN).sfc", b"c");
        let coordinator = coordinator(&fx, snes_api());

        let report = coordinator.scan_platform("snes", false).await.unwrap();

        let names: Vec<_> = report.roms.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["Super Game (EUR).sfc", "Super Game (JPN).sfc", "Super Game (USA).sfc"]
        );
        assert!(report.roms.iter().all(|r| r.is_identified()));
        assert!(report.failures.is_empty());
        let platform = report.platform.expect("resolved platform in report");
        assert_eq!(platform.external_id, Some(19));
        // Two sizes per distinct base name
        assert_eq!(coordinator.covers().downloader().request_count(), 6);
    }

    #[tokio::test]
    async fn test_rescan_reuses_cached_covers() {
        let fx = LibraryFixture::flat().rom("snes", "Super Game.sfc", b"a");
        let coordinator = coordinator(&fx, snes_api());

        coordinator.scan_platform("snes", false).await.unwrap();
        coordinator.scan_platform("snes", false).await.unwrap();

        assert_eq!(coordinator.covers().downloader().request_count(), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_aborts_scan() {
        let fx = LibraryFixture::flat().rom("snes", "Game.sfc", b"a");
        let coordinator = coordinator(
            &fx,
            MockMetadataApi::with_error(EnrichmentError::AuthConfig("bad".into())),
        );

        let err = coordinator.scan_platform("snes", false).await.unwrap_err();

        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_upstream_outage_degrades_to_unidentified() {
        let fx = LibraryFixture::flat().rom("snes", "Game.sfc", b"a");
        let coordinator = coordinator(
            &fx,
            MockMetadataApi::with_error(EnrichmentError::Network("down".into())),
        );

        let report = coordinator.scan_platform("snes", false).await.unwrap();

        assert_eq!(report.roms.len(), 1);
        assert!(!report.roms[0].is_identified());
        assert_eq!(report.roms[0].name, "Game");
    }

    #[tokio::test]
    async fn test_enrich_library_visits_each_platform() {
        let fx = LibraryFixture::flat()
            .rom("snes", "Super Game.sfc", b"a")
            .rom("gb", "Tetris.gb", b"b")
            .dir("resources");
        let coordinator = coordinator(&fx, snes_api());

        let reports = coordinator.enrich_library(false).await.unwrap();

        let slugs: Vec<_> = reports
            .iter()
            .filter_map(|r| r.platform.as_ref().map(|p| p.slug.as_str()))
            .collect();
        assert_eq!(slugs, vec!["gb", "snes"]);
    }

    #[tokio::test]
    async fn test_enrich_platform_stream_yields_every_rom() {
        let fx = LibraryFixture::flat()
            .rom("snes", "A.sfc", b"a")
            .rom("snes", "B.sfc", b"b");
        let coordinator = coordinator(&fx, snes_api());
        let platform = coordinator.enrichment().resolve_platform("snes").await.unwrap();
        let roms = coordinator.library().list_roms("snes").unwrap();

        let events: Vec<IngestEvent> = coordinator
            .enrich_platform(&platform, roms, false)
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, IngestEvent::Enriched(_))));
    }

    #[test]
    fn test_enriched_size_mb() {
        let rom = EnrichedRom {
            platform_slug: "snes".into(),
            filename: "a.sfc".into(),
            size_bytes: 3 * 1024 * 1024,
            external_id: None,
            slug: String::new(),
            name: "a".into(),
            summary: String::new(),
            cover: CoverPaths {
                small: String::new(),
                large: String::new(),
                has_cover: false,
            },
            screenshot_urls: vec![],
        };
        assert_eq!(rom.size_mb(), 3.0);
    }
}
