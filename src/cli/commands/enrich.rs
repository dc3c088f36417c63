//! Provider lookups, scans and cover caching.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::enrichment::MatchCandidate;
use crate::error::Error;
use crate::ingest::{EnrichedRom, PlatformReport};

use super::{coordinator, cover_store, enrichment_service};

/// Identify a single ROM and cache its cover
pub fn cmd_identify(
    rt: &Runtime,
    config: &Config,
    platform: &str,
    file: &str,
    overwrite: bool,
) -> anyhow::Result<()> {
    let coordinator = coordinator(config);

    rt.block_on(async {
        let rom = coordinator
            .library()
            .list_roms(platform)?
            .into_iter()
            .find(|r| r.filename == file)
            .ok_or_else(|| Error::not_found(format!("{}/{}", platform, file)))?;

        let metadata = coordinator.enrichment().resolve_platform(platform).await?;
        let enriched = coordinator.enrich_rom(&metadata, &rom, overwrite).await?;

        print_rom(&enriched);
        Ok::<_, anyhow::Error>(())
    })
}

/// List every provider candidate for a ROM filename
pub fn cmd_candidates(rt: &Runtime, config: &Config, platform: &str, file: &str) -> anyhow::Result<()> {
    let service = enrichment_service(config, &reqwest::Client::new());

    rt.block_on(async {
        let metadata = service.resolve_platform(platform).await?;
        let candidates = service
            .search_all_by_filename(file, metadata.external_id)
            .await?;

        if candidates.is_empty() {
            println!("✗ No matches found for {}.", file);
        }
        for candidate in &candidates {
            print_candidate(candidate);
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Search the provider for every match of a title
pub fn cmd_search(rt: &Runtime, config: &Config, platform: &str, term: &str) -> anyhow::Result<()> {
    let service = enrichment_service(config, &reqwest::Client::new());

    rt.block_on(async {
        let metadata = service.resolve_platform(platform).await?;
        let Some(platform_id) = metadata.external_id else {
            println!("✗ Platform {} is not known to the provider.", platform);
            return Ok(());
        };

        let candidates = service.search_all_by_name(term, platform_id).await?;
        if candidates.is_empty() {
            println!("✗ No matches found for \"{}\".", term);
        }
        for candidate in &candidates {
            print_candidate(candidate);
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Look up a game by provider ID
pub fn cmd_lookup(rt: &Runtime, config: &Config, id: u64) -> anyhow::Result<()> {
    let service = enrichment_service(config, &reqwest::Client::new());

    rt.block_on(async {
        for candidate in service.match_by_id(id).await? {
            print_candidate(&candidate);
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Identify every ROM of a platform, or of the whole library
pub fn cmd_scan(
    rt: &Runtime,
    config: &Config,
    platform: Option<&str>,
    overwrite: bool,
) -> anyhow::Result<()> {
    let coordinator = coordinator(config);

    rt.block_on(async {
        let reports = match platform {
            Some(slug) => vec![coordinator.scan_platform(slug, overwrite).await?],
            None => coordinator.enrich_library(overwrite).await?,
        };

        for report in &reports {
            print_report(report);
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Download the placeholder covers
pub fn cmd_defaults(rt: &Runtime, config: &Config, overwrite: bool) -> anyhow::Result<()> {
    let store = cover_store(config, &reqwest::Client::new());

    rt.block_on(store.store_default_resources(
        overwrite,
        &config.covers.default_small_url,
        &config.covers.default_large_url,
    ))?;

    println!("✓ Default covers in {}", store.resources_dir().join("default").display());
    Ok(())
}

fn print_candidate(candidate: &MatchCandidate) {
    println!("[{}] {}", candidate.external_id, candidate.name);
    if !candidate.slug.is_empty() {
        println!("  Slug:   {}", candidate.slug);
    }
    if candidate.has_cover() {
        println!("  Cover:  {}", candidate.cover_url);
    }
    for url in &candidate.screenshot_urls {
        println!("  Shot:   {}", url);
    }
    println!();
}

fn print_rom(rom: &EnrichedRom) {
    match rom.external_id {
        Some(id) => println!("✓ {} → [{}] {}", rom.filename, id, rom.name),
        None => println!("✗ {} (no match, listed as \"{}\")", rom.filename, rom.name),
    }
    println!("  Size:   {:.2} MB", rom.size_mb());
    println!("  Cover:  {}", rom.cover.large);
}

fn print_report(report: &PlatformReport) {
    let Some(platform) = &report.platform else {
        return;
    };
    let identified = report.roms.iter().filter(|r| r.is_identified()).count();

    println!("{} ({})", platform.name, platform.slug);
    for rom in &report.roms {
        print_rom(rom);
    }
    for (filename, error) in &report.failures {
        println!("✗ {}: {}", filename, error);
    }
    println!(
        "  {} / {} identified, {} failed\n",
        identified,
        report.roms.len(),
        report.failures.len()
    );
}
