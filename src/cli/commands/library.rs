//! Library filesystem commands.

use crate::config::Config;
use crate::library::resolve_raw_path;

use super::{RawKind, library_store};

/// List platforms in the library
pub fn cmd_platforms(config: &Config) -> anyhow::Result<()> {
    let store = library_store(config);
    let platforms = store.list_platforms()?;

    for platform in &platforms {
        let count = store.count_roms(platform)?;
        println!("{:<20} {:>6} roms", platform, count);
    }
    println!("\n{} platforms", platforms.len());
    Ok(())
}

/// List ROMs of a platform
pub fn cmd_roms(config: &Config, platform: &str, count_only: bool) -> anyhow::Result<()> {
    let store = library_store(config);

    if count_only {
        println!("{}", store.count_roms(platform)?);
        return Ok(());
    }

    let roms = store.list_roms(platform)?;
    for rom in &roms {
        println!("{:>10.2} MB  {}", rom.size_mb(), rom.filename);
    }
    println!("\n{} roms", roms.len());
    Ok(())
}

/// Rename a ROM within its platform
pub fn cmd_rename(config: &Config, platform: &str, from: &str, to: &str) -> anyhow::Result<()> {
    library_store(config).rename_rom(platform, from, to)?;
    println!("✓ Renamed {} to {}", from, to);
    Ok(())
}

/// Delete a ROM
pub fn cmd_delete(config: &Config, platform: &str, file: &str) -> anyhow::Result<()> {
    library_store(config).delete_rom(platform, file)?;
    println!("✓ Deleted {}", file);
    Ok(())
}

/// Print the on-disk location of a raw download
pub fn cmd_raw(config: &Config, kind: RawKind, path: &str) -> anyhow::Result<()> {
    let raw = match kind {
        RawKind::Rom => library_store(config).raw_file(path)?,
        RawKind::Asset => resolve_raw_path(&config.library.assets, path)?,
    };
    println!("{}\t{}", raw.filename, raw.path.display());
    Ok(())
}
