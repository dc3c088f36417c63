//! Command-line interface for rom-minder.
//!
//! This module provides CLI commands for listing, identifying, renaming and
//! deleting ROMs and for caching their cover art.

mod commands;

pub use commands::{Cli, Commands, RawKind, is_fatal, run_command};
