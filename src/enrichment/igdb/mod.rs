//! IGDB API integration
//!
//! Game and platform metadata, covers and screenshots from the Internet Game
//! Database, authenticated with a Twitch client-credentials token.
//!
//! API docs: https://api-docs.igdb.com

pub mod adapter;
pub mod dto;
mod client;

pub use adapter::ImageSize;
pub use client::{Endpoint, IGDB_API_URL, IgdbClient};
