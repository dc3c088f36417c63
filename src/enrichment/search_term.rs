//! Search term derivation from ROM filenames.
//!
//! ROM sets tag filenames with release info: `Super Game (USA) (Rev 1) [!].sfc`.
//! Those tags confuse the provider's full-text search, so they are stripped
//! along with the extension before searching. The provider indexes titles in
//! ASCII, so accented and non-Latin characters are transliterated.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Bracketed, parenthesised or braced groups: `[!]`, `(USA)`, `{Beta}`
static TAG_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Filename without extension.
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

/// Transliterate a term to ASCII: `Pokémon` becomes `Pokemon`.
pub fn fold_to_ascii(term: &str) -> String {
    let folded = deunicode::deunicode(term);
    WHITESPACE.replace_all(folded.trim(), " ").into_owned()
}

/// Derive a provider search term from a ROM filename.
///
/// Falls back to the bare stem if stripping tags leaves nothing.
pub fn search_term_from_filename(filename: &str) -> String {
    let stem = file_stem(filename);
    let stripped = TAG_GROUP.replace_all(stem, " ");
    let term = fold_to_ascii(&stripped);

    if term.is_empty() {
        fold_to_ascii(stem)
    } else {
        term
    }
}
