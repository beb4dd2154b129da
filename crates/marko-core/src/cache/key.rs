//! Cache key and hash derivation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Identity under which a cached artifact is stored, derived from the
/// component id and the translator identity. Deterministic: the same
/// component compiled with the same translator always lands on the same key,
/// and distinct translators always get distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

pub fn cache_key(component_id: &str, translator_id: &str) -> CacheKey {
    let mut hasher = blake3::Hasher::new();
    hasher.update(component_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(translator_id.as_bytes());
    CacheKey(hasher.finalize().to_hex().to_string())
}

/// Digest of a template's source text, used to detect content changes.
pub fn content_hash(source: &str) -> String {
    blake3::hash(source.as_bytes()).to_hex().to_string()
}

/// Short stable component id used in optimized builds: the first eight
/// characters of the base64 digest of the project-relative path.
pub fn optimized_id(component_id: &str) -> String {
    let digest = blake3::hash(component_id.as_bytes());
    let encoded = STANDARD.encode(digest.as_bytes());
    encoded[..8].to_string()
}
